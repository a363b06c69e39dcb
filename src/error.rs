use thiserror::Error;

pub type Result<T> = std::result::Result<T, KMeansError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KMeansError {
    #[error("attribute index {index} out of range for {dims}-dimensional point")]
    IndexOutOfRange { index: usize, dims: usize },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("point {id} has a non-finite value at attribute {index}")]
    NonFiniteValue { id: usize, index: usize },

    #[error("point id {0} appears more than once in the dataset")]
    DuplicateId(usize),

    #[error("dataset contains no points")]
    EmptyDataset,

    #[error("points must have at least one dimension")]
    ZeroDimensions,

    #[error("sample buffer holds {len} values, expected {sample_cnt} x {sample_dims}")]
    MalformedSamples { len: usize, sample_cnt: usize, sample_dims: usize },

    #[error("state belongs to a dataset of {found} points, expected {expected}")]
    SampleCountMismatch { expected: usize, found: usize },

    #[error("k must be at least 1")]
    InvalidK,

    #[error("cannot pick {k} distinct centroids from {sample_cnt} samples")]
    TooManyClusters { k: usize, sample_cnt: usize },

    #[error("initialization produced {found} centroids, expected {expected}")]
    CentroidCount { expected: usize, found: usize },

    #[error("invalid seeding box: min {min} exceeds max {max} in dimension {dim}")]
    InvalidBounds { dim: usize, min: f64, max: f64 },

    #[error("cluster {cluster} has no assigned points")]
    EmptyClusterDegeneracy { cluster: usize },

    #[error("state has not been seeded")]
    NotSeeded,
}
