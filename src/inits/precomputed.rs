use crate::{KMeans, KMeansError, KMeansState, Primitive, Result};

#[inline(always)]
pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, computed: Vec<Vec<T>>) -> Result<()> {
    if computed.len() != state.k {
        return Err(KMeansError::CentroidCount { expected: state.k, found: computed.len() });
    }
    for (ci, c) in computed.iter().enumerate() {
        if c.len() != kmean.sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: kmean.sample_dims, found: c.len() });
        }
        if let Some(index) = c.iter().position(|v| !v.is_finite()) {
            return Err(KMeansError::NonFiniteValue { id: ci, index });
        }
    }
    computed.into_iter().enumerate()
        .for_each(|(ci, c)| state.set_centroid_from_iter(ci, c.into_iter()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KMeansConfig;

    #[test]
    fn train_with_precomputed_centroids() {
        let samples = vec![0.0f32, 1.0, 10.0, 11.0, 20.0, 21.0];
        let kmean = KMeans::from_rows(&samples, samples.len(), 1).unwrap();
        let result = kmean.kmeans_lloyd(2, 200, KMeans::init_precomputed(vec![vec![0.0], vec![21.0]]), &KMeansConfig::default()).unwrap();

        assert!(result.is_converged());
        assert_eq!(result.assignments(), &[0, 0, 0, 1, 1, 1]);
        let centroids: Vec<f32> = result.centroids().map(|c| c[0]).collect();
        assert_approx_eq!(centroids[0], 11.0 / 3.0, 1e-5);
        assert_approx_eq!(centroids[1], 52.0 / 3.0, 1e-5);
    }

    #[test]
    fn rejects_malformed_centroids() {
        let kmean = KMeans::from_rows(&[0.0f64, 1.0, 2.0, 3.0], 2, 2).unwrap();
        let conf = KMeansConfig::default();

        let err = kmean.seed(2, KMeans::init_precomputed(vec![vec![0.0, 0.0]]), &conf).unwrap_err();
        assert_eq!(err, KMeansError::CentroidCount { expected: 2, found: 1 });

        let err = kmean.seed(1, KMeans::init_precomputed(vec![vec![0.0, 0.0, 0.0]]), &conf).unwrap_err();
        assert_eq!(err, KMeansError::DimensionMismatch { expected: 2, found: 3 });

        let err = kmean.seed(2, KMeans::init_precomputed(vec![vec![0.0, 0.0], vec![f64::INFINITY, 0.0]]), &conf).unwrap_err();
        assert_eq!(err, KMeansError::NonFiniteValue { id: 1, index: 0 });
    }
}
