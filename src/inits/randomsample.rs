use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};
use rand::seq::index;
use std::ops::DerefMut;

#[inline(always)]
pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
    if state.k > kmean.sample_cnt() {
        return Err(KMeansError::TooManyClusters { k: state.k, sample_cnt: kmean.sample_cnt() });
    }
    index::sample(config.rnd.borrow_mut().deref_mut(), kmean.sample_cnt(), state.k)
        .iter()
        .enumerate()
        .for_each(|(ci, si)| { // Copy randomly chosen points into the centroids
            state.set_centroid_from_iter(ci, kmean.points[si].values().iter().cloned());
        });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn picks_distinct_points() {
        let samples: Vec<f64> = (0..50).map(|v| v as f64).collect();
        let kmean = KMeans::from_rows(&samples, 50, 1).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(7)).build();
        let state = kmean.seed(50, KMeans::init_random_sample, &conf).unwrap();

        let mut picked: Vec<f64> = state.centroids().map(|c| c[0]).collect();
        picked.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(picked, samples);
    }

    #[test]
    fn rejects_more_clusters_than_points() {
        let kmean = KMeans::from_rows(&[1.0f32, 2.0], 2, 1).unwrap();
        let err = kmean.seed(3, KMeans::init_random_sample, &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, KMeansError::TooManyClusters { k: 3, sample_cnt: 2 });
    }
}
