use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};
use rand::distributions::WeightedIndex;
use rand::prelude::*;
use std::ops::DerefMut;

#[inline(always)]
pub(crate) fn calculate<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
    if state.k > kmean.sample_cnt() {
        return Err(KMeansError::TooManyClusters { k: state.k, sample_cnt: kmean.sample_cnt() });
    }
    let mut rnd = config.rnd.borrow_mut();
    {
        // Randomly select first centroid
        let first_idx = rnd.gen_range(0..kmean.sample_cnt());
        state.set_centroid_from_iter(0, kmean.points[first_idx].values().iter().cloned());
    }
    for k in 1..state.k {
        // For each following centroid...
        // Calculate distances & update cluster-assignments
        kmean.update_cluster_assignments(state, Some(k));

        // Draw the next centroid with a probability proportional to each point's squared distance
        // to its nearest centroid so far
        let total: T = state.centroid_distances.iter().cloned().sum();
        let sampled_idx = if !total.is_finite() {
            // the weights overflow, the farthest point is the one that dominates them
            farthest(&state.centroid_distances)
        } else {
            match WeightedIndex::<T>::new(state.centroid_distances.iter()) {
                Ok(centroid_index) => centroid_index.sample(rnd.deref_mut()),
                // every point sits on a centroid already
                Err(_) => rnd.gen_range(0..kmean.sample_cnt()),
            }
        };
        state.set_centroid_from_iter(k, kmean.points[sampled_idx].values().iter().cloned());
    }
    Ok(())
}

/// Index of the largest distance, the first one on ties.
fn farthest<T: Primitive>(distances: &[T]) -> usize {
    distances.iter().enumerate()
        .fold((0, T::neg_infinity()), |best, (idx, &d)| if d > best.1 { (idx, d) } else { best })
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test]
    fn spreads_centroids_over_separated_groups() {
        // three tight groups far apart: k-means++ must never put two centroids into the same group
        let mut samples = Vec::new();
        for center in [0.0f64, 1000.0, 2000.0] {
            for offset in 0..10 {
                samples.push(center + offset as f64 * 0.01);
            }
        }
        let kmean = KMeans::from_rows(&samples, samples.len(), 1).unwrap();
        for seed in 0..20 {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let state = kmean.seed(3, KMeans::init_kmeanplusplus, &conf).unwrap();
            let mut groups: Vec<i64> = state.centroids().map(|c| (c[0] / 1000.0).round() as i64).collect();
            groups.sort_unstable();
            assert_eq!(groups, vec![0, 1, 2]);
        }
    }

    #[test]
    fn identical_points_do_not_fail() {
        let kmean = KMeans::from_rows(&[2.0f32, 2.0, 2.0, 2.0, 2.0, 2.0], 3, 2).unwrap();
        let state = kmean.seed(3, KMeans::init_kmeanplusplus, &KMeansConfig::default()).unwrap();
        assert!(state.centroids().all(|c| c == [2.0, 2.0]));
    }

    #[test]
    fn overflowing_distances_pick_the_farthest_point() {
        let kmean = KMeans::from_rows(&[-1e200f64, 0.0, 1e200], 3, 1).unwrap();
        for seed in 0..10 {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(seed)).build();
            let state = kmean.seed(2, KMeans::init_kmeanplusplus, &conf).unwrap();
            let centroids: Vec<f64> = state.centroids().map(|c| c[0]).collect();
            assert_ne!(centroids[0], centroids[1]);
        }
    }

    #[test]
    fn farthest_prefers_the_first_maximum() {
        assert_eq!(farthest(&[1.0f64, f64::INFINITY, 3.0, f64::INFINITY]), 1);
        assert_eq!(farthest(&[0.0f32, 0.0]), 0);
    }

    #[test]
    fn rejects_more_clusters_than_points() {
        let kmean = KMeans::from_rows(&[1.0f64, 2.0], 2, 1).unwrap();
        let err = kmean.seed(4, KMeans::init_kmeanplusplus, &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, KMeansError::TooManyClusters { k: 4, sample_cnt: 2 });
    }
}
