use crate::{KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};
use rand::prelude::*;

#[inline(always)]
pub(crate) fn calculate_bounds<T: Primitive>(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
    let (min, max) = kmean.bounds();
    check_ranges(&min, &max)?;
    fill(state, config, &min, &max);
    Ok(())
}

#[inline(always)]
pub(crate) fn calculate_box<T: Primitive>(
    kmean: &KMeans<T>,
    state: &mut KMeansState<T>,
    config: &KMeansConfig<'_, T>,
    min: &[T],
    max: &[T],
) -> Result<()> {
    for corner in [min, max] {
        if corner.len() != kmean.sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: kmean.sample_dims, found: corner.len() });
        }
    }
    check_ranges(min, max)?;
    fill(state, config, min, max);
    Ok(())
}

/// Every dimension needs finite corners with `min <= max`, and a width that is itself finite.
fn check_ranges<T: Primitive>(min: &[T], max: &[T]) -> Result<()> {
    for (dim, (&lo, &hi)) in min.iter().zip(max.iter()).enumerate() {
        if !lo.is_finite() || !hi.is_finite() || lo > hi || !(hi - lo).is_finite() {
            return Err(KMeansError::InvalidBounds {
                dim,
                min: lo.to_f64().unwrap_or(f64::NAN),
                max: hi.to_f64().unwrap_or(f64::NAN),
            });
        }
    }
    Ok(())
}

/// Draw every coordinate of every centroid independently from `[min, max]` of its dimension.
fn fill<T: Primitive>(state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>, min: &[T], max: &[T]) {
    let mut rnd = config.rnd.borrow_mut();
    for ci in 0..state.k {
        let centroid: Vec<T> = min.iter().zip(max.iter())
            .map(|(&lo, &hi)| rnd.gen_range(lo..=hi))
            .collect();
        state.set_centroid_from_iter(ci, centroid.into_iter());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    #[test] fn centroids_within_bounds_f32() { centroids_within_bounds::<f32>(); }
    #[test] fn centroids_within_bounds_f64() { centroids_within_bounds::<f64>(); }

    fn centroids_within_bounds<T: Primitive>() {
        let mut rnd = StdRng::seed_from_u64(1337);
        let samples: Vec<T> = (0..300).map(|_| rnd.gen_range(T::from(-50.0).unwrap()..T::from(80.0).unwrap())).collect();
        let kmean = KMeans::from_rows(&samples, 100, 3).unwrap();
        let (min, max) = kmean.bounds();

        let conf = KMeansConfig::build().random_generator(rnd).build();
        let state = kmean.seed(16, KMeans::init_uniform_bounds, &conf).unwrap();
        for centroid in state.centroids() {
            for d in 0..3 {
                assert!(centroid[d] >= min[d] && centroid[d] <= max[d]);
            }
        }
    }

    #[test]
    fn centroids_within_box() {
        let kmean = KMeans::from_rows(&[0.0f64, 0.0, 600.0, 500.0], 2, 2).unwrap();
        let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(1)).build();
        let state = kmean.seed(8, KMeans::init_uniform_box(vec![40.0, 40.0], vec![640.0, 540.0]), &conf).unwrap();
        for centroid in state.centroids() {
            assert!((40.0..=640.0).contains(&centroid[0]));
            assert!((40.0..=540.0).contains(&centroid[1]));
        }
    }

    #[test]
    fn degenerate_bounds_collapse_onto_the_data() {
        let kmean = KMeans::from_rows(&[3.0f64, 7.0, 3.0, 7.0, 3.0, 7.0], 3, 2).unwrap();
        let state = kmean.seed(2, KMeans::init_uniform_bounds, &KMeansConfig::default()).unwrap();
        for centroid in state.centroids() {
            assert_eq!(centroid, &[3.0, 7.0]);
        }
    }

    #[test]
    fn rejects_invalid_box() {
        let kmean = KMeans::from_rows(&[0.0f64, 0.0], 1, 2).unwrap();
        let conf = KMeansConfig::default();

        let err = kmean.seed(1, KMeans::init_uniform_box(vec![0.0], vec![1.0]), &conf).unwrap_err();
        assert_eq!(err, KMeansError::DimensionMismatch { expected: 2, found: 1 });

        let err = kmean.seed(1, KMeans::init_uniform_box(vec![0.0, 5.0], vec![1.0, 4.0]), &conf).unwrap_err();
        assert_eq!(err, KMeansError::InvalidBounds { dim: 1, min: 5.0, max: 4.0 });
    }

    #[test]
    fn rejects_box_wider_than_representable() {
        let kmean = KMeans::from_rows(&[0.0f64], 1, 1).unwrap();
        let err = kmean.seed(1, KMeans::init_uniform_box(vec![-f64::MAX], vec![f64::MAX]), &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, KMeansError::InvalidBounds { dim: 0, min: -f64::MAX, max: f64::MAX });
    }

    #[test]
    fn rejects_data_bounds_wider_than_representable() {
        let kmean = KMeans::from_rows(&[-1e308f64, 1e308], 2, 1).unwrap();
        let err = kmean.seed(2, KMeans::init_uniform_bounds, &KMeansConfig::default()).unwrap_err();
        assert_eq!(err, KMeansError::InvalidBounds { dim: 0, min: -1e308, max: 1e308 });

        // other seeding methods still work on the same data
        assert!(kmean.seed(2, KMeans::init_random_sample, &KMeansConfig::default()).is_ok());
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let kmean = KMeans::from_rows(&[0.0f64, 0.0, 100.0, 100.0], 2, 2).unwrap();
        let run = || {
            let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(42)).build();
            let state = kmean.seed(4, KMeans::init_uniform_bounds, &conf).unwrap();
            state.centroids().map(|c| c.to_vec()).collect::<Vec<_>>()
        };
        assert_eq!(run(), run());
    }
}
