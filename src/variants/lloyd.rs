use std::cmp::Ordering;
use crate::{api::Phase, point::squared_distance, EmptyClusterPolicy, KMeans, KMeansConfig, KMeansError, KMeansState, Primitive, Result};

pub(crate) struct Lloyd<T: Primitive> {
    _p: std::marker::PhantomData<T>,
}
impl<T: Primitive> Lloyd<T> {
    /// Rebuild every cluster's membership from the current assignments, snapshotting the previous
    /// memberships first. Returns the new distance sum.
    fn update_memberships(data: &KMeans<T>, state: &mut KMeansState<T>) -> T {
        state.clusters.iter_mut().for_each(|c| c.reset(&data.points));

        data.update_cluster_assignments(state, None);
        for (sample_id, &centroid_id) in state.assignments.iter().enumerate() {
            state.clusters[centroid_id].assign(sample_id);
        }
        state.centroid_distances.iter().cloned().sum()
    }

    /// Give every empty cluster the point that is farthest from its own centroid, as long as that
    /// point is not alone in its cluster. Returns the (cluster, sample) pairs that were moved, the
    /// distances of those samples are removed from **distsum**.
    fn steal_farthest(state: &mut KMeansState<T>, empty: &[usize], distsum: &mut T) -> Vec<(usize, usize)> {
        let mut distance_sorted_samples: Vec<usize> = (0..state.assignments.len()).collect();
        distance_sorted_samples.sort_by(
            |&i1, &i2| state.centroid_distances[i2].partial_cmp(&state.centroid_distances[i1]).unwrap_or(Ordering::Equal));

        let mut stolen = Vec::with_capacity(empty.len());
        for &ci in empty {
            let candidate = distance_sorted_samples.iter().cloned()
                .find(|&si| state.clusters[state.assignments[si]].len() > 1);
            let Some(sample_id) = candidate else {
                tracing::warn!(cluster = ci, "no point left to move into empty cluster, keeping its centroid");
                continue;
            };
            let prev_centroid_id = state.assignments[sample_id];
            state.clusters[prev_centroid_id].unassign(sample_id);
            state.clusters[ci].assign(sample_id);
            state.assignments[sample_id] = ci;
            *distsum -= state.centroid_distances[sample_id];
            state.centroid_distances[sample_id] = T::zero();
            stolen.push((ci, sample_id));
            tracing::debug!(cluster = ci, sample_id, from = prev_centroid_id, "moved farthest point into empty cluster");
        }
        stolen
    }

    /// Move every non-empty cluster's centroid towards the mean of its members.
    /// Returns false if any centroid was held back by the step limit.
    fn update_centroids(data: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> bool {
        let mut settled = true;
        for cluster in state.clusters.iter_mut() {
            // empty clusters keep their centroid
            let Some(mean) = cluster.mean(&data.points) else { continue };
            let remaining = cluster.move_centroid(&mean, config.max_centroid_step);
            tracing::trace!(cluster = cluster.id(), remaining = %remaining, "centroid moved");
            settled &= remaining == T::zero();
        }
        settled
    }

    /// One iteration: assign, handle empty clusters, recenter, check for convergence.
    pub fn step(data: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<bool> {
        let mut new_distsum = Self::update_memberships(data, state);
        let mut stolen = Vec::new();

        let empty: Vec<usize> = state.clusters.iter()
            .filter(|c| c.is_empty())
            .map(|c| c.id())
            .collect();
        if !empty.is_empty() {
            tracing::warn!(iteration = state.iteration + 1, ?empty, policy = ?config.empty_cluster_policy, "empty clusters");
            match config.empty_cluster_policy {
                EmptyClusterPolicy::RetainCentroid => {}
                EmptyClusterPolicy::StealFarthest => {
                    stolen = Self::steal_farthest(state, &empty, &mut new_distsum);
                }
                EmptyClusterPolicy::Fail => {
                    return Err(KMeansError::EmptyClusterDegeneracy { cluster: empty[0] });
                }
            }
        }

        let settled = Self::update_centroids(data, state, config);

        // A stolen point is measured against where its new centroid ended up, which is short of the
        // point when the step limit held the centroid back
        for (ci, sample_id) in stolen {
            let distance = squared_distance(data.points[sample_id].values(), state.clusters[ci].centroid().values());
            state.centroid_distances[sample_id] = distance;
            new_distsum += distance;
        }

        let converged = (settled || !config.require_settled_centroids)
            && state.clusters.iter().all(|c| c.matches_previous(&data.points));
        state.iteration += 1;
        state.distsum = new_distsum;
        state.phase = if converged { Phase::Converged } else { Phase::Iterating };
        tracing::debug!(iteration = state.iteration, distsum = %new_distsum, converged, "iteration done");

        // Notify subscriber about finished iteration
        (config.iteration_done)(state, state.iteration, converged);
        Ok(converged)
    }

    #[inline(always)] pub fn calculate<'a, F>(data: &KMeans<T>, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'a, T>) -> Result<()> {
        let mut state = data.seed(k, init, config)?;
        let mut abort_strategy = config.abort_strategy.create_logic();

        for _ in 0..max_iter {
            let converged = Self::step(data, &mut state, config)?;
            if !abort_strategy.next(converged, state.distsum) {
                break;
            }
        }

        if state.is_converged() {
            tracing::info!(iterations = state.iteration, distsum = %state.distsum, "k-means converged");
        } else if state.iteration == max_iter {
            tracing::warn!(max_iter, "iteration cap reached before convergence");
        }
        Ok(state)
    }
}
