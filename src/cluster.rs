use crate::{point::squared_distance, Point, Primitive};

/// What to do with a cluster that received no points during an assignment pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EmptyClusterPolicy {
    /// Keep the centroid where it is. The cluster stays empty until points move closer to it.
    #[default]
    RetainCentroid,
    /// Move the centroid onto the point farthest away from its own centroid, taken from a cluster
    /// that has more than one member. Falls back to [`EmptyClusterPolicy::RetainCentroid`] when
    /// no such point exists (more clusters than points).
    StealFarthest,
    /// Abort the step with [`KMeansError::EmptyClusterDegeneracy`](crate::KMeansError::EmptyClusterDegeneracy).
    Fail,
}

/// One cluster of a running k-means calculation.
///
/// A cluster owns its centroid, but only refers to its members by their index in the dataset of
/// the [`KMeans`](crate::KMeans) instance that produced it. Memberships are rebuilt on every
/// iteration. The identities of the previous iteration's members are kept for the convergence check.
#[derive(Clone, Debug)]
pub struct Cluster<T: Primitive> {
    id: usize,
    centroid: Point<T>,
    members: Vec<usize>,
    previous: Vec<usize>,
}

impl<T: Primitive> Cluster<T> {
    pub(crate) fn new(id: usize, sample_dims: usize) -> Self {
        Self {
            id,
            centroid: Point::zeros(sample_dims, id),
            members: Vec::new(),
            previous: Vec::new(),
        }
    }

    pub fn id(&self) -> usize { self.id }

    pub fn centroid(&self) -> &Point<T> { &self.centroid }

    /// Dataset indices of the points assigned in the last iteration, in dataset order.
    pub fn members(&self) -> &[usize] { &self.members }

    pub fn len(&self) -> usize { self.members.len() }

    pub fn is_empty(&self) -> bool { self.members.is_empty() }

    /// Identities of the points assigned in the last iteration.
    pub fn member_ids<'p>(&'p self, points: &'p [Point<T>]) -> impl Iterator<Item = usize> + 'p {
        self.members.iter().map(move |&idx| points[idx].id())
    }

    pub(crate) fn set_centroid(&mut self, values: impl Iterator<Item = T>) {
        self.centroid.values_mut().iter_mut()
            .zip(values)
            .for_each(|(c, v)| *c = v);
    }

    /// Snapshot the current member identities as "previous" and clear the assignment.
    pub(crate) fn reset(&mut self, points: &[Point<T>]) {
        self.previous.clear();
        self.previous.extend(self.members.iter().map(|&idx| points[idx].id()));
        self.previous.sort_unstable();
        self.members.clear();
    }

    /// Members are kept sorted by dataset index.
    pub(crate) fn assign(&mut self, idx: usize) {
        match self.members.last() {
            Some(&last) if last > idx => {
                let pos = self.members.partition_point(|&m| m < idx);
                self.members.insert(pos, idx);
            }
            _ => self.members.push(idx),
        }
    }

    pub(crate) fn unassign(&mut self, idx: usize) {
        if let Ok(pos) = self.members.binary_search(&idx) {
            self.members.remove(pos);
        }
    }

    /// True when no member was absent from the previous snapshot.
    pub(crate) fn matches_previous(&self, points: &[Point<T>]) -> bool {
        self.members.iter()
            .all(|&idx| self.previous.binary_search(&points[idx].id()).is_ok())
    }

    /// Per-dimension arithmetic mean of all members, `None` for an empty cluster.
    pub(crate) fn mean(&self, points: &[Point<T>]) -> Option<Vec<T>> {
        if self.members.is_empty() {
            return None;
        }
        let mut sum = vec![T::zero(); self.centroid.dimensionality()];
        for &idx in &self.members {
            sum.iter_mut()
                .zip(points[idx].values().iter())
                .for_each(|(s, &v)| *s += v);
        }
        let cnt = T::from(self.members.len())?;
        Some(sum.into_iter().map(|s| s / cnt).collect())
    }

    /// Move the centroid towards **target**. With **max_step** set, the centroid travels at most that
    /// far along the straight line to the target.
    /// ## Returns
    /// The distance left between the centroid and **target** (zero unless the step limit kicked in).
    pub(crate) fn move_centroid(&mut self, target: &[T], max_step: Option<T>) -> T {
        let travel = squared_distance(self.centroid.values(), target).sqrt();
        match max_step {
            Some(max_step) if travel > max_step => {
                let scale = max_step / travel;
                self.centroid.values_mut().iter_mut()
                    .zip(target.iter())
                    .for_each(|(c, &t)| *c = *c + (t - *c) * scale);
                travel - max_step
            }
            _ => {
                self.set_centroid(target.iter().cloned());
                T::zero()
            }
        }
    }
}
