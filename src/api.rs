use crate::{point::squared_distance, AbortStrategy, Cluster, EmptyClusterPolicy, KMeansError, Point, Primitive, Result};
use rand::prelude::*;
use rayon::prelude::*;
use std::{cell::RefCell, collections::HashSet};

pub type InitDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>);
pub type IterationDoneCallbackFn<'a, T> = &'a dyn Fn(&KMeansState<T>, usize, bool);

/// This is a structure holding various configuration options for a k-means calculation, such as
/// the random number generator to use, the handling of degenerate clusters, or a couple of callbacks
/// that can be set to observe (e.g. render) a running calculation.
///
/// For a more detailed information about all possible options, have a look at [`KMeansConfigBuilder`].
pub struct KMeansConfig<'a, T: Primitive> {
    /// Callback that is called when the seeding phase finished
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the seeding
    pub(crate) init_done: InitDoneCallbackFn<'a, T>,
    /// Callback that is called after each iteration
    /// ## Arguments
    /// - **state**: Current [`KMeansState`] after the iteration
    /// - **iteration_id**: Number of the finished iteration (starting at 1)
    /// - **converged**: Whether the iteration left all memberships unchanged
    pub(crate) iteration_done: IterationDoneCallbackFn<'a, T>,
    /// Random number generator to use
    pub(crate) rnd: Box<RefCell<dyn RngCore>>,
    /// The abort-strategy to use for [`KMeans::kmeans_lloyd`]
    pub(crate) abort_strategy: AbortStrategy<T>,
    /// Policy for clusters without any assigned point
    pub(crate) empty_cluster_policy: EmptyClusterPolicy,
    /// Maximum distance a centroid may travel per iteration
    pub(crate) max_centroid_step: Option<T>,
    /// Only report convergence once no centroid is held back by the step limit
    pub(crate) require_settled_centroids: bool,
}
impl<'a, T: Primitive> Default for KMeansConfig<'a, T> {
    fn default() -> Self {
        Self {
            init_done: &|_| {},
            iteration_done: &|_, _, _| {},
            rnd: Box::new(RefCell::new(rand::thread_rng())),
            abort_strategy: AbortStrategy::StableAssignments,
            empty_cluster_policy: EmptyClusterPolicy::RetainCentroid,
            max_centroid_step: None,
            require_settled_centroids: false,
        }
    }
}
impl<'a, T: Primitive> KMeansConfig<'a, T> {
    /// Use the [`KMeansConfigBuilder`] to build a [`KMeansConfig`] instance.
    pub fn build() -> KMeansConfigBuilder<'a, T> {
        KMeansConfigBuilder { config: KMeansConfig::default() }
    }
}
impl<'a, T: Primitive> std::fmt::Debug for KMeansConfig<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KMeansConfig")
            .field("abort_strategy", &self.abort_strategy)
            .field("empty_cluster_policy", &self.empty_cluster_policy)
            .field("max_centroid_step", &self.max_centroid_step)
            .field("require_settled_centroids", &self.require_settled_centroids)
            .finish_non_exhaustive()
    }
}

pub struct KMeansConfigBuilder<'a, T: Primitive> {
    config: KMeansConfig<'a, T>,
}
impl<'a, T: Primitive> KMeansConfigBuilder<'a, T> {
    /// Set the callback that should be called after seeding, before the first iteration.
    pub fn init_done(mut self, init_done: InitDoneCallbackFn<'a, T>) -> Self {
        self.config.init_done = init_done; self
    }
    /// Set the callback that should be called after each iteration.
    pub fn iteration_done(mut self, iteration_done: IterationDoneCallbackFn<'a, T>) -> Self {
        self.config.iteration_done = iteration_done; self
    }
    /// Set the random number generator that should be used for seeding (and re-seeding).
    /// Use a seeded generator for deterministically repeatable results.
    pub fn random_generator<R: RngCore + 'static>(mut self, rnd: R) -> Self {
        self.config.rnd = Box::new(RefCell::new(rnd)); self
    }
    /// Set the abort-strategy to use in [`KMeans::kmeans_lloyd`]. For more information,
    /// see documentation of [`AbortStrategy`].
    /// ## Default
    /// [`AbortStrategy::StableAssignments`]
    pub fn abort_strategy(mut self, abort_strategy: AbortStrategy<T>) -> Self {
        self.config.abort_strategy = abort_strategy; self
    }
    /// Set how clusters without members are handled.
    /// ## Default
    /// [`EmptyClusterPolicy::RetainCentroid`]
    pub fn empty_cluster_policy(mut self, policy: EmptyClusterPolicy) -> Self {
        self.config.empty_cluster_policy = policy; self
    }
    /// Limit how far a centroid can travel towards its new mean per iteration. Animations use this to
    /// keep centroid movement smooth. The limited position is what the next iteration assigns against.
    ///
    /// Convergence is still decided on memberships alone, so a run can stop while a centroid is short
    /// of its mean. See [`KMeansConfigBuilder::require_settled_centroids`] to wait for it instead.
    /// ## Default
    /// `None` (centroids jump straight to the mean)
    pub fn max_centroid_step(mut self, max_step: Option<T>) -> Self {
        self.config.max_centroid_step = max_step; self
    }
    /// With a step limit set, additionally require every centroid to have reached the mean of its
    /// members before an iteration counts as converged. The final centroids then match an unlimited
    /// run, at the cost of extra iterations. Has no effect without [`KMeansConfigBuilder::max_centroid_step`].
    /// ## Default
    /// `false` (stable memberships alone mean convergence)
    pub fn require_settled_centroids(mut self, require: bool) -> Self {
        self.config.require_settled_centroids = require; self
    }
    /// Return the internally built configuration structure.
    pub fn build(self) -> KMeansConfig<'a, T> { self.config }
}

/// Lifecycle of a [`KMeansState`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Unseeded,
    Seeded,
    Iterating,
    Converged,
}

/// This is the data-structure storing the current state during calculation, as well as the final
/// result. All mutations are done in this structure, making [`KMeans`] immutable, and therefore allowing
/// multiple runs over one dataset without having to duplicate the input-data.
///
/// Renderers receive it by shared reference from the [`KMeansConfig`] callbacks.
#[derive(Clone, Debug)]
pub struct KMeansState<T: Primitive> {
    pub(crate) k: usize,
    pub(crate) distsum: T,
    pub(crate) iteration: usize,
    pub(crate) phase: Phase,
    pub(crate) clusters: Vec<Cluster<T>>,
    pub(crate) assignments: Vec<usize>,
    pub(crate) centroid_distances: Vec<T>,
    pub(crate) sample_dims: usize,
}
impl<T: Primitive> KMeansState<T> {
    pub(crate) fn new(sample_cnt: usize, sample_dims: usize, k: usize) -> Self {
        Self {
            k,
            distsum: T::infinity(),
            iteration: 0,
            phase: Phase::Unseeded,
            clusters: (0..k).map(|id| Cluster::new(id, sample_dims)).collect(),
            assignments: vec![0usize; sample_cnt],
            centroid_distances: vec![T::infinity(); sample_cnt],
            sample_dims,
        }
    }
    pub(crate) fn set_centroid_from_iter(&mut self, idx: usize, src: impl Iterator<Item = T>) {
        self.clusters[idx].set_centroid(src);
    }

    /// The amount of clusters requested for this calculation.
    pub fn k(&self) -> usize { self.k }
    /// Sum of squared distances from every point to the centroid it was assigned to in the last
    /// iteration. Infinite before the first iteration.
    pub fn distsum(&self) -> T { self.distsum }
    /// Number of finished iterations.
    pub fn iteration(&self) -> usize { self.iteration }
    pub fn phase(&self) -> Phase { self.phase }
    pub fn is_converged(&self) -> bool { self.phase == Phase::Converged }
    pub fn clusters(&self) -> &[Cluster<T>] { &self.clusters }
    /// Vector mapping each point (by dataset index) to its cluster.
    pub fn assignments(&self) -> &[usize] { &self.assignments }
    /// Squared distance of each point to the centroid it was assigned to.
    pub fn centroid_distances(&self) -> &[T] { &self.centroid_distances }
    /// Current centroid positions, in cluster order.
    pub fn centroids(&self) -> impl Iterator<Item = &[T]> + '_ {
        self.clusters.iter().map(|c| c.centroid().values())
    }
}

/// Entrypoint of this crate's API-Surface.
///
/// Create an instance of this struct, giving the points you want to operate on. The primitive type
/// of the points will be the type used internally for all calculations, as well as the result
/// as stored in the returned [`KMeansState`] structure.
///
/// ## Driving a calculation
/// - all at once: [`KMeans::kmeans_lloyd`]
/// - step by step (e.g. for animations): [`KMeans::seed`], then [`KMeans::step`] until it reports convergence
///
/// ## Supported seeding methods
/// - Uniform within the dataset's bounds [`KMeans::init_uniform_bounds`]
/// - Uniform within a given box [`KMeans::init_uniform_box`]
/// - Random-Sample [`KMeans::init_random_sample`]
/// - K-Mean++ [`KMeans::init_kmeanplusplus`]
/// - Precomputed [`KMeans::init_precomputed`]
#[derive(Clone, Debug)]
pub struct KMeans<T: Primitive> {
    pub(crate) sample_dims: usize,
    pub(crate) points: Vec<Point<T>>,
}
impl<T: Primitive> KMeans<T> {
    /// Create a new instance of the [`KMeans`] structure.
    ///
    /// The dataset must not be empty, all points must share the same (non-zero) dimensionality,
    /// carry unique ids, and contain only finite values.
    pub fn new(points: Vec<Point<T>>) -> Result<Self> {
        let sample_dims = points.first().ok_or(KMeansError::EmptyDataset)?.dimensionality();
        if sample_dims == 0 {
            return Err(KMeansError::ZeroDimensions);
        }
        let mut ids = HashSet::with_capacity(points.len());
        for p in &points {
            if p.dimensionality() != sample_dims {
                return Err(KMeansError::DimensionMismatch { expected: sample_dims, found: p.dimensionality() });
            }
            if let Some(index) = p.first_non_finite() {
                return Err(KMeansError::NonFiniteValue { id: p.id(), index });
            }
            if !ids.insert(p.id()) {
                return Err(KMeansError::DuplicateId(p.id()));
            }
        }
        Ok(Self { sample_dims, points })
    }

    /// Create a new instance from a raw sample buffer.
    ///
    /// ## Arguments
    /// - **samples**: Vector of samples [row-major] = [<sample0>,<sample1>,<sample2>,...]
    /// - **sample_cnt**: Amount of samples, contained in the passed **samples** vector
    /// - **sample_dims**: Amount of dimensions each sample from the **sample** vector has
    ///
    /// Points get the ids `1..=sample_cnt`, in buffer order.
    pub fn from_rows(samples: &[T], sample_cnt: usize, sample_dims: usize) -> Result<Self> {
        if sample_dims == 0 {
            return Err(KMeansError::ZeroDimensions);
        }
        if samples.len() != sample_cnt * sample_dims {
            return Err(KMeansError::MalformedSamples { len: samples.len(), sample_cnt, sample_dims });
        }
        let points = samples.chunks_exact(sample_dims)
            .enumerate()
            .map(|(i, row)| Point::new(i + 1, row.to_vec()))
            .collect();
        Self::new(points)
    }

    pub fn points(&self) -> &[Point<T>] { &self.points }

    pub fn sample_cnt(&self) -> usize { self.points.len() }

    pub fn sample_dims(&self) -> usize { self.sample_dims }

    /// Per-dimension minimum and maximum over all points.
    pub fn bounds(&self) -> (Vec<T>, Vec<T>) {
        let mut min = vec![T::infinity(); self.sample_dims];
        let mut max = vec![T::neg_infinity(); self.sample_dims];
        for p in &self.points {
            for (d, &v) in p.values().iter().enumerate() {
                min[d] = min[d].min(v);
                max[d] = max[d].max(v);
            }
        }
        (min, max)
    }

    /// Assign every point to its nearest centroid, considering only the first **limit_k** clusters
    /// (all clusters if `None`). Ties go to the cluster that comes first.
    pub(crate) fn update_cluster_assignments(&self, state: &mut KMeansState<T>, limit_k: Option<usize>) {
        let k = limit_k.unwrap_or(state.k);
        let clusters = &state.clusters[..k];

        self.points.par_iter()
            .zip(state.assignments.par_iter_mut())
            .zip(state.centroid_distances.par_iter_mut())
            .for_each(|((p, assignment), centroid_dist)| {
                let (best_idx, best_dist) = clusters.iter()
                    .map(|c| squared_distance(p.values(), c.centroid().values()))
                    .enumerate()
                    .fold((0, T::infinity()), |best, (ci, dist)| if dist < best.1 { (ci, dist) } else { best });
                *assignment = best_idx;
                *centroid_dist = best_dist;
            });
    }

    /// Start a new calculation: creates **k** clusters and places their centroids using **init**.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **init**: Seeding method to use for the initialization of the **k** centroids
    /// - **config**: Configuration (random generator, callbacks, ...)
    ///
    /// ## Returns
    /// A [`KMeansState`] in [`Phase::Seeded`], with empty clusters.
    pub fn seed<'a, F>(&self, k: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'a, T>) -> Result<()> {
        if k == 0 {
            return Err(KMeansError::InvalidK);
        }
        let mut state = KMeansState::new(self.sample_cnt(), self.sample_dims, k);
        init(self, &mut state, config)?;
        state.phase = Phase::Seeded;
        tracing::debug!(k, sample_cnt = self.sample_cnt(), "centroids seeded");

        (config.init_done)(&state);
        Ok(state)
    }

    /// Run exactly one assignment/recentering iteration on **state**.
    ///
    /// ## Returns
    /// `true` if no cluster gained a point it did not have in the previous iteration, i.e. the
    /// calculation converged. Stepping a converged state again is allowed and keeps it converged.
    pub fn step(&self, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<bool> {
        if state.phase == Phase::Unseeded {
            return Err(KMeansError::NotSeeded);
        }
        if state.sample_dims != self.sample_dims {
            return Err(KMeansError::DimensionMismatch { expected: self.sample_dims, found: state.sample_dims });
        }
        if state.assignments.len() != self.sample_cnt() {
            return Err(KMeansError::SampleCountMismatch { expected: self.sample_cnt(), found: state.assignments.len() });
        }
        crate::variants::Lloyd::step(self, state, config)
    }

    /// Normal K-Means algorithm implementation (Lloyd): seed, then step until the configured
    /// [`AbortStrategy`] stops the run or **max_iter** iterations are done.
    ///
    /// ## Arguments
    /// - **k**: Amount of clusters to search for
    /// - **max_iter**: Limit the maximum amount of iterations
    /// - **init**: Seeding method to use for the initialization of the **k** centroids
    /// - **config**: Configuration (random generator, callbacks, abort strategy, ...)
    ///
    /// ## Returns
    /// Instance of [`KMeansState`], containing the final state (result).
    ///
    /// ## Example
    /// ```rust
    /// use kmeans_viz::*;
    /// use rand::{rngs::StdRng, SeedableRng};
    ///
    /// let samples = vec![0.0f64, 0.0, 0.0, 2.0, 10.0, 0.0, 10.0, 2.0];
    /// let kmean = KMeans::from_rows(&samples, 4, 2).unwrap();
    /// let conf = KMeansConfig::build().random_generator(StdRng::seed_from_u64(42)).build();
    /// let result = kmean.kmeans_lloyd(2, 100, KMeans::init_random_sample, &conf).unwrap();
    ///
    /// assert!(result.is_converged());
    /// println!("Centroids: {:?}", result.centroids().collect::<Vec<_>>());
    /// println!("Cluster-Assignments: {:?}", result.assignments());
    /// ```
    pub fn kmeans_lloyd<'a, F>(&self, k: usize, max_iter: usize, init: F, config: &KMeansConfig<'a, T>) -> Result<KMeansState<T>>
                where F: FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'a, T>) -> Result<()> {
        crate::variants::Lloyd::calculate(self, k, max_iter, init, config)
    }

    /// Uniform initialization method: every coordinate of every centroid is drawn independently and
    /// uniformly between the dataset's minimum and maximum in that dimension.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_uniform_bounds(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::uniform::calculate_bounds(kmean, state, config)
    }

    /// Uniform initialization method within a caller-given box, e.g. the visible drawing area.
    ///
    /// ## Arguments
    /// - **min**: Lower corner of the box, one value per dimension
    /// - **max**: Upper corner of the box, one value per dimension
    pub fn init_uniform_box(min: Vec<T>, max: Vec<T>)
            -> impl for<'c> FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        move |kmean, state, config| crate::inits::uniform::calculate_box(kmean, state, config, &min, &max)
    }

    /// Random sample initialization method.
    /// This initialization method randomly selects k distinct points as initial centroids.
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_random_sample(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::randomsample::calculate(kmean, state, config)
    }

    /// K-Means++ initialization method, as implemented in Matlab
    /// (see: https://uk.mathworks.com/help/stats/kmeans.html#bueq7aj-5    Section: More About)
    ///
    /// ## Note
    /// This method is not meant for direct invocation. Pass a reference to it, to an instance-method of [`KMeans`].
    pub fn init_kmeanplusplus(kmean: &KMeans<T>, state: &mut KMeansState<T>, config: &KMeansConfig<'_, T>) -> Result<()> {
        crate::inits::kmeanplusplus::calculate(kmean, state, config)
    }

    /// Precomputed initialization method: uses the given centroids, one vector per cluster.
    pub fn init_precomputed(centroids: Vec<Vec<T>>)
            -> impl for<'c> FnOnce(&KMeans<T>, &mut KMeansState<T>, &KMeansConfig<'c, T>) -> Result<()> {
        move |kmean, state, _| crate::inits::precomputed::calculate(kmean, state, centroids)
    }
}
