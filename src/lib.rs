//! # kmeans-viz - API documentation
//!
//! kmeans-viz is a small rust library for step-by-step k-means clustering, built to drive
//! animated visualizations of the algorithm.
//!
//! ## Design target
//! Its main target is observability of every single iteration rather than raw throughput. A
//! calculation can be advanced one assignment/recentering step at a time, and each intermediate
//! state can be inspected (read-only) by a renderer, either by stepping manually or through the
//! callbacks in [`KMeansConfig`].
//!
//! ## The algorithm
//! Every iteration assigns each point to its nearest centroid (ties go to the centroid that comes
//! first), then moves each centroid to the mean of its members. The calculation has converged once
//! an iteration assigns no cluster a point it did not already have. Clusters that end up without
//! members are handled according to [`EmptyClusterPolicy`], so no centroid ever becomes NaN.
//!
//! ## Supported centroid initializations
//! The outcome of each run depends on the initialization of its clusters. For a list of implemented
//! initialization methods, see [`KMeans`]. All of them draw from the random generator configured in
//! [`KMeansConfig`], pass a seeded one for reproducible runs.
//!
//! ## Supported primitive types
//! - [`f32`]
//! - [`f64`]
//!
//! ## Example
//! ```rust
//! use kmeans_viz::*;
//! use rand::{rngs::StdRng, Rng, SeedableRng};
//!
//! let (sample_cnt, sample_dims, k) = (500, 2, 4);
//!
//! // Generate some random data
//! let mut rnd = StdRng::seed_from_u64(1);
//! let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..600.0)).collect();
//! let kmean = KMeans::from_rows(&samples, sample_cnt, sample_dims).unwrap();
//!
//! // Seed uniformly within the data's bounds, then step until convergence
//! let conf = KMeansConfig::build().random_generator(rnd).build();
//! let mut state = kmean.seed(k, KMeans::init_uniform_bounds, &conf).unwrap();
//! while !kmean.step(&mut state, &conf).unwrap() {
//!     println!("Iteration {}: {:?}", state.iteration(), state.centroids().collect::<Vec<_>>());
//!     assert!(state.iteration() < 100);
//! }
//! println!("Converged after {} iterations, error: {}", state.iteration(), state.distsum());
//! ```
//!
//! ## Example (using the status event callbacks)
//! ```rust
//! use kmeans_viz::*;
//!
//! let samples = vec![0.0f64, 0.0, 0.0, 2.0, 10.0, 0.0, 10.0, 2.0];
//! let kmean = KMeans::from_rows(&samples, 4, 2).unwrap();
//!
//! let conf = KMeansConfig::<f64>::build()
//!     .init_done(&|s| println!("Seeded {} centroids.", s.k()))
//!     .iteration_done(&|s, nr, converged|
//!         println!("Iteration {} - Error: {:.2} | Converged: {}", nr, s.distsum(), converged))
//!     .max_centroid_step(Some(1.0))
//!     .build();
//!
//! let init = KMeans::init_precomputed(vec![vec![0.0, 0.0], vec![10.0, 0.0]]);
//! let result = kmean.kmeans_lloyd(2, 100, init, &conf).unwrap();
//! assert_eq!(result.assignments(), &[0, 0, 1, 1]);
//! ```

#[macro_use] mod helpers;
mod abort_strategy;
mod api;
mod cluster;
mod error;
mod inits;
mod point;
mod primitive;
mod variants;

pub use abort_strategy::AbortStrategy;
pub use api::{InitDoneCallbackFn, IterationDoneCallbackFn, KMeans, KMeansConfig, KMeansConfigBuilder, KMeansState, Phase};
pub use cluster::{Cluster, EmptyClusterPolicy};
pub use error::{KMeansError, Result};
pub use point::Point;
pub use primitive::Primitive;
