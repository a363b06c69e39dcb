use kmeans_viz::*;
use rand::{rngs::StdRng, Rng, SeedableRng};

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let (sample_cnt, sample_dims, k, max_iter) = (20000, 2, 4, 100);

    // Generate some random data
    let mut rnd = StdRng::seed_from_u64(1337);
    let samples: Vec<f64> = (0..sample_cnt * sample_dims).map(|_| rnd.gen_range(0.0..1.0)).collect();

    // Calculate kmeans, using kmean++ as initialization-method
    let kmean = KMeans::from_rows(&samples, sample_cnt, sample_dims)?;
    let conf = KMeansConfig::build()
        .random_generator(rnd)
        .empty_cluster_policy(EmptyClusterPolicy::StealFarthest)
        .build();
    let result = kmean.kmeans_lloyd(k, max_iter, KMeans::init_kmeanplusplus, &conf)?;

    println!("Centroids: {:?}", result.centroids().collect::<Vec<_>>());
    println!("Cluster sizes: {:?}", result.clusters().iter().map(|c| c.len()).collect::<Vec<_>>());
    println!("Iterations: {} (converged: {})", result.iteration(), result.is_converged());
    println!("Error: {}", result.distsum());
    Ok(())
}
