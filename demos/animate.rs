//! Text-mode replay of the k-means visualization: five runs over freshly generated data, every
//! iteration drawn as a frame on stdout.
//!
//! Run with `cargo run --example animate`, set `RUST_LOG=debug` for the engine's iteration log.
use kmeans_viz::*;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rand_distr::StandardNormal;
use std::{cell::RefCell, thread, time::Duration};

const WIDTH: f64 = 680.0;
const HEIGHT: f64 = 580.0;
const COLS: usize = 68;
const ROWS: usize = 29;
const K: usize = 4;
const MAX_ITER: usize = 500;
const FRAME_DELAY: Duration = Duration::from_millis(150);

/// (centroid seed, data seed) per run.
const RUNS: [(u64, u64); 5] = [(1, 42), (7, 43), (8, 44), (10, 45), (11, 46)];

/// Render state owned by the demo, never by the engine: the path every centroid travelled so far.
struct Presentation {
    trails: Vec<Vec<(f64, f64)>>,
}

impl Presentation {
    fn new() -> Self {
        Self { trails: Vec::new() }
    }

    fn begin_run(&mut self, k: usize) {
        self.trails = vec![Vec::new(); k];
    }

    fn record(&mut self, state: &KMeansState<f64>) {
        for (trail, c) in self.trails.iter_mut().zip(state.centroids()) {
            trail.push((c[0], c[1]));
        }
    }

    fn cell(x: f64, y: f64) -> (usize, usize) {
        let col = ((x / WIDTH) * COLS as f64) as usize;
        let row = ((y / HEIGHT) * ROWS as f64) as usize;
        (col.min(COLS - 1), row.min(ROWS - 1))
    }

    fn render(&self, kmean: &KMeans<f64>, state: &KMeansState<f64>, title: &str) -> String {
        let mut grid = vec![vec![' '; COLS]; ROWS];
        let assigned = state.phase() != Phase::Seeded;
        for (p, &ci) in kmean.points().iter().zip(state.assignments()) {
            let (col, row) = Self::cell(p.values()[0], p.values()[1]);
            grid[row][col] = if assigned { (b'a' + ci as u8) as char } else { '.' };
        }
        for trail in &self.trails {
            for &(x, y) in trail {
                let (col, row) = Self::cell(x, y);
                grid[row][col] = '+';
            }
        }
        for (ci, c) in state.centroids().enumerate() {
            let (col, row) = Self::cell(c[0], c[1]);
            grid[row][col] = (b'A' + ci as u8) as char;
        }

        let mut frame = format!("{}\n{}\n", title, "-".repeat(COLS));
        for row in grid {
            frame.extend(row);
            frame.push('\n');
        }
        frame
    }
}

fn random_coord(rnd: &mut StdRng, sx: f64, sy: f64) -> Vec<f64> {
    let gx: f64 = rnd.sample(StandardNormal);
    let x = sx + gx * 60.0 + (rnd.gen::<f64>() * 20.0 - 10.0);
    let gy: f64 = rnd.sample(StandardNormal);
    let y = sy + gy * 60.0 + (rnd.gen::<f64>() * 10.0 - 5.0);
    vec![x.clamp(10.0, WIDTH - 10.0), y.clamp(10.0, HEIGHT - 10.0)]
}

/// Three blobs of 160, 160 and 180 points, ids starting at 1.
fn random_data(seed: u64) -> Result<KMeans<f64>> {
    let mut rnd = StdRng::seed_from_u64(seed);
    let mut points = Vec::new();
    for (cnt, sx, sy) in [(160, 200.0, 170.0), (160, 430.0, 270.0), (180, 300.0, 430.0)] {
        for _ in 0..cnt {
            let id = points.len() + 1;
            points.push(Point::new(id, random_coord(&mut rnd, sx, sy)));
        }
    }
    KMeans::new(points)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let presentation = RefCell::new(Presentation::new());
    for (run, &(centroid_seed, data_seed)) in RUNS.iter().enumerate() {
        let kmean = random_data(data_seed)?;

        let init_done = |s: &KMeansState<f64>| {
            let mut p = presentation.borrow_mut();
            p.begin_run(s.k());
            println!("{}", p.render(&kmean, s, &format!("run {} - seeded", run + 1)));
            thread::sleep(FRAME_DELAY);
        };
        let iteration_done = |s: &KMeansState<f64>, nr: usize, converged: bool| {
            let mut p = presentation.borrow_mut();
            p.record(s);
            let title = format!("run {} - iteration {}{}", run + 1, nr, if converged { " (converged)" } else { "" });
            println!("{}", p.render(&kmean, s, &title));
            thread::sleep(FRAME_DELAY);
        };

        let conf = KMeansConfig::build()
            .random_generator(StdRng::seed_from_u64(centroid_seed))
            .max_centroid_step(Some(10.0))
            .init_done(&init_done)
            .iteration_done(&iteration_done)
            .build();
        let init = KMeans::init_uniform_box(vec![40.0, 40.0], vec![WIDTH - 40.0, HEIGHT - 40.0]);
        let result = kmean.kmeans_lloyd(K, MAX_ITER, init, &conf)?;

        println!("run {} finished after {} iterations, error {:.1}", run + 1, result.iteration(), result.distsum());
    }
    Ok(())
}
