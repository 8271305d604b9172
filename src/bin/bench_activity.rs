#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use rand::RngCore;
use rand::SeedableRng;
use std::time::Instant;
use block_life::blocklife::patterns::{self, Pattern};
use block_life::{BlockLife, Boundary, Rule};

fn report(label: &str, life: &BlockLife, iterations: u64, elapsed_ms: f64) {
    let avg_us = elapsed_ms * 1000.0 / iterations as f64;
    let stats = life.last_step_stats();
    println!(
        "{:<28} {:>6} iters  {:>10.1} ms total  {:>10.1} us/step  pop={} blocks={} spawn/prune={}/{}",
        label,
        iterations,
        elapsed_ms,
        avg_us,
        life.population(),
        life.block_count(),
        stats.spawned,
        stats.pruned
    );
}

fn bench(label: &str, size: i32, density: f64, iterations: u64) {
    let mut life = BlockLife::new(Rule::conway(), Boundary::Unbounded);
    let mut rng = rand::rngs::StdRng::seed_from_u64(0xBEEF_CAFE);
    let threshold = (u64::MAX as f64 * density) as u64;

    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                life.set(x, y);
            }
        }
    }

    // Warm up: 2 steps to settle the block frontier
    life.step_n(2);

    let start = Instant::now();
    life.step_n(iterations);
    let elapsed = start.elapsed();
    report(label, &life, iterations, elapsed.as_secs_f64() * 1000.0);
}

fn bench_pattern(pattern: Pattern, boundary: Boundary, steps: u64) {
    let mut life = BlockLife::new(Rule::conway(), boundary);
    life.set_cells_alive(pattern.cells.iter().copied());
    life.step_n(2);

    let start = Instant::now();
    life.step_n(steps);
    let elapsed = start.elapsed();
    report(pattern.name, &life, steps, elapsed.as_secs_f64() * 1000.0);
}

fn main() {
    println!("=== BlockLife Activity Benchmark ===\n");

    bench_pattern(patterns::GLIDER, Boundary::Unbounded, 10_000);
    bench_pattern(patterns::LWSS, Boundary::Unbounded, 10_000);
    bench_pattern(patterns::GOSPER_GLIDER_GUN, Boundary::Unbounded, 2_000);
    if let Ok(torus) = Boundary::toroidal(-625, -625, 625, 625) {
        bench_pattern(patterns::R_PENTOMINO, torus, 2_000);
    }
    bench("small 128x128 d=0.3", 128, 0.3, 500);
    bench("medium 512x512 d=0.3", 512, 0.3, 100);
    bench("sparse 1024x1024 d=0.05", 1024, 0.05, 50);
}
