#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Instant;

use block_life::{BlockLife, BlockLifeConfig, Boundary, Rule};
use rand::RngCore;
use rand::SeedableRng;

fn bench_blocks(size: i32, iterations: u64, threads: usize) -> (f64, u64, usize) {
    let config = BlockLifeConfig::new(Rule::conway(), Boundary::Unbounded).thread_count(threads);
    let Ok(mut life) = BlockLife::with_config(config) else {
        eprintln!("failed to build engine with {threads} threads");
        return (0.0, 0, 0);
    };
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
    let threshold = (u64::MAX as f64 * 0.42) as u64;

    for y in 0..size {
        for x in 0..size {
            if rng.next_u64() <= threshold {
                life.set(x, y);
            }
        }
    }

    let start = Instant::now();
    life.step_n(iterations);
    let duration = start.elapsed();

    let total_ms = duration.as_secs_f64() * 1000.0;
    (total_ms, life.population(), life.block_count())
}

fn main() {
    let scales: &[(i32, u64)] = &[
        (128, 200),  // ~256 blocks, at the parallel threshold
        (256, 200),  // ~1024 blocks
        (512, 100),  // ~4096 blocks
        (1024, 50),  // ~16384 blocks
        (2048, 20),  // ~65536 blocks
    ];
    let threads = num_cpus::get_physical().max(1);

    println!(
        "{:<10} {:>8} {:>8} {:>12} {:>12} {:>10}",
        "Grid", "Threads", "Blocks", "Iters", "Total(ms)", "Avg(ms)"
    );
    println!("{}", "-".repeat(66));

    for &(size, iters) in scales {
        for t in [1, threads] {
            let (total_ms, _pop, blocks) = bench_blocks(size, iters, t);
            let avg_ms = total_ms / iters as f64;
            println!(
                "{:<10} {:>8} {:>8} {:>12} {:>12.1} {:>10.4}",
                format!("{}x{}", size, size),
                t,
                blocks,
                iters,
                total_ms,
                avg_ms
            );
        }
    }
}
