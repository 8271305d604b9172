#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use block_life::blocklife::patterns::{self, Pattern};
use block_life::{BlockLife, BlockLifeConfig, Boundary, ReferenceLife, Rule};
use rand::RngCore;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_SEED_SIDE: i32 = 512;
const DEFAULT_DENSITY: f64 = 0.35;
const DEFAULT_GENERATIONS: u64 = 1000;
const DEFAULT_INTERVAL: u64 = 100;
const MAX_PRINTED_SIDE: i64 = 120;

const USAGE: &str = "usage: block-life [--rule B3/S23] \
[--boundary unbounded|torus:LX,LY,HX,HY|fixed:LX,LY,HX,HY] \
[--pattern NAME | --seed-side N --density F] [--generations N] [--interval N] \
[--threads N] [--max-threads N] [--check] [--print]";

enum Seed {
    Random { side: i32, density: f64 },
    Pattern(Pattern),
}

struct MainArgs {
    config: BlockLifeConfig,
    seed: Seed,
    generations: u64,
    interval: u64,
    check: bool,
    print: bool,
}

fn parse_boundary(text: &str) -> Result<Boundary, String> {
    if text.eq_ignore_ascii_case("unbounded") {
        return Ok(Boundary::Unbounded);
    }
    let (kind, extents) = text
        .split_once(':')
        .ok_or_else(|| format!("unknown boundary: {text}"))?;
    let values: Vec<i32> = extents
        .split(',')
        .map(|v| v.trim().parse::<i32>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("bad boundary extent in {text}: {e}"))?;
    let [lx, ly, hx, hy] = values[..] else {
        return Err(format!("boundary needs four block coordinates: {text}"));
    };
    let boundary = match kind.to_ascii_lowercase().as_str() {
        "torus" | "toroidal" => Boundary::toroidal(lx, ly, hx, hy),
        "fixed" => Boundary::fixed(lx, ly, hx, hy),
        other => return Err(format!("unknown boundary kind: {other}")),
    };
    boundary.map_err(|e| e.to_string())
}

fn parse_args() -> Result<MainArgs, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut rule = Rule::conway();
    let mut boundary = Boundary::Unbounded;
    let mut config = BlockLifeConfig::default();
    let mut pattern = None;
    let mut side = DEFAULT_SEED_SIDE;
    let mut density = DEFAULT_DENSITY;
    let mut generations = DEFAULT_GENERATIONS;
    let mut interval = DEFAULT_INTERVAL;
    let mut check = false;
    let mut print = false;

    let value = |i: usize, flag: &str| -> Result<&str, String> {
        args.get(i)
            .map(String::as_str)
            .ok_or_else(|| format!("{flag} requires a value"))
    };
    fn number<T: std::str::FromStr>(text: &str, flag: &str) -> Result<T, String> {
        text.parse()
            .map_err(|_| format!("{flag} expects a number, got {text:?}"))
    }

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--rule" => {
                i += 1;
                rule = value(i, flag)?
                    .parse::<Rule>()
                    .map_err(|e| format!("bad rule: {e}"))?;
            }
            "--boundary" => {
                i += 1;
                boundary = parse_boundary(value(i, flag)?)?;
            }
            "--pattern" => {
                i += 1;
                let name = value(i, flag)?;
                pattern = Some(
                    patterns::by_name(name).ok_or_else(|| format!("unknown pattern: {name}"))?,
                );
            }
            "--seed-side" => {
                i += 1;
                side = number(value(i, flag)?, flag)?;
            }
            "--density" => {
                i += 1;
                density = number(value(i, flag)?, flag)?;
            }
            "--generations" => {
                i += 1;
                generations = number(value(i, flag)?, flag)?;
            }
            "--interval" => {
                i += 1;
                interval = number::<u64>(value(i, flag)?, flag)?.max(1);
            }
            "--threads" => {
                i += 1;
                config = config.thread_count(number(value(i, flag)?, flag)?);
            }
            "--max-threads" => {
                i += 1;
                config = config.max_threads(number(value(i, flag)?, flag)?);
            }
            "--check" => check = true,
            "--print" => print = true,
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    let seed = match pattern {
        Some(p) => Seed::Pattern(p),
        None => Seed::Random { side, density },
    };
    Ok(MainArgs {
        config: config.rule(rule).boundary(boundary),
        seed,
        generations,
        interval,
        check,
        print,
    })
}

fn seed_world(seed: &Seed, life: &mut BlockLife, mut reference: Option<&mut ReferenceLife>) {
    let mut place = |x: i32, y: i32| {
        life.set(x, y);
        if let Some(reference) = reference.as_deref_mut() {
            reference.set(x, y);
        }
    };
    match seed {
        Seed::Pattern(pattern) => {
            for &(x, y) in pattern.cells {
                place(x, y);
            }
        }
        Seed::Random { side, density } => {
            let mut rng = rand::rngs::StdRng::seed_from_u64(0x5EED_1234_ABCD_EF01);
            let threshold = (u64::MAX as f64 * density) as u64;
            for y in 0..*side {
                for x in 0..*side {
                    if rng.next_u64() <= threshold {
                        place(x, y);
                    }
                }
            }
        }
    }
}

fn live_cells(life: &BlockLife) -> Vec<(i32, i32)> {
    let mut cells = Vec::new();
    life.for_each_live(|x, y| cells.push((x, y)));
    cells.sort_unstable_by_key(|&(x, y)| (y, x));
    cells
}

fn print_world(life: &BlockLife) {
    let Some((min_x, min_y, max_x, max_y)) = life.live_bounds() else {
        println!("(empty)");
        return;
    };
    let too_wide = max_x as i64 - min_x as i64 >= MAX_PRINTED_SIDE;
    let too_tall = max_y as i64 - min_y as i64 >= MAX_PRINTED_SIDE;
    if too_wide || too_tall {
        println!("(world spans {min_x},{min_y} .. {max_x},{max_y}; too large to print)");
        return;
    }
    print!("{}", life.view(min_x, min_y, max_x, max_y));
}

fn run(args: MainArgs) -> Result<bool, block_life::ConfigError> {
    let mut life = BlockLife::with_config(args.config.clone())?;
    let mut reference = args
        .check
        .then(|| ReferenceLife::new(life.rule(), *life.boundary()));
    seed_world(&args.seed, &mut life, reference.as_mut());

    info!(
        rule = %life.rule(),
        boundary = ?life.boundary(),
        threads = life.thread_count(),
        population = life.population(),
        blocks = life.block_count(),
        "seeded world"
    );

    let mut all_match = true;
    let mut total = Duration::ZERO;
    let mut done = 0;
    while done < args.generations {
        let steps = args.interval.min(args.generations - done);
        let start = Instant::now();
        life.step_n(steps);
        let phase = start.elapsed();
        total += phase;
        done += steps;

        let phase_ms = phase.as_secs_f64() * 1000.0;
        let avg_ms = phase_ms / steps as f64;
        let population = life.population();
        match reference.as_mut() {
            Some(reference) => {
                reference.step_n(steps);
                let matches = live_cells(&life) == reference.live_cells();
                all_match &= matches;
                let status = if matches { "MATCH" } else { "MISMATCH" };
                println!(
                    "Generation {done}: pop = {population}, reference pop = {} [{status}]  {phase_ms:.3} ms, {avg_ms:.6} ms/gen",
                    reference.population()
                );
            }
            None => println!(
                "Generation {done}: pop = {population}, blocks = {}  {phase_ms:.3} ms, {avg_ms:.6} ms/gen",
                life.block_count()
            ),
        }
    }

    let total_ms = total.as_secs_f64() * 1000.0;
    let avg_ms = total_ms / args.generations.max(1) as f64;
    println!("\n--- Summary ({} generations) ---", args.generations);
    println!("BlockLife: {total_ms:.3} ms total, {avg_ms:.6} ms/gen");
    if args.print {
        print_world(&life);
    }
    Ok(all_match)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = match parse_args() {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{message}\n{USAGE}");
            return ExitCode::from(2);
        }
    };

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            warn!("block engine diverged from the reference evaluator");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
