use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand_pcg::Pcg64;
use rayon::prelude::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use starfighter_shared::*;
use starfighter_sim::pilots::{self, PILOT_NAMES};
use starfighter_sim::{run_session, AsteroidField, Policy, SessionReport};

#[derive(Parser)]
#[command(name = "starfighter", about = "Starfighter dogfight training environment")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fly scripted pilots through an academy and report rewards
    Run {
        /// Academy config JSON (defaults to one 2v2 dogfight arena)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,

        /// Number of academy steps
        #[arg(long, default_value_t = 1000)]
        steps: u64,

        /// Pilot for every agent (pursuit, cruiser, random, do_nothing)
        #[arg(long, default_value = "pursuit")]
        pilot: String,

        /// Write the session report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Generate an asteroid field and print it as JSON
    Field {
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Seconds of drift to simulate before dumping
        #[arg(long, default_value_t = 0.0)]
        seconds: f32,

        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Run the same session over many seeds in parallel
    Sweep {
        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of seeds, starting at 0
        #[arg(long, default_value_t = 8)]
        seeds: u64,

        #[arg(long, default_value_t = 500)]
        steps: u64,

        #[arg(long, default_value = "pursuit")]
        pilot: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "starfighter_sim=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            config,
            seed,
            steps,
            pilot,
            output,
        } => cmd_run(config.as_deref(), seed, steps, &pilot, output),

        Commands::Field {
            seed,
            seconds,
            output,
        } => cmd_field(seed, seconds, output),

        Commands::Sweep {
            config,
            seeds,
            steps,
            pilot,
        } => cmd_sweep(config.as_deref(), seeds, steps, &pilot),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AcademyConfig, SimError> {
    match path {
        Some(path) => AcademyConfig::from_json_file(path),
        None => Ok(AcademyConfig::default()),
    }
}

/// One pilot per agent, each `random` pilot seeded from its slot.
fn resolve_pilots(name: &str, count: usize, seed: u64) -> Result<Vec<Box<dyn Policy>>, SimError> {
    (0..count)
        .map(|i| {
            pilots::by_name(name, seed.wrapping_add(i as u64)).ok_or_else(|| {
                SimError::InvalidConfig(format!(
                    "unknown pilot '{}'. Valid options: {}",
                    name,
                    PILOT_NAMES.join(", ")
                ))
            })
        })
        .collect()
}

fn write_json<T: serde::Serialize>(value: &T, path: &Path) -> Result<(), SimError> {
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn cmd_run(
    config: Option<&Path>,
    seed: Option<u64>,
    steps: u64,
    pilot: &str,
    output: Option<PathBuf>,
) -> Result<(), SimError> {
    let mut config = load_config(config)?;
    if let Some(seed) = seed {
        config.seed = seed;
    }
    let mut policies = resolve_pilots(pilot, config.agent_count(), config.seed)?;

    println!(
        "Running {} steps: {} arenas, {} agents, pilot={} (seed={})",
        steps,
        config.arenas.len(),
        config.agent_count(),
        pilot,
        config.seed
    );

    let report = run_session(config, &mut policies, steps)?;
    print_report(&report);

    if let Some(path) = output {
        write_json(&report, &path)?;
        println!("\nReport written to {}", path.display());
    }
    Ok(())
}

fn print_report(report: &SessionReport) {
    println!();
    println!("=== Session Result ===");
    println!("Steps:    {} ({:.1}s)", report.steps, report.steps as f32 / TICK_RATE as f32);
    println!("Episodes: {}", report.episodes.len());
    println!();
    println!(
        "{:<6} {:<6} {:<5} {:<9} {:<11} {:>10} {:>6} {:>5} {:>10}",
        "Arena", "Agent", "Team", "Kind", "Pilot", "Reward", "Shots", "Hits", "Collisions"
    );
    println!(
        "{:-<6} {:-<6} {:-<5} {:-<9} {:-<11} {:->10} {:->6} {:->5} {:->10}",
        "", "", "", "", "", "", "", "", ""
    );
    for a in &report.agents {
        println!(
            "{:<6} {:<6} {:<5} {:<9} {:<11} {:>10.3} {:>6} {:>5} {:>10}",
            a.arena,
            a.agent.0,
            format!("{:?}", a.team),
            format!("{:?}", a.kind),
            a.pilot,
            a.reward,
            a.shots,
            a.hits,
            a.collisions
        );
    }
}

fn cmd_field(seed: u64, seconds: f32, output: Option<PathBuf>) -> Result<(), SimError> {
    let config = FieldConfig::default();
    let mut rng = Pcg64::seed_from_u64(seed);
    let mut field = AsteroidField::initialize(&config, &mut rng);
    let ticks = (seconds.max(0.0) / DT).round() as u64;
    for _ in 0..ticks {
        field.advance(DT);
    }

    match output {
        Some(path) => {
            write_json(&field.asteroids(), &path)?;
            println!("{} asteroids written to {}", field.len(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&field.asteroids())?),
    }
    Ok(())
}

fn cmd_sweep(config: Option<&Path>, seeds: u64, steps: u64, pilot: &str) -> Result<(), SimError> {
    let base = load_config(config)?;
    // Fail fast on a bad pilot name before fanning out.
    resolve_pilots(pilot, base.agent_count(), 0)?;

    println!("Sweeping {} seeds x {} steps, pilot={}", seeds, steps, pilot);

    let reports: Vec<Result<SessionReport, SimError>> = (0..seeds)
        .into_par_iter()
        .map(|seed| {
            let config = AcademyConfig {
                seed,
                ..base.clone()
            };
            let mut policies = resolve_pilots(pilot, config.agent_count(), seed)?;
            run_session(config, &mut policies, steps)
        })
        .collect();

    println!();
    println!("{:<6} {:>12} {:>12} {:>8} {:>12}", "Seed", "Mean reward", "Best", "Hits", "Collisions");
    println!("{:-<6} {:->12} {:->12} {:->8} {:->12}", "", "", "", "", "");
    for report in reports {
        let report = report?;
        let n = report.agents.len().max(1) as f32;
        let mean = report.agents.iter().map(|a| a.reward).sum::<f32>() / n;
        let best = report
            .agents
            .iter()
            .map(|a| a.reward)
            .fold(f32::NEG_INFINITY, f32::max);
        let hits: u32 = report.agents.iter().map(|a| a.hits).sum();
        let collisions: u32 = report.agents.iter().map(|a| a.collisions).sum();
        println!(
            "{:<6} {:>12.3} {:>12.3} {:>8} {:>12}",
            report.seed, mean, best, hits, collisions
        );
    }
    Ok(())
}
