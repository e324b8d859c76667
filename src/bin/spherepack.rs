//! Sphere packing batch runner CLI

use clap::{Parser, Subcommand};
use log::{error, info};
use spherepack::{pipeline, PackingConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "spherepack")]
#[command(about = "Random sphere packings, voxel microstructures and contact analysis")]
#[command(version)]
struct Cli {
    /// Configuration file (`key: value` lines, or JSON with --json)
    #[arg(short, long, global = true, default_value = "input.txt")]
    config: PathBuf,

    /// Read the configuration file as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Seed the bottom layer of every case and write the sphere lists
    Init {
        /// Only this case (1-based)
        #[arg(long)]
        case: Option<usize>,
    },

    /// Rasterize, tune and measure the seeded packings
    Postprocess {
        /// Only this case (1-based)
        #[arg(long)]
        case: Option<usize>,
    },

    /// Compute distance bands and pockets of the packings
    Contact {
        /// Only this case (1-based)
        #[arg(long)]
        case: Option<usize>,
    },

    /// Seed and post-process every case
    Run,
}

fn load_config(cli: &Cli) -> spherepack::Result<PackingConfig> {
    let config = if cli.json {
        PackingConfig::load_json(&cli.config)?
    } else {
        PackingConfig::load(&cli.config)
    };
    config.validate()?;
    Ok(config)
}

fn cases(config: &PackingConfig, case: Option<usize>) -> Vec<usize> {
    match case {
        Some(c) => vec![c],
        None => (1..=config.count).collect(),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failures = 0;
    match cli.command {
        Commands::Init { case } => {
            for c in cases(&config, case) {
                if let Err(e) = pipeline::initialize_case(&config, c) {
                    error!("case {}: {}", c, e);
                    failures += 1;
                }
            }
        }
        Commands::Postprocess { case } => {
            for c in cases(&config, case) {
                if let Err(e) = pipeline::postprocess_case(&config, c) {
                    error!("case {}: {}", c, e);
                    failures += 1;
                }
            }
        }
        Commands::Contact { case } => {
            for c in cases(&config, case) {
                match pipeline::analyze_contacts(&config, c) {
                    Ok(report) => info!(
                        "case {}: {} propagation passes, results in {}",
                        c,
                        report.passes,
                        report.directory.display()
                    ),
                    Err(e) => {
                        error!("case {}: {}", c, e);
                        failures += 1;
                    }
                }
            }
        }
        Commands::Run => {
            failures = pipeline::run_batch(&config).iter().filter(|r| r.is_err()).count();
        }
    }

    if failures > 0 {
        error!("{} case(s) failed", failures);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
