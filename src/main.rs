//! Windowed runner for a particle portrait.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use silkfield::Simulation;

#[derive(Parser)]
#[command(name = "silkfield", version, about = "Render portraits as an animated particle field")]
struct Cli {
    /// Portrait images, one per target state
    #[arg(required = true)]
    portraits: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for every random decision
    #[arg(short, long)]
    seed: Option<u64>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    if cli.verbose > 0 {
        log::set_max_level(match cli.verbose {
            1 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        log::set_max_level(log::LevelFilter::Error);
    }

    let mut sim = Simulation::new();
    for portrait in cli.portraits {
        sim = sim.with_portrait(portrait);
    }
    if let Some(path) = cli.config {
        sim = sim.with_config_file(path);
    }
    if let Some(seed) = cli.seed {
        sim = sim.with_seed(seed);
    }

    match sim.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
