//! `ean`: time expansion, delay management and passenger rerouting on
//! event-activity networks.
//!
//! Every subcommand reads one TOML run file (see [`config`]) and runs one
//! stage of the pipeline, reading its inputs from and writing its outputs
//! to the tables named in `[files]`.  `pipeline` runs all stages in
//! sequence without reloading intermediate tables.
//!
//! Logging goes to stderr; set `RUST_LOG` (e.g. `RUST_LOG=debug` or
//! `RUST_LOG=ean_reroute=trace`) to change the default `info` level.

mod config;
mod stages;


use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use config::RunConfig;

#[derive(Parser, Debug)]
#[command(name = "ean", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Expand the periodic network over the configured horizon.
    Rollout {
        #[arg(long)]
        config: PathBuf,
    },
    /// Draw source delays onto the rolled-out network.
    Delays {
        #[arg(long)]
        config: PathBuf,
    },
    /// Compute the disposition timetable from the source delays.
    Propagate {
        #[arg(long)]
        config: PathBuf,
    },
    /// Route passengers through the disposition timetable.
    Reroute {
        #[arg(long)]
        config: PathBuf,
    },
    /// Check feasibility and price the disposition timetable.
    Evaluate {
        #[arg(long)]
        config: PathBuf,
    },
    /// All stages in sequence.
    Pipeline {
        #[arg(long)]
        config: PathBuf,
    },
}

impl Command {
    fn config(&self) -> &PathBuf {
        match self {
            Command::Rollout { config }
            | Command::Delays { config }
            | Command::Propagate { config }
            | Command::Reroute { config }
            | Command::Evaluate { config }
            | Command::Pipeline { config } => config,
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = RunConfig::load(cli.command.config())?;
    match cli.command {
        Command::Rollout { .. } => stages::rollout(&config),
        Command::Delays { .. } => stages::delays(&config),
        Command::Propagate { .. } => stages::propagate(&config),
        Command::Reroute { .. } => stages::reroute(&config),
        Command::Evaluate { .. } => stages::evaluate(&config),
        Command::Pipeline { .. } => stages::pipeline(&config),
    }
}

fn main() -> ExitCode {
    init_logging();
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
