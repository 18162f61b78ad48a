//! Kinetica CLI
//!
//! Command-line interface for the Kinetica reaction-system simulator.

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::info;

use kinetica::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    info!("Kinetica v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(cmd) => handle_command(cmd),
        None => {
            println!("Kinetica v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}

fn handle_command(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Simulate {
            job,
            reactor,
            output,
            snapshot,
        } => commands::simulate(&job, reactor, output.as_deref(), snapshot.as_deref())
            .with_context(|| format!("simulation of {} failed", job.display())),
        Commands::ResolveSurface {
            job,
            species,
            reactions,
        } => commands::resolve_surface(&job, &species, &reactions)
            .with_context(|| format!("surface resolution for {} failed", job.display())),
        Commands::Layering {
            job,
            surface_species,
        } => commands::layering(&job, &surface_species)
            .with_context(|| format!("layering for {} failed", job.display())),
        Commands::Inspect { path } => {
            commands::inspect(&path).with_context(|| format!("cannot inspect {}", path.display()))
        }
    }
}
