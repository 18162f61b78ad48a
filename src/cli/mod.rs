//! CLI Module
//!
//! Command-line interface for running and inspecting reaction systems.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Kinetica - core/edge reaction-system simulator
#[derive(Parser, Debug)]
#[command(name = "kinetica")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one reactor of a job until it terminates
    #[command(name = "simulate")]
    Simulate {
        /// Job file
        #[arg(short, long)]
        job: PathBuf,

        /// Reactor to run, by position in the job
        #[arg(short, long, default_value_t = 0)]
        reactor: usize,

        /// Write the recorded concentration trajectory here
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save a reactor snapshot here
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Resolve a candidate surface against the job's core
    #[command(name = "resolve-surface")]
    ResolveSurface {
        /// Job file
        #[arg(short, long)]
        job: PathBuf,

        /// Candidate surface species labels
        #[arg(long, value_delimiter = ',')]
        species: Vec<String>,

        /// Candidate surface reactions, by core reaction position
        #[arg(long, value_delimiter = ',')]
        reactions: Vec<usize>,
    },

    /// Print the edge reactions that may join the surface
    #[command(name = "layering")]
    Layering {
        /// Job file
        #[arg(short, long)]
        job: PathBuf,

        /// Surface species labels; their core reactions form the surface
        #[arg(long, value_delimiter = ',')]
        surface_species: Vec<String>,
    },

    /// Print a saved reactor snapshot
    #[command(name = "inspect")]
    Inspect {
        /// Snapshot file
        path: PathBuf,
    },
}
