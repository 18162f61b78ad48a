//! Kinetica - Core/Edge Reaction-System Simulator
//!
//! Kinetica integrates batch reactors over a reaction network split into a
//! fully resolved **core** and a candidate **edge**, and reports which edge
//! species have grown important enough to join the core.
//!
//! # Architecture
//!
//! - `network`: species, reactions, core/edge lists and their index arrays
//! - `surface`: the surface subset of the core and its layering rules
//! - `solver`: reactor variants, listeners and the simulation loop
//! - `state`: checksummed reactor snapshots

pub mod cli;
pub mod error;
pub mod network;
pub mod quantity;
pub mod solver;
pub mod state;
pub mod surface;

pub use error::{KineticaError, Result};
pub use network::{Job, JobLoader, Network, Reaction, ReactionId, Species, SpeciesId};
pub use quantity::Quantity;
pub use solver::{ReactionSystem, Reactor, SimulationOutcome};
pub use surface::SurfaceSubset;
