//! Reaction Systems
//!
//! Everything needed to integrate a reactor over a core/edge network:
//! - `base`: shared state and the `ReactionSystem` trait
//! - `simple`, `liquid`: reactor variants, wrapped by `Reactor`
//! - `listener`: observers notified at each accepted step
//! - `integrator`: the time-stepping seam and its default implementation

mod base;
mod integrator;
mod liquid;
mod listener;
mod reactor;
mod settings;
mod simple;
mod termination;

pub use base::{InitialConditions, ReactionSystem, SimulationOutcome, SystemState, VolumeLaw};
pub use integrator::{AcceptedStep, AdaptiveRk4, IntegrationFailure, Integrator, Rhs};
pub use liquid::LiquidReactor;
pub use listener::{
    ConcentrationRecorder, ListenerRegistry, ReactionSystemListener, SharedListener, StateSnapshot,
};
pub use reactor::{Reactor, ReactorKind};
pub use settings::{ModelSettings, SimulatorSettings};
pub use simple::SimpleReactor;
pub use termination::{TerminationCause, TerminationCriterion};
