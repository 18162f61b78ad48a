//! Termination criteria and causes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KineticaError, Result};
use crate::network::SpeciesId;
use crate::quantity::{Dimension, Quantity};

/// Condition that ends a simulation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TerminationCriterion {
    /// Fraction of the initial amount of a core species consumed
    Conversion { species: SpeciesId, conversion: f64 },
    /// Elapsed reaction time
    Time { time: Quantity },
    /// Characteristic rate relative to its running maximum
    RateRatio { ratio: f64 },
}

impl TerminationCriterion {
    pub fn conversion(&self) -> Option<f64> {
        match self {
            TerminationCriterion::Conversion { conversion, .. } => Some(*conversion),
            _ => None,
        }
    }

    pub fn time(&self) -> Option<&Quantity> {
        match self {
            TerminationCriterion::Time { time } => Some(time),
            _ => None,
        }
    }

    /// Reject criteria that can never be met or would run time backwards
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| Err(KineticaError::InvalidSettings { reason });
        match self {
            TerminationCriterion::Conversion { conversion, .. } => {
                if !(*conversion > 0.0 && *conversion <= 1.0) {
                    return invalid(format!("conversion target must be in (0, 1], got {}", conversion));
                }
            }
            TerminationCriterion::Time { time } => {
                let seconds = time.expect_si(Dimension::Time, "termination time")?;
                if !seconds.is_finite() || seconds <= 0.0 {
                    return invalid(format!("termination time must be positive and finite, got {}", time));
                }
            }
            TerminationCriterion::RateRatio { ratio } => {
                if !(*ratio > 0.0 && *ratio <= 1.0) {
                    return invalid(format!("rate ratio must be in (0, 1], got {}", ratio));
                }
            }
        }
        Ok(())
    }
}

/// Why a simulation run stopped
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationCause {
    Conversion { species: SpeciesId },
    Time,
    RateRatio,
    /// An edge species exceeded the interrupt tolerance, or too many objects
    /// are waiting to enter the core
    Interrupted,
    /// The step budget ran out before any criterion was met
    StepLimit,
    /// The integrator failed with an empty surface
    IntegrationFailure { reason: String },
    /// The integrator failed and the surface was dissolved into the bulk core
    Resurrected { reason: String },
}

impl TerminationCause {
    /// True for causes that come from a termination criterion
    pub fn is_criterion(&self) -> bool {
        matches!(
            self,
            TerminationCause::Conversion { .. } | TerminationCause::Time | TerminationCause::RateRatio
        )
    }
}

impl fmt::Display for TerminationCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminationCause::Conversion { species } => {
                write!(f, "conversion target reached for {}", species)
            }
            TerminationCause::Time => write!(f, "time limit reached"),
            TerminationCause::RateRatio => write!(f, "rate ratio reached"),
            TerminationCause::Interrupted => write!(f, "interrupted by edge flux"),
            TerminationCause::StepLimit => write!(f, "step limit exceeded"),
            TerminationCause::IntegrationFailure { reason } => {
                write!(f, "integration failed: {}", reason)
            }
            TerminationCause::Resurrected { reason } => {
                write!(f, "surface dissolved after integration failure: {}", reason)
            }
        }
    }
}
