//! Model and simulator settings

use serde::Deserialize;

use crate::error::{KineticaError, Result};

/// Tolerances that drive edge-to-core and edge-to-surface decisions
///
/// Rates are normalized by the characteristic core rate
/// `sqrt(sum of squared core species rates)`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Edge species above this normalized rate are reported for the core
    pub tolerance_move_to_core: f64,
    /// Edge species whose peak normalized rate stays below this may be pruned
    pub tolerance_keep_in_edge: f64,
    /// An edge species above this normalized rate stops the simulation
    pub tolerance_interrupt_simulation: f64,
    /// Edge reactions above this normalized rate are promoted to the surface
    pub tolerance_move_edge_reaction_to_surface: f64,
    /// Stop once this many objects are waiting to enter the core
    pub max_objects_per_iteration: usize,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            tolerance_move_to_core: f64::INFINITY,
            tolerance_keep_in_edge: 0.0,
            tolerance_interrupt_simulation: f64::INFINITY,
            tolerance_move_edge_reaction_to_surface: f64::INFINITY,
            max_objects_per_iteration: usize::MAX,
        }
    }
}

impl ModelSettings {
    pub fn new(
        tolerance_move_to_core: f64,
        tolerance_keep_in_edge: f64,
        tolerance_interrupt_simulation: f64,
    ) -> Self {
        Self {
            tolerance_move_to_core,
            tolerance_keep_in_edge,
            tolerance_interrupt_simulation,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        let tolerances = [
            ("tolerance_move_to_core", self.tolerance_move_to_core),
            ("tolerance_keep_in_edge", self.tolerance_keep_in_edge),
            (
                "tolerance_interrupt_simulation",
                self.tolerance_interrupt_simulation,
            ),
            (
                "tolerance_move_edge_reaction_to_surface",
                self.tolerance_move_edge_reaction_to_surface,
            ),
        ];
        for (name, value) in tolerances {
            if value.is_nan() || value < 0.0 {
                return Err(KineticaError::InvalidSettings {
                    reason: format!("{} must be non-negative, got {}", name, value),
                });
            }
        }
        if self.tolerance_keep_in_edge > self.tolerance_move_to_core {
            return Err(KineticaError::InvalidSettings {
                reason: "tolerance_keep_in_edge exceeds tolerance_move_to_core".to_string(),
            });
        }
        if self.max_objects_per_iteration == 0 {
            return Err(KineticaError::InvalidSettings {
                reason: "max_objects_per_iteration must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

/// Integrator step control
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulatorSettings {
    /// Absolute tolerance on species moles
    pub atol: f64,
    /// Relative tolerance on species moles
    pub rtol: f64,
    /// First trial step in seconds
    pub initial_step: f64,
    /// Largest allowed step in seconds
    pub max_step: f64,
    /// Accepted steps before the run is abandoned
    pub max_steps: usize,
}

impl Default for SimulatorSettings {
    fn default() -> Self {
        Self {
            atol: 1e-16,
            rtol: 1e-8,
            initial_step: 1e-12,
            max_step: f64::INFINITY,
            max_steps: 100_000,
        }
    }
}

impl SimulatorSettings {
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("atol", self.atol),
            ("rtol", self.rtol),
            ("initial_step", self.initial_step),
            ("max_step", self.max_step),
        ];
        for (name, value) in positive {
            if value.is_nan() || value <= 0.0 {
                return Err(KineticaError::InvalidSettings {
                    reason: format!("{} must be positive, got {}", name, value),
                });
            }
        }
        if self.max_steps == 0 {
            return Err(KineticaError::InvalidSettings {
                reason: "max_steps must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ModelSettings::default().validate().is_ok());
        assert!(SimulatorSettings::default().validate().is_ok());
    }

    #[test]
    fn test_keep_above_move_rejected() {
        let settings = ModelSettings::new(0.1, 0.5, 1.0);
        let err = settings.validate().unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SETTINGS");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: SimulatorSettings = serde_json::from_str(r#"{"rtol": 1e-6}"#).unwrap();
        assert_eq!(settings.rtol, 1e-6);
        assert_eq!(settings.max_steps, 100_000);
    }
}
