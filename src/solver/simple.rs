//! Isothermal, isobaric ideal-gas batch reactor

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::base::{InitialConditions, ReactionSystem, SystemState, VolumeLaw};
use super::termination::TerminationCriterion;
use super::ReactorKind;
use crate::error::{KineticaError, Result};
use crate::network::{Species, SpeciesId};
use crate::quantity::{Dimension, Quantity, GAS_CONSTANT};

/// Well-mixed gas batch reactor at constant temperature and pressure
///
/// The initial state holds one cubic metre of gas at total concentration
/// `P / (R T)`; the volume then follows the mole count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleReactor {
    temperature: Quantity,
    pressure: Quantity,
    /// `(species, mole fraction)` pairs, ascending by species
    initial_mole_fractions: Vec<(SpeciesId, f64)>,
    system: SystemState,
}

impl SimpleReactor {
    pub fn new(
        temperature: Quantity,
        pressure: Quantity,
        initial_mole_fractions: BTreeMap<SpeciesId, f64>,
        termination: Vec<TerminationCriterion>,
    ) -> Self {
        Self {
            temperature,
            pressure,
            initial_mole_fractions: initial_mole_fractions.into_iter().collect(),
            system: SystemState::new(termination),
        }
    }

    pub fn temperature(&self) -> &Quantity {
        &self.temperature
    }

    pub fn pressure(&self) -> &Quantity {
        &self.pressure
    }

    pub fn initial_mole_fractions(&self) -> &[(SpeciesId, f64)] {
        &self.initial_mole_fractions
    }
}

impl ReactionSystem for SimpleReactor {
    fn kind(&self) -> ReactorKind {
        ReactorKind::Simple
    }

    fn state(&self) -> &SystemState {
        &self.system
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.system
    }

    fn initial_conditions(&self, core_species: &[Species]) -> Result<InitialConditions> {
        let temperature = self.temperature.expect_si(Dimension::Temperature, "temperature")?;
        let pressure = self.pressure.expect_si(Dimension::Pressure, "pressure")?;
        if temperature <= 0.0 || pressure <= 0.0 {
            return Err(KineticaError::InvalidInitialState {
                reason: format!("temperature {} and pressure {} must be positive", self.temperature, self.pressure),
            });
        }

        let mut total = 0.0;
        for (species, fraction) in &self.initial_mole_fractions {
            if !core_species.iter().any(|s| s.id() == *species) {
                return Err(KineticaError::InvalidInitialState {
                    reason: format!("initial species {} is not in the core", species),
                });
            }
            if !fraction.is_finite() || *fraction < 0.0 {
                return Err(KineticaError::InvalidInitialState {
                    reason: format!("mole fraction of {} is {}", species, fraction),
                });
            }
            total += fraction;
        }
        if total <= 0.0 {
            return Err(KineticaError::InvalidInitialState {
                reason: "initial mole fractions sum to zero".to_string(),
            });
        }

        let total_moles = pressure / (GAS_CONSTANT * temperature);
        let moles = core_species
            .iter()
            .map(|s| {
                self.initial_mole_fractions
                    .iter()
                    .find(|(id, _)| *id == s.id())
                    .map_or(0.0, |(_, x)| x / total * total_moles)
            })
            .collect();

        Ok(InitialConditions {
            moles,
            volume_law: VolumeLaw::IdealGas {
                temperature,
                pressure,
            },
            constant_species: Vec::new(),
        })
    }
}
