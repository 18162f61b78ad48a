//! Isothermal constant-volume liquid batch reactor

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::base::{InitialConditions, ReactionSystem, SystemState, VolumeLaw};
use super::termination::TerminationCriterion;
use super::ReactorKind;
use crate::error::{KineticaError, Result};
use crate::network::{Species, SpeciesId};
use crate::quantity::{Dimension, Quantity};

/// Liquid-phase batch reactor holding one cubic metre of solution
///
/// Species listed in `constant_species` keep their initial concentration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidReactor {
    temperature: Quantity,
    /// `(species, concentration)` pairs, ascending by species
    initial_concentrations: Vec<(SpeciesId, Quantity)>,
    #[serde(default)]
    constant_species: Vec<SpeciesId>,
    system: SystemState,
}

impl LiquidReactor {
    pub fn new(
        temperature: Quantity,
        initial_concentrations: BTreeMap<SpeciesId, Quantity>,
        constant_species: Vec<SpeciesId>,
        termination: Vec<TerminationCriterion>,
    ) -> Self {
        Self {
            temperature,
            initial_concentrations: initial_concentrations.into_iter().collect(),
            constant_species,
            system: SystemState::new(termination),
        }
    }

    pub fn temperature(&self) -> &Quantity {
        &self.temperature
    }

    pub fn initial_concentrations(&self) -> &[(SpeciesId, Quantity)] {
        &self.initial_concentrations
    }

    pub fn constant_species(&self) -> &[SpeciesId] {
        &self.constant_species
    }
}

impl ReactionSystem for LiquidReactor {
    fn kind(&self) -> ReactorKind {
        ReactorKind::Liquid
    }

    fn state(&self) -> &SystemState {
        &self.system
    }

    fn state_mut(&mut self) -> &mut SystemState {
        &mut self.system
    }

    fn initial_conditions(&self, core_species: &[Species]) -> Result<InitialConditions> {
        self.temperature.expect_si(Dimension::Temperature, "temperature")?;

        let position = |id: &SpeciesId| -> Result<usize> {
            core_species
                .iter()
                .position(|s| s.id() == *id)
                .ok_or_else(|| KineticaError::InvalidInitialState {
                    reason: format!("species {} is not in the core", id),
                })
        };

        let mut moles = vec![0.0; core_species.len()];
        for (species, concentration) in &self.initial_concentrations {
            let value = concentration.expect_si(Dimension::Concentration, "initial concentration")?;
            if !value.is_finite() || value < 0.0 {
                return Err(KineticaError::InvalidInitialState {
                    reason: format!("initial concentration of {} is {}", species, concentration),
                });
            }
            moles[position(species)?] = value;
        }
        let constant_species = self
            .constant_species
            .iter()
            .map(position)
            .collect::<Result<Vec<_>>>()?;

        Ok(InitialConditions {
            moles,
            volume_law: VolumeLaw::Constant { volume: 1.0 },
            constant_species,
        })
    }
}
