//! JSON job files
//!
//! A job declares species with a `core` flag, reactions between them by
//! label, one or more reactors and the model/simulator settings. Reactor
//! inputs name species by label; the loader resolves them to ids.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;

use super::mechanism::Mechanism;
use super::species::SpeciesId;
use super::Network;
use crate::error::{KineticaError, Result};
use crate::quantity::Quantity;
use crate::solver::{
    LiquidReactor, ModelSettings, Reactor, SimpleReactor, SimulatorSettings, TerminationCriterion,
};

#[derive(Debug, Deserialize)]
struct JobFile {
    species: Vec<SpeciesSpec>,
    #[serde(default)]
    reactions: Vec<ReactionSpec>,
    #[serde(default)]
    reactors: Vec<ReactorSpec>,
    #[serde(default)]
    model: ModelSettings,
    #[serde(default)]
    simulator: SimulatorSettings,
}

#[derive(Debug, Deserialize)]
struct SpeciesSpec {
    label: String,
    #[serde(default)]
    core: bool,
}

#[derive(Debug, Deserialize)]
struct ReactionSpec {
    reactants: Vec<String>,
    products: Vec<String>,
    kf: f64,
    #[serde(default)]
    kr: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ReactorSpec {
    Simple {
        temperature: Quantity,
        pressure: Quantity,
        initial_mole_fractions: BTreeMap<String, f64>,
        termination: Vec<TerminationSpec>,
    },
    Liquid {
        temperature: Quantity,
        initial_concentrations: BTreeMap<String, Quantity>,
        #[serde(default)]
        constant_species: Vec<String>,
        termination: Vec<TerminationSpec>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TerminationSpec {
    Conversion { species: String, conversion: f64 },
    Time { time: Quantity },
    RateRatio { ratio: f64 },
}

/// A loaded job
#[derive(Debug, Clone)]
pub struct Job {
    pub mechanism: Mechanism,
    pub network: Network,
    pub reactors: Vec<Reactor>,
    pub model_settings: ModelSettings,
    pub simulator_settings: SimulatorSettings,
}

/// Reads job files
#[derive(Debug, Clone, Default)]
pub struct JobLoader {
    validate_settings: bool,
}

impl JobLoader {
    pub fn new() -> Self {
        Self {
            validate_settings: true,
        }
    }

    /// Skip settings validation, e.g. to inspect a partially written job
    pub fn without_validation(mut self) -> Self {
        self.validate_settings = false;
        self
    }

    /// Load a job from a file
    pub fn load(&self, path: &Path) -> Result<Job> {
        if !path.exists() {
            return Err(KineticaError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = fs::read_to_string(path).map_err(|e| KineticaError::FileReadError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let job = self.from_str(&content)?;
        info!(
            "Loaded job {}: {} core species, {} edge species, {} reactors",
            path.display(),
            job.network.core_species.len(),
            job.network.edge_species.len(),
            job.reactors.len()
        );
        Ok(job)
    }

    /// Load a job from JSON text
    pub fn from_str(&self, json: &str) -> Result<Job> {
        let file: JobFile = serde_json::from_str(json)?;

        let mut mechanism = Mechanism::new();
        let mut core = HashSet::new();
        for spec in &file.species {
            let id = mechanism.add_species(spec.label.as_str())?;
            if spec.core {
                core.insert(id);
            }
        }
        for spec in &file.reactions {
            let reactants: Vec<&str> = spec.reactants.iter().map(String::as_str).collect();
            let products: Vec<&str> = spec.products.iter().map(String::as_str).collect();
            mechanism.add_reaction(&reactants, &products, spec.kf, spec.kr)?;
        }
        let network = mechanism.split(&core);
        debug!(
            "Split mechanism into {} core and {} edge reactions",
            network.core_reactions.len(),
            network.edge_reactions.len()
        );

        let reactors = file
            .reactors
            .into_iter()
            .map(|spec| build_reactor(&mechanism, spec))
            .collect::<Result<Vec<_>>>()?;

        if self.validate_settings {
            file.model.validate()?;
            file.simulator.validate()?;
        }

        Ok(Job {
            mechanism,
            network,
            reactors,
            model_settings: file.model,
            simulator_settings: file.simulator,
        })
    }
}

fn species_id(mechanism: &Mechanism, label: &str) -> Result<SpeciesId> {
    mechanism
        .species_by_label(label)
        .map(|s| s.id())
        .ok_or_else(|| KineticaError::UnknownSpecies {
            label: label.to_string(),
        })
}

fn build_termination(mechanism: &Mechanism, specs: Vec<TerminationSpec>) -> Result<Vec<TerminationCriterion>> {
    specs
        .into_iter()
        .map(|spec| {
            Ok(match spec {
                TerminationSpec::Conversion {
                    species,
                    conversion,
                } => TerminationCriterion::Conversion {
                    species: species_id(mechanism, &species)?,
                    conversion,
                },
                TerminationSpec::Time { time } => TerminationCriterion::Time { time },
                TerminationSpec::RateRatio { ratio } => TerminationCriterion::RateRatio { ratio },
            })
        })
        .collect()
}

fn build_reactor(mechanism: &Mechanism, spec: ReactorSpec) -> Result<Reactor> {
    let reactor = match spec {
        ReactorSpec::Simple {
            temperature,
            pressure,
            initial_mole_fractions,
            termination,
        } => {
            let fractions = initial_mole_fractions
                .into_iter()
                .map(|(label, x)| Ok((species_id(mechanism, &label)?, x)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            SimpleReactor::new(
                temperature,
                pressure,
                fractions,
                build_termination(mechanism, termination)?,
            )
            .into()
        }
        ReactorSpec::Liquid {
            temperature,
            initial_concentrations,
            constant_species,
            termination,
        } => {
            let concentrations = initial_concentrations
                .into_iter()
                .map(|(label, c)| Ok((species_id(mechanism, &label)?, c)))
                .collect::<Result<BTreeMap<_, _>>>()?;
            let constant = constant_species
                .iter()
                .map(|label| species_id(mechanism, label))
                .collect::<Result<Vec<_>>>()?;
            LiquidReactor::new(
                temperature,
                concentrations,
                constant,
                build_termination(mechanism, termination)?,
            )
            .into()
        }
    };
    Ok(reactor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::ReactionSystem;

    const JOB: &str = r#"{
        "species": [
            {"label": "A", "core": true},
            {"label": "B", "core": true},
            {"label": "C"}
        ],
        "reactions": [
            {"reactants": ["A"], "products": ["B"], "kf": 1.0},
            {"reactants": ["B"], "products": ["C"], "kf": 2.0, "kr": 0.5}
        ],
        "reactors": [{
            "type": "simple",
            "temperature": {"value": 1000, "units": "K"},
            "pressure": {"value": 1, "units": "bar"},
            "initial_mole_fractions": {"A": 1.0},
            "termination": [
                {"kind": "conversion", "species": "A", "conversion": 0.5},
                {"kind": "time", "time": {"value": 1, "units": "s"}}
            ]
        }],
        "model": {"tolerance_move_to_core": 0.1}
    }"#;

    #[test]
    fn test_load_from_str() {
        let job = JobLoader::new().from_str(JOB).unwrap();
        assert_eq!(job.network.core_species.len(), 2);
        assert_eq!(job.network.edge_reactions.len(), 1);
        assert_eq!(job.reactors.len(), 1);
        assert_eq!(job.reactors[0].termination().len(), 2);
        assert_eq!(job.model_settings.tolerance_move_to_core, 0.1);
        assert_eq!(job.model_settings.tolerance_interrupt_simulation, f64::INFINITY);
    }

    #[test]
    fn test_unknown_label_in_reactor() {
        let json = JOB.replace(r#""species": "A""#, r#""species": "Z""#);
        let err = JobLoader::new().from_str(&json).unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SPECIES");
    }

    #[test]
    fn test_missing_file() {
        let err = JobLoader::new().load(Path::new("/nonexistent/job.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_NOT_FOUND");
    }
}
