//! Reaction-system state shared by every reactor variant
//!
//! `SystemState` owns the current core/edge lists, the surface, the index
//! arrays and the listener registry. `ReactionSystem` provides the model
//! operations on top of it; a variant only supplies its initial conditions
//! and how its volume responds to the mole count.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::integrator::{AdaptiveRk4, Integrator};
use super::listener::{ListenerRegistry, ReactionSystemListener, SharedListener, StateSnapshot};
use super::settings::{ModelSettings, SimulatorSettings};
use super::termination::{TerminationCause, TerminationCriterion};
use super::ReactorKind;
use crate::error::{KineticaError, Result};
use crate::network::{Network, Reaction, Species, SpeciesId, SystemIndices};
use crate::quantity::{Dimension, GAS_CONSTANT};
use crate::surface::{bulk_core_species, LayeringExtension, SurfaceResolution, SurfaceResolver, SurfaceSubset};

/// How the reactor volume follows the mole count
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VolumeLaw {
    /// Isothermal, isobaric ideal gas: `V = N R T / P`
    IdealGas { temperature: f64, pressure: f64 },
    /// Fixed volume in m^3
    Constant { volume: f64 },
}

impl VolumeLaw {
    pub fn volume(&self, moles: &[f64]) -> f64 {
        match *self {
            VolumeLaw::IdealGas {
                temperature,
                pressure,
            } => moles.iter().sum::<f64>() * GAS_CONSTANT * temperature / pressure,
            VolumeLaw::Constant { volume } => volume,
        }
    }
}

/// Starting point of a simulation
#[derive(Debug, Clone, PartialEq)]
pub struct InitialConditions {
    /// Moles of each core species, core order
    pub moles: Vec<f64>,
    pub volume_law: VolumeLaw,
    /// Core positions held at constant concentration
    pub constant_species: Vec<usize>,
}

/// Result of one `simulate` call
#[derive(Debug, Clone)]
pub struct SimulationOutcome {
    /// A termination criterion was met
    pub terminated: bool,
    /// The surface was dissolved after an integration failure
    pub resurrected: bool,
    pub cause: TerminationCause,
    /// Edge species that exceeded the move-to-core tolerance, first seen first
    pub invalid_objects: Vec<Species>,
    /// Surface after any promotions or resurrection
    pub surface: SurfaceSubset,
    /// Final reaction time in seconds
    pub time: f64,
    /// Conversion of the first conversion criterion's species, else 0
    pub conversion: f64,
    /// Peak normalized rate of each edge species, edge order
    pub max_edge_species_rate_ratios: Vec<f64>,
    /// Accepted integration steps
    pub steps: usize,
}

/// State shared by all reactor variants
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemState {
    id: Uuid,
    termination: Vec<TerminationCriterion>,
    network: Network,
    surface: SurfaceSubset,
    pinned_surface_species: BTreeSet<SpeciesId>,
    #[serde(skip)]
    indices: Option<SystemIndices>,
    #[serde(skip)]
    listeners: ListenerRegistry,
    #[serde(skip)]
    time: f64,
    #[serde(skip)]
    core_species_concentrations: Vec<f64>,
}

impl SystemState {
    pub fn new(termination: Vec<TerminationCriterion>) -> Self {
        Self {
            id: Uuid::new_v4(),
            termination,
            ..Self::default()
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn termination(&self) -> &[TerminationCriterion] {
        &self.termination
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn surface(&self) -> &SurfaceSubset {
        &self.surface
    }

    pub fn indices(&self) -> Option<&SystemIndices> {
        self.indices.as_ref()
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn core_species_concentrations(&self) -> &[f64] {
        &self.core_species_concentrations
    }

    /// Keep a species on the surface even without a surface reaction
    pub fn pin_surface_species(&mut self, species: SpeciesId) {
        self.pinned_surface_species.insert(species);
    }

    /// Validate, resolve and index a new model
    pub fn initialize(&mut self, network: &Network, surface: &mut SurfaceSubset) -> Result<SurfaceResolution> {
        let core_species: HashSet<SpeciesId> = network.core_species.iter().map(|s| s.id()).collect();
        if let Some(species) = surface.species.iter().find(|s| !core_species.contains(&s.id())) {
            return Err(KineticaError::SpeciesNotInCore {
                label: species.label().to_string(),
            });
        }
        if let Some(reaction) = surface
            .reactions
            .iter()
            .find(|r| !network.is_core_reaction(r.id()))
        {
            return Err(KineticaError::ReactionNotInCore {
                reaction: reaction.to_string(),
            });
        }

        let mut indices = SystemIndices::build(network)?;
        let resolver = SurfaceResolver::with_pinned(self.pinned_surface_species.iter().copied());
        let resolution = resolver.resolve(&network.core_reactions, surface);
        indices.set_surface(surface)?;

        debug!(
            "Initialized model: {} core species, {} core reactions, {} edge species, {} edge reactions, {} surface species",
            indices.num_core_species(),
            indices.num_core_reactions(),
            indices.num_edge_species(),
            indices.num_edge_reactions(),
            surface.species.len()
        );

        self.core_species_concentrations = vec![0.0; indices.num_core_species()];
        self.time = 0.0;
        self.network = network.clone();
        self.surface = surface.clone();
        self.indices = Some(indices);
        Ok(resolution)
    }

    /// Rebuild index arrays from the stored lists, e.g. after loading a snapshot
    pub fn restore_indices(&mut self) -> Result<()> {
        let mut indices = SystemIndices::build(&self.network)?;
        indices.set_surface(&self.surface)?;
        self.core_species_concentrations = vec![0.0; indices.num_core_species()];
        self.indices = Some(indices);
        Ok(())
    }

    fn record(&mut self, time: f64, concentrations: Vec<f64>) -> Result<()> {
        self.time = time;
        self.core_species_concentrations = concentrations;
        let snapshot = StateSnapshot {
            time,
            core_species_concentrations: self.core_species_concentrations.clone(),
        };
        self.listeners.notify(&snapshot)
    }
}

/// Rate evaluation over one network, decoupled from the reactor borrow
struct Kinetics<'a> {
    network: &'a Network,
    indices: SystemIndices,
    volume_law: VolumeLaw,
    constant_species: Vec<usize>,
}

/// Rates at one state, all in mol/(m^3 s)
struct RateSummary {
    characteristic: f64,
    edge_species: Vec<f64>,
    edge_reactions: Vec<f64>,
}

impl Kinetics<'_> {
    fn concentrations(&self, moles: &[f64]) -> Vec<f64> {
        let volume = self.volume_law.volume(moles);
        if volume <= 0.0 {
            return vec![0.0; moles.len()];
        }
        moles.iter().map(|n| n / volume).collect()
    }

    fn rate(&self, reaction: &Reaction, position: usize, concentrations: &[f64]) -> f64 {
        let conc = |index: &usize| concentrations.get(*index).copied().unwrap_or(0.0);
        let forward: f64 = self.indices.reactant_indices(position).iter().map(conc).product();
        let reverse: f64 = self.indices.product_indices(position).iter().map(conc).product();
        reaction.kf() * forward - reaction.kr() * reverse
    }

    /// Net production of each core species in mol/(m^3 s)
    fn core_rates(&self, concentrations: &[f64]) -> Vec<f64> {
        let mut rates = vec![0.0; concentrations.len()];
        for (j, reaction) in self.network.core_reactions.iter().enumerate() {
            let r = self.rate(reaction, j, concentrations);
            for &i in self.indices.reactant_indices(j) {
                rates[i] -= r;
            }
            for &i in self.indices.product_indices(j) {
                rates[i] += r;
            }
        }
        for &i in &self.constant_species {
            rates[i] = 0.0;
        }
        rates
    }

    /// `dN/dt` for the integrator
    fn derivative(&self, moles: &[f64]) -> Vec<f64> {
        let volume = self.volume_law.volume(moles);
        let concentrations = self.concentrations(moles);
        self.core_rates(&concentrations)
            .into_iter()
            .map(|r| r * volume)
            .collect()
    }

    fn summarize(&self, concentrations: &[f64]) -> RateSummary {
        let core = self.core_rates(concentrations);
        let characteristic = core.iter().map(|r| r * r).sum::<f64>().sqrt();

        let num_core_species = self.indices.num_core_species();
        let num_core_reactions = self.indices.num_core_reactions();
        let mut edge_species = vec![0.0; self.indices.num_edge_species()];
        let mut edge_reactions = Vec::with_capacity(self.indices.num_edge_reactions());
        for (k, reaction) in self.network.edge_reactions.iter().enumerate() {
            let position = num_core_reactions + k;
            let r = self.rate(reaction, position, concentrations);
            for &i in self.indices.reactant_indices(position) {
                if i >= num_core_species {
                    edge_species[i - num_core_species] -= r;
                }
            }
            for &i in self.indices.product_indices(position) {
                if i >= num_core_species {
                    edge_species[i - num_core_species] += r;
                }
            }
            edge_reactions.push(r);
        }

        RateSummary {
            characteristic,
            edge_species,
            edge_reactions,
        }
    }
}

/// Capabilities shared by every reactor variant
pub trait ReactionSystem {
    fn kind(&self) -> ReactorKind;

    fn state(&self) -> &SystemState;

    fn state_mut(&mut self) -> &mut SystemState;

    /// Initial moles, volume law and constant species for the core list
    fn initial_conditions(&self, core_species: &[Species]) -> Result<InitialConditions>;

    fn attach(&mut self, listener: SharedListener) -> bool {
        self.state_mut().listeners.attach(listener)
    }

    fn detach<L: ReactionSystemListener + ?Sized>(&mut self, listener: &Rc<RefCell<L>>) -> Result<()>
    where
        Self: Sized,
    {
        self.state_mut().listeners.detach(listener)
    }

    fn termination(&self) -> &[TerminationCriterion] {
        self.state().termination()
    }

    /// Reset the index arrays from new core/edge lists
    ///
    /// The surface is repaired in place; see `SurfaceResolver`.
    fn initialize_model(&mut self, network: &Network, surface: &mut SurfaceSubset) -> Result<()> {
        self.state_mut().initialize(network, surface).map(|_| ())
    }

    fn num_core_species(&self) -> usize {
        self.state().indices().map_or(0, |i| i.num_core_species())
    }

    fn num_core_reactions(&self) -> usize {
        self.state().indices().map_or(0, |i| i.num_core_reactions())
    }

    /// Ascending positions of the surface species over `[core..., edge...]`
    ///
    /// Right after `initialize_model` every position is a core position.
    /// Species promoted from the edge by `add_reactions_to_surface` keep
    /// their edge position until the core is enlarged.
    fn surface_species_indices(&self) -> &[usize] {
        self.state()
            .indices()
            .map(|i| i.surface_species_indices())
            .unwrap_or(&[])
    }

    fn surface_reaction_indices(&self) -> &[usize] {
        self.state()
            .indices()
            .map(|i| i.surface_reaction_indices())
            .unwrap_or(&[])
    }

    /// Edge reactions of the current model that may join the surface
    fn layering_indices(&self) -> Result<Vec<usize>> {
        let state = self.state();
        if state.indices().is_none() {
            return Err(KineticaError::ModelNotInitialized);
        }
        let bulk = bulk_core_species(&state.network().core_species, state.surface());
        Ok(LayeringExtension::find(&bulk, state.network().edge_reactions.iter().enumerate()).accepted)
    }

    /// Promote edge reactions to the surface under the layering constraint
    ///
    /// Accepted reactions and the edge species they bring are appended to
    /// `surface` in candidate order. Returns the accepted edge indices.
    ///
    /// The promoted entries are still edge entries of the current network.
    /// Passing the grown surface back to `initialize_model` requires a
    /// network whose core includes them; otherwise it fails with
    /// `SpeciesNotInCore`.
    fn add_reactions_to_surface(
        &mut self,
        new_reactions: &[Reaction],
        new_reaction_indices: &[usize],
        surface: &mut SurfaceSubset,
        edge_species: &[Species],
    ) -> Result<Vec<usize>> {
        if new_reactions.len() != new_reaction_indices.len() {
            return Err(KineticaError::MismatchedIndices {
                reactions: new_reactions.len(),
                indices: new_reaction_indices.len(),
            });
        }
        if self.state().indices().is_none() {
            return Err(KineticaError::ModelNotInitialized);
        }

        let bulk = bulk_core_species(&self.state().network().core_species, surface);
        let extension = LayeringExtension::find(
            &bulk,
            new_reaction_indices.iter().copied().zip(new_reactions.iter()),
        );

        for (index, reaction) in new_reaction_indices.iter().zip(new_reactions) {
            if !extension.is_accepted(*index) {
                continue;
            }
            for id in reaction.species() {
                if surface.contains_species(id) {
                    continue;
                }
                if let Some(species) = edge_species.iter().find(|s| s.id() == id) {
                    surface.species.push(species.clone());
                }
            }
            if !surface.contains_reaction(reaction.id()) {
                debug!("Adding reaction {} to the surface", reaction);
                surface.reactions.push(reaction.clone());
            }
        }

        let state = self.state_mut();
        if let Some(indices) = state.indices.as_mut() {
            indices.set_surface(surface)?;
        }
        state.surface = surface.clone();
        Ok(extension.accepted)
    }

    /// Run the reactor with the default integrator
    fn simulate(
        &mut self,
        network: &Network,
        surface: SurfaceSubset,
        model_settings: &ModelSettings,
        simulator_settings: &SimulatorSettings,
    ) -> Result<SimulationOutcome> {
        let mut integrator = AdaptiveRk4::new(simulator_settings);
        self.simulate_with(
            network,
            surface,
            model_settings,
            simulator_settings,
            &mut integrator,
        )
    }

    /// Run the reactor until a criterion is met, the edge interrupts, or the
    /// integrator fails
    ///
    /// Listeners see every accepted step. Integration failures are reported
    /// through the outcome; listener failures are returned as errors.
    fn simulate_with(
        &mut self,
        network: &Network,
        mut surface: SurfaceSubset,
        model_settings: &ModelSettings,
        simulator_settings: &SimulatorSettings,
        integrator: &mut dyn Integrator,
    ) -> Result<SimulationOutcome> {
        model_settings.validate()?;
        simulator_settings.validate()?;
        if self.termination().is_empty() {
            return Err(KineticaError::MissingTermination);
        }
        for criterion in self.termination() {
            criterion.validate()?;
        }

        self.initialize_model(network, &mut surface)?;
        let initial = self.initial_conditions(&network.core_species)?;
        let indices = self
            .state()
            .indices()
            .cloned()
            .ok_or(KineticaError::ModelNotInitialized)?;

        let termination = self.termination().to_vec();
        let mut conversion_targets = Vec::new();
        let mut end_time = f64::INFINITY;
        let mut rate_ratio = None;
        for criterion in &termination {
            match criterion {
                TerminationCriterion::Conversion {
                    species,
                    conversion,
                } => {
                    let position = indices.core_species_index(*species).ok_or_else(|| {
                        KineticaError::InvalidInitialState {
                            reason: format!("conversion species {} is not in the core", species),
                        }
                    })?;
                    if initial.moles[position] <= 0.0 {
                        return Err(KineticaError::InvalidInitialState {
                            reason: format!("conversion species {} starts at zero", species),
                        });
                    }
                    conversion_targets.push((*species, position, *conversion));
                }
                TerminationCriterion::Time { time } => {
                    end_time = end_time.min(time.expect_si(Dimension::Time, "termination time")?);
                }
                TerminationCriterion::RateRatio { ratio } => rate_ratio = Some(*ratio),
            }
        }

        let kinetics = Kinetics {
            network,
            indices,
            volume_law: initial.volume_law,
            constant_species: initial.constant_species.clone(),
        };
        let rhs = |_t: f64, moles: &[f64]| kinetics.derivative(moles);

        let initial_moles = initial.moles.clone();
        let conversion_of = |moles: &[f64]| -> f64 {
            conversion_targets
                .first()
                .map_or(0.0, |&(_, i, _)| 1.0 - moles[i] / initial_moles[i])
        };

        let mut time = 0.0;
        let mut moles = initial.moles;
        let mut steps = 0;
        let mut max_characteristic: f64 = 0.0;
        let mut invalid_objects: Vec<Species> = Vec::new();
        let mut max_ratios = vec![0.0; kinetics.indices.num_edge_species()];
        let mut resurrected = false;
        let mut terminated = false;

        let cause = loop {
            if steps >= simulator_settings.max_steps {
                break TerminationCause::StepLimit;
            }

            let step = match integrator.advance(&rhs, time, &moles, end_time - time) {
                Ok(step) => step,
                Err(failure) => {
                    let reason = failure.to_string();
                    if surface.is_empty() {
                        warn!("Integration failed at t = {:e} s: {}", time, reason);
                        break TerminationCause::IntegrationFailure { reason };
                    }
                    warn!(
                        "Integration failed at t = {:e} s with {} surface species; dissolving surface: {}",
                        time,
                        surface.species.len(),
                        reason
                    );
                    surface.clear();
                    self.initialize_model(network, &mut surface)?;
                    resurrected = true;
                    break TerminationCause::Resurrected { reason };
                }
            };
            steps += 1;
            time = step.time;
            moles = step.state;

            let concentrations = kinetics.concentrations(&moles);
            self.state_mut().record(time, concentrations.clone())?;

            let rates = kinetics.summarize(&concentrations);
            max_characteristic = max_characteristic.max(rates.characteristic);

            let mut interrupt = false;
            if rates.characteristic > 0.0 {
                for (k, rate) in rates.edge_species.iter().enumerate() {
                    let ratio = rate.abs() / rates.characteristic;
                    max_ratios[k] = f64::max(max_ratios[k], ratio);
                    if ratio > model_settings.tolerance_move_to_core {
                        let species = &network.edge_species[k];
                        if !invalid_objects.contains(species) {
                            debug!("Edge species {} exceeds the move-to-core tolerance ({:.3e})", species, ratio);
                            invalid_objects.push(species.clone());
                        }
                    }
                    if ratio > model_settings.tolerance_interrupt_simulation {
                        interrupt = true;
                    }
                }

                let promote: Vec<(usize, Reaction)> = rates
                    .edge_reactions
                    .iter()
                    .enumerate()
                    .filter(|(_, r)| {
                        r.abs() / rates.characteristic > model_settings.tolerance_move_edge_reaction_to_surface
                    })
                    .map(|(k, _)| (k, network.edge_reactions[k].clone()))
                    .filter(|(_, r)| !surface.contains_reaction(r.id()))
                    .collect();
                if !promote.is_empty() {
                    let (indices, reactions): (Vec<usize>, Vec<Reaction>) = promote.into_iter().unzip();
                    self.add_reactions_to_surface(&reactions, &indices, &mut surface, &network.edge_species)?;
                }
            }

            if invalid_objects.len() >= model_settings.max_objects_per_iteration {
                invalid_objects.truncate(model_settings.max_objects_per_iteration);
                interrupt = true;
            }
            if interrupt {
                warn!("Simulation interrupted by edge flux at t = {:e} s", time);
                break TerminationCause::Interrupted;
            }

            if let Some(&(species, _, _)) = conversion_targets
                .iter()
                .find(|&&(_, i, target)| 1.0 - moles[i] / initial_moles[i] >= target)
            {
                terminated = true;
                break TerminationCause::Conversion { species };
            }
            if time >= end_time * (1.0 - 1e-12) {
                terminated = true;
                break TerminationCause::Time;
            }
            if let Some(ratio) = rate_ratio {
                if max_characteristic > 0.0 && rates.characteristic / max_characteristic <= ratio {
                    terminated = true;
                    break TerminationCause::RateRatio;
                }
            }
        };

        info!(
            "{} finished after {} steps at t = {:e} s: {}",
            self.kind(),
            steps,
            time,
            cause
        );

        Ok(SimulationOutcome {
            terminated,
            resurrected,
            cause,
            invalid_objects,
            surface,
            time,
            conversion: conversion_of(&moles),
            max_edge_species_rate_ratios: max_ratios,
            steps,
        })
    }
}
