//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde_json::json;

use crate::error::{KineticaError, Result};
use crate::network::{Job, JobLoader, Network, Species};
use crate::solver::{ConcentrationRecorder, ReactionSystem};
use crate::state::{save_reactor, ReactorSnapshot};
use crate::surface::SurfaceSubset;

fn load_job(path: &Path) -> Result<Job> {
    JobLoader::new().load(path)
}

fn core_species_by_labels(network: &Network, labels: &[String]) -> Result<Vec<Species>> {
    labels
        .iter()
        .map(|label| {
            network
                .core_species
                .iter()
                .find(|s| s.label() == label)
                .cloned()
                .ok_or_else(|| KineticaError::SpeciesNotInCore {
                    label: label.clone(),
                })
        })
        .collect()
}

fn labels(species: &[Species]) -> String {
    species
        .iter()
        .map(|s| s.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Run one reactor of a job.
pub fn simulate(job_path: &Path, index: usize, output: Option<&Path>, snapshot: Option<&Path>) -> Result<()> {
    info!("Simulating reactor {} of {}", index, job_path.display());

    let job = load_job(job_path)?;
    let mut reactor = job
        .reactors
        .get(index)
        .cloned()
        .ok_or_else(|| KineticaError::InvalidSettings {
            reason: format!("job has {} reactors, no reactor {}", job.reactors.len(), index),
        })?;

    let recorder = ConcentrationRecorder::shared();
    reactor.attach(recorder.clone());
    let outcome = reactor.simulate(
        &job.network,
        SurfaceSubset::default(),
        &job.model_settings,
        &job.simulator_settings,
    )?;

    println!("Reactor: {}", reactor.kind());
    println!("Cause: {}", outcome.cause);
    println!("Terminated: {}", outcome.terminated);
    println!("Time: {:e} s after {} steps", outcome.time, outcome.steps);
    println!("Conversion: {:.6}", outcome.conversion);
    if outcome.resurrected {
        warn!("Surface was dissolved after an integration failure");
    }
    if !outcome.invalid_objects.is_empty() {
        println!("Move to core: {}", labels(&outcome.invalid_objects));
    }
    for (species, ratio) in job.network.edge_species.iter().zip(&outcome.max_edge_species_rate_ratios) {
        println!("  {:<12} {:.3e}", species.label(), ratio);
    }

    if let Some(path) = output {
        let trajectory: Vec<_> = recorder
            .borrow()
            .data
            .iter()
            .map(|s| json!({ "time": s.time, "concentrations": s.core_species_concentrations }))
            .collect();
        let content = serde_json::to_string_pretty(&json!({
            "species": job.network.core_species.iter().map(|s| s.label()).collect::<Vec<_>>(),
            "trajectory": trajectory,
        }))?;
        fs::write(path, content).map_err(|e| KineticaError::FileWriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
        println!("Trajectory written: {}", path.display());
    }

    if let Some(path) = snapshot {
        save_reactor(&reactor, path)?;
        println!("Snapshot saved: {}", path.display());
    }

    Ok(())
}

/// Resolve a candidate surface and print what survives.
pub fn resolve_surface(job_path: &Path, species: &[String], reactions: &[usize]) -> Result<()> {
    info!("Resolving surface for {}", job_path.display());

    let job = load_job(job_path)?;
    let mut reactor = job.reactors.into_iter().next().ok_or_else(|| KineticaError::InvalidSettings {
        reason: "job has no reactors".to_string(),
    })?;

    let surface_species = core_species_by_labels(&job.network, species)?;
    let surface_reactions = reactions
        .iter()
        .map(|&j| {
            job.network
                .core_reactions
                .get(j)
                .cloned()
                .ok_or_else(|| KineticaError::ReactionNotInCore {
                    reaction: format!("#{}", j),
                })
        })
        .collect::<Result<Vec<_>>>()?;
    let mut surface = SurfaceSubset::new(surface_species, surface_reactions);

    reactor.initialize_model(&job.network, &mut surface)?;

    println!("Surface species: {}", labels(&surface.species));
    println!("Surface species indices: {:?}", reactor.surface_species_indices());
    println!("Surface reactions:");
    for reaction in &surface.reactions {
        println!("  {}", reaction);
    }
    println!("Surface reaction indices: {:?}", reactor.surface_reaction_indices());

    Ok(())
}

/// Print the edge reactions that satisfy the layering constraint.
pub fn layering(job_path: &Path, surface_species: &[String]) -> Result<()> {
    info!("Finding layering indices for {}", job_path.display());

    let job = load_job(job_path)?;
    let mut reactor = job.reactors.into_iter().next().ok_or_else(|| KineticaError::InvalidSettings {
        reason: "job has no reactors".to_string(),
    })?;

    let species = core_species_by_labels(&job.network, surface_species)?;
    let reactions = job
        .network
        .core_reactions
        .iter()
        .filter(|r| species.iter().any(|s| r.involves(s.id())))
        .cloned()
        .collect();
    let mut surface = SurfaceSubset::new(species, reactions);
    reactor.initialize_model(&job.network, &mut surface)?;

    let indices = reactor.layering_indices()?;
    println!("Surface species: {}", labels(&surface.species));
    println!("Layering indices: {:?}", indices);
    for &k in &indices {
        println!("  {:>3}  {}", k, job.network.edge_reactions[k]);
    }

    Ok(())
}

/// Print a saved reactor snapshot.
pub fn inspect(path: &Path) -> Result<()> {
    info!("Inspecting snapshot: {}", path.display());

    let snapshot = ReactorSnapshot::load(path)?;
    println!("Schema version: {}", snapshot.schema_version);
    println!("Saved at: {}", snapshot.saved_at);
    println!("Checksum: {}", snapshot.checksum);

    let reactor = snapshot.restore()?;
    let state = reactor.state();
    println!("Reactor: {} ({})", reactor.kind(), state.id());
    println!("Core species: {}", labels(&state.network().core_species));
    println!("Edge species: {}", labels(&state.network().edge_species));
    println!("Surface species: {}", labels(&state.surface().species));
    println!("Termination criteria: {}", reactor.termination().len());

    Ok(())
}
