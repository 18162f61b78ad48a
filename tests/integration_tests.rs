//! Integration Tests
//!
//! End-to-end simulation runs: job files in, outcomes and snapshots out.

mod common;

use std::fs;

use approx::assert_relative_eq;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use common::*;
use kinetica::error::{KineticaError, Result};
use kinetica::network::JobLoader;
use kinetica::solver::{
    AcceptedStep, ConcentrationRecorder, IntegrationFailure, Integrator, ModelSettings,
    ReactionSystem, ReactionSystemListener, Rhs, SimulatorSettings, StateSnapshot, TerminationCause,
    TerminationCriterion,
};
use kinetica::state::load_reactor;
use kinetica::surface::SurfaceSubset;

fn run(
    termination: Vec<TerminationCriterion>,
    model: &ModelSettings,
) -> kinetica::SimulationOutcome {
    reactor(termination)
        .simulate(
            &pyrolysis_network(),
            SurfaceSubset::default(),
            model,
            &SimulatorSettings::default(),
        )
        .unwrap()
}

// === Termination Tests ===

#[test]
fn test_conversion_termination() {
    let outcome = run(vec![conversion(0.5), time(10.0)], &ModelSettings::default());

    assert!(outcome.terminated);
    assert!(!outcome.resurrected);
    assert_eq!(outcome.cause, TerminationCause::Conversion { species: C2H6 });
    assert!(outcome.conversion >= 0.5);
    // First-order decay in moles: N = N0 exp(-10 t)
    assert_relative_eq!(outcome.conversion, 1.0 - (-10.0 * outcome.time).exp(), max_relative = 1e-6);
    assert!(outcome.time > 2.0f64.ln() / 10.0);
}

#[test]
fn test_time_termination() {
    let outcome = run(vec![time(0.01)], &ModelSettings::default());

    assert!(outcome.terminated);
    assert_eq!(outcome.cause, TerminationCause::Time);
    assert_relative_eq!(outcome.time, 0.01, max_relative = 1e-9);
    assert_eq!(outcome.conversion, 0.0);
}

#[test]
fn test_rate_ratio_termination() {
    let outcome = run(
        vec![TerminationCriterion::RateRatio { ratio: 0.5 }, time(10.0)],
        &ModelSettings::default(),
    );

    assert!(outcome.terminated);
    assert_eq!(outcome.cause, TerminationCause::RateRatio);
    assert!(outcome.time < 10.0);
}

#[test]
fn test_step_limit() {
    let settings = SimulatorSettings {
        max_steps: 3,
        ..SimulatorSettings::default()
    };
    let outcome = reactor(vec![time(10.0)])
        .simulate(&pyrolysis_network(), SurfaceSubset::default(), &ModelSettings::default(), &settings)
        .unwrap();

    assert!(!outcome.terminated);
    assert_eq!(outcome.cause, TerminationCause::StepLimit);
    assert_eq!(outcome.steps, 3);
}

#[test]
fn test_missing_termination_is_error() {
    let err = reactor(vec![])
        .simulate(
            &pyrolysis_network(),
            SurfaceSubset::default(),
            &ModelSettings::default(),
            &SimulatorSettings::default(),
        )
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_TERMINATION");
}

#[test]
fn test_invalid_termination_time_is_error() {
    for seconds in [-1.0, f64::INFINITY, f64::NAN] {
        let recorder = ConcentrationRecorder::shared();
        let mut reactor = reactor(vec![time(seconds)]);
        reactor.attach(recorder.clone());

        let err = reactor
            .simulate(
                &pyrolysis_network(),
                SurfaceSubset::default(),
                &ModelSettings::default(),
                &SimulatorSettings::default(),
            )
            .unwrap_err();
        assert_eq!(err.error_code(), "INVALID_SETTINGS");
        assert!(recorder.borrow().data.is_empty());
    }
}

#[test]
fn test_conversion_of_absent_species_is_error() {
    let criterion = TerminationCriterion::Conversion {
        species: AR,
        conversion: 0.5,
    };
    let err = reactor(vec![criterion])
        .simulate(
            &pyrolysis_network(),
            SurfaceSubset::default(),
            &ModelSettings::default(),
            &SimulatorSettings::default(),
        )
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_INITIAL_STATE");
}

// === Edge Flux Tests ===

#[test]
fn test_edge_species_reported_for_core() {
    let model = ModelSettings::new(0.1, 0.0, f64::INFINITY);
    let outcome = run(vec![conversion(0.5)], &model);

    assert!(outcome.terminated);
    let labels: Vec<&str> = outcome.invalid_objects.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["C2H5", "CH4"]);

    // Edge order is C2H5, H, CH4; nothing produces H
    let ratios = &outcome.max_edge_species_rate_ratios;
    assert_eq!(ratios.len(), 3);
    assert!(ratios[0] > 0.1);
    assert_eq!(ratios[1], 0.0);
    assert_relative_eq!(ratios[0], ratios[2]);
}

#[test]
fn test_edge_flux_interrupts() {
    let model = ModelSettings::new(0.1, 0.0, 0.2);
    let outcome = run(vec![conversion(0.9)], &model);

    assert!(!outcome.terminated);
    assert_eq!(outcome.cause, TerminationCause::Interrupted);
    assert!(outcome.conversion < 0.9);
}

#[test]
fn test_object_limit_interrupts() {
    let model = ModelSettings {
        max_objects_per_iteration: 1,
        ..ModelSettings::new(0.1, 0.0, f64::INFINITY)
    };
    let outcome = run(vec![conversion(0.9)], &model);

    assert_eq!(outcome.cause, TerminationCause::Interrupted);
    assert_eq!(outcome.invalid_objects.len(), 1);
}

#[test]
fn test_fast_edge_reaction_promoted_to_surface() {
    let model = ModelSettings {
        tolerance_move_edge_reaction_to_surface: 0.1,
        ..ModelSettings::default()
    };
    let outcome = run(vec![conversion(0.5)], &model);

    assert!(outcome.terminated);
    assert_eq!(outcome.surface.reactions, vec![reaction(1)]);
    let labels: Vec<&str> = outcome.surface.species.iter().map(|s| s.label()).collect();
    assert_eq!(labels, vec!["C2H5", "CH4"]);
}

// === Failure Handling Tests ===

struct FailingIntegrator;

impl Integrator for FailingIntegrator {
    fn advance(
        &mut self,
        _rhs: &Rhs<'_>,
        t: f64,
        _y: &[f64],
        _max_step: f64,
    ) -> std::result::Result<AcceptedStep, IntegrationFailure> {
        Err(IntegrationFailure::StepTooSmall { time: t, step: 1e-30 })
    }
}

#[test]
fn test_integration_failure_dissolves_surface() {
    let network = pyrolysis_network();
    let mut reactor = reactor(vec![conversion(0.9)]);
    let surface = SurfaceSubset::new(vec![species(CH3)], vec![reaction(0)]);

    let outcome = reactor
        .simulate_with(
            &network,
            surface,
            &ModelSettings::default(),
            &SimulatorSettings::default(),
            &mut FailingIntegrator,
        )
        .unwrap();

    assert!(outcome.resurrected);
    assert!(!outcome.terminated);
    assert!(matches!(outcome.cause, TerminationCause::Resurrected { .. }));
    assert!(outcome.surface.is_empty());
    assert!(reactor.surface_species_indices().is_empty());
    assert!(reactor.state().surface().is_empty());
}

#[test]
fn test_integration_failure_without_surface() {
    let mut reactor = reactor(vec![conversion(0.9)]);

    let outcome = reactor
        .simulate_with(
            &pyrolysis_network(),
            SurfaceSubset::default(),
            &ModelSettings::default(),
            &SimulatorSettings::default(),
            &mut FailingIntegrator,
        )
        .unwrap();

    assert!(!outcome.resurrected);
    assert!(!outcome.terminated);
    assert!(matches!(outcome.cause, TerminationCause::IntegrationFailure { .. }));
    assert_eq!(outcome.steps, 0);
}

struct FailingListener;

impl ReactionSystemListener for FailingListener {
    fn update(&mut self, _snapshot: &StateSnapshot) -> Result<()> {
        Err(KineticaError::ListenerFailed {
            reason: "output closed".to_string(),
        })
    }
}

#[test]
fn test_listener_failure_propagates() {
    let mut reactor = reactor(vec![conversion(0.5)]);
    reactor.attach(std::rc::Rc::new(std::cell::RefCell::new(FailingListener)));

    let err = reactor
        .simulate(
            &pyrolysis_network(),
            SurfaceSubset::default(),
            &ModelSettings::default(),
            &SimulatorSettings::default(),
        )
        .unwrap_err();

    assert_eq!(err.error_code(), "LISTENER_FAILED");
    assert!(err.is_recoverable());
}

// === Job File Tests ===

const LIQUID_JOB: &str = r#"{
    "species": [
        {"label": "solvent", "core": true},
        {"label": "A", "core": true},
        {"label": "B", "core": true},
        {"label": "C"}
    ],
    "reactions": [
        {"reactants": ["A"], "products": ["B"], "kf": 1.0},
        {"reactants": ["solvent", "B"], "products": ["C"], "kf": 1.0e-6}
    ],
    "reactors": [{
        "type": "liquid",
        "temperature": {"value": 298.15, "units": "K"},
        "initial_concentrations": {
            "solvent": {"value": 10.0, "units": "mol/L"},
            "A": {"value": 1.0, "units": "mol/L"}
        },
        "constant_species": ["solvent"],
        "termination": [{"kind": "time", "time": {"value": 1000, "units": "ms"}}]
    }],
    "simulator": {"rtol": 1e-10, "atol": 1e-12}
}"#;

#[test]
fn test_liquid_job_from_file() {
    let dir = tempdir().unwrap();
    let job_path = dir.path().join("liquid.json");
    fs::write(&job_path, LIQUID_JOB).unwrap();

    let job = JobLoader::new().load(&job_path).unwrap();
    assert_eq!(job.network.edge_species.len(), 1);
    assert_eq!(job.simulator_settings.rtol, 1e-10);

    let mut reactor = job.reactors[0].clone();
    let recorder = ConcentrationRecorder::shared();
    reactor.attach(recorder.clone());
    let outcome = reactor
        .simulate(
            &job.network,
            SurfaceSubset::default(),
            &job.model_settings,
            &job.simulator_settings,
        )
        .unwrap();

    assert_eq!(outcome.cause, TerminationCause::Time);
    assert_relative_eq!(outcome.time, 1.0, max_relative = 1e-9);

    let recorder = recorder.borrow();
    let last = &recorder.data.last().unwrap().core_species_concentrations;
    assert_relative_eq!(last[0], 10_000.0);
    assert_relative_eq!(last[1], 1000.0 * (-1.0f64).exp(), max_relative = 1e-6);
    assert_relative_eq!(last[1] + last[2], 1000.0, max_relative = 1e-9);
    // solvent + B feeds the edge species C
    assert!(outcome.max_edge_species_rate_ratios[0] > 0.0);
}

#[test]
fn test_simulated_reactor_snapshot_reloads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    let job = JobLoader::new().from_str(LIQUID_JOB).unwrap();

    let mut reactor = job.reactors[0].clone();
    reactor
        .simulate(
            &job.network,
            SurfaceSubset::default(),
            &job.model_settings,
            &job.simulator_settings,
        )
        .unwrap();
    kinetica::state::save_reactor(&reactor, &path).unwrap();

    let loaded = load_reactor(&path).unwrap();
    let liquid = loaded.as_liquid().unwrap();
    assert_eq!(liquid.constant_species().len(), 1);
    assert_eq!(liquid.initial_concentrations()[1].1.units(), "mol/L");
    assert_eq!(loaded.state().network(), &job.network);
    assert_eq!(loaded.num_core_species(), 3);
    assert_eq!(loaded.termination(), reactor.termination());
}
