//! Shared ethane-pyrolysis fixture
//!
//! Species, in id order: Ar, He, Ne, N2, C2H6, CH3, C2H5, H, CH4.
//! Reactions:
//! - r0: C2H6 <=> CH3 + CH3
//! - r1: C2H6 + CH3 <=> C2H5 + CH4
//! - r2: C2H5 + H <=> C2H6
//! - r3: CH3 + H <=> CH4

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};

use kinetica::network::{Mechanism, Network, Reaction, Species, SpeciesId};
use kinetica::quantity::Quantity;
use kinetica::solver::{SimpleReactor, TerminationCriterion};

pub const AR: SpeciesId = SpeciesId(0);
pub const C2H6: SpeciesId = SpeciesId(4);
pub const CH3: SpeciesId = SpeciesId(5);
pub const C2H5: SpeciesId = SpeciesId(6);
pub const H: SpeciesId = SpeciesId(7);
pub const CH4: SpeciesId = SpeciesId(8);

pub fn mechanism() -> Mechanism {
    let mut mechanism = Mechanism::new();
    for label in ["Ar", "He", "Ne", "N2", "C2H6", "CH3", "C2H5", "H", "CH4"] {
        mechanism.add_species(label).unwrap();
    }
    mechanism.add_reaction(&["C2H6"], &["CH3", "CH3"], 10.0, 0.0).unwrap();
    mechanism.add_reaction(&["C2H6", "CH3"], &["C2H5", "CH4"], 1.0, 0.0).unwrap();
    mechanism.add_reaction(&["C2H5", "H"], &["C2H6"], 1.0, 0.0).unwrap();
    mechanism.add_reaction(&["CH3", "H"], &["CH4"], 1.0, 0.0).unwrap();
    mechanism
}

pub fn species(id: SpeciesId) -> Species {
    mechanism().species()[id.0 as usize].clone()
}

pub fn reaction(n: usize) -> Reaction {
    mechanism().reactions()[n].clone()
}

/// Split with the given species ids in the core
pub fn network(core: &[u32]) -> Network {
    let core: HashSet<SpeciesId> = core.iter().map(|&i| SpeciesId(i)).collect();
    mechanism().split(&core)
}

/// Everything in the core
pub fn full_core() -> Network {
    network(&[0, 1, 2, 3, 4, 5, 6, 7, 8])
}

/// Core Ar..CH3 with r0, edge C2H5, H, CH4 with r1..r3
pub fn pyrolysis_network() -> Network {
    network(&[0, 1, 2, 3, 4, 5])
}

pub fn reactor(termination: Vec<TerminationCriterion>) -> SimpleReactor {
    let fractions: BTreeMap<SpeciesId, f64> = [(C2H6, 1.0)].into_iter().collect();
    SimpleReactor::new(
        Quantity::kelvin(1000.0),
        Quantity::new(1.0, "bar").unwrap(),
        fractions,
        termination,
    )
}

pub fn conversion(target: f64) -> TerminationCriterion {
    TerminationCriterion::Conversion {
        species: C2H6,
        conversion: target,
    }
}

pub fn time(seconds: f64) -> TerminationCriterion {
    TerminationCriterion::Time {
        time: Quantity::seconds(seconds),
    }
}
