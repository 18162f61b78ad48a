//! Elementary reactions with mass-action kinetics

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::species::SpeciesId;

/// Stable identity of a reaction within a mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionId(pub u32);

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A reversible elementary reaction
///
/// Reactants and products are ordered and may repeat (`2 CH3` is two
/// entries). Rate coefficients are in SI units consistent with
/// concentrations in mol/m^3.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    id: ReactionId,
    label: String,
    reactants: Vec<SpeciesId>,
    products: Vec<SpeciesId>,
    kf: f64,
    #[serde(default)]
    kr: f64,
}

impl Reaction {
    pub fn new(
        id: ReactionId,
        label: impl Into<String>,
        reactants: Vec<SpeciesId>,
        products: Vec<SpeciesId>,
        kf: f64,
        kr: f64,
    ) -> Self {
        Self {
            id,
            label: label.into(),
            reactants,
            products,
            kf,
            kr,
        }
    }

    pub fn id(&self) -> ReactionId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn reactants(&self) -> &[SpeciesId] {
        &self.reactants
    }

    pub fn products(&self) -> &[SpeciesId] {
        &self.products
    }

    /// Forward rate coefficient
    pub fn kf(&self) -> f64 {
        self.kf
    }

    /// Reverse rate coefficient
    pub fn kr(&self) -> f64 {
        self.kr
    }

    /// Every species the reaction references, reactants first
    pub fn species(&self) -> impl Iterator<Item = SpeciesId> + '_ {
        self.reactants.iter().chain(self.products.iter()).copied()
    }

    /// Distinct species the reaction references
    pub fn species_set(&self) -> HashSet<SpeciesId> {
        self.species().collect()
    }

    /// Whether the reaction references the species on either side
    pub fn involves(&self, species: SpeciesId) -> bool {
        self.species().any(|s| s == species)
    }

    /// Net rate for the given concentration lookup
    ///
    /// `concentration` maps a species to mol/m^3; species it cannot place
    /// (e.g. edge species during a core simulation) should map to zero.
    pub fn net_rate(&self, concentration: impl Fn(SpeciesId) -> f64) -> f64 {
        let forward: f64 = self.reactants.iter().map(|&s| concentration(s)).product();
        let reverse: f64 = self.products.iter().map(|&s| concentration(s)).product();
        self.kf * forward - self.kr * reverse
    }
}

impl PartialEq for Reaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Reaction {}

impl Hash for Reaction {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Reaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.label.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}", self.label)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dissociation() -> Reaction {
        Reaction::new(
            ReactionId(0),
            "C2H6 <=> CH3 + CH3",
            vec![SpeciesId(0)],
            vec![SpeciesId(1), SpeciesId(1)],
            2.0,
            0.5,
        )
    }

    #[test]
    fn test_species_set_deduplicates() {
        let rxn = dissociation();
        assert_eq!(rxn.species().count(), 3);
        assert_eq!(rxn.species_set().len(), 2);
        assert!(rxn.involves(SpeciesId(1)));
        assert!(!rxn.involves(SpeciesId(2)));
    }

    #[test]
    fn test_net_rate_mass_action() {
        let rxn = dissociation();
        let rate = rxn.net_rate(|s| if s == SpeciesId(0) { 3.0 } else { 2.0 });
        // 2.0 * 3.0 - 0.5 * 2.0 * 2.0
        assert_relative_eq!(rate, 4.0);
    }
}
