//! Reaction Network Module
//!
//! Species, reactions and the core/edge partition the reactor works on:
//! - `Mechanism`: every declared species and reaction
//! - `Network`: the same entities split into ordered core and edge lists
//! - `SystemIndices`: array positions derived from a `Network`
//! - `JobLoader`: reads a JSON job description

mod index;
mod loader;
mod mechanism;
mod reaction;
mod species;

use serde::{Deserialize, Serialize};

pub use index::SystemIndices;
pub use loader::{Job, JobLoader};
pub use mechanism::Mechanism;
pub use reaction::{Reaction, ReactionId};
pub use species::{Species, SpeciesId};

/// Core and edge species and reactions
///
/// List order is significant: it fixes the positions used by the numeric
/// state arrays for one simulation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub core_species: Vec<Species>,
    pub core_reactions: Vec<Reaction>,
    pub edge_species: Vec<Species>,
    pub edge_reactions: Vec<Reaction>,
}

impl Network {
    pub fn new(
        core_species: Vec<Species>,
        core_reactions: Vec<Reaction>,
        edge_species: Vec<Species>,
        edge_reactions: Vec<Reaction>,
    ) -> Self {
        Self {
            core_species,
            core_reactions,
            edge_species,
            edge_reactions,
        }
    }

    /// Find a core or edge species by label
    pub fn species_by_label(&self, label: &str) -> Option<&Species> {
        self.core_species
            .iter()
            .chain(self.edge_species.iter())
            .find(|s| s.label() == label)
    }

    pub fn is_core_species(&self, id: SpeciesId) -> bool {
        self.core_species.iter().any(|s| s.id() == id)
    }

    pub fn is_core_reaction(&self, id: ReactionId) -> bool {
        self.core_reactions.iter().any(|r| r.id() == id)
    }
}
