//! Surface Management
//!
//! The surface is a subset of the core held to a stricter rule than plain
//! core membership:
//! - no surface species may take part in a bulk core reaction
//! - every surface reaction carries at least one surface species
//! - edge reactions join the surface one layer at a time
//!
//! `resolver` repairs a candidate surface after the core changes and
//! `layering` decides which edge reactions may be promoted.

mod layering;
mod resolver;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::network::{Reaction, ReactionId, Species, SpeciesId};

pub use layering::{find_layering_indices, LayeringExtension};
pub use resolver::{resolve_surface, SurfaceResolution, SurfaceResolver};

/// Ordered surface species and reactions
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSubset {
    pub species: Vec<Species>,
    pub reactions: Vec<Reaction>,
}

impl SurfaceSubset {
    pub fn new(species: Vec<Species>, reactions: Vec<Reaction>) -> Self {
        Self { species, reactions }
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty() && self.reactions.is_empty()
    }

    pub fn contains_species(&self, id: SpeciesId) -> bool {
        self.species.iter().any(|s| s.id() == id)
    }

    pub fn contains_reaction(&self, id: ReactionId) -> bool {
        self.reactions.iter().any(|r| r.id() == id)
    }

    pub fn species_ids(&self) -> HashSet<SpeciesId> {
        self.species.iter().map(|s| s.id()).collect()
    }

    pub fn reaction_ids(&self) -> HashSet<ReactionId> {
        self.reactions.iter().map(|r| r.id()).collect()
    }

    /// Move everything back to the bulk core
    pub fn clear(&mut self) {
        self.species.clear();
        self.reactions.clear();
    }
}

/// Core species that are not on the surface
pub fn bulk_core_species(core_species: &[Species], surface: &SurfaceSubset) -> HashSet<SpeciesId> {
    let on_surface = surface.species_ids();
    core_species
        .iter()
        .map(|s| s.id())
        .filter(|id| !on_surface.contains(id))
        .collect()
}
