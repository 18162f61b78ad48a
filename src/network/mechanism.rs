//! Flat mechanism: every species and reaction before core/edge classification

use std::collections::{HashMap, HashSet};

use super::reaction::{Reaction, ReactionId};
use super::species::{Species, SpeciesId};
use super::Network;
use crate::error::{KineticaError, Result};

/// All species and reactions known to a job, in declaration order
#[derive(Debug, Clone, Default)]
pub struct Mechanism {
    species: Vec<Species>,
    reactions: Vec<Reaction>,
    by_label: HashMap<String, SpeciesId>,
}

impl Mechanism {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a species; labels must be unique
    pub fn add_species(&mut self, label: impl Into<String>) -> Result<SpeciesId> {
        let label = label.into();
        if self.by_label.contains_key(&label) {
            return Err(KineticaError::DuplicateSpecies { label });
        }
        let id = SpeciesId(self.species.len() as u32);
        self.by_label.insert(label.clone(), id);
        self.species.push(Species::new(id, label));
        Ok(id)
    }

    /// Declare a reaction between already declared species
    pub fn add_reaction(
        &mut self,
        reactants: &[&str],
        products: &[&str],
        kf: f64,
        kr: f64,
    ) -> Result<ReactionId> {
        let reactant_ids = self.resolve_labels(reactants)?;
        let product_ids = self.resolve_labels(products)?;
        let id = ReactionId(self.reactions.len() as u32);
        let label = format!("{} <=> {}", reactants.join(" + "), products.join(" + "));
        self.reactions.push(Reaction::new(
            id,
            label,
            reactant_ids,
            product_ids,
            kf,
            kr,
        ));
        Ok(id)
    }

    fn resolve_labels(&self, labels: &[&str]) -> Result<Vec<SpeciesId>> {
        labels
            .iter()
            .map(|label| {
                self.by_label
                    .get(*label)
                    .copied()
                    .ok_or_else(|| KineticaError::UnknownSpecies {
                        label: label.to_string(),
                    })
            })
            .collect()
    }

    pub fn species(&self) -> &[Species] {
        &self.species
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn species_by_label(&self, label: &str) -> Option<&Species> {
        self.by_label
            .get(label)
            .map(|id| &self.species[id.0 as usize])
    }

    /// Classify into core and edge
    ///
    /// A reaction is core when every species it references is core.
    /// Declaration order is kept within each list.
    pub fn split(&self, core: &HashSet<SpeciesId>) -> Network {
        let (core_species, edge_species): (Vec<_>, Vec<_>) = self
            .species
            .iter()
            .cloned()
            .partition(|s| core.contains(&s.id()));
        let (core_reactions, edge_reactions): (Vec<_>, Vec<_>) = self
            .reactions
            .iter()
            .cloned()
            .partition(|r| r.species().all(|s| core.contains(&s)));

        Network {
            core_species,
            core_reactions,
            edge_species,
            edge_reactions,
        }
    }
}
