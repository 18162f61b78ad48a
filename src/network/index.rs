//! Index arrays shared by the reactor state and the integrator
//!
//! Species are numbered `[core..., edge...]` and reactions the same way, so
//! the first `num_core_species` entries of a state vector are the core.

use std::collections::HashMap;

use super::reaction::ReactionId;
use super::species::SpeciesId;
use super::Network;
use crate::error::{KineticaError, Result};
use crate::surface::SurfaceSubset;

/// Positions of every species and reaction in the numeric state arrays
#[derive(Debug, Clone, Default)]
pub struct SystemIndices {
    species_index: HashMap<SpeciesId, usize>,
    reaction_index: HashMap<ReactionId, usize>,
    reactant_indices: Vec<Vec<usize>>,
    product_indices: Vec<Vec<usize>>,
    num_core_species: usize,
    num_core_reactions: usize,
    num_edge_species: usize,
    num_edge_reactions: usize,
    surface_species_indices: Vec<usize>,
    surface_reaction_indices: Vec<usize>,
}

impl SystemIndices {
    /// Build the index arrays for a network
    ///
    /// Fails if a species appears twice, a reaction references a species
    /// that is neither core nor edge, or a core reaction references an edge
    /// species.
    pub fn build(network: &Network) -> Result<Self> {
        let mut species_index = HashMap::new();
        for (i, species) in network
            .core_species
            .iter()
            .chain(network.edge_species.iter())
            .enumerate()
        {
            if species_index.insert(species.id(), i).is_some() {
                return Err(KineticaError::DuplicateSpecies {
                    label: species.label().to_string(),
                });
            }
        }

        let mut reaction_index = HashMap::new();
        let mut reactant_indices = Vec::new();
        let mut product_indices = Vec::new();
        for (j, reaction) in network
            .core_reactions
            .iter()
            .chain(network.edge_reactions.iter())
            .enumerate()
        {
            let lookup = |ids: &[SpeciesId]| -> Result<Vec<usize>> {
                ids.iter()
                    .map(|id| {
                        species_index
                            .get(id)
                            .copied()
                            .ok_or_else(|| KineticaError::UnknownSpecies {
                                label: id.to_string(),
                            })
                    })
                    .collect()
            };
            let reactants = lookup(reaction.reactants())?;
            let products = lookup(reaction.products())?;
            if j < network.core_reactions.len() {
                let num_core_species = network.core_species.len();
                if let Some(&i) = reactants.iter().chain(&products).find(|&&i| i >= num_core_species) {
                    return Err(KineticaError::ReactionOutsideCore {
                        reaction: reaction.to_string(),
                        species: network.edge_species[i - num_core_species].label().to_string(),
                    });
                }
            }
            reactant_indices.push(reactants);
            product_indices.push(products);
            reaction_index.insert(reaction.id(), j);
        }

        Ok(Self {
            species_index,
            reaction_index,
            reactant_indices,
            product_indices,
            num_core_species: network.core_species.len(),
            num_core_reactions: network.core_reactions.len(),
            num_edge_species: network.edge_species.len(),
            num_edge_reactions: network.edge_reactions.len(),
            surface_species_indices: Vec::new(),
            surface_reaction_indices: Vec::new(),
        })
    }

    /// Recompute the surface index arrays (ascending positions)
    ///
    /// Positions are over `[core..., edge...]`. Edge species promoted by
    /// `add_reactions_to_surface` sit past `num_core_species` until the
    /// caller moves them into the core and re-initializes.
    pub fn set_surface(&mut self, surface: &SurfaceSubset) -> Result<()> {
        let mut species: Vec<usize> = surface
            .species
            .iter()
            .map(|s| {
                self.species_index
                    .get(&s.id())
                    .copied()
                    .ok_or_else(|| KineticaError::SpeciesNotInCore {
                        label: s.label().to_string(),
                    })
            })
            .collect::<Result<_>>()?;
        let mut reactions: Vec<usize> = surface
            .reactions
            .iter()
            .map(|r| {
                self.reaction_index
                    .get(&r.id())
                    .copied()
                    .ok_or_else(|| KineticaError::ReactionNotInCore {
                        reaction: r.to_string(),
                    })
            })
            .collect::<Result<_>>()?;
        species.sort_unstable();
        reactions.sort_unstable();
        self.surface_species_indices = species;
        self.surface_reaction_indices = reactions;
        Ok(())
    }

    pub fn species_index(&self, id: SpeciesId) -> Option<usize> {
        self.species_index.get(&id).copied()
    }

    pub fn reaction_index(&self, id: ReactionId) -> Option<usize> {
        self.reaction_index.get(&id).copied()
    }

    /// Position of a core species, `None` for edge or unknown species
    pub fn core_species_index(&self, id: SpeciesId) -> Option<usize> {
        self.species_index(id).filter(|&i| i < self.num_core_species)
    }

    pub fn reactant_indices(&self, reaction: usize) -> &[usize] {
        &self.reactant_indices[reaction]
    }

    pub fn product_indices(&self, reaction: usize) -> &[usize] {
        &self.product_indices[reaction]
    }

    pub fn num_core_species(&self) -> usize {
        self.num_core_species
    }

    pub fn num_core_reactions(&self) -> usize {
        self.num_core_reactions
    }

    pub fn num_edge_species(&self) -> usize {
        self.num_edge_species
    }

    pub fn num_edge_reactions(&self) -> usize {
        self.num_edge_reactions
    }

    pub fn surface_species_indices(&self) -> &[usize] {
        &self.surface_species_indices
    }

    pub fn surface_reaction_indices(&self) -> &[usize] {
        &self.surface_reaction_indices
    }
}
