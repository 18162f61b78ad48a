//! Surface Consistency Resolver
//!
//! Repairs a candidate surface in a single stable pass:
//! 1. species referenced by any bulk core reaction (a core reaction that is
//!    not a candidate surface reaction) are demoted
//! 2. species no candidate surface reaction references are demoted unless
//!    pinned
//! 3. surface reactions left without any surface species are demoted
//!
//! Demoted entries stay in the core. A reaction demoted in step 3 only
//! references bulk species, so no further pass is needed.

use std::collections::HashSet;

use log::debug;

use super::SurfaceSubset;
use crate::network::{Reaction, Species, SpeciesId};

/// What the resolver moved from the surface back to the bulk core
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceResolution {
    pub demoted_species: Vec<Species>,
    pub demoted_reactions: Vec<Reaction>,
}

impl SurfaceResolution {
    /// True when the candidate surface was already consistent
    pub fn is_unchanged(&self) -> bool {
        self.demoted_species.is_empty() && self.demoted_reactions.is_empty()
    }
}

/// Resolver with an optional set of pinned surface species
///
/// A pinned species stays on the surface without a surface reaction, but is
/// still demoted if a bulk reaction references it.
#[derive(Debug, Clone, Default)]
pub struct SurfaceResolver {
    pinned: HashSet<SpeciesId>,
}

impl SurfaceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pinned(pinned: impl IntoIterator<Item = SpeciesId>) -> Self {
        Self {
            pinned: pinned.into_iter().collect(),
        }
    }

    /// Filter `surface` in place and report what was demoted
    pub fn resolve(
        &self,
        core_reactions: &[Reaction],
        surface: &mut SurfaceSubset,
    ) -> SurfaceResolution {
        let surface_reactions = surface.reaction_ids();

        let bulk_referenced: HashSet<SpeciesId> = core_reactions
            .iter()
            .filter(|r| !surface_reactions.contains(&r.id()))
            .flat_map(|r| r.species())
            .collect();
        let surface_referenced: HashSet<SpeciesId> =
            surface.reactions.iter().flat_map(|r| r.species()).collect();

        let mut resolution = SurfaceResolution::default();

        let mut seen = HashSet::new();
        let mut kept_species = Vec::with_capacity(surface.species.len());
        for species in surface.species.drain(..) {
            let id = species.id();
            if !seen.insert(id) {
                continue;
            }
            let anchored = surface_referenced.contains(&id) || self.pinned.contains(&id);
            if anchored && !bulk_referenced.contains(&id) {
                kept_species.push(species);
            } else {
                debug!("Demoting surface species {} to the bulk core", species);
                resolution.demoted_species.push(species);
            }
        }

        let kept_ids: HashSet<SpeciesId> = kept_species.iter().map(|s| s.id()).collect();
        let mut seen = HashSet::new();
        let mut kept_reactions = Vec::with_capacity(surface.reactions.len());
        for reaction in surface.reactions.drain(..) {
            if !seen.insert(reaction.id()) {
                continue;
            }
            if reaction.species().any(|s| kept_ids.contains(&s)) {
                kept_reactions.push(reaction);
            } else {
                debug!("Demoting surface reaction {} to the bulk core", reaction);
                resolution.demoted_reactions.push(reaction);
            }
        }

        surface.species = kept_species;
        surface.reactions = kept_reactions;
        resolution
    }
}

/// Resolve with no pinned species
pub fn resolve_surface(core_reactions: &[Reaction], surface: &mut SurfaceSubset) -> SurfaceResolution {
    SurfaceResolver::new().resolve(core_reactions, surface)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ReactionId;

    fn species(n: u32) -> Species {
        Species::new(SpeciesId(n), format!("S{}", n))
    }

    fn reaction(n: u32, reactants: &[u32], products: &[u32]) -> Reaction {
        Reaction::new(
            ReactionId(n),
            "",
            reactants.iter().map(|&i| SpeciesId(i)).collect(),
            products.iter().map(|&i| SpeciesId(i)).collect(),
            1.0,
            0.0,
        )
    }

    #[test]
    fn test_consistent_surface_is_untouched() {
        // A <=> B is bulk, B <=> C is the surface reaction for C
        let core = vec![reaction(0, &[0], &[1]), reaction(1, &[1], &[2])];
        let mut surface = SurfaceSubset::new(vec![species(2)], vec![core[1].clone()]);

        let resolution = resolve_surface(&core, &mut surface);

        assert!(resolution.is_unchanged());
        assert_eq!(surface.species.len(), 1);
        assert_eq!(surface.reactions.len(), 1);
    }

    #[test]
    fn test_species_in_bulk_reaction_is_demoted() {
        let core = vec![reaction(0, &[0], &[1]), reaction(1, &[1], &[2])];
        let mut surface = SurfaceSubset::new(vec![species(1)], vec![core[1].clone()]);

        let resolution = resolve_surface(&core, &mut surface);

        assert_eq!(resolution.demoted_species, vec![species(1)]);
        assert_eq!(resolution.demoted_reactions.len(), 1);
        assert!(surface.is_empty());
    }

    #[test]
    fn test_unreferenced_species_dropped_unless_pinned() {
        let core = vec![reaction(0, &[0], &[1])];
        let mut surface = SurfaceSubset::new(vec![species(5)], vec![]);
        resolve_surface(&core, &mut surface);
        assert!(surface.species.is_empty());

        let mut surface = SurfaceSubset::new(vec![species(5)], vec![]);
        SurfaceResolver::with_pinned([SpeciesId(5)]).resolve(&core, &mut surface);
        assert_eq!(surface.species, vec![species(5)]);
    }

    #[test]
    fn test_order_preserved_and_duplicates_dropped() {
        let core = vec![reaction(0, &[0], &[3]), reaction(1, &[0], &[2])];
        let mut surface = SurfaceSubset::new(
            vec![species(3), species(2), species(3)],
            vec![core[0].clone(), core[1].clone()],
        );

        let resolution = resolve_surface(&core, &mut surface);

        assert!(resolution.is_unchanged());
        assert_eq!(surface.species, vec![species(3), species(2)]);
    }
}
