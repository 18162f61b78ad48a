//! Layering Extension Finder
//!
//! Candidates are edge reactions tagged with their edge index and examined
//! in the caller's order. The working set starts as the bulk core species.
//! A candidate is accepted when all of its reactants or all of its products
//! are in the working set; its species then join the working set, so later
//! candidates may build on species promoted in the same pass. Species that
//! were already on the surface before the pass are not in the working set:
//! anchoring on them would put a reaction two layers away from the bulk.

use std::collections::HashSet;

use crate::network::{Reaction, SpeciesId};

/// Result of one layering pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayeringExtension {
    /// Edge indices of accepted candidates, in candidate order
    pub accepted: Vec<usize>,
    /// Edge indices of rejected candidates, in candidate order
    pub rejected: Vec<usize>,
    /// Number of leading candidates accepted before the first rejection
    pub prefix_len: usize,
}

impl LayeringExtension {
    pub fn find<'a, I>(bulk_core: &HashSet<SpeciesId>, candidates: I) -> Self
    where
        I: IntoIterator<Item = (usize, &'a Reaction)>,
    {
        let mut working: HashSet<SpeciesId> = bulk_core.clone();
        let mut extension = Self::default();
        let mut in_prefix = true;

        for (index, reaction) in candidates {
            let anchored = reaction.reactants().iter().all(|s| working.contains(s))
                || reaction.products().iter().all(|s| working.contains(s));

            if anchored {
                working.extend(reaction.species());
                extension.accepted.push(index);
                if in_prefix {
                    extension.prefix_len += 1;
                }
            } else {
                extension.rejected.push(index);
                in_prefix = false;
            }
        }

        extension
    }

    pub fn is_accepted(&self, index: usize) -> bool {
        self.accepted.contains(&index)
    }
}

/// Edge indices of the candidates that satisfy the layering constraint
pub fn find_layering_indices<'a, I>(bulk_core: &HashSet<SpeciesId>, candidates: I) -> Vec<usize>
where
    I: IntoIterator<Item = (usize, &'a Reaction)>,
{
    LayeringExtension::find(bulk_core, candidates).accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::ReactionId;

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

    fn ids(ids: &[u32]) -> HashSet<SpeciesId> {
        ids.iter().map(|&i| SpeciesId(i)).collect()
    }

    #[test]
    fn test_chain_builds_within_one_pass() {
        // 0 -> 1, then 1 -> 2 anchored on the species promoted just before
        let edge = vec![reaction(0, &[0], &[1]), reaction(1, &[1], &[2])];
        let extension = LayeringExtension::find(&ids(&[0]), edge.iter().enumerate());
        assert_eq!(extension.accepted, vec![0, 1]);
        assert_eq!(extension.prefix_len, 2);
    }

    #[test]
    fn test_order_matters() {
        let edge = vec![reaction(1, &[1], &[2]), reaction(0, &[0], &[1])];
        let extension = LayeringExtension::find(&ids(&[0]), edge.iter().enumerate());
        assert_eq!(extension.accepted, vec![1]);
        assert_eq!(extension.rejected, vec![0]);
        assert_eq!(extension.prefix_len, 0);
    }

    #[test]
    fn test_either_side_can_anchor() {
        let edge = vec![reaction(0, &[5, 6], &[0])];
        assert_eq!(find_layering_indices(&ids(&[0]), edge.iter().enumerate()), vec![0]);
    }

    #[test]
    fn test_indices_come_from_candidates() {
        let edge = vec![reaction(0, &[0], &[1]), reaction(1, &[7], &[8])];
        let candidates = [(4, &edge[0]), (9, &edge[1])];
        let extension = LayeringExtension::find(&ids(&[0]), candidates);
        assert_eq!(extension.accepted, vec![4]);
        assert!(extension.is_accepted(4));
        assert!(!extension.is_accepted(9));
    }
}
