//! Chemical species

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

/// Stable identity of a species within a mechanism
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpeciesId(pub u32);

impl fmt::Display for SpeciesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// A chemical species
///
/// Two species are the same species when their ids match; the label is
/// for display only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    id: SpeciesId,
    label: String,
}

impl Species {
    pub fn new(id: SpeciesId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }

    pub fn id(&self) -> SpeciesId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl PartialEq for Species {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Species {}

impl Hash for Species {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_ignores_label() {
        let a = Species::new(SpeciesId(3), "H");
        let b = Species::new(SpeciesId(3), "hydrogen atom");
        let c = Species::new(SpeciesId(4), "H");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
