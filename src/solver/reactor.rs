//! Reactor variants behind one serializable type

use std::fmt;

use serde::{Deserialize, Serialize};

use super::base::{InitialConditions, ReactionSystem, SystemState};
use super::liquid::LiquidReactor;
use super::simple::SimpleReactor;
use crate::error::Result;
use crate::network::Species;

/// Variant tag of a reactor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReactorKind {
    Simple,
    Liquid,
}

impl fmt::Display for ReactorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReactorKind::Simple => write!(f, "SimpleReactor"),
            ReactorKind::Liquid => write!(f, "LiquidReactor"),
        }
    }
}

/// Any reactor, tagged by `"type"` when serialized
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reactor {
    Simple(SimpleReactor),
    Liquid(LiquidReactor),
}

impl Reactor {
    pub fn as_simple(&self) -> Option<&SimpleReactor> {
        match self {
            Reactor::Simple(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_liquid(&self) -> Option<&LiquidReactor> {
        match self {
            Reactor::Liquid(r) => Some(r),
            _ => None,
        }
    }
}

impl ReactionSystem for Reactor {
    fn kind(&self) -> ReactorKind {
        match self {
            Reactor::Simple(r) => r.kind(),
            Reactor::Liquid(r) => r.kind(),
        }
    }

    fn state(&self) -> &SystemState {
        match self {
            Reactor::Simple(r) => r.state(),
            Reactor::Liquid(r) => r.state(),
        }
    }

    fn state_mut(&mut self) -> &mut SystemState {
        match self {
            Reactor::Simple(r) => r.state_mut(),
            Reactor::Liquid(r) => r.state_mut(),
        }
    }

    fn initial_conditions(&self, core_species: &[Species]) -> Result<InitialConditions> {
        match self {
            Reactor::Simple(r) => r.initial_conditions(core_species),
            Reactor::Liquid(r) => r.initial_conditions(core_species),
        }
    }
}

impl From<SimpleReactor> for Reactor {
    fn from(reactor: SimpleReactor) -> Self {
        Reactor::Simple(reactor)
    }
}

impl From<LiquidReactor> for Reactor {
    fn from(reactor: LiquidReactor) -> Self {
        Reactor::Liquid(reactor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantity::Quantity;
    use std::collections::BTreeMap;

    #[test]
    fn test_variant_tag() {
        let reactor: Reactor =
            LiquidReactor::new(Quantity::kelvin(300.0), BTreeMap::new(), vec![], vec![]).into();
        let json = serde_json::to_value(&reactor).unwrap();
        assert_eq!(json["type"], "liquid");
        assert_eq!(reactor.kind(), ReactorKind::Liquid);
        assert_eq!(reactor.kind().to_string(), "LiquidReactor");
        assert!(reactor.as_simple().is_none());
    }
}
