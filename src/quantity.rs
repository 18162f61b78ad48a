//! Physical quantities
//!
//! A `Quantity` keeps the value and units exactly as they were given so a
//! persisted reactor reproduces its inputs bit for bit. The SI value is
//! derived on demand.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{KineticaError, Result};

/// Molar gas constant in J/(mol K)
pub const GAS_CONSTANT: f64 = 8.314_462_618;

/// Physical dimension of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Temperature,
    Pressure,
    Time,
    Concentration,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dimension::Temperature => write!(f, "temperature"),
            Dimension::Pressure => write!(f, "pressure"),
            Dimension::Time => write!(f, "time"),
            Dimension::Concentration => write!(f, "concentration"),
        }
    }
}

/// Look up the dimension and SI scale factor for a units string
fn unit_factor(units: &str) -> Option<(Dimension, f64)> {
    let entry = match units {
        "K" => (Dimension::Temperature, 1.0),
        "Pa" => (Dimension::Pressure, 1.0),
        "kPa" => (Dimension::Pressure, 1.0e3),
        "bar" => (Dimension::Pressure, 1.0e5),
        "atm" => (Dimension::Pressure, 101_325.0),
        "torr" => (Dimension::Pressure, 101_325.0 / 760.0),
        "s" => (Dimension::Time, 1.0),
        "ms" => (Dimension::Time, 1.0e-3),
        "us" => (Dimension::Time, 1.0e-6),
        "min" => (Dimension::Time, 60.0),
        "h" | "hr" => (Dimension::Time, 3600.0),
        "mol/m^3" => (Dimension::Concentration, 1.0),
        "mol/L" | "mol/dm^3" => (Dimension::Concentration, 1.0e3),
        "mol/cm^3" => (Dimension::Concentration, 1.0e6),
        _ => return None,
    };
    Some(entry)
}

#[derive(Serialize, Deserialize)]
struct QuantityRepr {
    value: f64,
    units: String,
}

/// A scalar physical quantity: value plus units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuantityRepr", into = "QuantityRepr")]
pub struct Quantity {
    value: f64,
    units: String,
    dimension: Dimension,
    factor: f64,
}

impl Quantity {
    /// Create a quantity, rejecting unknown units
    pub fn new(value: f64, units: impl Into<String>) -> Result<Self> {
        let units = units.into();
        let (dimension, factor) =
            unit_factor(&units).ok_or_else(|| KineticaError::UnknownUnits {
                units: units.clone(),
                quantity: format!("value {}", value),
            })?;
        Ok(Self {
            value,
            units,
            dimension,
            factor,
        })
    }

    pub fn kelvin(value: f64) -> Self {
        Self::si(value, "K", Dimension::Temperature)
    }

    pub fn pascal(value: f64) -> Self {
        Self::si(value, "Pa", Dimension::Pressure)
    }

    pub fn seconds(value: f64) -> Self {
        Self::si(value, "s", Dimension::Time)
    }

    pub fn mol_per_m3(value: f64) -> Self {
        Self::si(value, "mol/m^3", Dimension::Concentration)
    }

    fn si(value: f64, units: &str, dimension: Dimension) -> Self {
        Self {
            value,
            units: units.to_string(),
            dimension,
            factor: 1.0,
        }
    }

    /// Value in the units it was given in
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn units(&self) -> &str {
        &self.units
    }

    pub fn dimension(&self) -> Dimension {
        self.dimension
    }

    /// Value converted to SI
    pub fn value_si(&self) -> f64 {
        self.value * self.factor
    }

    /// SI value, checked against the expected dimension
    pub fn expect_si(&self, dimension: Dimension, what: &str) -> Result<f64> {
        if self.dimension != dimension {
            return Err(KineticaError::UnknownUnits {
                units: self.units.clone(),
                quantity: format!("{} (expected {})", what, dimension),
            });
        }
        Ok(self.value_si())
    }
}

impl TryFrom<QuantityRepr> for Quantity {
    type Error = KineticaError;

    fn try_from(repr: QuantityRepr) -> Result<Self> {
        Quantity::new(repr.value, repr.units)
    }
}

impl From<Quantity> for QuantityRepr {
    fn from(quantity: Quantity) -> Self {
        Self {
            value: quantity.value,
            units: quantity.units,
        }
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.units)
    }
}
