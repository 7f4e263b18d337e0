//! Typed length units
//!
//! Traces carry their wavelength axis in nanometers, while the group index
//! formula needs SI meters. The wrappers here make every conversion explicit,
//! so a raw nanometer value can never reach [`crate::metrics::group_index`] by accident.
//!
//! ```rust
//! use tracefit::units::{Meters, Nanometers};
//!
//! let fsr = Nanometers(5.7);
//! let m: Meters = fsr.into();
//! assert!((m.value() - 5.7e-9).abs() < 1e-20);
//! ```
use std::fmt;

/// Speed of light in vacuum, in m/s.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

const NANOMETERS_PER_METER: f64 = 1e9;

/// A length in nanometers.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Nanometers(pub f64);
impl Nanometers {
    /// The raw value, in nanometers.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Converts to meters.
    #[must_use]
    pub fn to_meters(self) -> Meters {
        Meters(self.0 / NANOMETERS_PER_METER)
    }
}

/// A length in meters.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Meters(pub f64);
impl Meters {
    /// The raw value, in meters.
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Converts to nanometers.
    #[must_use]
    pub fn to_nanometers(self) -> Nanometers {
        Nanometers(self.0 * NANOMETERS_PER_METER)
    }
}

impl From<Nanometers> for Meters {
    fn from(value: Nanometers) -> Self {
        value.to_meters()
    }
}

impl From<Meters> for Nanometers {
    fn from(value: Meters) -> Self {
        value.to_nanometers()
    }
}

impl fmt::Display for Nanometers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} nm", self.0)
    }
}

impl fmt::Display for Meters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} m", self.0)
    }
}

/// Converts a slice of raw nanometer values to meters.
#[must_use]
pub fn to_meters(nanometers: &[f64]) -> Vec<Meters> {
    nanometers
        .iter()
        .map(|&nm| Nanometers(nm).to_meters())
        .collect()
}
