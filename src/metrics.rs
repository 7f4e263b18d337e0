//! Device metrics extracted from corrected traces
//!
//! # Single-peak responses
//! - [`bandwidth`]: width of the band within `threshold` dB of the global maximum.
//!
//! # Periodic responses
//! Built on scipy-style peak detection ([`peaks::find_peaks`]):
//! - [`extinction_ratio`]: peak-to-trough depth of each fringe.
//! - [`free_spectral_range`]: spacing between consecutive troughs.
//! - [`group_index`]: group index from the free spectral range and the arm length difference.
//! - [`splitting_ratio`]: coupler splitting ratio implied by an extinction ratio.
//!
//! # Loss
//! Insertion loss comes from [`crate::cutback`], which regresses several traces at once.
//!
//! Every extractor also has a flat form, [`Metric`], for reporting.
pub mod bandwidth;
pub mod peaks;
pub mod periodic;

pub use bandwidth::{bandwidth, Bandwidth, DEFAULT_BANDWIDTH_THRESHOLD};
pub use peaks::{find_peaks, find_troughs, Peak, PeakConfig};
pub use periodic::{
    extinction_ratio, free_spectral_range, group_index, splitting_ratio, ExtinctionRatio,
    FreeSpectralRange,
};

/// A single extracted value together with the wavelength it belongs to.
///
/// Units follow the trace: nanometers for wavelengths and widths, dB for
/// ratios, dB per length unit for insertion loss. Group index is unitless.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Metric {
    /// Width of the pass band and its center
    Bandwidth {
        /// Band width
        value: f64,
        /// Midpoint of the band edges
        center_wavelength: f64,
    },

    /// Depth of one fringe
    ExtinctionRatio {
        /// Wavelength of the fringe peak
        wavelength: f64,
        /// Peak minus trough
        value: f64,
    },

    /// Spacing between two consecutive troughs
    Fsr {
        /// Midpoint of the two troughs
        wavelength: f64,
        /// Trough spacing
        value: f64,
    },

    /// Group index derived from one FSR value
    GroupIndex {
        /// Wavelength of the FSR value
        wavelength: f64,
        /// Group index
        value: f64,
    },

    /// Propagation loss from a cutback regression
    InsertionLoss {
        /// Wavelength of the regression
        wavelength: f64,
        /// Loss per length unit, positive when power falls with length
        value: f64,
    },
}
impl Metric {
    /// The extracted value.
    #[must_use]
    pub fn value(&self) -> f64 {
        match *self {
            Metric::Bandwidth { value, .. }
            | Metric::ExtinctionRatio { value, .. }
            | Metric::Fsr { value, .. }
            | Metric::GroupIndex { value, .. }
            | Metric::InsertionLoss { value, .. } => value,
        }
    }

    /// The wavelength the value belongs to.
    #[must_use]
    pub fn wavelength(&self) -> f64 {
        match *self {
            Metric::Bandwidth {
                center_wavelength, ..
            } => center_wavelength,
            Metric::ExtinctionRatio { wavelength, .. }
            | Metric::Fsr { wavelength, .. }
            | Metric::GroupIndex { wavelength, .. }
            | Metric::InsertionLoss { wavelength, .. } => wavelength,
        }
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_accessors() {
        let bw = Metric::Bandwidth {
            value: 12.5,
            center_wavelength: 1550.0,
        };
        assert_eq!(bw.value(), 12.5);
        assert_eq!(bw.wavelength(), 1550.0);

        let il = Metric::InsertionLoss {
            wavelength: 1310.0,
            value: 2.0,
        };
        assert_eq!(il.value(), 2.0);
        assert_eq!(il.wavelength(), 1310.0);
    }
}
