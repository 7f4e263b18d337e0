//! Threshold bandwidth of a single-peak response
use crate::{
    error::{Error, Result},
    metrics::Metric,
    trace::Trace,
};

/// Threshold, in dB below the maximum, that defines the band unless stated otherwise.
pub const DEFAULT_BANDWIDTH_THRESHOLD: f64 = 3.0;

/// Width of the band around the global maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bandwidth {
    /// `wavelength[right_index] - wavelength[left_index]`
    pub value: f64,

    /// Midpoint of the two band edges
    pub center_wavelength: f64,

    /// Index of the global maximum
    pub peak_index: usize,

    /// First sample left of the peak outside the band, or 0
    pub left_index: usize,

    /// First sample right of the peak outside the band, or the last sample
    pub right_index: usize,
}
impl Bandwidth {
    /// This bandwidth as a [`Metric`].
    #[must_use]
    pub fn metric(&self) -> Metric {
        Metric::Bandwidth {
            value: self.value,
            center_wavelength: self.center_wavelength,
        }
    }
}

/// Measures the band within `threshold` of the maximum of `trace`.
///
/// Starting from the first occurrence of the maximum, the walk moves outward on
/// each side while samples stay above `max - threshold`. Each edge is the first
/// sample outside the band. A band that runs into the end of the sweep stops at
/// that end, so the edge is the first or last sample.
///
/// # Errors
/// - [`Error::InvalidParameter`] if `threshold` is negative or not finite.
/// - [`Error::NoData`] if every value is `NaN`.
///
/// # Example
/// ```rust
/// # use tracefit::{metrics::bandwidth, Trace};
/// let trace = Trace::new(
///     vec![1549.0, 1549.5, 1550.0, 1550.5, 1551.0],
///     vec![-20.0, -2.0, 0.0, -1.0, -20.0],
/// ).unwrap();
/// let bw = bandwidth(&trace, 3.0).unwrap();
/// assert_eq!(bw.value, 2.0);
/// assert_eq!(bw.center_wavelength, 1550.0);
/// ```
pub fn bandwidth(trace: &Trace, threshold: f64) -> Result<Bandwidth> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(Error::InvalidParameter(
            "bandwidth threshold must be zero or positive",
        ));
    }

    let values = trace.value();
    let wavelength = trace.wavelength();

    let peak = trace.max_value();
    if peak.is_nan() {
        return Err(Error::NoData);
    }
    let peak_index = trace.argmax();

    let floor = peak - threshold;
    let in_band = |i: usize| values[i] > floor;

    let mut left_index = peak_index;
    while left_index > 0 && in_band(left_index) {
        left_index -= 1;
    }

    let last = values.len() - 1;
    let mut right_index = peak_index;
    while right_index < last && in_band(right_index) {
        right_index += 1;
    }

    Ok(Bandwidth {
        value: wavelength[right_index] - wavelength[left_index],
        center_wavelength: (wavelength[right_index] + wavelength[left_index]) / 2.0,
        peak_index,
        left_index,
        right_index,
    })
}
