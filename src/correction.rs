//! Removal of systematic responses from measured traces
//!
//! Each corrector fits a polynomial to some part of the measurement and
//! subtracts it, returning new vectors and leaving its inputs untouched.
//!
//! - [`baseline_correction`]: fits the trace itself. Used for periodic or self-referencing
//!   responses (ring resonators, MZIs) where no separate reference exists.
//! - [`calibrate`]: fits a separate reference trace measured on the same sweep, such as a
//!   grating coupler loopback, and subtracts it from the device trace.
//! - [`calibrate_envelope`]: fits only the envelope of a reference whose own response has
//!   dips or ripple, using a tolerance-gated walk over coarse samples.
//!
//! ```rust
//! use tracefit::{correction::baseline_correction, Trace};
//!
//! let wavelength: Vec<f64> = (0..200).map(|i| 1500.0 + 0.5 * f64::from(i)).collect();
//! let power: Vec<f64> = wavelength.iter().map(|l| -10.0 - 0.002 * (l - 1550.0).powi(2)).collect();
//! let trace = Trace::new(wavelength, power).unwrap();
//!
//! let result = baseline_correction(&trace, 4).unwrap();
//! assert!((result.corrected[0] - result.corrected[199]).abs() < 1e-6);
//! ```
use crate::{error::Result, fit::polyfit, trace::Trace};

pub mod baseline;
pub mod envelope;
pub mod reference;

pub use baseline::{baseline_correction, DEFAULT_BASELINE_ORDER};
pub use envelope::{calibrate_envelope, EnvelopeCalibration, EnvelopeConfig, WalkDirection};
pub use reference::{calibrate, DEFAULT_CALIBRATION_ORDER};

/// Fits a centered polynomial of `order` to a trace and evaluates it on the trace's own grid.
pub(crate) fn fit_on_grid(trace: &Trace, order: usize) -> Result<Vec<f64>> {
    let poly = polyfit(trace.wavelength(), trace.value(), order)?;
    Ok(poly.solve(trace.wavelength()))
}
