//! Two-trace calibration against a measured reference
use crate::{
    error::Result,
    trace::{FitResult, Trace},
};

use super::fit_on_grid;

/// Polynomial order used to fit reference traces unless stated otherwise.
pub const DEFAULT_CALIBRATION_ORDER: usize = 8;

/// Calibrates `input` against a `reference` measured on the same sweep.
///
/// A polynomial of `order` is fitted to the reference over its own wavelength
/// grid, then subtracted from the input values. The returned `baseline` is that
/// fitted reference.
///
/// Typical use is a device trace and a loopback of the same grating couplers,
/// both swept on one laser scan.
///
/// # Errors
/// - [`crate::Error::GridMismatch`] if the two traces were not sampled on identical wavelengths.
/// - [`crate::Error::InsufficientData`] if the reference has fewer than `order + 1` samples.
/// - [`crate::Error::Algebra`] if the fit fails.
pub fn calibrate(input: &Trace, reference: &Trace, order: usize) -> Result<FitResult> {
    reference.ensure_same_grid(input)?;

    let baseline = fit_on_grid(reference, order)?;
    let corrected = input
        .value()
        .iter()
        .zip(&baseline)
        .map(|(v, b)| v - b)
        .collect();

    Ok(FitResult {
        corrected,
        baseline,
    })
}
