//! Self-referenced baseline correction
use crate::{
    error::{Error, Result},
    statistics,
    trace::{FitResult, Trace},
};

use super::fit_on_grid;

/// Polynomial order used for baseline correction unless stated otherwise.
pub const DEFAULT_BASELINE_ORDER: usize = 4;

/// Removes the slowly varying baseline of a trace by fitting the trace itself.
///
/// The corrected signal is shifted so its peak keeps the absolute level of the
/// original peak, which keeps power levels comparable before and after correction.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// baseline  = polyfit(wavelength, value, order)
/// residual  = value - baseline
/// corrected = residual + (max(value) - max(residual))
/// ```
/// so that `max(corrected) == max(value)`.
/// </div>
///
/// # Errors
/// - [`Error::InsufficientData`] if the trace has fewer than `order + 1` samples.
/// - [`Error::Algebra`] if the fit fails.
pub fn baseline_correction(trace: &Trace, order: usize) -> Result<FitResult> {
    let baseline = fit_on_grid(trace, order)?;

    let residual: Vec<f64> = trace
        .value()
        .iter()
        .zip(&baseline)
        .map(|(v, b)| v - b)
        .collect();

    let peak = statistics::max(trace.value()).ok_or(Error::NoData)?;
    let residual_peak = statistics::max(&residual).ok_or(Error::NoData)?;
    let shift = peak - residual_peak;

    let corrected = residual.into_iter().map(|r| r + shift).collect();
    Ok(FitResult {
        corrected,
        baseline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_all_close, assert_close,
        test::{mzi_transmission_db, wavelength_grid},
    };

    #[test]
    fn test_peak_level_is_preserved() {
        let wavelength = wavelength_grid(1500.0, 1600.0, 2001);
        let mzi = mzi_transmission_db(&wavelength, 4.2, 50e-6, 25.0);
        let values: Vec<f64> = wavelength
            .iter()
            .zip(&mzi)
            .map(|(l, t)| t - 12.0 - 0.001 * (l - 1550.0).powi(2) + 0.02 * (l - 1550.0))
            .collect();
        let trace = Trace::new(wavelength, values).unwrap();

        let result = baseline_correction(&trace, DEFAULT_BASELINE_ORDER).unwrap();
        assert_eq!(result.corrected.len(), trace.len());
        assert_eq!(result.baseline.len(), trace.len());

        let corrected_peak = statistics::max(&result.corrected).unwrap();
        assert_close!(corrected_peak, trace.max_value(), tol = 1e-9);
    }

    #[test]
    fn test_removes_polynomial_tilt() {
        let wavelength = wavelength_grid(1260.0, 1360.0, 501);
        let values: Vec<f64> = wavelength
            .iter()
            .map(|l| -20.0 + 0.05 * (l - 1310.0) - 0.0004 * (l - 1310.0).powi(2))
            .collect();
        let trace = Trace::new(wavelength, values.clone()).unwrap();

        let result = baseline_correction(&trace, 2).unwrap();
        assert_all_close!(result.baseline, values, tol = 1e-8);

        // Nothing left but a flat line at the original peak level
        let peak = trace.max_value();
        for c in &result.corrected {
            assert_close!(*c, peak, tol = 1e-8);
        }
    }

    #[test]
    fn test_too_few_samples() {
        let trace = Trace::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 1.0]).unwrap();
        assert_eq!(
            baseline_correction(&trace, DEFAULT_BASELINE_ORDER),
            Err(Error::InsufficientData {
                required: 5,
                available: 3
            })
        );
    }
}
