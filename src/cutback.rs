//! Insertion loss by the cutback method
//!
//! Several copies of a structure with different lengths (or repeat counts) are
//! measured on one wavelength sweep. At every wavelength, power against length is
//! a straight line whose slope is the loss per unit length; the intercept is the
//! length-independent loss, such as the grating couplers.
//!
//! Each trace is first smoothed by a centered polynomial so laser ripple and
//! fiber noise do not dominate the regression. Both the smoothed and the raw
//! regressions are reported.
//!
//! Loss is reported as a positive number when power falls with length, i.e. `-slope`.
use crate::{
    correction::fit_on_grid,
    error::{ensure_same_len, Error, Result},
    metrics::Metric,
    statistics::linear_regression,
    trace::{ensure_common_grid, Trace},
};

/// Polynomial order used to smooth cutback traces unless stated otherwise.
pub const DEFAULT_CUTBACK_ORDER: usize = 8;

/// Per-wavelength result of a cutback regression.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CutbackResult {
    /// Grid index nearest to the requested target wavelength
    pub target_index: usize,

    /// Grid wavelength actually used as the target
    pub target_wavelength: f64,

    /// Loss at the target, from the smoothed traces
    pub loss_at_target: f64,

    /// Loss at the target, from the raw traces
    pub raw_loss_at_target: f64,

    /// Common wavelength grid of the traces
    pub wavelength: Vec<f64>,

    /// Loss at every wavelength, from the smoothed traces
    pub loss_fit: Vec<f64>,

    /// Loss at every wavelength, from the raw traces
    pub loss_raw: Vec<f64>,

    /// R² of each smoothed regression
    pub r_squared_fit: Vec<f64>,

    /// Standard error of the loss of each smoothed regression
    pub standard_error_fit: Vec<f64>,
}
impl CutbackResult {
    /// Smoothed loss at every wavelength, as metrics.
    #[must_use]
    pub fn insertion_loss(&self) -> Vec<Metric> {
        self.wavelength
            .iter()
            .zip(&self.loss_fit)
            .map(|(&wavelength, &value)| Metric::InsertionLoss { wavelength, value })
            .collect()
    }

    /// Smoothed loss at the target wavelength, as a metric.
    #[must_use]
    pub fn target_metric(&self) -> Metric {
        Metric::InsertionLoss {
            wavelength: self.target_wavelength,
            value: self.loss_at_target,
        }
    }
}

/// Extracts insertion loss from traces of structures with different `lengths`.
///
/// `lengths[i]` is the length (or unit count) of the structure measured in `traces[i]`;
/// loss comes out in dB per that unit. `target_wavelength` is matched to the nearest
/// grid point, not interpolated.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// smooth_j      = polyfit(wavelength, trace_j, fit_order)
/// P_j(λ_i)      ≈ intercept(λ_i) + slope(λ_i) · length_j
/// loss(λ_i)     = -slope(λ_i)
/// ```
/// </div>
///
/// # Errors
/// - [`Error::LengthMismatch`] if `traces` and `lengths` differ in length.
/// - [`Error::InsufficientData`] for fewer than two traces, or traces shorter than `fit_order + 1`.
/// - [`Error::GridMismatch`] if the traces do not share one wavelength grid.
/// - [`Error::DegenerateLengths`] if every length is the same.
///
/// # Example
/// ```rust
/// use tracefit::{cutback::cutback, test::{cutback_set, wavelength_grid}};
///
/// let wavelength = wavelength_grid(1500.0, 1600.0, 101);
/// let lengths = [0.1, 0.5, 1.0, 2.0];
/// let traces = cutback_set(&wavelength, &lengths, |_| 3.0, |_| -8.0);
///
/// let result = cutback(&traces, &lengths, 1550.0, 2).unwrap();
/// assert!((result.loss_at_target - 3.0).abs() < 1e-9);
/// ```
pub fn cutback(
    traces: &[Trace],
    lengths: &[f64],
    target_wavelength: f64,
    fit_order: usize,
) -> Result<CutbackResult> {
    ensure_same_len(traces.len(), lengths.len())?;
    if traces.len() < 2 {
        return Err(Error::InsufficientData {
            required: 2,
            available: traces.len(),
        });
    }
    ensure_common_grid(traces)?;

    #[allow(clippy::float_cmp)]
    let degenerate = lengths.iter().all(|&l| l == lengths[0]);
    if degenerate {
        return Err(Error::DegenerateLengths);
    }

    let smoothed = smooth_all(traces, fit_order)?;
    let grid = traces[0].wavelength();

    let mut loss_fit = Vec::with_capacity(grid.len());
    let mut loss_raw = Vec::with_capacity(grid.len());
    let mut r_squared_fit = Vec::with_capacity(grid.len());
    let mut standard_error_fit = Vec::with_capacity(grid.len());

    let mut raw_column = vec![0.0; traces.len()];
    let mut fit_column = vec![0.0; traces.len()];
    for i in 0..grid.len() {
        for j in 0..traces.len() {
            raw_column[j] = traces[j].value()[i];
            fit_column[j] = smoothed[j][i];
        }

        let fit = linear_regression(lengths, &fit_column)?;
        let raw = linear_regression(lengths, &raw_column)?;

        loss_fit.push(-fit.slope);
        loss_raw.push(-raw.slope);
        r_squared_fit.push(fit.r_squared);
        standard_error_fit.push(fit.slope_standard_error);
    }

    let target_index = traces[0].nearest_index(target_wavelength);
    log::debug!(
        "cutback over {} traces, target {target_wavelength} nm matched to {} nm",
        traces.len(),
        grid[target_index]
    );

    Ok(CutbackResult {
        target_index,
        target_wavelength: grid[target_index],
        loss_at_target: loss_fit[target_index],
        raw_loss_at_target: loss_raw[target_index],
        wavelength: grid.to_vec(),
        loss_fit,
        loss_raw,
        r_squared_fit,
        standard_error_fit,
    })
}

/// Smooths every trace with a centered polynomial of `order`.
fn smooth_all(traces: &[Trace], order: usize) -> Result<Vec<Vec<f64>>> {
    #[cfg(feature = "parallel")]
    use rayon::prelude::*;

    #[cfg(not(feature = "parallel"))]
    let traces = traces.iter();
    #[cfg(feature = "parallel")]
    let traces = traces.par_iter();

    traces.map(|t| fit_on_grid(t, order)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_all_close, assert_close,
        test::{cutback_set, wavelength_grid},
    };

    fn loss(l: f64) -> f64 {
        // dB/cm, rising slowly towards longer wavelengths
        2.0 + 0.01 * (l - 1550.0)
    }

    fn coupler(l: f64) -> f64 {
        -9.0 - 0.0015 * (l - 1550.0).powi(2)
    }

    #[test]
    fn test_recovers_known_loss() {
        let wavelength = wavelength_grid(1500.0, 1600.0, 1001);
        let lengths = [0.5, 1.0, 1.5, 3.0];
        let traces = cutback_set(&wavelength, &lengths, loss, coupler);

        let result = cutback(&traces, &lengths, 1550.0, DEFAULT_CUTBACK_ORDER).unwrap();
        assert_eq!(result.target_index, 500);
        assert_close!(result.target_wavelength, 1550.0, tol = 1e-9);
        assert_close!(result.loss_at_target, 2.0, tol = 1e-6);
        assert_close!(result.raw_loss_at_target, 2.0, tol = 1e-9);

        let expected: Vec<f64> = wavelength.iter().map(|&l| loss(l)).collect();
        assert_all_close!(result.loss_fit, expected, tol = 1e-6);
        assert_all_close!(result.loss_raw, expected, tol = 1e-9);
        for r2 in &result.r_squared_fit {
            assert_close!(*r2, 1.0, tol = 1e-9);
        }

        let metrics = result.insertion_loss();
        assert_eq!(metrics.len(), wavelength.len());
        assert_close!(result.target_metric().value(), 2.0, tol = 1e-6);
    }

    #[test]
    fn test_target_is_nearest_grid_point() {
        let wavelength = wavelength_grid(1500.0, 1600.0, 101);
        let lengths = [1.0, 2.0, 3.0];
        let traces = cutback_set(&wavelength, &lengths, loss, coupler);

        let result = cutback(&traces, &lengths, 1523.4, 2).unwrap();
        assert_eq!(result.target_index, 23);
        assert_close!(result.target_wavelength, 1523.0, tol = 1e-9);
    }

    #[test]
    fn test_rejects_mismatched_grids() {
        let lengths = [1.0, 2.0, 3.0];
        let mut traces = cutback_set(&wavelength_grid(1500.0, 1600.0, 101), &lengths, loss, coupler);
        traces[2] = Trace::new(wavelength_grid(1500.0, 1600.0, 102), vec![-10.0; 102]).unwrap();

        assert_eq!(
            cutback(&traces, &lengths, 1550.0, 2),
            Err(Error::GridMismatch { index: 2 })
        );
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let wavelength = wavelength_grid(1500.0, 1600.0, 101);
        let traces = cutback_set(&wavelength, &[1.0, 1.0], loss, coupler);

        assert_eq!(
            cutback(&traces, &[1.0, 1.0], 1550.0, 2),
            Err(Error::DegenerateLengths)
        );
        assert_eq!(
            cutback(&traces[..1], &[1.0], 1550.0, 2),
            Err(Error::InsufficientData {
                required: 2,
                available: 1
            })
        );
        assert_eq!(
            cutback(&traces, &[1.0], 1550.0, 2),
            Err(Error::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
    }
}
