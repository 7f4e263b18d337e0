//! Functions for evaluating fits and regressing measurements
//!
//! # Model Fit / Regression Diagnostics
//! - [`r_squared`]: Proportion of variance explained by the model. Higher is better (0 to 1).
//! - [`residual_variance`]: Unbiased estimate of variance of errors after fitting.
//!
//! # Regression
//! - [`linear_regression`]: Closed-form least-squares line through `(x, y)` pairs, with the
//!   standard error of the slope. This is the per-wavelength workhorse of the cutback method.
//!
//! # Descriptive Statistics
//! - [`mean`]: Arithmetic mean of a dataset.
//! - [`stddev_and_mean`]: Standard deviation and mean of a dataset.
//! - [`max`] / [`argmax`]: Largest value of a dataset and where it first occurs.
//!
//! # Examples
//!
//! ```rust
//! use tracefit::statistics::{linear_regression, r_squared};
//!
//! let lengths = [0.5, 1.0, 2.0];
//! let power = [-10.5, -11.0, -12.0];
//! let line = linear_regression(&lengths, &power).unwrap();
//! assert!((line.slope + 1.0).abs() < 1e-12);
//!
//! let y = [1.0, 2.0, 3.0];
//! let y_fit = [1.1, 1.9, 3.05];
//! let r2 = r_squared(y.iter().copied(), y_fit.iter().copied());
//! assert!(r2 > 0.9);
//! ```
use crate::error::{ensure_same_len, Error, Result};

/// Computes the residual variance of a model's predictions.
///
/// Residual variance is the unbiased estimate of the variance of the
/// errors (σ²) after fitting a model.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// σ² = Σ (y_i - y_fit_i)² / (n - k)
/// where
///   y_i = observed values, y_fit_i = predicted values,
///   n = number of observations, k = number of model parameters
/// ```
/// </div>
///
/// Returns zero when `n <= k`; an exactly-determined model has no residual degrees of freedom.
pub fn residual_variance(
    y: impl Iterator<Item = f64>,
    y_fit: impl Iterator<Item = f64>,
    k: usize,
) -> f64 {
    let mut ss_res = 0.0;
    let mut n = 0usize;
    for (y, y_fit) in y.zip(y_fit) {
        ss_res += (y - y_fit).powi(2);
        n += 1;
    }

    if n <= k {
        return 0.0;
    }
    ss_res / (n - k) as f64
}

/// Calculate the R-squared value for a set of data.
///
/// R-squared is a number between 0 and 1 that tells you how well the model explains the data:
/// - `0` means the model explains none of the variation.
/// - `1` means the model explains all the variation.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// R² = 1 - (SS_res / SS_tot)
/// where
///   SS_res = Σ (y_i - y_fit_i)²
///   SS_tot = Σ (y_i - y_mean)²
/// ```
/// </div>
///
/// A constant `y` has no variance to explain: the result is `1.0` when the model
/// reproduces it exactly and `NaN` otherwise.
pub fn r_squared(y: impl Iterator<Item = f64>, y_fit: impl Iterator<Item = f64>) -> f64 {
    let pairs: Vec<(f64, f64)> = y.zip(y_fit).collect();
    let y_mean = mean(pairs.iter().map(|(y, _)| *y));

    let mut ss_res = 0.0;
    let mut ss_tot = 0.0;
    for (y, y_fit) in &pairs {
        ss_res += (y - y_fit).powi(2);
        ss_tot += (y - y_mean).powi(2);
    }

    if ss_tot == 0.0 {
        return if ss_res == 0.0 { 1.0 } else { f64::NAN };
    }
    1.0 - ss_res / ss_tot
}

/// Computes the arithmetic mean of a sequence of values.
///
/// Returns `NaN` if the iterator yields no elements.
///
/// # Examples
/// ```rust
/// let m = tracefit::statistics::mean([1.0, 2.0, 3.0].into_iter());
/// assert_eq!(m, 2.0);
/// ```
pub fn mean(data: impl Iterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in data {
        sum += value;
        count += 1;
    }
    sum / count as f64
}

/// Computes the population standard deviation (divides by `N`) and the mean of a sequence.
///
/// Returns `(stddev, mean)`.
pub fn stddev_and_mean(data: impl Iterator<Item = f64>) -> (f64, f64) {
    let data: Vec<f64> = data.collect();
    let mean = mean(data.iter().copied());
    let variance = data.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / data.len() as f64;
    (variance.sqrt(), mean)
}

/// Largest value in a sequence, ignoring `NaN`.
///
/// Returns `None` for an empty sequence.
pub fn max(data: &[f64]) -> Option<f64> {
    argmax(data).map(|i| data[i])
}

/// Index of the first occurrence of the largest value in a sequence, ignoring `NaN`.
///
/// Returns `None` if the sequence is empty or holds only `NaN`.
pub fn argmax(data: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, v) in data.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some(b) if data[b] >= *v => {}
            _ => best = Some(i),
        }
    }
    best
}

/// A least-squares straight line `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearRegression {
    /// Slope of the line
    pub slope: f64,

    /// Value of the line at `x = 0`
    pub intercept: f64,

    /// Coefficient of determination of the line against the regressed points
    pub r_squared: f64,

    /// Standard error of the slope estimate
    ///
    /// Zero when only two points were regressed, since the line passes through both.
    pub slope_standard_error: f64,
}
impl LinearRegression {
    /// Evaluates the line at `x`.
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fits a straight line through `(x, y)` pairs by ordinary least squares.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// slope     = Σ (x_i - x̄)(y_i - ȳ) / Σ (x_i - x̄)²
/// intercept = ȳ - slope * x̄
/// SE(slope) = sqrt( σ² / Σ (x_i - x̄)² ),  σ² = SS_res / (n - 2)
/// ```
/// </div>
///
/// # Errors
/// - [`Error::LengthMismatch`] if `x` and `y` differ in length.
/// - [`Error::InsufficientData`] if fewer than 2 points are given.
/// - [`Error::DegenerateLengths`] if every `x` is identical, leaving the slope undefined.
pub fn linear_regression(x: &[f64], y: &[f64]) -> Result<LinearRegression> {
    ensure_same_len(x.len(), y.len())?;
    if x.len() < 2 {
        return Err(Error::InsufficientData {
            required: 2,
            available: x.len(),
        });
    }

    let x_mean = mean(x.iter().copied());
    let y_mean = mean(y.iter().copied());

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - x_mean;
        sxx += dx * dx;
        sxy += dx * (yi - y_mean);
    }

    if sxx == 0.0 {
        return Err(Error::DegenerateLengths);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let fitted = x.iter().map(|xi| slope * xi + intercept);
    let r_squared = r_squared(y.iter().copied(), fitted.clone());
    let variance = residual_variance(y.iter().copied(), fitted, 2);
    let slope_standard_error = (variance / sxx).sqrt();

    Ok(LinearRegression {
        slope,
        intercept,
        r_squared,
        slope_standard_error,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::assert_close;

    #[test]
    fn residual_variance_zero_error() {
        let y = vec![1.0, 2.0, 3.0];
        let y_fit = vec![1.0, 2.0, 3.0];
        let var = residual_variance(y.into_iter(), y_fit.into_iter(), 1);
        assert_eq!(var, 0.0);
    }

    #[test]
    fn residual_variance_simple_case() {
        // errors: [1, 2], squared = [1, 4], sum = 5
        // n=2, n-k=1, variance = 5
        let y = vec![1.0, 2.0];
        let y_fit = vec![0.0, 0.0];
        let var = residual_variance(y.into_iter(), y_fit.into_iter(), 1);
        assert_eq!(var, 5.0);
    }

    #[test]
    fn residual_variance_no_degrees_of_freedom() {
        let y = vec![1.0, 2.0];
        let y_fit = vec![0.0, 0.0];
        let var = residual_variance(y.into_iter(), y_fit.into_iter(), 2);
        assert_eq!(var, 0.0);
    }

    #[test]
    fn r_squared_perfect_and_bad_fit() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r_squared(y.into_iter(), y.into_iter()), 1.0);

        // SST = 2, SSE = 2 → R² = 0
        let flat = [2.0, 2.0, 2.0];
        assert_eq!(r_squared(y.into_iter(), flat.into_iter()), 0.0);
    }

    #[test]
    fn r_squared_constant_y() {
        let y = [2.0, 2.0, 2.0];
        assert_eq!(r_squared(y.into_iter(), y.into_iter()), 1.0);
        assert!(r_squared(y.into_iter(), [2.0, 2.0, 2.5].into_iter()).is_nan());
    }

    #[test]
    fn stddev_of_known_set() {
        let (sd, m) = stddev_and_mean([2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0].into_iter());
        assert_eq!(m, 5.0);
        assert_eq!(sd, 2.0);
    }

    #[test]
    fn argmax_first_occurrence() {
        assert_eq!(argmax(&[1.0, 3.0, 2.0, 3.0]), Some(1));
        assert_eq!(argmax(&[f64::NAN, -1.0, -2.0]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(max(&[-4.0, -1.5, -3.0]), Some(-1.5));
    }

    #[test]
    fn regression_exact_line() {
        let x = [1.0, 2.0, 4.0, 8.0];
        let y: Vec<f64> = x.iter().map(|x| -0.25 * x + 3.0).collect();
        let line = linear_regression(&x, &y).unwrap();
        assert_close!(line.slope, -0.25, tol = 1e-12);
        assert_close!(line.intercept, 3.0, tol = 1e-12);
        assert_close!(line.r_squared, 1.0, tol = 1e-12);
        assert_close!(line.slope_standard_error, 0.0, tol = 1e-9);
        assert_close!(line.y(2.0), 2.5, tol = 1e-12);
    }

    #[test]
    fn regression_reports_uncertainty_for_noisy_points() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y = [0.1, 0.9, 2.1, 2.9];
        let line = linear_regression(&x, &y).unwrap();
        assert!(line.slope_standard_error > 0.0);
        assert!(line.r_squared < 1.0 && line.r_squared > 0.95);
    }

    #[test]
    fn regression_rejects_bad_input() {
        assert_eq!(
            linear_regression(&[1.0], &[1.0]),
            Err(Error::InsufficientData {
                required: 2,
                available: 1
            })
        );
        assert_eq!(
            linear_regression(&[1.0, 2.0], &[1.0]),
            Err(Error::LengthMismatch {
                expected: 2,
                found: 1
            })
        );
        assert_eq!(
            linear_regression(&[3.0, 3.0, 3.0], &[1.0, 2.0, 3.0]),
            Err(Error::DegenerateLengths)
        );
    }
}
