//! Savitzky-Golay smoothing
//!
//! Fits a polynomial of `order` to every `window` consecutive samples and keeps
//! the value of that fit at the window center. Polynomials of degree `order` or
//! lower pass through unchanged, so peak heights and widths survive better than
//! under a moving average of the same width.
use nalgebra::DMatrix;

use crate::{
    error::{Error, Result},
    CurveFit,
};

/// Least-squares convolution weights for the center sample of a window.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// A[i][j] = (i - h)^j,   i in 0..window, j in 0..=order, h = window / 2
/// c = first row of (AᵀA)⁻¹Aᵀ
/// ```
/// </div>
///
/// # Errors
/// [`Error::Algebra`] if the pseudo-inverse cannot be computed.
pub fn coefficients(window: usize, order: usize) -> Result<Vec<f64>> {
    let half = (window / 2) as f64;
    let design = DMatrix::from_fn(window, order + 1, |i, j| {
        let u = i as f64 - half;
        u.powi(j as i32)
    });

    let pinv = design.pseudo_inverse(f64::EPSILON).map_err(Error::Algebra)?;
    Ok(pinv.row(0).iter().copied().collect())
}

/// Smooths `values` with a Savitzky-Golay filter.
///
/// Interior samples are the convolution of the window with [`coefficients`].
/// The first and last `window / 2` samples are taken from a polynomial of `order`
/// fitted to the first and last full window respectively.
///
/// # Errors
/// - [`Error::InvalidParameter`] if `window` is even or not larger than `order`.
/// - [`Error::InsufficientData`] if `values` is shorter than `window`.
///
/// # Example
/// ```rust
/// # use tracefit::smoothing::savitzky_golay;
/// let noisy = [1.0, 1.2, 0.9, 1.1, 1.0, 0.8, 1.1];
/// let smooth = savitzky_golay(&noisy, 5, 1).unwrap();
/// assert_eq!(smooth.len(), noisy.len());
/// ```
pub fn savitzky_golay(values: &[f64], window: usize, order: usize) -> Result<Vec<f64>> {
    if window % 2 == 0 {
        return Err(Error::InvalidParameter("smoothing window must be odd"));
    }
    if window <= order {
        return Err(Error::InvalidParameter(
            "smoothing window must be larger than the polynomial order",
        ));
    }
    if values.len() < window {
        return Err(Error::InsufficientData {
            required: window,
            available: values.len(),
        });
    }

    let half = window / 2;
    let weights = coefficients(window, order)?;

    let mut smoothed = Vec::with_capacity(values.len());
    smoothed.extend(edge(&values[..window], order, 0..half)?);
    for segment in values.windows(window) {
        smoothed.push(segment.iter().zip(&weights).map(|(v, w)| v * w).sum());
    }
    smoothed.extend(edge(
        &values[values.len() - window..],
        order,
        window - half..window,
    )?);

    Ok(smoothed)
}

/// Evaluates a polynomial fitted to a full edge window at the given window positions.
fn edge(
    segment: &[f64],
    order: usize,
    positions: std::ops::Range<usize>,
) -> Result<Vec<f64>> {
    let x: Vec<f64> = (0..segment.len()).map(|i| i as f64).collect();
    let fit = CurveFit::new(&x, segment, order)?;
    Ok(positions.map(|i| fit.y(i as f64)).collect())
}
