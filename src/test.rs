//! Test helpers for trace correction and metric extraction.
//!
//! # Features
//!
//! ## Float assertions
//!
//! ### [`crate::assert_close`]
//! Asserts that two floating-point values are approximately equal.
//! - Defaults to a few machine epsilons, scaled by the magnitude of the operands.
//! - `tol = <value>` sets an absolute tolerance instead.
//! - `assert_eq!` equivalent for floats.
//!
//! ### [`crate::assert_all_close`]
//! Element-wise [`crate::assert_close`] over two sequences of the same length.
//!
//! ### [`crate::assert_r_squared`]
//! Asserts that a [`crate::CurveFit`] explains at least a given share of the variance of its data.
//!
//! ## Synthetic traces
//! Deterministic generators for the structures this crate analyzes. They are used by the unit
//! tests and the benchmarks, and are handy for checking an analysis plan before real data exists.
//! - [`wavelength_grid`]: evenly spaced sweep axis
//! - [`mzi_transmission`] / [`mzi_transmission_db`]: unbalanced Mach-Zehnder response
//! - [`dipped_reference`]: smooth envelope with narrow resonance dips
//! - [`cutback_set`]: waveguides of several lengths with a known propagation loss
//!
//! ```rust
//! use tracefit::test::{mzi_transmission_db, wavelength_grid};
//!
//! let wavelength = wavelength_grid(1500.0, 1600.0, 10_001);
//! let power = mzi_transmission_db(&wavelength, 4.2, 100e-6, 30.0);
//! assert_eq!(power.len(), wavelength.len());
//! ```
use crate::{trace::Trace, units::Nanometers};


/// `n` evenly spaced wavelengths from `start` to `stop`, both inclusive.
///
/// Returns `[start]` when `n == 1` and an empty vector when `n == 0`.
#[must_use]
pub fn wavelength_grid(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => vec![],
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Linear transmission of an unbalanced MZI, `cos²(π · ng · ΔL / λ)`.
///
/// `wavelength` is in nanometers and `delta_length` in meters.
#[must_use]
pub fn mzi_transmission(wavelength: &[f64], group_index: f64, delta_length: f64) -> Vec<f64> {
    wavelength
        .iter()
        .map(|&nm| {
            let lambda = Nanometers(nm).to_meters().value();
            (std::f64::consts::PI * group_index * delta_length / lambda)
                .cos()
                .powi(2)
        })
        .collect()
}

/// [`mzi_transmission`] in dB, with troughs floored `extinction` dB below the peaks.
#[must_use]
pub fn mzi_transmission_db(
    wavelength: &[f64],
    group_index: f64,
    delta_length: f64,
    extinction: f64,
) -> Vec<f64> {
    let floor = 10f64.powf(-extinction / 10.0);
    mzi_transmission(wavelength, group_index, delta_length)
        .into_iter()
        .map(|t| 10.0 * (t + floor).log10())
        .collect()
}

/// A smooth envelope with narrow Gaussian dips carved into it.
///
/// Each dip is `depth` dB deep with standard deviation `width` nm.
/// Returns `(reference, envelope)`, both sampled on `wavelength`.
#[must_use]
pub fn dipped_reference(
    wavelength: &[f64],
    envelope: impl Fn(f64) -> f64,
    dip_centers: &[f64],
    depth: f64,
    width: f64,
) -> (Vec<f64>, Vec<f64>) {
    let envelope: Vec<f64> = wavelength.iter().map(|&x| envelope(x)).collect();
    let reference = wavelength
        .iter()
        .zip(&envelope)
        .map(|(&x, &e)| {
            let dip: f64 = dip_centers
                .iter()
                .map(|c| depth * (-0.5 * ((x - c) / width).powi(2)).exp())
                .sum();
            e - dip
        })
        .collect();
    (reference, envelope)
}

/// Traces of waveguides with the given `lengths` and a propagation loss of `loss` dB per length unit.
///
/// `insertion` is the length-independent part of the response, such as grating coupler loss.
#[must_use]
pub fn cutback_set(
    wavelength: &[f64],
    lengths: &[f64],
    loss: impl Fn(f64) -> f64,
    insertion: impl Fn(f64) -> f64,
) -> Vec<Trace> {
    lengths
        .iter()
        .filter_map(|&length| {
            let values = wavelength
                .iter()
                .map(|&x| insertion(x) - loss(x) * length)
                .collect();
            Trace::new(wavelength.to_vec(), values).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assert_all_close, assert_close};

    #[test]
    fn test_wavelength_grid() {
        let grid = wavelength_grid(1500.0, 1600.0, 5);
        assert_all_close!(grid, [1500.0, 1525.0, 1550.0, 1575.0, 1600.0]);
        assert_eq!(wavelength_grid(1.0, 2.0, 1), vec![1.0]);
        assert!(wavelength_grid(1.0, 2.0, 0).is_empty());
    }

    #[test]
    fn test_mzi_extremes() {
        // ng·ΔL / λ = 1 → cos²(π) = 1
        let t = mzi_transmission(&[1000.0], 1.0, 1e-6);
        assert_close!(t[0], 1.0, tol = 1e-12);

        // ng·ΔL / λ = 0.5 → cos²(π/2) = 0 → floored at -30 dB
        let t = mzi_transmission_db(&[2000.0], 1.0, 1e-6, 30.0);
        assert_close!(t[0], -30.0, tol = 1e-6);
    }

    #[test]
    fn test_dipped_reference() {
        let x = wavelength_grid(0.0, 10.0, 11);
        let (reference, envelope) = dipped_reference(&x, |_| -5.0, &[5.0], 10.0, 0.1);
        assert_close!(reference[5], -15.0, tol = 1e-12);
        assert_close!(reference[0], -5.0, tol = 1e-12);
        assert_all_close!(envelope, [-5.0; 11]);
    }

    #[test]
    fn test_cutback_set() {
        let x = wavelength_grid(1500.0, 1600.0, 3);
        let traces = cutback_set(&x, &[0.0, 2.0], |_| 1.5, |_| -6.0);
        assert_eq!(traces.len(), 2);
        assert_all_close!(traces[1].value(), [-9.0; 3]);
    }
}
