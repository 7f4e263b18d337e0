//! # Tracefit
//! ## Correction and metric extraction for swept optical measurements
//!
//! A wafer-scale photonics test run produces thousands of wavelength sweeps: a power reading in dBm
//! for every laser wavelength, for every device. Before any number can be compared across a wafer,
//! the parts of each sweep that belong to the setup rather than the device have to go. That means
//! grating coupler passbands, fiber alignment drift and laser power ripple.
//!
//! This crate takes a [`Trace`] and does two things with it:
//! - **Correction** ([`correction`]): fit a centered polynomial to the systematic part of the response
//!   and subtract it. Three flavors, depending on what reference you measured.
//! - **Extraction** ([`metrics`], [`cutback`]): read device figures of merit off the corrected trace.
//!   Bandwidth, extinction ratio, free spectral range, group index and propagation loss.
//!
//! [`pipeline`] strings the two together for a batch of devices.
//!
//! ```rust
//! use tracefit::{correction::baseline_correction, metrics::bandwidth, Trace};
//!
//! // A passband riding on a tilted grating coupler response
//! let wavelength: Vec<f64> = (0..=400).map(|i| 1530.0 + 0.1 * f64::from(i)).collect();
//! let power: Vec<f64> = wavelength
//!     .iter()
//!     .map(|&l| -8.0 + 0.05 * (l - 1550.0) - 12.0 * (1.0 - (-((l - 1550.0) / 4.0).powi(2)).exp()))
//!     .collect();
//! let trace = Trace::new(wavelength, power).unwrap();
//!
//! let corrected = baseline_correction(&trace, 1).unwrap().corrected_trace(&trace).unwrap();
//! let bw = bandwidth(&corrected, 3.0).unwrap();
//! assert!(bw.value > 0.0);
//! ```
//!
//! # Core Concepts
//! - A [`Trace`] is one sweep: a wavelength grid in nanometers and the values sampled on it.
//!     - Traces are validated on construction and never mutated by the engine; every operation returns new vectors.
//!     - Operations that combine traces require them to share a grid exactly, see [`Error::GridMismatch`].
//! - A [`Polynomial`] is a fitted curve in centered form, `y = Σ cᵢ (x - center)ⁱ`.
//!     - Centering keeps high orders stable over a 1500-1600 nm sweep, where raw powers of `x` would overflow the solver.
//!     - [`polyfit`] returns one directly; [`CurveFit`] keeps the data around for diagnostics.
//! - Units are nanometers and dB everywhere, except [`metrics::group_index`] which takes [`units::Meters`].
//!
//! # Implementation Details
//!
//! Least squares is solved by SVD with `nalgebra`, on a column-scaled Vandermonde matrix.
//! Everything is synchronous and pure. With the `parallel` feature, batch work in
//! [`pipeline::analyze_all`] and [`cutback::cutback`] runs on the rayon pool.
//!
//! The crate logs through the `log` facade and never installs a logger itself.
//!
//! # Testing utilities
//!
//! This crate includes assertion macros and synthetic trace generators for MZIs, resonant references
//! and cutback sets. See [`test`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // Sample counts never get near 2^52
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod test;

#[cfg(feature = "transforms")]
#[cfg_attr(docsrs, doc(cfg(feature = "transforms")))]
pub mod transforms;

pub mod correction;
pub mod cutback;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod smoothing;
pub mod statistics;
pub mod trace;
pub mod units;

mod fit;
mod polynomial;

pub use error::Error;
pub use fit::*;
pub use polynomial::Polynomial;
pub use trace::{FitResult, Trace};

pub use nalgebra;
