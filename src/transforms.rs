//! Utilities for adding transformations to data
//!
//! Data can be transformed by anything implementing the [`Transform`] trait, which applies the transformation over a set of values.
//!
//! The [`Transformable`] trait is a convenient wrapper that allows you to apply transformations to a [`Trace`] or a plain
//! `Vec<f64>` more easily. On a trace, only the values change; the wavelength grid is left alone.
//!
//! These are mostly used to build realistic synthetic measurements from the generators in [`crate::test`],
//! so extractors can be checked against laser noise and detector ripple before real data exists.
//!
//! # Noise: [`NoiseTransform`] / [`ApplyNoise`]
//! - Gaussian noise: [`NoiseTransform::Gaussian`]
//!   - [`ApplyNoise::apply_normal_noise`] adds independent Gaussian noise to every value.
//! - Correlated Gaussian noise: [`NoiseTransform::CorrelatedGaussian`]
//!   - [`ApplyNoise::apply_correlated_noise`] adds slowly wandering noise, like laser power drift.
//! - Uniform noise: [`NoiseTransform::Uniform`]
//!   - [`ApplyNoise::apply_uniform_noise`] adds flat, bounded noise.
//!
//! ```rust
//! use tracefit::{test::wavelength_grid, transforms::ApplyNoise, Trace};
//!
//! let wavelength = wavelength_grid(1500.0, 1600.0, 101);
//! let trace = Trace::new(wavelength, vec![-10.0; 101]).unwrap();
//! let noisy = trace.apply_normal_noise(0.05, Some(7));
//! assert!(noisy.value().iter().any(|&v| v != -10.0));
//! ```
use crate::trace::Trace;

mod noise;
pub use noise::{ApplyNoise, NoiseTransform};

pub use rand;
pub use rand_distr;

/// Trait for applying transformations to data.
pub trait Transform {
    /// Applies the transformation to the given data.
    fn apply<'a>(&self, data: impl Iterator<Item = &'a mut f64>);
}

/// Trait for transforming data.
pub trait Transformable {
    /// Transforms the data in place.
    fn transform<R: Transform>(&mut self, transform: &R);
}
impl Transformable for Vec<f64> {
    fn transform<R: Transform>(&mut self, transform: &R) {
        transform.apply(self.iter_mut());
    }
}
impl Transformable for Trace {
    fn transform<R: Transform>(&mut self, transform: &R) {
        transform.apply(self.value_mut().iter_mut());
    }
}
