use rand::SeedableRng;
use rand_distr::{Distribution, Normal, Uniform};

use crate::transforms::{Transform, Transformable};

/// Types of noise based transforms for data
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoiseTransform {
    /// Adds independent Gaussian noise to every value.
    ///
    /// <div class="warning">
    ///
    /// **Technical Details**
    ///
    /// ```math
    /// xₙ = x + εₙ
    /// where
    ///   εₙ ~ N(0, strength²), x = uncorrupted value
    /// ```
    /// </div>
    Gaussian {
        /// Standard deviation of the noise, in the units of the data.
        strength: f64,

        /// Fixes the RNG seed for reproducibility.
        /// If not provided, a system RNG will be used each run.
        seed: Option<u64>,
    },

    /// Adds correlated Gaussian noise to a signal.
    ///
    /// Neighboring samples share part of their noise, so it varies smoothly across the
    /// sweep. This is closer to laser power drift or slow fiber movement than
    /// [`NoiseTransform::Gaussian`].
    ///
    /// <div class="warning">
    ///
    /// **Technical Details**
    ///
    /// ```math
    /// sₙ = ρ * sₙ₋₁ + √(1 − ρ²) * εₙ
    /// xₙ = x + sₙ
    /// where
    ///   εₙ ~ N(0, strength²), ρ = correlation factor
    /// ```
    /// The drive term is scaled so the noise keeps a standard deviation of `strength` for any `ρ`.
    /// </div>
    CorrelatedGaussian {
        /// Correlation factor between consecutive samples, in `[-1, 1]`.
        /// - Values near `0` → mostly independent noise.
        /// - Values near `1` → highly correlated, slow-changing noise.
        rho: f64,

        /// Standard deviation of the noise, in the units of the data.
        strength: f64,

        /// Fixes the RNG seed for reproducibility.
        /// If not provided, a system RNG will be used each run.
        seed: Option<u64>,
    },

    /// Adds uniform noise drawn from `[-strength, +strength]`.
    Uniform {
        /// Largest deviation from the original value.
        strength: f64,

        /// Fixes the RNG seed for reproducibility.
        /// If not provided, a system RNG will be used each run.
        seed: Option<u64>,
    },
}
impl NoiseTransform {
    fn seed(&self) -> Option<u64> {
        match self {
            NoiseTransform::Gaussian { seed, .. }
            | NoiseTransform::CorrelatedGaussian { seed, .. }
            | NoiseTransform::Uniform { seed, .. } => *seed,
        }
    }

    fn rng(seed: Option<u64>) -> rand::rngs::SmallRng {
        match seed {
            Some(s) => rand::rngs::SmallRng::seed_from_u64(s),
            None => rand::rngs::SmallRng::from_rng(&mut rand::rng()),
        }
    }
}
impl Transform for NoiseTransform {
    fn apply<'a>(&self, data: impl Iterator<Item = &'a mut f64>) {
        let mut rng = Self::rng(self.seed());
        match *self {
            NoiseTransform::Gaussian { strength, .. } => {
                let Ok(gaussian) = Normal::new(0.0, strength.abs()) else {
                    log::warn!("gaussian noise skipped, strength {strength} is not finite");
                    return;
                };
                for v in data {
                    *v += gaussian.sample(&mut rng);
                }
            }

            NoiseTransform::CorrelatedGaussian { rho, strength, .. } => {
                let Ok(gaussian) = Normal::new(0.0, strength.abs()) else {
                    log::warn!("correlated noise skipped, strength {strength} is not finite");
                    return;
                };
                let rho = rho.clamp(-1.0, 1.0);
                let drive_scale = (1.0 - rho * rho).sqrt();

                let mut state = gaussian.sample(&mut rng); // start from a plain Gaussian
                for v in data {
                    state = rho * state + gaussian.sample(&mut rng) * drive_scale;
                    *v += state;
                }
            }

            NoiseTransform::Uniform { strength, .. } => {
                let strength = strength.abs().max(f64::EPSILON);
                let Ok(uniform) = Uniform::new(-strength, strength) else {
                    log::warn!("uniform noise skipped, strength {strength} is not finite");
                    return;
                };
                for v in data {
                    *v += uniform.sample(&mut rng);
                }
            }
        }
    }
}

/// Trait for applying noise to data.
pub trait ApplyNoise
where
    Self: Sized,
{
    /// Adds independent Gaussian noise with standard deviation `strength`.
    ///
    /// See [`NoiseTransform::Gaussian`].
    #[must_use]
    fn apply_normal_noise(self, strength: f64, seed: Option<u64>) -> Self;

    /// Adds correlated Gaussian noise with standard deviation `strength`.
    ///
    /// See [`NoiseTransform::CorrelatedGaussian`].
    #[must_use]
    fn apply_correlated_noise(self, strength: f64, rho: f64, seed: Option<u64>) -> Self;

    /// Adds uniform noise from `[-strength, +strength]`.
    ///
    /// See [`NoiseTransform::Uniform`].
    #[must_use]
    fn apply_uniform_noise(self, strength: f64, seed: Option<u64>) -> Self;
}
impl<T: Transformable> ApplyNoise for T {
    fn apply_normal_noise(mut self, strength: f64, seed: Option<u64>) -> Self {
        self.transform(&NoiseTransform::Gaussian { strength, seed });
        self
    }

    fn apply_correlated_noise(mut self, strength: f64, rho: f64, seed: Option<u64>) -> Self {
        self.transform(&NoiseTransform::CorrelatedGaussian {
            rho,
            strength,
            seed,
        });
        self
    }

    fn apply_uniform_noise(mut self, strength: f64, seed: Option<u64>) -> Self {
        self.transform(&NoiseTransform::Uniform { strength, seed });
        self
    }
}
