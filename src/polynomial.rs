use crate::{
    error::{Error, Result},
    statistics,
};

/// A polynomial function expressed over a centered domain.
///
/// The polynomial is stored as ascending monomial coefficients in the shifted
/// variable `u = x - center`:
///
/// ```text
/// y(x) = c₀ + c₁·u + c₂·u² + … + cₙ·uⁿ,   u = x - center
/// ```
///
/// The centering offset is part of the polynomial, so a polynomial fitted over
/// one domain always evaluates with the same offset it was fitted with.
///
/// Unlike [`crate::CurveFit`], this struct is **not tied to any dataset**; it can be
/// evaluated for any x-value.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Polynomial {
    center: f64,
    coefficients: Vec<f64>,
}
impl Polynomial {
    /// Creates a polynomial from a centering offset and ascending coefficients.
    ///
    /// # Errors
    /// Returns [`Error::NoData`] if `coefficients` is empty.
    ///
    /// # Example
    /// ```
    /// # use tracefit::Polynomial;
    /// // 1 + 2(x - 10) + 3(x - 10)²
    /// let poly = Polynomial::new(10.0, vec![1.0, 2.0, 3.0]).unwrap();
    /// assert_eq!(poly.y(12.0), 17.0);
    /// ```
    pub fn new(center: f64, coefficients: Vec<f64>) -> Result<Self> {
        if coefficients.is_empty() {
            return Err(Error::NoData);
        }
        Ok(Self {
            center,
            coefficients,
        })
    }

    /// Creates an uncentered polynomial, `y = c₀ + c₁x + …`.
    ///
    /// # Errors
    /// Returns [`Error::NoData`] if `coefficients` is empty.
    pub fn monomial(coefficients: Vec<f64>) -> Result<Self> {
        Self::new(0.0, coefficients)
    }

    /// The domain offset subtracted from `x` before evaluation.
    #[must_use]
    pub fn center(&self) -> f64 {
        self.center
    }

    /// Ascending coefficients in the centered variable, constant term first.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Degree of the polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluates the polynomial at `x` using Horner's method.
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        let u = x - self.center;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &coef| acc * u + coef)
    }

    /// Evaluates the polynomial at every x-value.
    #[must_use]
    pub fn solve(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&x| self.y(x)).collect()
    }

    /// Calculates the R-squared value of this polynomial against `(x, y)` data.
    ///
    /// See [`statistics::r_squared`] for more details.
    #[must_use]
    pub fn r_squared(&self, x: &[f64], y: &[f64]) -> f64 {
        statistics::r_squared(y.iter().copied(), x.iter().map(|&x| self.y(x)))
    }
}
