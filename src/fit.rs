use nalgebra::{DMatrix, DVector, SVD};

use crate::{
    error::{ensure_same_len, Error, Result},
    statistics, Polynomial,
};

/// Fits a polynomial of `degree` to `(x, y)` and returns only the function.
///
/// Shorthand for `CurveFit::new(x, y, degree)?.into_polynomial()`.
///
/// # Errors
/// See [`CurveFit::new`].
pub fn polyfit(x: &[f64], y: &[f64], degree: usize) -> Result<Polynomial> {
    Ok(CurveFit::new(x, y, degree)?.into_polynomial())
}

/// Represents a least-squares polynomial fit to a set of samples.
///
/// `CurveFit` computes the polynomial that best fits a given dataset, always
/// fitting against the centered domain `x - mean(x)`. It keeps a reference to the
/// original samples and the resulting [`Polynomial`], which carries the centering
/// offset so every evaluation reuses it.
///
/// # How it works
/// - Builds a **Vandermonde matrix** with shape `[rows, k]` over `u = x - mean(x)`,
///   where `rows` is the number of samples and `k = degree + 1`.
/// - Scales every column to unit norm so high powers of `u` do not swamp the constant term.
/// - Solves the least-squares system `A * c = y` using the **SVD** of the scaled matrix,
///   then undoes the column scaling.
///
/// Centering matters: wavelengths around 1550 nm raised to the 8th power exceed
/// 1e25, while the centered domain of a 100 nm sweep stays near 1e13 and the scaled
/// columns stay near 1.
///
/// # Example
/// ```
/// # use tracefit::CurveFit;
/// let x = [1549.0, 1550.0, 1551.0];
/// let y = [-11.0, -10.0, -11.0];
/// let fit = CurveFit::new(&x, &y, 2).unwrap();
/// assert!((fit.y(1550.0) + 10.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct CurveFit<'data> {
    x: &'data [f64],
    y: &'data [f64],
    function: Polynomial,
}
impl<'data> CurveFit<'data> {
    /// Turns the centered samples into a Vandermonde matrix.
    fn create_matrix(x: &[f64], center: f64, k: usize) -> DMatrix<f64> {
        let mut bigx = DMatrix::zeros(x.len(), k);
        for (row, &xi) in x.iter().enumerate() {
            let u = xi - center;
            let mut power = 1.0;
            for j in 0..k {
                bigx[(row, j)] = power;
                power *= u;
            }
        }
        bigx
    }

    /// Scales each column to unit norm in place, returning the scale factors.
    fn scale_columns(matrix: &mut DMatrix<f64>) -> Vec<f64> {
        let mut scales = Vec::with_capacity(matrix.ncols());
        for j in 0..matrix.ncols() {
            let norm = matrix.column(j).norm();
            let scale = if norm > 0.0 { norm } else { 1.0 };
            for i in 0..matrix.nrows() {
                matrix[(i, j)] /= scale;
            }
            scales.push(scale);
        }
        scales
    }

    /// Solves the linear system using SVD.
    fn solve_matrix(matrix: DMatrix<f64>, b: &DVector<f64>) -> Result<Vec<f64>> {
        let size = matrix.shape();

        let decomp = SVD::new_unordered(matrix, true, true);

        // ~= machine_epsilon * max(size) * max_singular
        let max_size = size.0.max(size.1) as f64;
        let sigma_max = decomp.singular_values.max();
        let epsilon = f64::EPSILON * max_size * sigma_max;

        let big_x = decomp.solve(b, epsilon).map_err(Error::Algebra)?;
        let coefficients: Vec<f64> = big_x.iter().copied().collect();

        if coefficients.iter().any(|c| !c.is_finite()) {
            return Err(Error::Algebra("non-finite value in coefficients"));
        }

        Ok(coefficients)
    }

    /// Creates a new polynomial curve fit for the given samples and degree.
    ///
    /// # Parameters
    /// - `x`: Sample positions (e.g. wavelengths).
    /// - `y`: Sample values, same length as `x`.
    /// - `degree`: Desired polynomial degree.
    ///
    /// # Errors
    /// - [`Error::LengthMismatch`]: `x` and `y` differ in length.
    /// - [`Error::InsufficientData`]: fewer than `degree + 1` samples.
    /// - [`Error::Algebra`]: the linear system could not be solved.
    pub fn new(x: &'data [f64], y: &'data [f64], degree: usize) -> Result<Self> {
        ensure_same_len(x.len(), y.len())?;

        let k = degree + 1;
        if x.len() < k {
            return Err(Error::InsufficientData {
                required: k,
                available: x.len(),
            });
        }

        let center = statistics::mean(x.iter().copied());
        let mut matrix = Self::create_matrix(x, center, k);
        let scales = Self::scale_columns(&mut matrix);
        let b = DVector::from_column_slice(y);

        let scaled = Self::solve_matrix(matrix, &b)?;
        let coefficients = scaled.iter().zip(&scales).map(|(c, s)| c / s).collect();

        Ok(Self {
            x,
            y,
            function: Polynomial::new(center, coefficients)?,
        })
    }

    /// The samples this curve was fitted to, as `(x, y)`.
    #[must_use]
    pub fn data(&self) -> (&'data [f64], &'data [f64]) {
        (self.x, self.y)
    }

    /// Degree of the fitted polynomial.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.function.degree()
    }

    /// Coefficients of the fitted polynomial over the centered domain.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.function.coefficients()
    }

    /// Borrow the fitted function.
    #[must_use]
    pub fn polynomial(&self) -> &Polynomial {
        &self.function
    }

    /// Consume the fit, keeping only the fitted function.
    #[must_use]
    pub fn into_polynomial(self) -> Polynomial {
        self.function
    }

    /// Evaluates the fit at `x`.
    #[must_use]
    pub fn y(&self, x: f64) -> f64 {
        self.function.y(x)
    }

    /// Evaluates the fit at every sample position it was fitted to.
    #[must_use]
    pub fn solution(&self) -> Vec<f64> {
        self.function.solve(self.x)
    }

    /// Difference between each sample and the fit, `y - y_fit`.
    #[must_use]
    pub fn residuals(&self) -> Vec<f64> {
        self.y
            .iter()
            .zip(self.x)
            .map(|(y, &x)| y - self.function.y(x))
            .collect()
    }

    /// Proportion of the sample variance explained by the fit.
    ///
    /// See [`statistics::r_squared`].
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        self.function.r_squared(self.x, self.y)
    }

    /// Unbiased estimate of the variance of the residuals.
    ///
    /// See [`statistics::residual_variance`].
    #[must_use]
    pub fn residual_variance(&self) -> f64 {
        statistics::residual_variance(
            self.y.iter().copied(),
            self.solution().into_iter(),
            self.function.coefficients().len(),
        )
    }
}
