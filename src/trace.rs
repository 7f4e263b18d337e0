//! Swept optical measurements
//!
//! A [`Trace`] is one channel of a wavelength sweep: a wavelength axis in
//! nanometers and a value per sample, usually power in dBm. The engine never
//! mutates a trace; corrections return new vectors or new traces.
use crate::{
    error::{ensure_same_len, Error, Result},
    smoothing, statistics,
};

/// Index of the sample closest to `target`.
///
/// Ties resolve to the first such sample. Returns `None` for an empty slice.
///
/// ```rust
/// # use tracefit::trace::nearest_index;
/// assert_eq!(nearest_index(&[1500.0, 1550.0, 1600.0], 1560.0), Some(1));
/// ```
#[must_use]
pub fn nearest_index(values: &[f64], target: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.iter().enumerate() {
        let distance = (v - target).abs();
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((i, distance)),
        }
    }
    best.map(|(i, _)| i)
}

/// A swept measurement: parallel wavelength and value arrays.
///
/// Invariant: `wavelength.len() == value.len() >= 1`.
/// The wavelength axis is expected to be non-decreasing; this is assumed, not checked.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "TraceParts", into = "TraceParts"))]
pub struct Trace {
    wavelength: Vec<f64>,
    value: Vec<f64>,
}
impl Trace {
    /// Creates a trace from a wavelength axis and the values sampled on it.
    ///
    /// # Errors
    /// - [`Error::NoData`] if the trace is empty.
    /// - [`Error::LengthMismatch`] if the arrays differ in length.
    pub fn new(wavelength: Vec<f64>, value: Vec<f64>) -> Result<Self> {
        ensure_same_len(wavelength.len(), value.len())?;
        if wavelength.is_empty() {
            return Err(Error::NoData);
        }
        Ok(Self { wavelength, value })
    }

    /// The wavelength axis, in nanometers.
    #[must_use]
    pub fn wavelength(&self) -> &[f64] {
        &self.wavelength
    }

    /// The sampled values.
    #[must_use]
    pub fn value(&self) -> &[f64] {
        &self.value
    }

    /// The sampled values, for in-place edits. The grid stays fixed.
    pub fn value_mut(&mut self) -> &mut [f64] {
        &mut self.value
    }

    /// Number of samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.wavelength.len()
    }

    /// Always `false`; a trace holds at least one sample.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.wavelength.is_empty()
    }

    /// First and last wavelength of the sweep.
    #[must_use]
    pub fn x_range(&self) -> (f64, f64) {
        let first = self.wavelength.first().copied().unwrap_or(f64::NAN);
        let last = self.wavelength.last().copied().unwrap_or(f64::NAN);
        (first, last)
    }

    /// Largest value, ignoring `NaN`. `NaN` if every value is `NaN`.
    #[must_use]
    pub fn max_value(&self) -> f64 {
        statistics::max(&self.value).unwrap_or(f64::NAN)
    }

    /// Index of the first occurrence of the largest value.
    ///
    /// Falls back to `0` if every value is `NaN`.
    #[must_use]
    pub fn argmax(&self) -> usize {
        statistics::argmax(&self.value).unwrap_or(0)
    }

    /// Index of the sample whose wavelength is closest to `target`.
    #[must_use]
    pub fn nearest_index(&self, target: f64) -> usize {
        nearest_index(&self.wavelength, target).unwrap_or(0)
    }

    /// `true` if both traces were sampled on exactly the same wavelengths.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn same_grid(&self, other: &Trace) -> bool {
        self.wavelength.len() == other.wavelength.len()
            && self
                .wavelength
                .iter()
                .zip(&other.wavelength)
                .all(|(a, b)| a == b)
    }

    /// Checks that `other` shares this trace's wavelength grid.
    ///
    /// # Errors
    /// [`Error::GridMismatch`] with `index = 1`, naming `other` as the offending trace.
    pub fn ensure_same_grid(&self, other: &Trace) -> Result<()> {
        if self.same_grid(other) {
            Ok(())
        } else {
            Err(Error::GridMismatch { index: 1 })
        }
    }

    /// Creates a trace on the same grid with new values.
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] if `values` does not match the grid length.
    pub fn with_values(&self, values: Vec<f64>) -> Result<Self> {
        Self::new(self.wavelength.clone(), values)
    }

    /// Returns a Savitzky-Golay smoothed copy of this trace.
    ///
    /// See [`smoothing::savitzky_golay`].
    ///
    /// # Errors
    /// Fails if the window is invalid for this trace.
    pub fn smoothed(&self, window: usize, order: usize) -> Result<Self> {
        let values = smoothing::savitzky_golay(&self.value, window, order)?;
        self.with_values(values)
    }

    /// Splits the trace into its wavelength and value arrays.
    #[must_use]
    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.wavelength, self.value)
    }
}

/// Checks that every trace shares the first trace's wavelength grid.
///
/// # Errors
/// [`Error::GridMismatch`] naming the first trace that differs.
pub fn ensure_common_grid(traces: &[Trace]) -> Result<()> {
    let Some(first) = traces.first() else {
        return Err(Error::NoData);
    };
    match traces.iter().skip(1).position(|t| !first.same_grid(t)) {
        Some(i) => Err(Error::GridMismatch { index: i + 1 }),
        None => Ok(()),
    }
}

/// Unchecked serialized form of a [`Trace`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct TraceParts {
    wavelength: Vec<f64>,
    value: Vec<f64>,
}

#[cfg(feature = "serde")]
impl TryFrom<TraceParts> for Trace {
    type Error = Error;
    fn try_from(parts: TraceParts) -> Result<Self> {
        Trace::new(parts.wavelength, parts.value)
    }
}

#[cfg(feature = "serde")]
impl From<Trace> for TraceParts {
    fn from(trace: Trace) -> Self {
        let (wavelength, value) = trace.into_parts();
        Self { wavelength, value }
    }
}

/// The result of subtracting a fitted curve from a trace.
///
/// Both arrays have the length of the input trace.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FitResult {
    /// The corrected signal
    pub corrected: Vec<f64>,

    /// The fitted curve that was subtracted
    pub baseline: Vec<f64>,
}
impl FitResult {
    /// Places the corrected values on the grid of `trace`.
    ///
    /// # Errors
    /// [`Error::LengthMismatch`] if `trace` is not the trace this result was computed from.
    pub fn corrected_trace(&self, trace: &Trace) -> Result<Trace> {
        trace.with_values(self.corrected.clone())
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_new_enforces_invariants() {
        assert_eq!(Trace::new(vec![], vec![]), Err(Error::NoData));
        assert_eq!(
            Trace::new(vec![1.0, 2.0], vec![1.0]),
            Err(Error::LengthMismatch {
                expected: 2,
                found: 1
            })
        );

        let trace = Trace::new(vec![1500.0, 1501.0, 1502.0], vec![-3.0, -1.0, -1.0]).unwrap();
        assert_eq!(trace.len(), 3);
        assert!(!trace.is_empty());
        assert_eq!(trace.x_range(), (1500.0, 1502.0));
        assert_eq!(trace.max_value(), -1.0);
        assert_eq!(trace.argmax(), 1);
    }

    #[test]
    fn test_nearest_index() {
        let trace = Trace::new(vec![1500.0, 1500.5, 1501.0], vec![0.0; 3]).unwrap();
        assert_eq!(trace.nearest_index(1500.2), 0);
        assert_eq!(trace.nearest_index(1500.25), 0);
        assert_eq!(trace.nearest_index(1500.3), 1);
        assert_eq!(trace.nearest_index(2000.0), 2);
        assert_eq!(nearest_index(&[], 1.0), None);
    }

    #[test]
    fn test_grid_checks() {
        let a = Trace::new(vec![1.0, 2.0, 3.0], vec![0.0; 3]).unwrap();
        let b = a.with_values(vec![1.0; 3]).unwrap();
        let c = Trace::new(vec![1.0, 2.0, 3.5], vec![0.0; 3]).unwrap();

        assert!(a.same_grid(&b));
        assert!(a.ensure_same_grid(&b).is_ok());
        assert_eq!(a.ensure_same_grid(&c), Err(Error::GridMismatch { index: 1 }));

        assert!(ensure_common_grid(&[a.clone(), b.clone()]).is_ok());
        assert_eq!(
            ensure_common_grid(&[a, b, c]),
            Err(Error::GridMismatch { index: 2 })
        );
        assert_eq!(ensure_common_grid(&[]), Err(Error::NoData));
    }

    #[test]
    fn test_fit_result_to_trace() {
        let trace = Trace::new(vec![1.0, 2.0], vec![5.0, 6.0]).unwrap();
        let result = FitResult {
            corrected: vec![0.0, 1.0],
            baseline: vec![5.0, 5.0],
        };
        let corrected = result.corrected_trace(&trace).unwrap();
        assert_eq!(corrected.value(), &[0.0, 1.0]);
        assert_eq!(corrected.wavelength(), trace.wavelength());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_deserialize_validates() {
        let ok: Trace = serde_json::from_str(r#"{"wavelength":[1.0,2.0],"value":[3.0,4.0]}"#).unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<Trace>(r#"{"wavelength":[1.0,2.0],"value":[3.0]}"#);
        assert!(bad.is_err());
    }
}
