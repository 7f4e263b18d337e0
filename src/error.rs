//! Error types for trace correction and metric extraction
//!
//! This module defines the failure modes of the correction and extraction
//! engine, along with a convenient `Result` alias.
//!
//! Every error is raised synchronously at the point of violation. Nothing in
//! this crate retries or swallows an error; batch callers decide whether a
//! failed device is skipped (see [`crate::pipeline::analyze_all`]).

/// Errors that can occur while correcting traces or extracting metrics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Cannot perform the operation because there is no data.
    #[error("No data available")]
    NoData,

    /// Two sequences that must be parallel have different lengths.
    #[error("Length mismatch: expected {expected} values, found {found}")]
    LengthMismatch {
        /// Length of the reference sequence
        expected: usize,
        /// Length of the offending sequence
        found: usize,
    },

    /// Fewer samples than the requested polynomial order or regression needs.
    ///
    /// A polynomial of degree `k` needs at least `k + 1` samples, and a
    /// regression across traces needs at least two traces.
    #[error("Insufficient data: {required} samples required, {available} available")]
    InsufficientData {
        /// Minimum number of samples needed
        required: usize,
        /// Number of samples provided
        available: usize,
    },

    /// The tolerance-gated envelope walk accepted too few points to fit the envelope.
    ///
    /// Usually `tolerance` is too tight for the ripple depth of the reference,
    /// or `segments` is too small for the requested fit order.
    #[error("Envelope walk produced {found} points, at least {required} are needed for the fit")]
    InsufficientEnvelopePoints {
        /// Points accepted by the walk
        found: usize,
        /// Points needed for the envelope fit order
        required: usize,
    },

    /// Traces that are compared or regressed do not share a wavelength grid.
    ///
    /// `index` is the position of the first trace whose grid differs from the first one.
    #[error("Trace {index} does not share the wavelength grid of the first trace")]
    GridMismatch {
        /// Index of the offending trace
        index: usize,
    },

    /// A wavelength expected in meters looks like it was given in nanometers.
    #[error("Wavelength {value} is not a plausible optical wavelength in meters")]
    UnitConvention {
        /// The offending value
        value: f64,
    },

    /// More envelope sampling segments were requested than the trace has samples.
    #[error("Cannot split {samples} samples into {segments} segments")]
    TooManySegments {
        /// Requested number of segments
        segments: usize,
        /// Number of samples in the trace
        samples: usize,
    },

    /// All cutback structures have the same length, so no slope can be regressed.
    #[error("Cutback lengths must contain at least two distinct values")]
    DegenerateLengths,

    /// A configuration value is outside its valid domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Failed to solve the least-squares system.
    ///
    /// Contains a static string describing the solver error.
    #[error("Failed to solve: {0}")]
    Algebra(&'static str),
}

/// Result type for trace correction and metric extraction
pub type Result<T> = std::result::Result<T, Error>;

/// Returns an error if two parallel sequences differ in length.
pub(crate) fn ensure_same_len(expected: usize, found: usize) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(Error::LengthMismatch { expected, found })
    }
}
