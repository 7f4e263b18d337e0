//! Envelope calibration with a tolerance-gated walk
//!
//! Some references cannot be fitted directly: a loopback with Bragg dips, or a
//! ring drop port, has narrow features that drag a polynomial away from the
//! envelope you actually want to remove. This module samples the reference
//! coarsely, walks the samples keeping only those consistent with a running
//! envelope estimate, fits the survivors, and subtracts that fit.
//!
//! # The walk
//! The walk is an explicit state machine, [`EnvelopeWalker`]. It holds a
//! `tracker` (the last trusted envelope level) and the points accepted so far.
//! For each sample it makes one [`Decision`]:
//!
//! | Condition | Decision | Effect |
//! |---|---|---|
//! | `\|y - tracker\| < tol` | [`Decision::Accept`] | point joins the envelope, `tracker = y` |
//! | `\|y - oracle(x)\| < tol` | [`Decision::Resync`] | `tracker = y`, point not kept |
//! | otherwise | [`Decision::Reject`] | nothing kept, walker is resynchronizing |
//!
//! The oracle is a low order polynomial fitted through the accepted points. It lets
//! the walk follow a steep but genuine envelope slope instead of losing track.
//!
//! ```rust
//! use tracefit::correction::{calibrate_envelope, EnvelopeConfig};
//! use tracefit::test::{dipped_reference, wavelength_grid};
//!
//! let wavelength = wavelength_grid(1500.0, 1600.0, 2001);
//! let (reference, _) = dipped_reference(&wavelength, |l| -10.0 - 0.001 * (l - 1550.0).powi(2), &[1520.0, 1580.0], 8.0, 0.1);
//!
//! let config = EnvelopeConfig::new(1.0, 50);
//! let result = calibrate_envelope(&wavelength, &reference, &reference, &config).unwrap();
//! assert!(result.points.len() >= 9);
//! ```
use crate::{
    error::{ensure_same_len, Error, Result},
    fit::polyfit,
    trace::FitResult,
};

/// Polynomial order of the final envelope fit unless stated otherwise.
pub const DEFAULT_ENVELOPE_FIT_ORDER: usize = 8;

/// Polynomial order of the walk's oracle unless stated otherwise.
pub const DEFAULT_ORACLE_ORDER: usize = 3;

/// Order in which the coarse samples are walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkDirection {
    /// From the first sample towards the last.
    #[default]
    Left,

    /// From the last sample towards the first.
    Right,

    /// Both walks, keeping every sample either of them accepted.
    ///
    /// Useful when one end of the sweep starts inside a dip, which would
    /// otherwise anchor the tracker on the wrong level.
    Both,
}

/// Parameters of an envelope calibration.
///
/// `tolerance` and `segments` depend on the ripple depth and feature density
/// of each reference, so they have no defaults and must be given to [`EnvelopeConfig::new`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeConfig {
    /// Largest level change, in the units of the trace, still treated as envelope
    pub tolerance: f64,

    /// Number of coarse samples taken from the reference
    pub segments: usize,

    /// Order of the polynomial fitted through the envelope points
    #[cfg_attr(feature = "serde", serde(default = "default_fit_order"))]
    pub fit_order: usize,

    /// Highest order of the oracle used to resynchronize the walk
    #[cfg_attr(feature = "serde", serde(default = "default_oracle_order"))]
    pub oracle_order: usize,

    /// Order in which the samples are walked
    #[cfg_attr(feature = "serde", serde(default))]
    pub direction: WalkDirection,
}

#[cfg(feature = "serde")]
fn default_fit_order() -> usize {
    DEFAULT_ENVELOPE_FIT_ORDER
}

#[cfg(feature = "serde")]
fn default_oracle_order() -> usize {
    DEFAULT_ORACLE_ORDER
}

impl EnvelopeConfig {
    /// Creates a configuration with the default fit order, oracle order and direction.
    #[must_use]
    pub fn new(tolerance: f64, segments: usize) -> Self {
        Self {
            tolerance,
            segments,
            fit_order: DEFAULT_ENVELOPE_FIT_ORDER,
            oracle_order: DEFAULT_ORACLE_ORDER,
            direction: WalkDirection::default(),
        }
    }

    /// Sets the order of the final envelope fit.
    #[must_use]
    pub fn with_fit_order(mut self, order: usize) -> Self {
        self.fit_order = order;
        self
    }

    /// Sets the highest oracle order. Orders 2 and 3 work well in practice.
    #[must_use]
    pub fn with_oracle_order(mut self, order: usize) -> Self {
        self.oracle_order = order;
        self
    }

    /// Sets the walk direction.
    #[must_use]
    pub fn with_direction(mut self, direction: WalkDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `tolerance` is not a positive finite number or `segments` is 0.
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter(
                "envelope tolerance must be positive and finite",
            ));
        }
        if self.segments == 0 {
            return Err(Error::InvalidParameter(
                "envelope segments must be at least 1",
            ));
        }
        Ok(())
    }
}

/// One coarse sample of the reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    /// Index of the sample in the full trace
    pub index: usize,

    /// Wavelength of the sample
    pub x: f64,

    /// Reference value of the sample
    pub y: f64,
}

/// Samples selected as belonging to the envelope, in walk order.
///
/// [`WalkDirection::Both`] walks produce points sorted by sample index.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopePoints {
    /// Index of each point in the full trace
    pub index: Vec<usize>,

    /// Wavelength of each point
    pub x: Vec<f64>,

    /// Reference value of each point
    pub y: Vec<f64>,
}
impl EnvelopePoints {
    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if the walk kept nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    fn push(&mut self, sample: Sample) {
        self.index.push(sample.index);
        self.x.push(sample.x);
        self.y.push(sample.y);
    }

    /// Union of two point sets, sorted and deduplicated by sample index.
    #[must_use]
    pub fn merge(&self, other: &EnvelopePoints) -> EnvelopePoints {
        let mut all: Vec<Sample> = self.samples().chain(other.samples()).collect();
        all.sort_by_key(|s| s.index);
        all.dedup_by_key(|s| s.index);

        let mut merged = EnvelopePoints::default();
        for sample in all {
            merged.push(sample);
        }
        merged
    }

    fn samples(&self) -> impl Iterator<Item = Sample> + '_ {
        self.index
            .iter()
            .zip(&self.x)
            .zip(&self.y)
            .map(|((&index, &x), &y)| Sample { index, x, y })
    }
}

/// State of an [`EnvelopeWalker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkMode {
    /// The last sample was accepted or resynchronized the tracker.
    Accumulating,

    /// The last sample was rejected; the walker is waiting to regain the envelope.
    Resynchronizing,
}

/// Outcome of classifying one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The sample is within tolerance of the tracker and joins the envelope.
    Accept,

    /// The sample agrees with the oracle; it moves the tracker but is not kept.
    Resync,

    /// The sample is neither near the tracker nor the oracle.
    Reject,
}

/// The tolerance-gated walk as a state machine.
///
/// [`EnvelopeWalker::classify`] is pure; [`EnvelopeWalker::push`] classifies and
/// applies the transition. The tracker starts at the level it is created with,
/// normally the first sample of the walk.
#[derive(Debug, Clone)]
pub struct EnvelopeWalker {
    tolerance: f64,
    oracle_order: usize,
    tracker: f64,
    mode: WalkMode,
    points: EnvelopePoints,
    resynced: usize,
    rejected: usize,
}
impl EnvelopeWalker {
    /// Creates a walker whose tracker starts at `tracker`.
    #[must_use]
    pub fn new(tracker: f64, tolerance: f64, oracle_order: usize) -> Self {
        Self {
            tolerance,
            oracle_order,
            tracker,
            mode: WalkMode::Accumulating,
            points: EnvelopePoints::default(),
            resynced: 0,
            rejected: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn mode(&self) -> WalkMode {
        self.mode
    }

    /// Last trusted envelope level.
    #[must_use]
    pub fn tracker(&self) -> f64 {
        self.tracker
    }

    /// Points accepted so far.
    #[must_use]
    pub fn points(&self) -> &EnvelopePoints {
        &self.points
    }

    /// Decides what to do with `sample`, without changing the walker.
    ///
    /// The oracle has order `min(oracle_order, accepted - 1)`, so it degrades to a
    /// line or a constant early in the walk. Before any point is accepted there is
    /// no oracle, and a sample outside tolerance is rejected.
    ///
    /// # Errors
    /// [`Error::Algebra`] if the oracle fit fails.
    pub fn classify(&self, sample: Sample) -> Result<Decision> {
        if (sample.y - self.tracker).abs() < self.tolerance {
            return Ok(Decision::Accept);
        }

        let accepted = self.points.len();
        if accepted == 0 {
            return Ok(Decision::Reject);
        }

        let order = self.oracle_order.min(accepted - 1);
        let oracle = polyfit(&self.points.x, &self.points.y, order)?;
        if (sample.y - oracle.y(sample.x)).abs() < self.tolerance {
            Ok(Decision::Resync)
        } else {
            Ok(Decision::Reject)
        }
    }

    /// Classifies `sample` and applies the resulting transition.
    ///
    /// # Errors
    /// See [`EnvelopeWalker::classify`].
    pub fn push(&mut self, sample: Sample) -> Result<Decision> {
        let decision = self.classify(sample)?;
        log::trace!(
            "envelope sample {} at {}: {decision:?}",
            sample.index,
            sample.x
        );

        match decision {
            Decision::Accept => {
                self.points.push(sample);
                self.tracker = sample.y;
                self.mode = WalkMode::Accumulating;
            }
            Decision::Resync => {
                self.tracker = sample.y;
                self.mode = WalkMode::Accumulating;
                self.resynced += 1;
            }
            Decision::Reject => {
                self.mode = WalkMode::Resynchronizing;
                self.rejected += 1;
            }
        }
        Ok(decision)
    }

    /// Ends the walk, returning the accepted points.
    #[must_use]
    pub fn finish(self) -> EnvelopePoints {
        log::debug!(
            "envelope walk kept {} points ({} resynced, {} rejected)",
            self.points.len(),
            self.resynced,
            self.rejected
        );
        self.points
    }
}

/// Takes `segments` evenly spaced samples from the reference.
///
/// Samples sit at indices `i * floor(len / segments)`.
///
/// # Errors
/// - [`Error::LengthMismatch`] if the arrays differ in length.
/// - [`Error::TooManySegments`] if `segments` exceeds the number of samples.
pub fn coarse_samples(wavelength: &[f64], reference: &[f64], segments: usize) -> Result<Vec<Sample>> {
    ensure_same_len(wavelength.len(), reference.len())?;

    let step = if segments == 0 {
        0
    } else {
        wavelength.len() / segments
    };
    if step == 0 {
        return Err(Error::TooManySegments {
            segments,
            samples: wavelength.len(),
        });
    }

    Ok((0..segments)
        .map(|i| {
            let index = i * step;
            Sample {
                index,
                x: wavelength[index],
                y: reference[index],
            }
        })
        .collect())
}

/// Runs one walk over `samples` in the order given.
fn walk<'a>(
    samples: impl Iterator<Item = &'a Sample>,
    config: &EnvelopeConfig,
) -> Result<EnvelopePoints> {
    let mut samples = samples.peekable();
    let Some(first) = samples.peek() else {
        return Ok(EnvelopePoints::default());
    };

    let mut walker = EnvelopeWalker::new(first.y, config.tolerance, config.oracle_order);
    for sample in samples {
        walker.push(*sample)?;
    }
    Ok(walker.finish())
}

/// Selects envelope points from coarse samples of the reference.
///
/// # Errors
/// See [`coarse_samples`] and [`EnvelopeWalker::classify`].
pub fn envelope_points(
    wavelength: &[f64],
    reference: &[f64],
    config: &EnvelopeConfig,
) -> Result<EnvelopePoints> {
    config.validate()?;
    let samples = coarse_samples(wavelength, reference, config.segments)?;

    match config.direction {
        WalkDirection::Left => walk(samples.iter(), config),
        WalkDirection::Right => walk(samples.iter().rev(), config),
        WalkDirection::Both => {
            let forward = walk(samples.iter(), config)?;
            let backward = walk(samples.iter().rev(), config)?;
            Ok(forward.merge(&backward))
        }
    }
}

/// The result of an envelope calibration.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnvelopeCalibration {
    /// Input values with the envelope removed
    pub corrected: Vec<f64>,

    /// Reference values with the envelope removed
    pub corrected_reference: Vec<f64>,

    /// Envelope polynomial evaluated over the full wavelength grid
    pub envelope_fit: Vec<f64>,

    /// Points the envelope was fitted through
    pub points: EnvelopePoints,
}
impl EnvelopeCalibration {
    /// The corrected input and the envelope that was removed from it.
    #[must_use]
    pub fn into_fit_result(self) -> FitResult {
        FitResult {
            corrected: self.corrected,
            baseline: self.envelope_fit,
        }
    }
}

/// Calibrates `input` by the envelope of `reference`.
///
/// 1. Samples the reference at `config.segments` evenly spaced indices.
/// 2. Walks the samples in `config.direction` with an [`EnvelopeWalker`].
/// 3. Fits a polynomial of `config.fit_order` through the accepted points.
/// 4. Subtracts the fit, evaluated on the full grid, from both `input` and `reference`.
///
/// # Errors
/// - [`Error::InvalidParameter`] for an invalid configuration.
/// - [`Error::LengthMismatch`] if the three arrays differ in length.
/// - [`Error::TooManySegments`] if there are fewer samples than segments.
/// - [`Error::InsufficientEnvelopePoints`] if the walk kept fewer than `fit_order + 1` points.
/// - [`Error::Algebra`] if a fit fails.
pub fn calibrate_envelope(
    wavelength: &[f64],
    reference: &[f64],
    input: &[f64],
    config: &EnvelopeConfig,
) -> Result<EnvelopeCalibration> {
    ensure_same_len(wavelength.len(), input.len())?;
    let points = envelope_points(wavelength, reference, config)?;

    let required = config.fit_order + 1;
    if points.len() < required {
        return Err(Error::InsufficientEnvelopePoints {
            found: points.len(),
            required,
        });
    }

    let envelope = polyfit(&points.x, &points.y, config.fit_order)?;
    let envelope_fit = envelope.solve(wavelength);

    let corrected = input.iter().zip(&envelope_fit).map(|(v, e)| v - e).collect();
    let corrected_reference = reference
        .iter()
        .zip(&envelope_fit)
        .map(|(v, e)| v - e)
        .collect();

    Ok(EnvelopeCalibration {
        corrected,
        corrected_reference,
        envelope_fit,
        points,
    })
}
