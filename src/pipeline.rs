//! Per-device analysis: one correction followed by the requested metrics
//!
//! An [`AnalysisPlan`] describes what to do with every device of a measurement run.
//! [`analyze`] applies it to one [`Device`]; [`analyze_all`] applies it to a batch,
//! isolating failures so one bad device does not stop the run.
//!
//! ```rust
//! use tracefit::{
//!     metrics::PeakConfig,
//!     pipeline::{analyze_all, AnalysisPlan, Correction, Device},
//!     test::{mzi_transmission_db, wavelength_grid},
//!     units::Meters,
//!     Trace,
//! };
//!
//! let wavelength = wavelength_grid(1540.0, 1560.0, 4001);
//! let power = mzi_transmission_db(&wavelength, 4.2, 100e-6, 30.0);
//! let device = Device::new("mzi_1", Trace::new(wavelength, power).unwrap());
//!
//! let plan = AnalysisPlan::new(Correction::Baseline { order: 2 })
//!     .with_peaks(PeakConfig::default())
//!     .with_delta_length(Meters(100e-6));
//!
//! let outcomes = analyze_all(&plan, &[device]);
//! let report = outcomes[0].result.as_ref().unwrap();
//! assert!(!report.metrics().is_empty());
//! ```
use crate::{
    correction::{baseline_correction, calibrate, calibrate_envelope, EnvelopeConfig},
    error::{Error, Result},
    metrics::{
        bandwidth, extinction_ratio, free_spectral_range, Bandwidth, ExtinctionRatio,
        FreeSpectralRange, Metric, PeakConfig,
    },
    trace::{FitResult, Trace},
    units::Meters,
};

/// The correction applied to each device before metrics are extracted.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Correction {
    /// Use the trace as measured
    #[default]
    None,

    /// [`baseline_correction`] against the trace itself
    Baseline {
        /// Order of the baseline polynomial
        order: usize,
    },

    /// [`calibrate`] against the device's reference trace
    Reference {
        /// Order of the reference polynomial
        order: usize,
    },

    /// [`calibrate_envelope`] against the device's reference trace
    Envelope(EnvelopeConfig),
}

/// What to do with every device of a run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalysisPlan {
    /// Correction applied first
    pub correction: Correction,

    /// Measure the bandwidth at this threshold below the maximum
    pub bandwidth: Option<f64>,

    /// Measure extinction ratio and FSR with this peak configuration
    pub peaks: Option<PeakConfig>,

    /// Derive the group index from the FSR, for this arm length difference
    pub delta_length: Option<Meters>,
}
impl AnalysisPlan {
    /// A plan that only applies `correction`.
    #[must_use]
    pub fn new(correction: Correction) -> Self {
        Self {
            correction,
            ..Self::default()
        }
    }

    /// Also measure the bandwidth at `threshold` below the maximum.
    #[must_use]
    pub fn with_bandwidth(mut self, threshold: f64) -> Self {
        self.bandwidth = Some(threshold);
        self
    }

    /// Also measure extinction ratio and FSR.
    #[must_use]
    pub fn with_peaks(mut self, config: PeakConfig) -> Self {
        self.peaks = Some(config);
        self
    }

    /// Also derive the group index. Implies FSR, with default peaks if none were set.
    #[must_use]
    pub fn with_delta_length(mut self, delta_length: Meters) -> Self {
        self.delta_length = Some(delta_length);
        self
    }

    fn periodic(&self) -> Option<PeakConfig> {
        match (self.peaks, self.delta_length) {
            (Some(config), _) => Some(config),
            (None, Some(_)) => Some(PeakConfig::default()),
            (None, None) => None,
        }
    }
}

/// One device of a run: its measured trace and, if it has one, its reference.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Device {
    /// Name used in reports and logs
    pub id: String,

    /// Measured trace
    pub trace: Trace,

    /// Reference trace on the same sweep
    pub reference: Option<Trace>,
}
impl Device {
    /// A device without a reference.
    pub fn new(id: impl Into<String>, trace: Trace) -> Self {
        Self {
            id: id.into(),
            trace,
            reference: None,
        }
    }

    /// Attaches a reference trace.
    #[must_use]
    pub fn with_reference(mut self, reference: Trace) -> Self {
        self.reference = Some(reference);
        self
    }

    fn reference(&self) -> Result<&Trace> {
        self.reference.as_ref().ok_or(Error::InvalidParameter(
            "correction requires a reference trace",
        ))
    }
}

/// Everything extracted from one device.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceReport {
    /// Device name
    pub id: String,

    /// Trace after correction
    pub corrected: Trace,

    /// Curve that was subtracted, all zeros for [`Correction::None`]
    pub baseline: Vec<f64>,

    /// Present when the plan asked for a bandwidth
    pub bandwidth: Option<Bandwidth>,

    /// Present when the plan asked for periodic metrics
    pub extinction_ratio: Option<ExtinctionRatio>,

    /// Present when the plan asked for periodic metrics
    pub fsr: Option<FreeSpectralRange>,

    /// One value per FSR, present when the plan gave an arm length difference
    pub group_index: Option<Vec<f64>>,
}
impl DeviceReport {
    /// Every extracted value, flattened.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        let mut metrics = vec![];
        if let Some(bw) = &self.bandwidth {
            metrics.push(bw.metric());
        }
        if let Some(er) = &self.extinction_ratio {
            metrics.extend(er.metrics());
        }
        if let Some(fsr) = &self.fsr {
            metrics.extend(fsr.metrics());
            if let Some(ng) = &self.group_index {
                metrics.extend(
                    fsr.wavelength
                        .iter()
                        .zip(ng)
                        .map(|(&wavelength, &value)| Metric::GroupIndex { wavelength, value }),
                );
            }
        }
        metrics
    }
}

/// The outcome of analyzing one device in a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct DeviceOutcome {
    /// Device name
    pub id: String,

    /// The report, or the error that stopped this device
    pub result: Result<DeviceReport>,
}

/// Corrects one device and extracts the metrics `plan` asks for.
///
/// # Errors
/// - [`Error::InvalidParameter`] if the correction needs a reference and the device has none.
/// - [`Error::GridMismatch`] if the reference is not on the trace's grid.
/// - Any error of the correction or of an extractor.
pub fn analyze(plan: &AnalysisPlan, device: &Device) -> Result<DeviceReport> {
    let trace = &device.trace;
    let fit = match &plan.correction {
        Correction::None => FitResult {
            corrected: trace.value().to_vec(),
            baseline: vec![0.0; trace.len()],
        },
        Correction::Baseline { order } => baseline_correction(trace, *order)?,
        Correction::Reference { order } => calibrate(trace, device.reference()?, *order)?,
        Correction::Envelope(config) => {
            let reference = device.reference()?;
            reference.ensure_same_grid(trace)?;
            calibrate_envelope(trace.wavelength(), reference.value(), trace.value(), config)?
                .into_fit_result()
        }
    };
    let corrected = fit.corrected_trace(trace)?;

    let bandwidth = plan
        .bandwidth
        .map(|threshold| bandwidth(&corrected, threshold))
        .transpose()?;

    let (extinction_ratio, fsr, group_index) = match plan.periodic() {
        Some(config) => {
            let er = extinction_ratio(&corrected, &config)?;
            let fsr = free_spectral_range(&corrected, &config)?;
            let ng = plan
                .delta_length
                .map(|delta_length| fsr.group_index(delta_length))
                .transpose()?;
            (Some(er), Some(fsr), ng)
        }
        None => (None, None, None),
    };

    Ok(DeviceReport {
        id: device.id.clone(),
        corrected,
        baseline: fit.baseline,
        bandwidth,
        extinction_ratio,
        fsr,
        group_index,
    })
}

/// Runs [`analyze`] over a batch of devices.
///
/// Failed devices are logged and reported in their outcome; the rest of the batch
/// still runs. Outcomes are in the order of `devices`.
#[must_use]
pub fn analyze_all(plan: &AnalysisPlan, devices: &[Device]) -> Vec<DeviceOutcome> {
    #[cfg(feature = "parallel")]
    use rayon::prelude::*;

    #[cfg(not(feature = "parallel"))]
    let devices = devices.iter();
    #[cfg(feature = "parallel")]
    let devices = devices.into_par_iter();

    devices
        .map(|device| {
            let result = analyze(plan, device);
            if let Err(e) = &result {
                log::warn!("device {} skipped: {e}", device.id);
            }
            DeviceOutcome {
                id: device.id.clone(),
                result,
            }
        })
        .collect()
}
