//! Metrics of periodic responses such as unbalanced MZIs and ring resonators
use crate::{
    error::{ensure_same_len, Error, Result},
    metrics::{
        peaks::{find_peaks, find_troughs, PeakConfig},
        Metric,
    },
    trace::Trace,
    units::{to_meters, Meters},
};

/// Any wavelength above this, in meters, was almost certainly given in nanometers.
const MAX_OPTICAL_WAVELENGTH: Meters = Meters(1e-3);

/// Extinction ratio of each fringe.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtinctionRatio {
    /// Wavelength of each fringe peak
    pub wavelength: Vec<f64>,

    /// Peak value minus trough value, one per pair
    pub value: Vec<f64>,

    /// Sample index of each peak
    pub peak_index: Vec<usize>,

    /// Sample index of the trough each peak was paired with
    pub trough_index: Vec<usize>,
}
impl ExtinctionRatio {
    /// One metric per fringe.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        self.wavelength
            .iter()
            .zip(&self.value)
            .map(|(&wavelength, &value)| Metric::ExtinctionRatio { wavelength, value })
            .collect()
    }

    /// The coupler splitting ratio implied by each extinction ratio.
    ///
    /// See [`splitting_ratio`].
    #[must_use]
    pub fn splitting_ratios(&self) -> Vec<f64> {
        self.value.iter().map(|&er| splitting_ratio(er)).collect()
    }
}

/// Measures the extinction ratio of every fringe of a periodic trace.
///
/// Peaks and troughs are detected independently, then the i-th peak is paired
/// with the i-th trough in detection order. This assumes the trace starts with
/// a peak, or at least that peaks and troughs alternate from the first one found.
/// Unpaired extras at the end are dropped.
///
/// # Errors
/// [`Error::InvalidParameter`] if `config` is invalid.
///
/// # Example
/// ```rust
/// # use tracefit::{metrics::{extinction_ratio, PeakConfig}, test::{mzi_transmission_db, wavelength_grid}, Trace};
/// let wavelength = wavelength_grid(1540.0, 1560.0, 4001);
/// let power = mzi_transmission_db(&wavelength, 4.2, 100e-6, 25.0);
/// let trace = Trace::new(wavelength, power).unwrap();
///
/// let er = extinction_ratio(&trace, &PeakConfig::default()).unwrap();
/// assert!(er.value.iter().all(|v| (v - 25.0).abs() < 0.5));
/// ```
pub fn extinction_ratio(trace: &Trace, config: &PeakConfig) -> Result<ExtinctionRatio> {
    config.validate()?;

    let values = trace.value();
    let peaks = find_peaks(values, config);
    let troughs = find_troughs(values, config);

    if peaks.len() != troughs.len() {
        log::debug!(
            "extinction ratio: {} peaks and {} troughs, pairing the first {}",
            peaks.len(),
            troughs.len(),
            peaks.len().min(troughs.len())
        );
    }

    let mut result = ExtinctionRatio::default();
    for (peak, trough) in peaks.iter().zip(&troughs) {
        result.wavelength.push(trace.wavelength()[peak.index]);
        result.value.push(peak.value - trough.value);
        result.peak_index.push(peak.index);
        result.trough_index.push(trough.index);
    }
    Ok(result)
}

/// Free spectral range between consecutive troughs.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FreeSpectralRange {
    /// Midpoint wavelength of each pair of consecutive troughs
    pub wavelength: Vec<f64>,

    /// Spacing of each pair of consecutive troughs
    pub value: Vec<f64>,

    /// Sample index of every detected trough
    pub trough_index: Vec<usize>,
}
impl FreeSpectralRange {
    /// One metric per trough pair.
    #[must_use]
    pub fn metrics(&self) -> Vec<Metric> {
        self.wavelength
            .iter()
            .zip(&self.value)
            .map(|(&wavelength, &value)| Metric::Fsr { wavelength, value })
            .collect()
    }

    /// Group index at each FSR value, for an arm length difference of `delta_length`.
    ///
    /// Converts this FSR from nanometers to meters before calling [`group_index`].
    ///
    /// # Errors
    /// See [`group_index`].
    pub fn group_index(&self, delta_length: Meters) -> Result<Vec<f64>> {
        group_index(&to_meters(&self.wavelength), &to_meters(&self.value), delta_length)
    }

    /// [`FreeSpectralRange::group_index`] as metrics.
    ///
    /// # Errors
    /// See [`group_index`].
    pub fn group_index_metrics(&self, delta_length: Meters) -> Result<Vec<Metric>> {
        let ng = self.group_index(delta_length)?;
        Ok(self
            .wavelength
            .iter()
            .zip(ng)
            .map(|(&wavelength, value)| Metric::GroupIndex { wavelength, value })
            .collect())
    }
}

/// Measures the spacing between consecutive troughs of a periodic trace.
///
/// Troughs are sharper than peaks in dB, so they locate each period more precisely.
///
/// # Errors
/// [`Error::InvalidParameter`] if `config` is invalid.
pub fn free_spectral_range(trace: &Trace, config: &PeakConfig) -> Result<FreeSpectralRange> {
    config.validate()?;

    let wavelength = trace.wavelength();
    let troughs = find_troughs(trace.value(), config);

    let mut result = FreeSpectralRange {
        trough_index: troughs.iter().map(|t| t.index).collect(),
        ..FreeSpectralRange::default()
    };
    for pair in troughs.windows(2) {
        let (a, b) = (wavelength[pair[0].index], wavelength[pair[1].index]);
        result.wavelength.push((a + b) / 2.0);
        result.value.push((b - a).abs());
    }
    Ok(result)
}

/// Group index from the free spectral range of an unbalanced MZI.
///
/// All lengths are in meters; use [`FreeSpectralRange::group_index`] to start from nanometers.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// FSR_Hz = FSR · c / λ²
/// ng     = c / (ΔL · FSR_Hz)
/// ```
/// </div>
///
/// # Errors
/// - [`Error::LengthMismatch`] if `wavelength` and `fsr` differ in length.
/// - [`Error::UnitConvention`] if a wavelength or FSR is above 1 mm, i.e. was not converted from nanometers.
/// - [`Error::InvalidParameter`] if `delta_length`, a wavelength or an FSR is not positive.
///
/// # Example
/// ```rust
/// # use tracefit::{metrics::group_index, units::Meters};
/// let ng = group_index(&[Meters(1.55e-6)], &[Meters(5.72e-9)], Meters(100e-6)).unwrap();
/// assert!((ng[0] - 4.2).abs() < 0.01);
/// ```
pub fn group_index(wavelength: &[Meters], fsr: &[Meters], delta_length: Meters) -> Result<Vec<f64>> {
    ensure_same_len(wavelength.len(), fsr.len())?;
    if !delta_length.value().is_finite() || delta_length.value() <= 0.0 {
        return Err(Error::InvalidParameter("delta length must be positive"));
    }

    wavelength
        .iter()
        .zip(fsr)
        .map(|(&lambda, &fsr)| {
            for length in [lambda, fsr] {
                if length > MAX_OPTICAL_WAVELENGTH {
                    return Err(Error::UnitConvention {
                        value: length.value(),
                    });
                }
                if length.value().is_nan() || length.value() <= 0.0 {
                    return Err(Error::InvalidParameter(
                        "wavelength and FSR must be positive",
                    ));
                }
            }

            let c = crate::units::SPEED_OF_LIGHT;
            let fsr_hz = fsr.value() * c / lambda.value().powi(2);
            Ok(c / (delta_length.value() * fsr_hz))
        })
        .collect()
}

/// Power splitting ratio of the couplers of an MZI with the given extinction ratio, in dB.
///
/// <div class="warning">
///
/// **Technical Details**
///
/// ```math
/// κ = 0.5 + 0.5 · sqrt(10^(-ER / 10))
/// ```
/// The other branch of the solution, `1 - κ`, describes the complementary port.
/// </div>
#[must_use]
pub fn splitting_ratio(extinction_ratio: f64) -> f64 {
    0.5 + 0.5 * 10f64.powf(-extinction_ratio / 10.0).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assert_close,
        test::{mzi_transmission_db, wavelength_grid},
        units::Nanometers,
    };

    fn mzi_trace(extinction: f64) -> Trace {
        let wavelength = wavelength_grid(1500.0, 1600.0, 10_001);
        let power = mzi_transmission_db(&wavelength, 4.2, 100e-6, extinction);
        Trace::new(wavelength, power).unwrap()
    }

    #[test]
    fn test_group_index_round_trip() {
        let trace = mzi_trace(30.0);

        let fsr = free_spectral_range(&trace, &PeakConfig::default()).unwrap();
        assert!(fsr.value.len() > 10);
        for v in &fsr.value {
            // λ² / (ng ΔL) ≈ 5.7 nm across the band
            assert!((5.0..6.5).contains(v), "fsr {v}");
        }

        let ng = fsr.group_index(Nanometers(100e3).to_meters()).unwrap();
        assert_eq!(ng.len(), fsr.value.len());
        for n in &ng {
            assert_close!(*n, 4.2, tol = 0.05);
        }

        let metrics = fsr.group_index_metrics(Meters(100e-6)).unwrap();
        assert_eq!(metrics.len(), ng.len());
        assert_eq!(fsr.metrics().len(), ng.len());
        assert_eq!(fsr.trough_index.len(), ng.len() + 1);
    }

    #[test]
    fn test_extinction_ratio_pairs_by_order() {
        let trace = mzi_trace(20.0);
        let er = extinction_ratio(&trace, &PeakConfig::default()).unwrap();

        assert!(!er.value.is_empty());
        for v in &er.value {
            assert_close!(*v, 20.0, tol = 0.2);
        }
        assert_eq!(er.peak_index.len(), er.trough_index.len());
        assert_eq!(er.metrics().len(), er.value.len());

        let ratios = er.splitting_ratios();
        assert!(ratios.iter().all(|k| (0.5..0.6).contains(k)));
    }

    #[test]
    fn test_unpaired_extras_are_dropped() {
        // Three troughs, two peaks
        let y = [0.0, -10.0, 0.0, -10.0, 0.0, -10.0, 0.0];
        let trace = Trace::new(wavelength_grid(1.0, 7.0, 7), y.to_vec()).unwrap();
        let er = extinction_ratio(&trace, &PeakConfig::default()).unwrap();
        assert_eq!(er.peak_index, vec![2, 4]);
        assert_eq!(er.trough_index, vec![1, 3]);
        assert_eq!(er.value, vec![10.0, 10.0]);
    }

    #[test]
    fn test_unit_convention_guard() {
        let err = group_index(&[Meters(1550.0)], &[Meters(5.7e-9)], Meters(100e-6));
        assert_eq!(err, Err(Error::UnitConvention { value: 1550.0 }));

        let err = group_index(&[Meters(1.55e-6)], &[Meters(5.7)], Meters(100e-6));
        assert_eq!(err, Err(Error::UnitConvention { value: 5.7 }));

        assert!(matches!(
            group_index(&[Meters(1.55e-6)], &[Meters(5.7e-9)], Meters(0.0)),
            Err(Error::InvalidParameter(_))
        ));
        assert!(matches!(
            group_index(&[Meters(1.55e-6)], &[Meters(0.0)], Meters(1e-4)),
            Err(Error::InvalidParameter(_))
        ));
        assert_eq!(
            group_index(&[Meters(1.55e-6)], &[], Meters(1e-4)),
            Err(Error::LengthMismatch {
                expected: 1,
                found: 0
            })
        );
    }

    #[test]
    fn test_splitting_ratio() {
        // Infinite extinction means a perfect 50/50 coupler
        assert_close!(splitting_ratio(f64::INFINITY), 0.5);
        assert_close!(splitting_ratio(0.0), 1.0);
        assert_close!(splitting_ratio(20.0), 0.55, tol = 1e-12);
    }
}
