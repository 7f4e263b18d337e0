//! Peak and trough detection
//!
//! Detection runs in three passes, matching the behavior of `scipy.signal.find_peaks`
//! with the `distance` and `prominence` arguments:
//! 1. Local maxima. A flat plateau counts once, at its middle sample. The first and
//!    last samples are never peaks.
//! 2. Distance. Peaks closer than `distance` samples to a higher peak are dropped,
//!    highest peaks first.
//! 3. Prominence. Each survivor's topographic prominence must reach `prominence`.
use crate::error::{Error, Result};

/// Prominence, in dB, a fringe must have to be detected unless stated otherwise.
pub const DEFAULT_PROMINENCE: f64 = 3.0;

/// Peak detection parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PeakConfig {
    /// Minimum topographic prominence of a peak
    pub prominence: f64,

    /// Minimum spacing between peaks, in samples
    pub distance: usize,
}
impl Default for PeakConfig {
    fn default() -> Self {
        Self {
            prominence: DEFAULT_PROMINENCE,
            distance: 1,
        }
    }
}
impl PeakConfig {
    /// Creates a configuration with the given prominence and no spacing constraint.
    #[must_use]
    pub fn new(prominence: f64) -> Self {
        Self {
            prominence,
            ..Self::default()
        }
    }

    /// Sets the minimum spacing between peaks, in samples.
    #[must_use]
    pub fn with_distance(mut self, distance: usize) -> Self {
        self.distance = distance;
        self
    }

    /// Checks that the configuration can be used.
    ///
    /// # Errors
    /// [`Error::InvalidParameter`] if `prominence` is negative or `NaN`.
    pub fn validate(&self) -> Result<()> {
        if self.prominence.is_nan() || self.prominence < 0.0 {
            return Err(Error::InvalidParameter(
                "peak prominence must be zero or positive",
            ));
        }
        Ok(())
    }
}

/// A detected peak or trough.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Peak {
    /// Sample index
    pub index: usize,

    /// Sample value
    pub value: f64,

    /// Height above the higher of its two bases; always positive, troughs included
    pub prominence: f64,

    /// Index of the lowest point between the peak and the next higher sample to its left
    pub left_base: usize,

    /// Index of the lowest point between the peak and the next higher sample to its right
    pub right_base: usize,
}

/// Finds the peaks of `values`.
///
/// Peaks are returned in ascending index order.
///
/// ```rust
/// # use tracefit::metrics::{find_peaks, PeakConfig};
/// let y = [0.0, 5.0, 1.0, 2.0, 1.5, 6.0, 0.0];
/// let peaks = find_peaks(&y, &PeakConfig::new(3.0));
/// let idx: Vec<usize> = peaks.iter().map(|p| p.index).collect();
/// assert_eq!(idx, vec![1, 5]);
/// ```
#[must_use]
pub fn find_peaks(values: &[f64], config: &PeakConfig) -> Vec<Peak> {
    let candidates = local_maxima(values);
    let candidates = select_by_distance(values, candidates, config.distance);

    candidates
        .into_iter()
        .filter_map(|index| {
            let (prominence, left_base, right_base) = prominence(values, index);
            (prominence >= config.prominence).then_some(Peak {
                index,
                value: values[index],
                prominence,
                left_base,
                right_base,
            })
        })
        .collect()
}

/// Finds the troughs of `values`: the peaks of `-values`.
///
/// Reported values are the original, un-negated samples.
#[must_use]
pub fn find_troughs(values: &[f64], config: &PeakConfig) -> Vec<Peak> {
    let negated: Vec<f64> = values.iter().map(|v| -v).collect();
    find_peaks(&negated, config)
        .into_iter()
        .map(|p| Peak {
            value: values[p.index],
            ..p
        })
        .collect()
}

/// Strict local maxima, with plateaus reduced to their middle sample.
#[allow(clippy::float_cmp)]
fn local_maxima(values: &[f64]) -> Vec<usize> {
    let mut maxima = vec![];
    if values.len() < 3 {
        return maxima;
    }

    let last = values.len() - 1;
    let mut i = 1;
    while i < last {
        if values[i - 1] < values[i] {
            let mut ahead = i + 1;
            while ahead < last && values[ahead] == values[i] {
                ahead += 1;
            }

            if values[ahead] < values[i] {
                let right_edge = ahead - 1;
                maxima.push((i + right_edge) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Drops peaks within `distance` samples of a higher peak, highest first.
fn select_by_distance(values: &[f64], peaks: Vec<usize>, distance: usize) -> Vec<usize> {
    if distance <= 1 || peaks.len() < 2 {
        return peaks;
    }

    let mut keep = vec![true; peaks.len()];
    let mut priority: Vec<usize> = (0..peaks.len()).collect();
    priority.sort_by(|&a, &b| values[peaks[a]].total_cmp(&values[peaks[b]]));

    for &j in priority.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, k)| k.then_some(p))
        .collect()
}

/// Topographic prominence of the peak at `index`, with its left and right bases.
///
/// Each side is searched outward until a strictly higher sample or the end of the data;
/// the base on that side is the minimum passed on the way.
fn prominence(values: &[f64], index: usize) -> (f64, usize, usize) {
    let height = values[index];

    let mut left_base = index;
    let mut left_min = height;
    for i in (0..=index).rev() {
        if values[i] > height {
            break;
        }
        if values[i] < left_min {
            left_min = values[i];
            left_base = i;
        }
    }

    let mut right_base = index;
    let mut right_min = height;
    for i in index..values.len() {
        if values[i] > height {
            break;
        }
        if values[i] < right_min {
            right_min = values[i];
            right_base = i;
        }
    }

    (height - left_min.max(right_min), left_base, right_base)
}
