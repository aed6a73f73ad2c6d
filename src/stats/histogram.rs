use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use super::{StatsError, StatsResult};

/// Upper bound on the number of bins a layout may allocate.
pub const MAX_BINS: usize = 1 << 20;

/// How to partition `[min, max]` of the data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Binning {
    /// Fixed number of equal-width bins.
    Count(usize),
    /// Fixed bin width; as many bins as needed to reach the maximum.
    Width(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub center: f64,
    pub count: usize,
}

/// Bin placement over the finite values of a sample.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BinLayout {
    pub start: f64,
    pub width: f64,
    pub bins: usize,
}

impl BinLayout {
    /// `None` when `data` has no finite value.
    pub(crate) fn for_data(data: &[f64], binning: Binning) -> StatsResult<Option<Self>> {
        match binning {
            Binning::Count(0) => {
                return Err(StatsError::InvalidBinning {
                    reason: "bin count must be at least 1".to_string(),
                });
            }
            Binning::Width(w) if !w.is_finite() || w <= 0.0 => {
                return Err(StatsError::InvalidBinning {
                    reason: format!("bin width must be finite and positive: {w}"),
                });
            }
            _ => {}
        }

        let mut finite = data.iter().copied().filter(|x| x.is_finite());
        let Some(first) = finite.next() else {
            return Ok(None);
        };
        let (min, max) = finite.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x)));
        let range = max - min;
        if !range.is_finite() {
            return Err(StatsError::InvalidBinning {
                reason: format!("data range [{min}, {max}] overflows"),
            });
        }
        if range == 0.0 {
            // one unit-wide bin centered on the single value
            return Ok(Some(Self {
                start: min - 0.5,
                width: 1.0,
                bins: 1,
            }));
        }

        let (width, bins) = match binning {
            Binning::Count(n) => (range / n as f64, n as f64),
            Binning::Width(w) => (w, (range / w).ceil().max(1.0)),
        };
        if bins > MAX_BINS as f64 {
            return Err(StatsError::InvalidBinning {
                reason: format!("{bins} bins exceed the limit of {MAX_BINS}"),
            });
        }
        let bins = bins as usize;
        Ok(Some(Self {
            start: min,
            width,
            bins,
        }))
    }

    pub(crate) fn center(&self, k: usize) -> f64 {
        self.start + (k as f64 + 0.5) * self.width
    }

    pub(crate) fn index(&self, x: f64) -> usize {
        let k = ((x - self.start) / self.width).floor().max(0.0) as usize;
        k.min(self.bins - 1)
    }

    pub(crate) fn counts(&self, data: &[f64]) -> Vec<usize> {
        let mut counts = vec![0; self.bins];
        for &x in data.iter().filter(|x| x.is_finite()) {
            counts[self.index(x)] += 1;
        }
        counts
    }
}

/// Ordered `(center, count)` bins covering `[min, max]` of the finite
/// values in `data`. Empty input gives an empty histogram.
///
/// # Errors
/// `InvalidBinning` for a zero bin count, a non-positive width, a data range
/// that overflows, or a layout of more than [`MAX_BINS`] bins.
pub fn histogram(data: &[f64], binning: Binning) -> StatsResult<Vec<HistogramBin>> {
    let Some(layout) = BinLayout::for_data(data, binning)? else {
        return Ok(Vec::new());
    };
    Ok(layout
        .counts(data)
        .into_iter()
        .enumerate()
        .map(|(k, count)| HistogramBin {
            center: layout.center(k),
            count,
        })
        .collect())
}

/// Histogram normalized to unit area: `(center, count / (n·width))`.
///
/// # Errors
/// As [`histogram`].
pub fn probability_density(data: &[f64], binning: Binning) -> StatsResult<Vec<(f64, f64)>> {
    let Some(layout) = BinLayout::for_data(data, binning)? else {
        return Ok(Vec::new());
    };
    let counts = layout.counts(data);
    let total: usize = counts.iter().sum();
    let norm = total as f64 * layout.width;
    Ok(counts
        .into_iter()
        .enumerate()
        .map(|(k, count)| (layout.center(k), count as f64 / norm))
        .collect())
}

/// Normal density with the given mean and standard deviation at each `x`.
/// `None` for a non-positive or non-finite standard deviation.
#[must_use]
pub fn gaussian_model(x: &[f64], mean: f64, std_dev: f64) -> Option<Vec<f64>> {
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return None;
    }
    let norm = 1.0 / (std_dev * (2.0 * PI).sqrt());
    Some(
        x.iter()
            .map(|&v| norm * (-(v - mean).powi(2) / (2.0 * std_dev * std_dev)).exp())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_histogram() {
        assert!(histogram(&[], Binning::Count(10)).unwrap().is_empty());
        assert!(probability_density(&[f64::NAN], Binning::Width(1.0)).unwrap().is_empty());
    }

    #[test]
    fn maximum_lands_in_last_bin() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0], Binning::Count(4)).unwrap();
        let counts: Vec<usize> = bins.iter().map(|b| b.count).collect();
        assert_eq!(counts, vec![1, 1, 1, 2]);
        assert!((bins[0].center - 0.5).abs() < 1e-12);
        assert!((bins[3].center - 3.5).abs() < 1e-12);
    }

    #[test]
    fn width_binning_covers_the_range() {
        let bins = histogram(&[0.0, 0.25, 1.0], Binning::Width(0.4)).unwrap();
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[test]
    fn constant_data_uses_one_bin() {
        let bins = histogram(&[2.5; 4], Binning::Count(10)).unwrap();
        assert_eq!(bins, vec![HistogramBin { center: 2.5, count: 4 }]);
    }

    #[test]
    fn invalid_binning_is_an_error() {
        assert!(histogram(&[1.0], Binning::Count(0)).is_err());
        assert!(histogram(&[1.0], Binning::Width(-1.0)).is_err());
    }

    #[test]
    fn oversized_layouts_are_rejected() {
        assert!(matches!(
            histogram(&[0.0, 1e300], Binning::Width(1.0)),
            Err(StatsError::InvalidBinning { .. })
        ));
        assert!(matches!(
            histogram(&[0.0, 1.0], Binning::Count(MAX_BINS + 1)),
            Err(StatsError::InvalidBinning { .. })
        ));
        assert!(matches!(
            probability_density(&[-f64::MAX, f64::MAX], Binning::Count(4)),
            Err(StatsError::InvalidBinning { .. })
        ));
        assert_eq!(histogram(&[0.0, 1.0], Binning::Count(MAX_BINS)).unwrap().len(), MAX_BINS);
    }

    #[test]
    fn density_integrates_to_one() {
        let data: Vec<f64> = (0..100).map(|k| f64::from(k) * 0.37).collect();
        let pdf = probability_density(&data, Binning::Count(13)).unwrap();
        let width = pdf[1].0 - pdf[0].0;
        let integral: f64 = pdf.iter().map(|(_, d)| d * width).sum();
        assert!((integral - 1.0).abs() < 1e-9);
    }

    #[test]
    fn gaussian_peak_height() {
        let g = gaussian_model(&[0.0], 0.0, 1.0).unwrap();
        assert!((g[0] - 1.0 / (2.0 * PI).sqrt()).abs() < 1e-15);
        assert!(gaussian_model(&[0.0], 0.0, 0.0).is_none());
    }
}
