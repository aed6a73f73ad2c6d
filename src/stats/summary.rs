use serde::{Deserialize, Serialize};

use super::histogram::{BinLayout, Binning};
use super::moments::moments;
use super::{StatsError, StatsResult};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Bins of the histogram that mode and percentiles are read from.
    pub bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self { bins: 800 }
    }
}

impl SummaryOptions {
    #[must_use]
    pub fn with_bins(mut self, bins: usize) -> Self {
        self.bins = bins;
        self
    }
}

/// Moments plus histogram-based location statistics of one sample.
///
/// Median, quartiles and deciles are the center of the first bin at which
/// the cumulative count reaches the fraction, so they carry the bin width
/// as resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatisticalSummary {
    pub count: usize,
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub mode: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
    pub d1: f64,
    pub d9: f64,
}

/// Summarize the finite values of `data`.
///
/// # Errors
/// `InsufficientSamples` for fewer than two finite values,
/// `InvalidBinning` for zero bins.
pub fn summarize(data: &[f64], options: SummaryOptions) -> StatsResult<StatisticalSummary> {
    let finite: Vec<f64> = data.iter().copied().filter(|x| x.is_finite()).collect();
    let m = moments(&finite)?;
    let layout = BinLayout::for_data(&finite, Binning::Count(options.bins))?.ok_or(
        StatsError::InsufficientSamples {
            provided: 0,
            required: 2,
        },
    )?;
    let counts = layout.counts(&finite);

    let mut mode_bin = 0;
    for (k, &c) in counts.iter().enumerate() {
        if c > counts[mode_bin] {
            mode_bin = k;
        }
    }

    let n = finite.len() as f64;
    let quantile = |fraction: f64| {
        let target = fraction * n;
        let mut cumulative = 0usize;
        for (k, &c) in counts.iter().enumerate() {
            cumulative += c;
            if cumulative as f64 >= target {
                return layout.center(k);
            }
        }
        layout.center(counts.len() - 1)
    };

    let (min, max) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| (lo.min(x), hi.max(x)));

    Ok(StatisticalSummary {
        count: finite.len(),
        mean: m.mean,
        std_dev: m.std_dev,
        skewness: m.skewness,
        kurtosis: m.kurtosis,
        min,
        max,
        mode: layout.center(mode_bin),
        median: quantile(0.5),
        q1: quantile(0.25),
        q3: quantile(0.75),
        d1: quantile(0.1),
        d9: quantile(0.9),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_sample_quantiles() {
        let data: Vec<f64> = (0..1000).map(f64::from).collect();
        let summary = summarize(&data, SummaryOptions::default().with_bins(100)).unwrap();
        assert_eq!(summary.count, 1000);
        assert!((summary.median - 499.5).abs() < 10.0);
        assert!((summary.q1 - 250.0).abs() < 10.0);
        assert!((summary.d9 - 900.0).abs() < 10.0);
        assert_eq!(summary.min, 0.0);
        assert_eq!(summary.max, 999.0);
    }

    #[test]
    fn mode_follows_the_peak() {
        let mut data = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        data.extend([4.0; 10]);
        let summary = summarize(&data, SummaryOptions::default().with_bins(4)).unwrap();
        assert!((summary.mode - 4.5).abs() < 1e-12);
    }

    #[test]
    fn needs_two_samples() {
        assert!(summarize(&[1.0, f64::NAN], SummaryOptions::default()).is_err());
    }
}
