//! General-purpose statistics over numeric sequences: moments, histograms,
//! autocorrelation and distribution summaries.

mod autocorrelation;
mod histogram;
mod moments;
mod summary;

use thiserror::Error;

pub use autocorrelation::autocorrelation;
pub use histogram::{
    Binning, HistogramBin, MAX_BINS, gaussian_model, histogram, probability_density,
};
pub use moments::{Moments, mean, moments, sample_std_dev, sample_variance};
pub use summary::{StatisticalSummary, SummaryOptions, summarize};

pub type StatsResult<T> = Result<T, StatsError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    #[error("at least {required} samples are required, got {provided}")]
    InsufficientSamples { provided: usize, required: usize },

    #[error("invalid binning: {reason}")]
    InvalidBinning { reason: String },
}
