use serde::Serialize;

use super::{StatsError, StatsResult};

/// First four standardized moments of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Moments {
    pub mean: f64,
    /// Sample standard deviation (Bessel-corrected).
    pub std_dev: f64,
    /// `⟨((x−μ)/s)³⟩`.
    pub skewness: f64,
    /// `⟨((x−μ)/s)⁴⟩`, not excess.
    pub kurtosis: f64,
}

fn require(data: &[f64], required: usize) -> StatsResult<()> {
    if data.len() < required {
        return Err(StatsError::InsufficientSamples {
            provided: data.len(),
            required,
        });
    }
    Ok(())
}

/// # Errors
/// `InsufficientSamples` for an empty sequence.
pub fn mean(data: &[f64]) -> StatsResult<f64> {
    require(data, 1)?;
    Ok(data.iter().sum::<f64>() / data.len() as f64)
}

/// Variance with Bessel's correction, `Σ(x−μ)²/(n−1)`.
///
/// # Errors
/// `InsufficientSamples` for fewer than two samples.
pub fn sample_variance(data: &[f64]) -> StatsResult<f64> {
    require(data, 2)?;
    let mu = mean(data)?;
    let ss: f64 = data.iter().map(|x| (x - mu) * (x - mu)).sum();
    Ok(ss / (data.len() - 1) as f64)
}

/// # Errors
/// `InsufficientSamples` for fewer than two samples.
pub fn sample_std_dev(data: &[f64]) -> StatsResult<f64> {
    sample_variance(data).map(f64::sqrt)
}

/// Mean, standard deviation, skewness and kurtosis.
///
/// Skewness and kurtosis are `0.0` for a zero-variance sample.
///
/// # Errors
/// `InsufficientSamples` for fewer than two samples.
pub fn moments(data: &[f64]) -> StatsResult<Moments> {
    let mu = mean(data)?;
    let std_dev = sample_std_dev(data)?;
    if std_dev == 0.0 {
        return Ok(Moments {
            mean: mu,
            std_dev,
            skewness: 0.0,
            kurtosis: 0.0,
        });
    }
    let n = data.len() as f64;
    let (m3, m4) = data.iter().fold((0.0, 0.0), |(m3, m4), x| {
        let z = (x - mu) / std_dev;
        (m3 + z * z * z, m4 + z * z * z * z)
    });
    Ok(Moments {
        mean: mu,
        std_dev,
        skewness: m3 / n,
        kurtosis: m4 / n,
    })
}
