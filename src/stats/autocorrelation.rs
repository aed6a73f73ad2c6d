/// Normalized autocorrelation of a frame series at lags `0..=max_lag`
/// (all lags `0..n` when `max_lag` is `None`, capped at `n − 1`).
///
/// `r(k) = Σ_{i<n−k} (x_i − μ)(x_{i+k} − μ) / Σ (x_i − μ)²`. Lag 0 is exactly
/// `1.0`; a constant series is perfectly correlated at every lag. Empty
/// input yields an empty result.
#[must_use]
pub fn autocorrelation(series: &[f64], max_lag: Option<usize>) -> Vec<f64> {
    let n = series.len();
    if n == 0 {
        return Vec::new();
    }
    let lags = max_lag.map_or(n, |m| m.saturating_add(1).min(n));
    if series.iter().all(|&x| x == series[0]) {
        return vec![1.0; lags];
    }

    let mu = series.iter().sum::<f64>() / n as f64;
    let dev: Vec<f64> = series.iter().map(|x| x - mu).collect();
    let c0: f64 = dev.iter().map(|d| d * d).sum();

    let mut acf = Vec::with_capacity(lags);
    acf.push(1.0);
    for lag in 1..lags {
        let ck: f64 = dev[..n - lag]
            .iter()
            .zip(&dev[lag..])
            .map(|(a, b)| a * b)
            .sum();
        acf.push(ck / c0);
    }
    acf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_series_is_one_everywhere() {
        let acf = autocorrelation(&[0.1; 7], None);
        assert_eq!(acf, vec![1.0; 7]);
    }

    #[test]
    fn lag_zero_is_exactly_one() {
        let acf = autocorrelation(&[1.0, 3.0, 2.0, 5.0, 4.0], None);
        assert_eq!(acf.len(), 5);
        assert_eq!(acf[0], 1.0);
        assert!(acf.iter().all(|r| r.abs() <= 1.0));
    }

    #[test]
    fn alternating_series_anticorrelates_at_lag_one() {
        let acf = autocorrelation(&[1.0, -1.0, 1.0, -1.0, 1.0, -1.0], Some(2));
        assert_eq!(acf.len(), 3);
        assert!(acf[1] < -0.8);
        assert!(acf[2] > 0.6);
    }

    #[test]
    fn empty_series() {
        assert!(autocorrelation(&[], None).is_empty());
    }
}
