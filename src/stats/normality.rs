use crate::error::{StatisticUnavailable, finite};
use serde::{Deserialize, Serialize};

use super::special::{kolmogorov_sf, normal_cdf};
use super::std_sample;

const NAME: &str = "ks normality test";

/// Result of a one-sample Kolmogorov–Smirnov test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KsTest {
    pub statistic: f64,
    pub p_value: f64,
}

/// Shift and scale to zero mean and unit sample variance.
pub fn standardize(x: &[f64]) -> Result<Vec<f64>, StatisticUnavailable> {
    if x.len() < 2 {
        return Err(StatisticUnavailable::insufficient(NAME, 2, x.len()));
    }
    let m = x.iter().sum::<f64>() / x.len() as f64;
    let sd = std_sample(x).map_err(|e| StatisticUnavailable::new(NAME, e.reason))?;
    if sd == 0.0 {
        return Err(StatisticUnavailable::zero_variance(NAME));
    }
    finite(NAME, sd)?;
    Ok(x.iter().map(|v| (v - m) / sd).collect())
}

/// Two-sided one-sample KS test of `x` against a continuous `cdf`.
pub fn ks_1samp<F>(x: &[f64], cdf: F) -> Result<KsTest, StatisticUnavailable>
where
    F: Fn(f64) -> f64,
{
    if x.is_empty() {
        return Err(StatisticUnavailable::insufficient(NAME, 1, 0));
    }
    if x.iter().any(|v| v.is_nan()) {
        return Err(StatisticUnavailable::nan(NAME));
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let n = sorted.len() as f64;

    let d = sorted
        .iter()
        .enumerate()
        .map(|(i, &v)| {
            let f = cdf(v);
            let d_plus = (i + 1) as f64 / n - f;
            let d_minus = f - i as f64 / n;
            d_plus.max(d_minus)
        })
        .fold(0.0_f64, f64::max);

    Ok(KsTest {
        statistic: d,
        p_value: finite(NAME, kolmogorov_sf(d, sorted.len()))?,
    })
}

/// Standardize `x`, then test it against the standard normal distribution.
///
/// Standardizing first means a sample fails on its shape, not on its location
/// or scale.
pub fn normality_test(x: &[f64]) -> Result<KsTest, StatisticUnavailable> {
    let z = standardize(x)?;
    ks_1samp(&z, normal_cdf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Reason;

    /// Deterministic normal-looking sample: normal quantiles at (i + 0.5) / n.
    fn normal_quantiles(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let p = (i as f64 + 0.5) / n as f64;
                // bisection on the CDF
                let (mut lo, mut hi) = (-10.0, 10.0);
                for _ in 0..80 {
                    let mid = 0.5 * (lo + hi);
                    if normal_cdf(mid) < p { lo = mid } else { hi = mid }
                }
                0.5 * (lo + hi)
            })
            .collect()
    }

    #[test]
    fn normal_sample_is_not_rejected() {
        let t = normality_test(&normal_quantiles(50)).unwrap();
        assert!(t.p_value > 0.5, "p = {}", t.p_value);
    }

    #[test]
    fn bimodal_sample_is_rejected() {
        let x: Vec<f64> = (0..200)
            .map(|i| if i % 2 == 0 { -5.0 + (i as f64) * 1e-3 } else { 5.0 + (i as f64) * 1e-3 })
            .collect();
        let t = normality_test(&x).unwrap();
        assert!(t.p_value < 0.05, "p = {}", t.p_value);
    }

    #[test]
    fn degenerate_samples_are_unavailable() {
        assert_eq!(
            normality_test(&[2.0, 2.0, 2.0]).unwrap_err().reason,
            Reason::ZeroVariance
        );
        assert!(matches!(
            normality_test(&[]).unwrap_err().reason,
            Reason::InsufficientData { .. }
        ));
    }

    #[test]
    fn standardize_uses_sample_sd() {
        let z = standardize(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        let sd = 2.5f64.sqrt();
        assert!((z[0] + 2.0 / sd).abs() < 1e-12);
        assert!((z[4] - 2.0 / sd).abs() < 1e-12);
        let err = standardize(&[1.0]).unwrap_err();
        assert_eq!(err.statistic, NAME);
        assert!(matches!(err.reason, Reason::InsufficientData { required: 2, actual: 1 }));
    }

    #[test]
    fn statistic_is_bounded() {
        let t = ks_1samp(&[0.0], normal_cdf).unwrap();
        assert!((t.statistic - 0.5).abs() < 1e-6);
        assert!(t.p_value > 0.99);
    }
}
