//! Mutual information between two continuous variables, estimated with the
//! Kraskov–Stögbauer–Grassberger k-nearest-neighbour method.
//!
//! Both variables are scaled to unit variance and receive a tiny seeded
//! jitter so that ties between equal values are broken the same way on
//! every call.

use crate::error::{Reason, StatisticUnavailable, finite};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::special::digamma;

const NAME: &str = "mutual information";

/// Neighbours used by the estimator.
pub const DEFAULT_NEIGHBORS: usize = 3;
/// Seed of the tie-breaking jitter.
pub const DEFAULT_SEED: u64 = 0;

/// Estimate I(x; y) in nats with `k = 3` neighbours and seed 0.
pub fn mutual_info_regression(x: &[f64], y: &[f64]) -> Result<f64, StatisticUnavailable> {
    mutual_info_ksg(x, y, DEFAULT_NEIGHBORS, DEFAULT_SEED)
}

/// KSG estimator with explicit neighbour count and jitter seed. Never negative.
pub fn mutual_info_ksg(
    x: &[f64],
    y: &[f64],
    k: usize,
    seed: u64,
) -> Result<f64, StatisticUnavailable> {
    if x.len() != y.len() {
        return Err(StatisticUnavailable::new(
            NAME,
            Reason::LengthMismatch {
                x: x.len(),
                y: y.len(),
            },
        ));
    }
    let n = x.len();
    let k = k.max(1);
    if n <= k {
        return Err(StatisticUnavailable::insufficient(NAME, k + 1, n));
    }
    if x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(StatisticUnavailable::nan(NAME));
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let xs = scale_and_jitter(x, &mut rng);
    let ys = scale_and_jitter(y, &mut rng);

    let mut sum_x = 0.0;
    let mut sum_y = 0.0;
    let mut dists: Vec<f64> = Vec::with_capacity(n - 1);
    for i in 0..n {
        dists.clear();
        for j in 0..n {
            if j != i {
                dists.push((xs[i] - xs[j]).abs().max((ys[i] - ys[j]).abs()));
            }
        }
        dists.select_nth_unstable_by(k - 1, |a, b| a.total_cmp(b));
        let radius = next_down(dists[k - 1]);

        let nx = (0..n)
            .filter(|&j| j != i && (xs[i] - xs[j]).abs() <= radius)
            .count();
        let ny = (0..n)
            .filter(|&j| j != i && (ys[i] - ys[j]).abs() <= radius)
            .count();
        sum_x += digamma(nx as f64 + 1.0);
        sum_y += digamma(ny as f64 + 1.0);
    }

    let nf = n as f64;
    let mi = digamma(nf) + digamma(k as f64) - sum_x / nf - sum_y / nf;
    Ok(finite(NAME, mi)?.max(0.0))
}

/// Divide by the population SD (left alone when zero) and add `1e-10`-scale noise.
fn scale_and_jitter(v: &[f64], rng: &mut StdRng) -> Vec<f64> {
    let n = v.len() as f64;
    let m = v.iter().sum::<f64>() / n;
    let sd = (v.iter().map(|a| (a - m) * (a - m)).sum::<f64>() / n).sqrt();
    let sd = if sd > 0.0 { sd } else { 1.0 };
    let scaled: Vec<f64> = v.iter().map(|a| a / sd).collect();
    let amp = 1e-10 * (scaled.iter().map(|a| a.abs()).sum::<f64>() / n).max(1.0);
    scaled
        .into_iter()
        .map(|a| a + amp * standard_normal(rng))
        .collect()
}

/// Box–Muller draw from N(0, 1).
fn standard_normal(rng: &mut StdRng) -> f64 {
    let u1: f64 = rng.gen_range(f64::MIN_POSITIVE..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Largest float strictly below a non-negative `v`.
fn next_down(v: f64) -> f64 {
    if v > 0.0 {
        f64::from_bits(v.to_bits() - 1)
    } else {
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64).collect()
    }

    #[test]
    fn identical_series_share_information() {
        let x = ramp(100);
        let mi = mutual_info_regression(&x, &x).unwrap();
        assert!(mi > 1.0, "mi = {mi}");
    }

    #[test]
    fn independent_series_share_little() {
        let x = ramp(200);
        let mut rng = StdRng::seed_from_u64(7);
        let y: Vec<f64> = (0..200).map(|_| rng.gen_range(0.0..1.0)).collect();
        let mi = mutual_info_regression(&x, &y).unwrap();
        assert!(mi < 0.2, "mi = {mi}");
    }

    #[test]
    fn estimate_is_deterministic() {
        let x: Vec<f64> = (0..40).map(|i| (i as f64).sin()).collect();
        let y: Vec<f64> = (0..40).map(|i| (i as f64 * 0.7).cos()).collect();
        assert_eq!(
            mutual_info_regression(&x, &y).unwrap(),
            mutual_info_regression(&x, &y).unwrap()
        );
    }

    #[test]
    fn too_few_points() {
        let err = mutual_info_regression(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert_eq!(err.reason, Reason::InsufficientData { required: 4, actual: 3 });
    }
}
