//! Special functions and distribution tails used by the statistical tests.
//!
//! Accuracy targets are those of an annotation printed to three or five
//! decimals, not of a numerical library.

use std::f64::consts::PI;

const LANCZOS_G: f64 = 7.0;
const LANCZOS: [f64; 9] = [
    0.999_999_999_999_809_9,
    676.520_368_121_885_1,
    -1_259.139_216_722_402_8,
    771.323_428_777_653_1,
    -176.615_029_162_140_6,
    12.507_343_278_686_905,
    -0.138_571_095_265_720_12,
    9.984_369_578_019_572e-6,
    1.505_632_735_149_311_6e-7,
];

/// Natural log of the gamma function (Lanczos approximation), `x > 0`.
pub fn ln_gamma(x: f64) -> f64 {
    if x < 0.5 {
        // Reflection formula
        (PI / (PI * x).sin()).ln() - ln_gamma(1.0 - x)
    } else {
        let x = x - 1.0;
        let mut a = LANCZOS[0];
        let t = x + LANCZOS_G + 0.5;
        for (i, c) in LANCZOS.iter().enumerate().skip(1) {
            a += c / (x + i as f64);
        }
        0.5 * (2.0 * PI).ln() + (x + 0.5) * t.ln() - t + a.ln()
    }
}

/// Digamma function ψ(x) for `x > 0`.
pub fn digamma(mut x: f64) -> f64 {
    let mut acc = 0.0;
    while x < 6.0 {
        acc -= 1.0 / x;
        x += 1.0;
    }
    let inv = 1.0 / x;
    let inv2 = inv * inv;
    let series = inv2
        * (1.0 / 12.0
            - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))));
    acc + x.ln() - 0.5 * inv - series
}

/// Continued fraction for the incomplete beta function (modified Lentz).
fn beta_continued_fraction(a: f64, b: f64, x: f64) -> f64 {
    const MAX_ITER: usize = 300;
    const EPS: f64 = 1e-15;
    const TINY: f64 = 1e-300;

    let qab = a + b;
    let qap = a + 1.0;
    let qam = a - 1.0;
    let mut c = 1.0;
    let mut d = 1.0 - qab * x / qap;
    if d.abs() < TINY {
        d = TINY;
    }
    d = 1.0 / d;
    let mut h = d;
    for m in 1..=MAX_ITER {
        let m = m as f64;
        let m2 = 2.0 * m;
        let aa = m * (b - m) * x / ((qam + m2) * (a + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        h *= d * c;
        let aa = -(a + m) * (qab + m) * x / ((a + m2) * (qap + m2));
        d = 1.0 + aa * d;
        if d.abs() < TINY {
            d = TINY;
        }
        c = 1.0 + aa / c;
        if c.abs() < TINY {
            c = TINY;
        }
        d = 1.0 / d;
        let del = d * c;
        h *= del;
        if (del - 1.0).abs() < EPS {
            break;
        }
    }
    h
}

/// Regularized incomplete beta function I_x(a, b).
pub fn incomplete_beta(a: f64, b: f64, x: f64) -> f64 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    let ln_front = ln_gamma(a + b) - ln_gamma(a) - ln_gamma(b) + a * x.ln() + b * (1.0 - x).ln();
    let front = ln_front.exp();
    if x < (a + 1.0) / (a + b + 2.0) {
        front * beta_continued_fraction(a, b, x) / a
    } else {
        1.0 - front * beta_continued_fraction(b, a, 1.0 - x) / b
    }
}

/// Complementary error function (Chebyshev fit, relative error below 1.2e-7).
pub fn erfc(x: f64) -> f64 {
    let z = x.abs();
    let t = 1.0 / (1.0 + 0.5 * z);
    let poly = -z * z - 1.265_512_23
        + t * (1.000_023_68
            + t * (0.374_091_96
                + t * (0.096_784_18
                    + t * (-0.186_288_06
                        + t * (0.278_868_07
                            + t * (-1.135_203_98
                                + t * (1.488_515_87 + t * (-0.822_152_23 + t * 0.170_872_77))))))));
    let ans = t * poly.exp();
    if x >= 0.0 { ans } else { 2.0 - ans }
}

/// CDF of the standard normal distribution.
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Two-sided tail probability P(|T| >= |t|) of Student's t with `df` degrees of freedom.
pub fn student_t_two_sided(t: f64, df: f64) -> f64 {
    if t.is_infinite() {
        return 0.0;
    }
    incomplete_beta(0.5 * df, 0.5, df / (df + t * t))
}

/// Quantile of Student's t (upper tail `p` in (0, 0.5)), found by bisection.
pub fn student_t_upper_quantile(p: f64, df: f64) -> f64 {
    let (mut lo, mut hi) = (0.0_f64, 1.0_f64);
    while student_t_two_sided(hi, df) / 2.0 > p && hi < 1e6 {
        hi *= 2.0;
    }
    for _ in 0..100 {
        let mid = 0.5 * (lo + hi);
        if student_t_two_sided(mid, df) / 2.0 > p {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

/// Survival function of the two-sided one-sample Kolmogorov–Smirnov statistic
/// `D_n`, i.e. `P(D_n >= d)`.
///
/// Uses the Marsaglia–Tsang–Wang exact recursion whenever its matrix stays
/// small (order `2 * floor(n * d) + 1`) or its large-deviation tail applies.
/// Only beyond that does it fall back to the Kolmogorov limit with Stephens'
/// small-sample correction.
pub fn kolmogorov_sf(d: f64, n: usize) -> f64 {
    if n == 0 || d.is_nan() {
        return f64::NAN;
    }
    if d <= 0.0 {
        return 1.0;
    }
    if d >= 1.0 {
        return 0.0;
    }
    let nf = n as f64;
    let p = if nf * d <= EXACT_MAX_ND || d * d * nf > 3.76 {
        1.0 - mtw_cdf(d, n)
    } else {
        let sn = (n as f64).sqrt();
        kolmogorov_limit_sf((sn + 0.12 + 0.11 / sn) * d)
    };
    p.clamp(0.0, 1.0)
}

/// Largest `n * d` evaluated with the exact matrix recursion.
const EXACT_MAX_ND: f64 = 140.0;

/// `P(sqrt(n) D_n >= lambda)` as `n -> inf`.
fn kolmogorov_limit_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }
    if lambda < 1.18 {
        // Series for the CDF converges fast for small lambda.
        let w = (2.0 * PI).sqrt() / lambda;
        let q = -(PI * PI) / (8.0 * lambda * lambda);
        let cdf: f64 = (1..=5)
            .map(|j| {
                let k = (2 * j - 1) as f64;
                (k * k * q).exp()
            })
            .sum::<f64>()
            * w;
        1.0 - cdf
    } else {
        let mut sum = 0.0;
        for j in 1..=100 {
            let j = j as f64;
            let term = (-2.0 * j * j * lambda * lambda).exp();
            sum += if (j as i64) % 2 == 1 { term } else { -term };
            if term < 1e-16 {
                break;
            }
        }
        2.0 * sum
    }
}

/// `P(D_n < d)` by Marsaglia, Tsang & Wang (2003).
fn mtw_cdf(d: f64, n: usize) -> f64 {
    let nf = n as f64;
    let s = d * d * nf;
    if s > 7.24 || (s > 3.76 && n > 99) {
        return 1.0 - 2.0 * (-(2.000_071 + 0.331 / nf.sqrt() + 1.409 / nf) * s).exp();
    }
    let k = (nf * d) as usize + 1;
    let m = 2 * k - 1;
    let h = k as f64 - nf * d;

    let mut hm = vec![0.0_f64; m * m];
    for i in 0..m {
        for j in 0..m {
            if i + 1 >= j {
                hm[i * m + j] = 1.0;
            }
        }
    }
    for i in 0..m {
        hm[i * m] -= h.powi(i as i32 + 1);
        hm[(m - 1) * m + i] -= h.powi((m - i) as i32);
    }
    if 2.0 * h - 1.0 > 0.0 {
        hm[(m - 1) * m] += (2.0 * h - 1.0).powi(m as i32);
    }
    for i in 0..m {
        for j in 0..m {
            if i + 1 > j {
                for g in 1..=(i + 1 - j) {
                    hm[i * m + j] /= g as f64;
                }
            }
        }
    }

    let (q, mut eq) = matrix_power(&hm, 0, m, n);
    let mut s = q[(k - 1) * m + k - 1];
    for i in 1..=n {
        s = s * i as f64 / nf;
        if s < 1e-140 {
            s *= 1e140;
            eq -= 140;
        }
    }
    s * 10f64.powi(eq)
}

fn matrix_multiply(a: &[f64], b: &[f64], m: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * m];
    for i in 0..m {
        for k in 0..m {
            let aik = a[i * m + k];
            if aik == 0.0 {
                continue;
            }
            for j in 0..m {
                c[i * m + j] += aik * b[k * m + j];
            }
        }
    }
    c
}

/// `A^n` with a decimal exponent carried alongside to avoid overflow.
fn matrix_power(a: &[f64], ea: i32, m: usize, n: usize) -> (Vec<f64>, i32) {
    if n == 1 {
        return (a.to_vec(), ea);
    }
    let (v, ev) = matrix_power(a, ea, m, n / 2);
    let b = matrix_multiply(&v, &v, m);
    let eb = 2 * ev;
    let (mut out, mut e) = if n % 2 == 0 {
        (b, eb)
    } else {
        (matrix_multiply(a, &b, m), ea + eb)
    };
    if out[(m / 2) * m + (m / 2)] > 1e140 {
        for x in out.iter_mut() {
            *x *= 1e-140;
        }
        e += 140;
    }
    (out, e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn gamma_and_digamma_known_values() {
        assert_abs_diff_eq!(ln_gamma(5.0), (24.0f64).ln(), epsilon = 1e-10);
        assert_abs_diff_eq!(ln_gamma(0.5), PI.sqrt().ln(), epsilon = 1e-10);
        // psi(1) = -Euler–Mascheroni
        assert_abs_diff_eq!(digamma(1.0), -0.577_215_664_901_532_9, epsilon = 1e-10);
        assert_abs_diff_eq!(digamma(10.0), 2.251_752_589_066_721, epsilon = 1e-10);
    }

    #[test]
    fn normal_cdf_matches_table() {
        assert_abs_diff_eq!(normal_cdf(0.0), 0.5, epsilon = 1e-7);
        assert_abs_diff_eq!(normal_cdf(1.959_963_985), 0.975, epsilon = 1e-6);
        assert_abs_diff_eq!(normal_cdf(-1.0), 0.158_655_253_9, epsilon = 1e-6);
    }

    #[test]
    fn student_t_tails() {
        // t = 2.228 is the 97.5% quantile for df = 10
        assert_abs_diff_eq!(student_t_two_sided(2.228_138_85, 10.0), 0.05, epsilon = 1e-6);
        assert_abs_diff_eq!(student_t_upper_quantile(0.025, 10.0), 2.228_138_85, epsilon = 1e-5);
        assert_abs_diff_eq!(student_t_two_sided(0.0, 5.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn kolmogorov_tail_reference_values() {
        // Two-sided critical values for n = 10 (Miller, 1956)
        assert_abs_diff_eq!(kolmogorov_sf(0.409_25, 10), 0.05, epsilon = 2e-3);
        assert_abs_diff_eq!(kolmogorov_sf(0.488_93, 10), 0.01, epsilon = 1e-3);
        assert_eq!(kolmogorov_sf(1.0, 10), 0.0);
        let big = kolmogorov_sf(0.05, 500);
        assert!(big > 0.1 && big < 0.2, "got {big}");
    }

    #[test]
    fn kolmogorov_stays_exact_past_140_rows() {
        assert_abs_diff_eq!(kolmogorov_sf(0.05, 140), 0.857_65, epsilon = 1e-4);
        assert_abs_diff_eq!(kolmogorov_sf(0.05, 141), 0.854_84, epsilon = 1e-4);
        assert_abs_diff_eq!(kolmogorov_sf(0.0555, 141), 0.756_49, epsilon = 1e-4);
        for n in [141, 150, 200, 300, 500] {
            for d in [0.03, 0.05, 0.0555, 0.08, 0.1] {
                assert_eq!(kolmogorov_sf(d, n), (1.0 - mtw_cdf(d, n)).clamp(0.0, 1.0));
            }
        }
        // no jump when a group grows by one row
        let step = kolmogorov_sf(0.05, 140) - kolmogorov_sf(0.05, 141);
        assert!(step > 0.0 && step < 5e-3, "got {step}");
    }
}
