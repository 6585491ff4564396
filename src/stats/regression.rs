use crate::error::{StatisticUnavailable, finite};

use super::special::student_t_upper_quantile;

const NAME: &str = "linear regression";

/// Ordinary least squares fit `y = intercept + slope * x`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Residual standard error, `sqrt(SSE / (n - 2))`.
    pub residual_se: f64,
    pub n: usize,
    x_mean: f64,
    sxx: f64,
}

/// Fit a straight line. Needs three points so the confidence band is defined.
pub fn ols(x: &[f64], y: &[f64]) -> Result<LinearFit, StatisticUnavailable> {
    let n = x.len().min(y.len());
    if n < 3 {
        return Err(StatisticUnavailable::insufficient(NAME, 3, n));
    }
    let nf = n as f64;
    let (x, y) = (&x[..n], &y[..n]);
    let mx = x.iter().sum::<f64>() / nf;
    let my = y.iter().sum::<f64>() / nf;
    let (mut sxx, mut sxy) = (0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        sxx += (a - mx) * (a - mx);
        sxy += (a - mx) * (b - my);
    }
    if sxx == 0.0 {
        return Err(StatisticUnavailable::zero_variance(NAME));
    }
    let slope = finite(NAME, sxy / sxx)?;
    let intercept = my - slope * mx;
    let sse: f64 = x
        .iter()
        .zip(y)
        .map(|(a, b)| {
            let r = b - (intercept + slope * a);
            r * r
        })
        .sum();
    Ok(LinearFit {
        slope,
        intercept,
        residual_se: finite(NAME, (sse / (nf - 2.0)).sqrt())?,
        n,
        x_mean: mx,
        sxx,
    })
}

impl LinearFit {
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Fitted line and two-sided confidence band for the mean response, as
    /// `(x, fit, lower, upper)` at each of `xs`.
    pub fn confidence_band(&self, xs: &[f64], level: f64) -> Vec<(f64, f64, f64, f64)> {
        let df = (self.n - 2) as f64;
        let t = student_t_upper_quantile((1.0 - level) / 2.0, df);
        xs.iter()
            .map(|&x| {
                let fit = self.predict(x);
                let se = self.residual_se
                    * (1.0 / self.n as f64 + (x - self.x_mean).powi(2) / self.sxx).sqrt();
                (x, fit, fit - t * se, fit + t * se)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn exact_line_has_zero_width_band() {
        let fit = ols(&[0.0, 1.0, 2.0, 3.0], &[1.0, 3.0, 5.0, 7.0]).unwrap();
        assert_abs_diff_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(fit.intercept, 1.0, epsilon = 1e-12);
        let band = fit.confidence_band(&[1.5], 0.95);
        assert_abs_diff_eq!(band[0].1, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(band[0].2, band[0].3, epsilon = 1e-9);
    }

    #[test]
    fn band_widens_away_from_center() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0];
        let y = [0.1, 0.9, 2.2, 2.8, 4.1];
        let fit = ols(&x, &y).unwrap();
        let band = fit.confidence_band(&[2.0, 6.0], 0.95);
        let width = |b: &(f64, f64, f64, f64)| b.3 - b.2;
        assert!(width(&band[1]) > width(&band[0]));
    }

    #[test]
    fn degenerate_fits() {
        assert!(ols(&[1.0, 2.0], &[1.0, 2.0]).is_err());
        assert!(ols(&[1.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).is_err());
    }
}
