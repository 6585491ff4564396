use crate::error::{Reason, StatisticUnavailable, finite};
use serde::{Deserialize, Serialize};

use super::special::student_t_two_sided;

const NAME: &str = "pearson correlation";

/// Pearson coefficient with its two-sided p-value (H0: no correlation).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Correlation {
    pub coefficient: f64,
    pub p_value: f64,
}

/// Two-sided Pearson correlation test between paired series.
pub fn pearson(x: &[f64], y: &[f64]) -> Result<Correlation, StatisticUnavailable> {
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
    if n < 2 {
        return Err(StatisticUnavailable::insufficient(NAME, 2, n));
    }

    let mx = x.iter().sum::<f64>() / n as f64;
    let my = y.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (a, b) in x.iter().zip(y) {
        let (dx, dy) = (a - mx, b - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(StatisticUnavailable::zero_variance(NAME));
    }
    let r = finite(NAME, sxy / (sxx.sqrt() * syy.sqrt()))?.clamp(-1.0, 1.0);

    let p = if n == 2 {
        1.0
    } else if r.abs() == 1.0 {
        0.0
    } else {
        let df = (n - 2) as f64;
        let t = r * (df / ((1.0 - r) * (1.0 + r))).sqrt();
        student_t_two_sided(t, df)
    };

    Ok(Correlation {
        coefficient: r,
        p_value: finite(NAME, p)?,
    })
}
