//! Descriptive statistics, grouped summaries, and the inferential kernels
//! behind the grid annotations.

pub mod correlation;
pub mod kde;
pub mod mutual_info;
pub mod normality;
pub mod regression;
pub mod special;

use crate::error::StatisticUnavailable;
use crate::models::Dataset;
use serde::{Deserialize, Serialize};

pub use correlation::{Correlation, pearson};
pub use mutual_info::mutual_info_regression;
pub use normality::{KsTest, normality_test};

/// Arithmetic mean. Empty input has no mean.
pub fn mean(x: &[f64]) -> Result<f64, StatisticUnavailable> {
    if x.is_empty() {
        return Err(StatisticUnavailable::insufficient("mean", 1, 0));
    }
    Ok(x.iter().sum::<f64>() / x.len() as f64)
}

/// Population standard deviation (divisor `n`).
pub fn std_population(x: &[f64]) -> Result<f64, StatisticUnavailable> {
    let m = mean(x).map_err(|_| StatisticUnavailable::insufficient("std", 1, 0))?;
    let ss: f64 = x.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / x.len() as f64).sqrt())
}

/// Sample standard deviation (divisor `n - 1`).
pub fn std_sample(x: &[f64]) -> Result<f64, StatisticUnavailable> {
    if x.len() < 2 {
        return Err(StatisticUnavailable::insufficient("sample std", 2, x.len()));
    }
    let m = x.iter().sum::<f64>() / x.len() as f64;
    let ss: f64 = x.iter().map(|v| (v - m) * (v - m)).sum();
    Ok((ss / (x.len() - 1) as f64).sqrt())
}

/// Quantile with linear interpolation between order statistics
/// (position `q * (n - 1)` in the sorted sample).
pub fn quantile(x: &[f64], q: f64) -> Result<f64, StatisticUnavailable> {
    if x.is_empty() {
        return Err(StatisticUnavailable::insufficient("quantile", 1, 0));
    }
    if x.iter().any(|v| v.is_nan()) {
        return Err(StatisticUnavailable::nan("quantile"));
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    Ok(sorted[lo] + (sorted[hi] - sorted[lo]) * frac)
}

/// Summary statistics for one variable within one group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Summary {
    pub variable: String,
    /// `None` when the dataset has no hue.
    pub group: Option<String>,
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Population standard deviation.
    pub std: Option<f64>,
    /// Two-sided KS p-value against a normal distribution.
    pub ks_p_value: Option<f64>,
}

/// Compute per-variable statistics, split by group when the dataset has a hue.
/// Groups appear in first-seen order.
pub fn grouped_summary(dataset: &Dataset) -> Vec<Summary> {
    let groups: Vec<Option<String>> = if dataset.hue().is_some() {
        dataset.group_labels().into_iter().map(Some).collect()
    } else {
        vec![None]
    };

    let mut out = Vec::new();
    for (idx, variable) in dataset.variables().iter().enumerate() {
        for group in &groups {
            let vals = dataset.column_for_group(idx, group.as_deref());
            out.push(summarize(variable, group.clone(), &vals));
        }
    }
    out
}

fn summarize(variable: &str, group: Option<String>, vals: &[f64]) -> Summary {
    let min = vals.iter().copied().reduce(f64::min);
    let max = vals.iter().copied().reduce(f64::max);
    Summary {
        variable: variable.to_string(),
        group,
        count: vals.len(),
        min,
        max,
        mean: mean(vals).ok(),
        median: quantile(vals, 0.5).ok(),
        std: std_population(vals).ok(),
        ks_p_value: normality_test(vals).ok().map(|t| t.p_value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn descriptive_values() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mean(&x).unwrap(), 3.0);
        assert_abs_diff_eq!(std_population(&x).unwrap(), 2f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(std_sample(&x).unwrap(), 2.5f64.sqrt(), epsilon = 1e-12);
        assert_eq!(quantile(&x, 0.25).unwrap(), 2.0);
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap(), 2.5);
        assert_eq!(quantile(&[4.0, 1.0, 3.0, 2.0], 0.75).unwrap(), 3.25);
    }

    #[test]
    fn empty_input_is_unavailable() {
        assert!(mean(&[]).is_err());
        assert!(std_population(&[]).is_err());
        assert!(std_sample(&[1.0]).is_err());
        assert!(quantile(&[], 0.5).is_err());
    }

    #[test]
    fn summary_splits_by_group_in_first_seen_order() {
        let mut ds = Dataset::new(vec!["v".into()], Some("g".into())).unwrap();
        for (v, g) in [(10.0, "b"), (1.0, "a"), (30.0, "b"), (2.0, "a"), (3.0, "a")] {
            ds.push(vec![v], Some(g.into())).unwrap();
        }
        let s = grouped_summary(&ds);
        assert_eq!(s.len(), 2);
        assert_eq!(s[0].group.as_deref(), Some("b"));
        assert_eq!(s[0].count, 2);
        assert_eq!(s[0].median, Some(20.0));
        assert_eq!(s[1].min, Some(1.0));
        assert_eq!(s[1].max, Some(3.0));
        // two points: standardization works, KS runs
        assert!(s[0].ks_p_value.is_some());
    }
}
