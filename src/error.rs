//! Error types for statistics and the dataset model.

use thiserror::Error;

/// Why a statistic could not be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Not enough observations for the computation.
    InsufficientData { required: usize, actual: usize },
    /// All observations share one value, so the statistic is undefined.
    ZeroVariance,
    /// Paired series of different lengths.
    LengthMismatch { x: usize, y: usize },
    /// A pairwise statistic was asked for without a second series.
    MissingSeries,
    /// The computation finished but produced NaN.
    NotANumber,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::InsufficientData { required, actual } => {
                write!(f, "need at least {required} observations, got {actual}")
            }
            Reason::ZeroVariance => write!(f, "input has zero variance"),
            Reason::LengthMismatch { x, y } => write!(f, "series lengths differ ({x} vs {y})"),
            Reason::MissingSeries => write!(f, "second series is missing"),
            Reason::NotANumber => write!(f, "result is not a number"),
        }
    }
}

/// The single failure kind of the annotation core: a statistic could not be
/// computed for a (provider, subplot, group) combination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{statistic} unavailable: {reason}")]
pub struct StatisticUnavailable {
    pub statistic: &'static str,
    pub reason: Reason,
}

impl StatisticUnavailable {
    pub fn new(statistic: &'static str, reason: Reason) -> Self {
        Self { statistic, reason }
    }

    pub fn insufficient(statistic: &'static str, required: usize, actual: usize) -> Self {
        Self::new(statistic, Reason::InsufficientData { required, actual })
    }

    pub fn zero_variance(statistic: &'static str) -> Self {
        Self::new(statistic, Reason::ZeroVariance)
    }

    pub fn nan(statistic: &'static str) -> Self {
        Self::new(statistic, Reason::NotANumber)
    }
}

/// Pass `value` through if it is a number, otherwise report it as unavailable.
pub fn finite(statistic: &'static str, value: f64) -> Result<f64, StatisticUnavailable> {
    if value.is_nan() {
        Err(StatisticUnavailable::nan(statistic))
    } else {
        Ok(value)
    }
}

/// Shape errors when assembling a [`crate::models::Dataset`].
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("row has {actual} values but the dataset has {expected} variables")]
    Arity { expected: usize, actual: usize },
    #[error("row is missing a group label for hue column `{0}`")]
    MissingGroup(String),
    #[error("unknown variable `{0}`")]
    UnknownVariable(String),
    #[error("duplicate variable `{0}`")]
    DuplicateVariable(String),
}
