//! Share distribution rows and coefficient results.

use serde::{Deserialize, Serialize};

/// Tolerance used when checking that a distribution sums to one.
pub const SHARE_SUM_TOLERANCE: f64 = 1e-6;

/// One entity with its share of the distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareRow {
    pub entity: String,
    /// Fraction in `[0, 1]` for well-formed distributions.
    pub share: f64,
}

impl ShareRow {
    pub fn new(entity: impl Into<String>, share: f64) -> Self {
        Self {
            entity: entity.into(),
            share,
        }
    }
}

impl<S: Into<String>> From<(S, f64)> for ShareRow {
    fn from((entity, share): (S, f64)) -> Self {
        Self::new(entity, share)
    }
}

/// Sums the shares of `rows`.
pub fn total_share(rows: &[ShareRow]) -> f64 {
    rows.iter().map(|row| row.share).sum()
}

/// Returns whether `rows` sums to one within `SHARE_SUM_TOLERANCE`.
pub fn is_normalized(rows: &[ShareRow]) -> bool {
    (total_share(rows) - 1.0).abs() <= SHARE_SUM_TOLERANCE
}

/// Outcome of a minimum-covering-set computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoefficientResult {
    /// Number of top-ranked entities consumed. Zero only for empty input.
    pub coefficient: usize,
    /// Running total at the point the computation stopped.
    pub cumulative_share: f64,
    /// Threshold the computation was run against.
    pub threshold: f64,
    /// False when every entity was consumed without reaching `threshold`.
    pub threshold_reached: bool,
}
