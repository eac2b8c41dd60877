//! Nakamoto coefficient over a generic share distribution.
//!
//! # Contract
//! - Entities are ranked by share descending, ties by entity ascending.
//! - The coefficient is the smallest `k` whose top-`k` prefix sum reaches
//!   the threshold (`>=`, boundary included). The comparison allows
//!   `BOUNDARY_TOLERANCE` so float sums like `0.3 + 0.2` reach `0.5`.
//! - Shares are used as given; the engine never normalizes.
//!
//! # Edge cases
//! - Empty input → `0`.
//! - Threshold `<= 0` with non-empty input → `1`.
//! - Threshold never reached → number of entities, `threshold_reached = false`.

use crate::aggregate::sort_rows;
use crate::model::share::{CoefficientResult, ShareRow};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Majority threshold.
pub const DEFAULT_THRESHOLD: f64 = 0.5;
/// Absolute slack applied when testing whether the threshold is reached.
pub const BOUNDARY_TOLERANCE: f64 = 1e-9;

/// Invalid coefficient input.
#[derive(Debug, Clone, PartialEq)]
pub enum CoefficientError {
    NegativeShare { entity: String, share: f64 },
    NonFiniteShare { entity: String },
    NonFiniteThreshold(f64),
}

impl Display for CoefficientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NegativeShare { entity, share } => {
                write!(f, "share for `{entity}` is negative: {share}")
            }
            Self::NonFiniteShare { entity } => write!(f, "share for `{entity}` is not finite"),
            Self::NonFiniteThreshold(value) => write!(f, "threshold is not finite: {value}"),
        }
    }
}

impl Error for CoefficientError {}

/// Validates rows, sums duplicate entities and ranks the result.
///
/// # Errors
/// - `NonFiniteShare` / `NegativeShare` for invalid rows.
pub fn rank_shares(rows: &[ShareRow]) -> Result<Vec<ShareRow>, CoefficientError> {
    let mut merged: BTreeMap<&str, f64> = BTreeMap::new();
    for row in rows {
        if !row.share.is_finite() {
            return Err(CoefficientError::NonFiniteShare {
                entity: row.entity.clone(),
            });
        }
        if row.share < 0.0 {
            return Err(CoefficientError::NegativeShare {
                entity: row.entity.clone(),
                share: row.share,
            });
        }
        *merged.entry(row.entity.as_str()).or_insert(0.0) += row.share;
    }

    let mut ranked: Vec<ShareRow> = merged
        .into_iter()
        .map(|(entity, share)| ShareRow::new(entity, share))
        .collect();
    sort_rows(&mut ranked);
    Ok(ranked)
}

/// Computes the minimum number of top entities whose shares reach
/// `threshold`.
///
/// # Errors
/// - `NonFiniteThreshold` when `threshold` is NaN or infinite.
/// - Row errors from `rank_shares`.
pub fn nakamoto_coefficient(
    rows: &[ShareRow],
    threshold: f64,
) -> Result<CoefficientResult, CoefficientError> {
    if !threshold.is_finite() {
        return Err(CoefficientError::NonFiniteThreshold(threshold));
    }

    let ranked = rank_shares(rows)?;
    let mut cumulative = 0.0;
    for (index, row) in ranked.iter().enumerate() {
        cumulative += row.share;
        if cumulative + BOUNDARY_TOLERANCE >= threshold {
            return Ok(CoefficientResult {
                coefficient: index + 1,
                cumulative_share: cumulative,
                threshold,
                threshold_reached: true,
            });
        }
    }

    Ok(CoefficientResult {
        coefficient: ranked.len(),
        cumulative_share: cumulative,
        threshold,
        threshold_reached: false,
    })
}

/// `nakamoto_coefficient` at `DEFAULT_THRESHOLD`.
pub fn majority_coefficient(rows: &[ShareRow]) -> Result<CoefficientResult, CoefficientError> {
    nakamoto_coefficient(rows, DEFAULT_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::{majority_coefficient, nakamoto_coefficient, rank_shares, CoefficientError};
    use crate::model::share::ShareRow;

    fn rows(shares: &[f64]) -> Vec<ShareRow> {
        shares
            .iter()
            .enumerate()
            .map(|(index, share)| ShareRow::new(format!("e{index}"), *share))
            .collect()
    }

    #[test]
    fn empty_input_is_zero() {
        let result = majority_coefficient(&[]).expect("coefficient");
        assert_eq!(result.coefficient, 0);
        assert!(!result.threshold_reached);
    }

    #[test]
    fn non_positive_threshold_takes_first_entity() {
        let result = nakamoto_coefficient(&rows(&[0.1, 0.9]), 0.0).expect("coefficient");
        assert_eq!(result.coefficient, 1);
        assert_eq!(result.cumulative_share, 0.9);

        let result = nakamoto_coefficient(&rows(&[0.0]), -1.0).expect("coefficient");
        assert_eq!(result.coefficient, 1);
    }

    #[test]
    fn unreached_threshold_consumes_everything() {
        let result = nakamoto_coefficient(&rows(&[0.2, 0.1]), 0.5).expect("coefficient");
        assert_eq!(result.coefficient, 2);
        assert!(!result.threshold_reached);
        assert!((result.cumulative_share - 0.3).abs() < 1e-12);
    }

    #[test]
    fn duplicate_entities_are_summed_before_ranking() {
        let input = vec![
            ShareRow::new("b", 0.3),
            ShareRow::new("a", 0.2),
            ShareRow::new("b", 0.3),
        ];
        let ranked = rank_shares(&input).expect("rank");
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entity, "b");
        assert_eq!(majority_coefficient(&input).expect("coefficient").coefficient, 1);
    }

    #[test]
    fn ties_rank_by_entity_name() {
        let input = vec![ShareRow::new("zeta", 0.5), ShareRow::new("alpha", 0.5)];
        let ranked = rank_shares(&input).expect("rank");
        assert_eq!(ranked[0].entity, "alpha");
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        assert!(matches!(
            majority_coefficient(&rows(&[0.5, -0.1])),
            Err(CoefficientError::NegativeShare { .. })
        ));
        assert!(matches!(
            majority_coefficient(&rows(&[f64::NAN])),
            Err(CoefficientError::NonFiniteShare { .. })
        ));
        assert!(matches!(
            nakamoto_coefficient(&rows(&[1.0]), f64::INFINITY),
            Err(CoefficientError::NonFiniteThreshold(_))
        ));
    }
}
