use nakamoto_core::{
    majority_coefficient, nakamoto_coefficient, rank_shares, CoefficientError, ShareRow,
    BOUNDARY_TOLERANCE,
};
use proptest::prelude::*;

fn rows(shares: &[f64]) -> Vec<ShareRow> {
    shares
        .iter()
        .enumerate()
        .map(|(index, share)| ShareRow::new(format!("entity-{index}"), *share))
        .collect()
}

#[test]
fn boundary_tie_is_included() {
    // 0.3 + 0.25 = 0.55 already reaches one half.
    let result = nakamoto_coefficient(&rows(&[0.3, 0.25, 0.2, 0.15, 0.1]), 0.5).unwrap();
    assert_eq!(result.coefficient, 2);
    assert!(result.threshold_reached);

    let exact = nakamoto_coefficient(&rows(&[0.3, 0.2, 0.5]), 0.5).unwrap();
    assert_eq!(exact.coefficient, 1);
    let tie = nakamoto_coefficient(&rows(&[0.3, 0.2, 0.1, 0.1, 0.1, 0.1, 0.1]), 0.5).unwrap();
    assert_eq!(tie.coefficient, 2);
}

#[test]
fn equal_shares_need_three_of_five() {
    let result = majority_coefficient(&rows(&[0.2; 5])).unwrap();
    assert_eq!(result.coefficient, 3);
}

#[test]
fn dominant_entity_alone_reaches_majority() {
    let result = majority_coefficient(&rows(&[0.6, 0.1, 0.1, 0.1, 0.1])).unwrap();
    assert_eq!(result.coefficient, 1);
}

#[test]
fn input_order_does_not_matter() {
    let sorted = majority_coefficient(&rows(&[0.4, 0.3, 0.2, 0.1])).unwrap();
    let shuffled = majority_coefficient(&rows(&[0.1, 0.3, 0.4, 0.2])).unwrap();
    assert_eq!(sorted, shuffled);
}

#[test]
fn degenerate_distribution_uses_absolute_shares() {
    let result = majority_coefficient(&rows(&[0.2, 0.1])).unwrap();
    assert_eq!(result.coefficient, 2);
    assert!(!result.threshold_reached);
    assert!((result.cumulative_share - 0.3).abs() < 1e-12);

    let empty = majority_coefficient(&[]).unwrap();
    assert_eq!(empty.coefficient, 0);
    assert!(!empty.threshold_reached);
}

#[test]
fn invalid_shares_are_rejected() {
    let negative = majority_coefficient(&rows(&[0.7, -0.1])).unwrap_err();
    assert!(matches!(negative, CoefficientError::NegativeShare { .. }));

    let nan = majority_coefficient(&rows(&[f64::NAN])).unwrap_err();
    assert!(matches!(nan, CoefficientError::NonFiniteShare { .. }));

    let threshold = nakamoto_coefficient(&rows(&[1.0]), f64::INFINITY).unwrap_err();
    assert!(matches!(threshold, CoefficientError::NonFiniteThreshold(_)));
}

fn arb_distribution() -> impl Strategy<Value = Vec<ShareRow>> {
    prop::collection::vec(1u32..100, 1..20).prop_map(|weights| {
        let total: u32 = weights.iter().sum();
        let shares: Vec<f64> = weights
            .iter()
            .map(|weight| f64::from(*weight) / f64::from(total))
            .collect();
        rows(&shares)
    })
}

proptest! {
    #[test]
    fn coefficient_is_the_smallest_covering_prefix(
        distribution in arb_distribution(),
        threshold in 0.0f64..=1.0,
    ) {
        let result = nakamoto_coefficient(&distribution, threshold).unwrap();
        let ranked = rank_shares(&distribution).unwrap();

        let prefix = |k: usize| ranked[..k].iter().fold(0.0, |acc, row| acc + row.share);
        let reaches = |k: usize| prefix(k) + BOUNDARY_TOLERANCE >= threshold;

        prop_assert!(result.coefficient >= 1);
        prop_assert!(result.coefficient <= ranked.len());
        if result.threshold_reached {
            prop_assert!(reaches(result.coefficient));
            prop_assert!(result.coefficient == 1 || !reaches(result.coefficient - 1));
        } else {
            prop_assert_eq!(result.coefficient, ranked.len());
            prop_assert!(!reaches(ranked.len()));
        }
    }

    #[test]
    fn coefficient_never_decreases_as_threshold_rises(
        distribution in arb_distribution(),
        low in 0.0f64..=1.0,
        high in 0.0f64..=1.0,
    ) {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let at_low = nakamoto_coefficient(&distribution, low).unwrap();
        let at_high = nakamoto_coefficient(&distribution, high).unwrap();
        prop_assert!(at_low.coefficient <= at_high.coefficient);
    }
}
