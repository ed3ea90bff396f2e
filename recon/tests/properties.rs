//! Property tests for composition, matching and status derivation.

use std::collections::BTreeMap;

use nibor_common::{Currency, Tenor};
use nibor_recon::{
    compose, derive_status, values_match, Criterion, RateSnapshot, ReconStatus,
    ReconciliationResult, Weights,
};
use proptest::prelude::*;
use rust_decimal::Decimal;

// Rates between -2% and 15% at four decimals.
fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (-20_000i64..150_000).prop_map(|n| Decimal::new(n, 4))
}

fn optional_rate_strategy() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::weighted(0.8, rate_strategy())
}

// Complete weight sets summing to exactly one.
fn weights_strategy() -> impl Strategy<Value = Weights> {
    (0i64..=10_000)
        .prop_flat_map(|eur| (Just(eur), 0i64..=(10_000 - eur)))
        .prop_map(|(eur, usd)| {
            let nok = 10_000 - eur - usd;
            Weights::new(BTreeMap::from([
                (Currency::Eur, Decimal::new(eur, 4)),
                (Currency::Usd, Decimal::new(usd, 4)),
                (Currency::Nok, Decimal::new(nok, 4)),
            ]))
            .unwrap()
        })
}

// 0 = matched, 1 = mismatch, 2 = missing expected value.
fn criterion_from_kind(index: usize, kind: u8) -> Criterion {
    let name = format!("c{}", index);
    match kind {
        0 => Criterion::new(name, Some(Decimal::new(42_525, 4)), Some(Decimal::new(42_525, 4))),
        1 => Criterion::new(name, Some(Decimal::new(42_525, 4)), Some(Decimal::new(42_520, 4))),
        _ => Criterion::new(name, Some(Decimal::new(42_525, 4)), None),
    }
}

fn criteria_strategy() -> impl Strategy<Value = Vec<Criterion>> {
    prop::collection::vec(0u8..3, 0..8).prop_map(|kinds| {
        kinds
            .into_iter()
            .enumerate()
            .map(|(i, k)| criterion_from_kind(i, k))
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn test_composition_formula(
        eur in optional_rate_strategy(),
        usd in optional_rate_strategy(),
        nok in optional_rate_strategy(),
        weights in weights_strategy(),
        spread in (0i64..5_000).prop_map(|n| Decimal::new(n, 4)),
    ) {
        let rates: BTreeMap<Currency, Decimal> = [
            (Currency::Eur, eur),
            (Currency::Usd, usd),
            (Currency::Nok, nok),
        ]
        .into_iter()
        .filter_map(|(c, r)| r.map(|r| (c, r)))
        .collect();

        let snapshot = RateSnapshot::new(Tenor::OneMonth, rates.clone(), weights.clone(), spread);
        let composition = compose(&snapshot).unwrap();

        let expected_funding: Decimal = Currency::ALL
            .iter()
            .filter_map(|c| Some(*rates.get(c)? * weights.get(*c)?))
            .sum();

        prop_assert_eq!(composition.funding_rate, expected_funding);
        prop_assert_eq!(composition.final_rate, expected_funding + spread);
        prop_assert_eq!(composition.partial, rates.len() < Currency::ALL.len());
    }

    #[test]
    fn test_match_boundary_inclusive(
        expected in rate_strategy(),
        tolerance in (0i64..100).prop_map(|n| Decimal::new(n, 4)),
        negative in any::<bool>(),
    ) {
        let offset = if negative { -tolerance } else { tolerance };
        prop_assert!(values_match(Some(expected + offset), Some(expected), tolerance));

        let beyond = tolerance + Decimal::new(1, 6);
        let offset = if negative { -beyond } else { beyond };
        prop_assert!(!values_match(Some(expected + offset), Some(expected), tolerance));
    }

    #[test]
    fn test_absent_side_never_matches(
        value in rate_strategy(),
        tolerance in (0i64..1_000_000).prop_map(|n| Decimal::new(n, 4)),
    ) {
        prop_assert!(!values_match(Some(value), None, tolerance));
        prop_assert!(!values_match(None, Some(value), tolerance));
        prop_assert!(!values_match(None, None, tolerance));
    }

    #[test]
    fn test_status_precedence(criteria in criteria_strategy()) {
        let status = derive_status(&criteria);
        let both = |c: &Criterion| c.computed_value().is_some() && c.expected_value().is_some();
        let any_mismatch = criteria.iter().any(|c| both(c) && !c.matched());
        let any_missing = criteria.iter().any(|c| !both(c));

        let expected = if criteria.is_empty() {
            ReconStatus::Pending
        } else if any_mismatch {
            ReconStatus::Fail
        } else if any_missing {
            ReconStatus::Warn
        } else {
            ReconStatus::Matched
        };
        prop_assert_eq!(status, expected);
    }

    #[test]
    fn test_status_is_idempotent(criteria in criteria_strategy()) {
        let first = ReconciliationResult::new(criteria.clone());
        let second = ReconciliationResult::new(criteria);
        prop_assert_eq!(first.status(), second.status());
        prop_assert_eq!(first, second);
    }
}
