//! Weighted composition of the published rate.

use nibor_common::{round_display, Currency, NiborError, Result, Tenor};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::snapshot::RateSnapshot;

/// One currency's share of the funding rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Contribution {
    pub currency: Currency,
    pub implied_rate: Option<Decimal>,
    pub weight: Option<Decimal>,
    /// `implied_rate * weight`; absent when either input is missing.
    pub value: Option<Decimal>,
}

impl Contribution {
    /// Whether this currency lacked an input.
    pub fn is_missing(&self) -> bool {
        self.value.is_none()
    }
}

/// Result of rate composition for one tenor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Composition {
    pub tenor: Tenor,
    /// Per-currency contributions in display order.
    pub contributions: Vec<Contribution>,
    /// Sum of present contributions.
    pub funding_rate: Decimal,
    pub spread: Decimal,
    /// `funding_rate + spread`.
    pub final_rate: Decimal,
    /// Set when any currency contributed zero for lack of input.
    pub partial: bool,
}

impl Composition {
    /// Contribution for a currency.
    pub fn contribution(&self, currency: Currency) -> Option<&Contribution> {
        self.contributions.iter().find(|c| c.currency == currency)
    }

    /// Currencies that were missing an implied rate or weight.
    pub fn missing_currencies(&self) -> Vec<Currency> {
        self.contributions
            .iter()
            .filter(|c| c.is_missing())
            .map(|c| c.currency)
            .collect()
    }

    pub fn display_final_rate(&self) -> Decimal {
        round_display(self.final_rate)
    }

    pub fn display_funding_rate(&self) -> Decimal {
        round_display(self.funding_rate)
    }
}

/// Compose the final rate from a snapshot's implied rates, weights and spread.
///
/// Fails with [`NiborError::Overflow`] when a product or sum leaves the
/// decimal range; no partial composition is produced.
pub fn compose(snapshot: &RateSnapshot) -> Result<Composition> {
    let tenor = snapshot.tenor();
    let overflow = |field: String| NiborError::Overflow {
        field: format!("{}.{}", tenor, field),
    };

    let mut contributions = Vec::with_capacity(Currency::ALL.len());
    let mut funding_rate = Decimal::ZERO;
    let mut partial = false;

    for currency in Currency::ALL {
        let implied_rate = snapshot.implied_rate(currency);
        let weight = snapshot.weights().get(currency);

        let value = match (implied_rate, weight) {
            (Some(rate), Some(weight)) => Some(
                rate.checked_mul(weight)
                    .ok_or_else(|| overflow(format!("contribution.{}", currency)))?,
            ),
            _ => None,
        };

        match value {
            Some(v) => {
                funding_rate = funding_rate
                    .checked_add(v)
                    .ok_or_else(|| overflow("funding_rate".to_string()))?;
            }
            None => partial = true,
        }

        contributions.push(Contribution {
            currency,
            implied_rate,
            weight,
            value,
        });
    }

    let spread = snapshot.spread();
    let final_rate = funding_rate
        .checked_add(spread)
        .ok_or_else(|| overflow("final_rate".to_string()))?;

    debug!(
        tenor = %tenor,
        funding_rate = %funding_rate,
        final_rate = %final_rate,
        partial,
        "Composed rate"
    );

    Ok(Composition {
        tenor,
        contributions,
        funding_rate,
        spread,
        final_rate,
        partial,
    })
}
