//! Per-tenor computation trace.

use std::collections::BTreeMap;

use nibor_common::{decimal_from_f64, optional_decimal, Currency, NiborError, Result, Tenor};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::composition::{compose, Composition};

/// Allowed deviation of a complete weight set from 1.
pub const WEIGHT_SUM_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 6);

/// Basket weights per currency, each in [0, 1].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Weights(BTreeMap<Currency, Decimal>);

impl Weights {
    /// Create a validated weight set with the default sum tolerance.
    pub fn new(weights: BTreeMap<Currency, Decimal>) -> Result<Self> {
        Self::with_sum_tolerance(weights, WEIGHT_SUM_TOLERANCE)
    }

    /// Create a validated weight set.
    ///
    /// The sum check only applies once all three currencies are present.
    pub fn with_sum_tolerance(
        weights: BTreeMap<Currency, Decimal>,
        sum_tolerance: Decimal,
    ) -> Result<Self> {
        for (currency, weight) in &weights {
            if *weight < Decimal::ZERO || *weight > Decimal::ONE {
                return Err(NiborError::WeightOutOfRange {
                    currency: *currency,
                    weight: *weight,
                });
            }
        }

        let weights = Self(weights);
        if weights.is_complete() {
            let sum = weights.sum();
            if (sum - Decimal::ONE).abs() > sum_tolerance {
                return Err(NiborError::WeightSumMismatch { sum });
            }
        }

        Ok(weights)
    }

    /// Weight for a currency.
    pub fn get(&self, currency: Currency) -> Option<Decimal> {
        self.0.get(&currency).copied()
    }

    /// Whether every basket currency has a weight.
    pub fn is_complete(&self) -> bool {
        Currency::ALL.iter().all(|c| self.0.contains_key(c))
    }

    /// Sum of present weights.
    pub fn sum(&self) -> Decimal {
        self.0.values().copied().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Currency, Decimal)> + '_ {
        self.0.iter().map(|(c, w)| (*c, *w))
    }
}

/// Auxiliary FX inputs behind a currency's implied rate. Informational.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FxInputs {
    /// Spot rate against NOK.
    pub spot: Option<Decimal>,
    /// Forward points in pips.
    pub pips: Option<Decimal>,
    /// Base currency rate in percent.
    pub base_rate: Option<Decimal>,
    /// Days to maturity.
    pub days: Option<u32>,
}

/// Immutable computation trace for one tenor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateSnapshot {
    tenor: Tenor,
    implied_rates: BTreeMap<Currency, Decimal>,
    weights: Weights,
    spread: Decimal,
    fx_inputs: BTreeMap<Currency, FxInputs>,
    composition: Option<Composition>,
}

impl RateSnapshot {
    /// Create a snapshot. Currencies missing from `implied_rates` have not
    /// been computed yet.
    pub fn new(
        tenor: Tenor,
        implied_rates: BTreeMap<Currency, Decimal>,
        weights: Weights,
        spread: Decimal,
    ) -> Self {
        Self {
            tenor,
            implied_rates,
            weights,
            spread,
            fx_inputs: BTreeMap::new(),
            composition: None,
        }
    }

    /// Attach FX inputs for a currency.
    pub fn with_fx_inputs(mut self, currency: Currency, inputs: FxInputs) -> Self {
        self.fx_inputs.insert(currency, inputs);
        self
    }

    /// Replace one implied rate. Any earlier composition is dropped.
    pub fn with_implied_rate(mut self, currency: Currency, rate: Option<Decimal>) -> Self {
        match rate {
            Some(rate) => self.implied_rates.insert(currency, rate),
            None => self.implied_rates.remove(&currency),
        };
        self.composition = None;
        self
    }

    /// Replace the spread. Any earlier composition is dropped.
    pub fn with_spread(mut self, spread: Decimal) -> Self {
        self.spread = spread;
        self.composition = None;
        self
    }

    /// Run rate composition and keep its output on the snapshot.
    pub fn composed(mut self) -> Result<Self> {
        if self.composition.is_none() {
            self.composition = Some(compose(&self)?);
        }
        Ok(self)
    }

    pub fn tenor(&self) -> Tenor {
        self.tenor
    }

    /// Implied rate for a currency, `None` when not yet computed.
    pub fn implied_rate(&self, currency: Currency) -> Option<Decimal> {
        self.implied_rates.get(&currency).copied()
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    pub fn spread(&self) -> Decimal {
        self.spread
    }

    pub fn fx_inputs(&self, currency: Currency) -> Option<&FxInputs> {
        self.fx_inputs.get(&currency)
    }

    /// Composition output, absent until [`RateSnapshot::composed`] runs.
    pub fn composition(&self) -> Option<&Composition> {
        self.composition.as_ref()
    }

    /// Published rate, absent until [`RateSnapshot::composed`] runs.
    pub fn final_rate(&self) -> Option<Decimal> {
        self.composition.as_ref().map(|c| c.final_rate)
    }
}

/// Inbound FX inputs as produced by the upstream calculation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FxInputRecord {
    #[serde(default)]
    pub spot: Option<f64>,
    #[serde(default)]
    pub pips: Option<f64>,
    #[serde(default)]
    pub base_rate: Option<f64>,
    #[serde(default)]
    pub days: Option<u32>,
}

impl FxInputRecord {
    fn into_inputs(self, currency: Currency) -> Result<FxInputs> {
        Ok(FxInputs {
            spot: optional_decimal(&format!("fx_inputs.{}.spot", currency), self.spot)?,
            pips: optional_decimal(&format!("fx_inputs.{}.pips", currency), self.pips)?,
            base_rate: optional_decimal(
                &format!("fx_inputs.{}.base_rate", currency),
                self.base_rate,
            )?,
            days: self.days,
        })
    }
}

/// Inbound snapshot record. Dictionary-shaped upstream data lands here and
/// is validated once, on conversion into a [`RateSnapshot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub tenor: Tenor,
    #[serde(default)]
    pub implied_rates: BTreeMap<Currency, Option<f64>>,
    #[serde(default)]
    pub weights: BTreeMap<Currency, f64>,
    /// Falls back to the tenor's default spread when omitted.
    #[serde(default)]
    pub spread: Option<f64>,
    #[serde(default)]
    pub fx_inputs: BTreeMap<Currency, FxInputRecord>,
}

impl SnapshotRecord {
    /// Validate and convert with a custom weight-sum tolerance.
    pub fn into_snapshot(self, weight_sum_tolerance: Decimal) -> Result<RateSnapshot> {
        let mut implied_rates = BTreeMap::new();
        for (currency, rate) in self.implied_rates {
            if let Some(rate) = optional_decimal(&format!("implied_rates.{}", currency), rate)? {
                implied_rates.insert(currency, rate);
            }
        }

        let mut weights = BTreeMap::new();
        for (currency, weight) in self.weights {
            weights.insert(currency, decimal_from_f64(&format!("weights.{}", currency), weight)?);
        }
        let weights = Weights::with_sum_tolerance(weights, weight_sum_tolerance)?;

        let spread = match self.spread {
            Some(spread) => decimal_from_f64("spread", spread)?,
            None => self.tenor.default_spread(),
        };

        let mut snapshot = RateSnapshot::new(self.tenor, implied_rates, weights, spread);
        for (currency, inputs) in self.fx_inputs {
            snapshot = snapshot.with_fx_inputs(currency, inputs.into_inputs(currency)?);
        }

        Ok(snapshot)
    }
}

impl TryFrom<SnapshotRecord> for RateSnapshot {
    type Error = NiborError;

    fn try_from(record: SnapshotRecord) -> Result<Self> {
        record.into_snapshot(WEIGHT_SUM_TOLERANCE)
    }
}
