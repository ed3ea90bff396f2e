//! Implied NOK yield from FX forward points.

use rust_decimal::Decimal;

use crate::snapshot::FxInputs;

const PIPS_PER_UNIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);
const DAY_COUNT_PERCENT: Decimal = Decimal::from_parts(36_000, 0, 0, false, 0);

/// Implied yield in percent, ACT/360.
///
/// `None` when any input is absent, days is zero or the spot is zero.
pub fn implied_yield(inputs: &FxInputs) -> Option<Decimal> {
    let days = Decimal::from(inputs.days.filter(|d| *d > 0)?);
    let spot = inputs.spot?;
    let pips = inputs.pips?;
    let base_rate = inputs.base_rate?;

    let forward = spot.checked_add(pips.checked_div(PIPS_PER_UNIT)?)?;
    let accrual = base_rate.checked_mul(days)?.checked_div(DAY_COUNT_PERCENT)?;
    let base_factor = Decimal::ONE.checked_add(accrual)?;
    let term_factor = forward.checked_div(spot)?.checked_mul(base_factor)?;

    term_factor
        .checked_sub(Decimal::ONE)?
        .checked_mul(DAY_COUNT_PERCENT)?
        .checked_div(days)
}
