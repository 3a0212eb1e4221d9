use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::PricePoint;
use crate::error::PlanError;

pub const AVG_PRICE_DECIMALS: u32 = 6;
pub const COST_DECIMALS: u32 = 2;

/// Rounds half-up to `dp` places and pins the scale to `dp`, so a total of
/// 4.4 is carried (and rendered) as `4.40`.
pub fn round_fixed(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Cost summary of a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CostSummary {
    pub total_cost_eur: Decimal,
    pub avg_price_eur_per_kwh: Decimal,
}

/// Prices a selection of hours for `energy_needed_kwh`.
///
/// The average is `sum / hours`; the total is that average times the energy,
/// evaluated as `sum * energy / hours` so the only rounding happens on the
/// final value.
pub fn summarize(
    selection: &[PricePoint],
    required_hours: u32,
    energy_needed_kwh: Decimal,
) -> Result<CostSummary, PlanError> {
    if required_hours == 0 {
        return Err(PlanError::Internal(
            "cost of an empty selection".to_string(),
        ));
    }
    let hours = Decimal::from(required_hours);
    let price_sum = selection
        .iter()
        .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.price_per_kwh))
        .ok_or_else(|| PlanError::Internal("price sum overflow".to_string()))?;

    let avg_price_eur_per_kwh = price_sum
        .checked_div(hours)
        .map(|avg| round_fixed(avg, AVG_PRICE_DECIMALS))
        .ok_or_else(|| PlanError::Internal("average price overflow".to_string()))?;

    let total_cost_eur = price_sum
        .checked_mul(energy_needed_kwh)
        .and_then(|scaled| scaled.checked_div(hours))
        .map(|total| round_fixed(total, COST_DECIMALS))
        .ok_or_else(|| PlanError::Internal("total cost overflow".to_string()))?;

    Ok(CostSummary {
        total_cost_eur,
        avg_price_eur_per_kwh,
    })
}
