use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::PlanError;

/// Whole hours needed to deliver `energy_needed_kwh` at
/// `charge_rate_kwh_per_hour`, rounded up.
pub fn required_hours(
    energy_needed_kwh: Decimal,
    charge_rate_kwh_per_hour: Decimal,
) -> Result<u32, PlanError> {
    if energy_needed_kwh <= Decimal::ZERO {
        return Err(PlanError::InvalidRequest(
            "energy needed must be positive".to_string(),
        ));
    }
    if charge_rate_kwh_per_hour <= Decimal::ZERO {
        return Err(PlanError::InvalidRequest(
            "charge rate must be positive".to_string(),
        ));
    }

    energy_needed_kwh
        .checked_div(charge_rate_kwh_per_hour)
        .map(|hours| hours.ceil())
        .and_then(|hours| hours.to_u32())
        .ok_or_else(|| {
            PlanError::InvalidRequest(format!(
                "{energy_needed_kwh} kWh at {charge_rate_kwh_per_hour} kWh/h needs too many hours"
            ))
        })
}
