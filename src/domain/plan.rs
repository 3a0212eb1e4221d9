use chrono::{DateTime, LocalResult, NaiveDate, NaiveTime, TimeZone};
use chrono_tz::Tz;
use rust_decimal::Decimal;

use super::ChargingMode;
use crate::error::PlanError;

/// Validated input for one plan computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingPlanRequest {
    pub date: NaiveDate,
    pub deadline: NaiveTime,
    pub timezone: Tz,
    pub charge_rate_kwh_per_hour: Decimal,
    pub energy_needed_kwh: Decimal,
    pub continuous: bool,
}

impl ChargingPlanRequest {
    pub fn mode(&self) -> ChargingMode {
        ChargingMode::from_continuous(self.continuous)
    }

    /// The deadline as an instant: `date` at `deadline` in `timezone`.
    ///
    /// A local time skipped by a DST transition is rejected; a repeated one
    /// resolves to its earlier occurrence.
    pub fn deadline_at(&self) -> Result<DateTime<Tz>, PlanError> {
        match self
            .timezone
            .from_local_datetime(&self.date.and_time(self.deadline))
        {
            LocalResult::Single(dt) => Ok(dt),
            LocalResult::Ambiguous(earliest, _) => Ok(earliest),
            LocalResult::None => Err(PlanError::InvalidRequest(format!(
                "deadline {} {} does not exist in {}",
                self.date,
                self.deadline.format("%H:%M"),
                self.timezone
            ))),
        }
    }
}

/// Outcome of a successful computation.
///
/// `selected_hours` is ascending and has exactly `required_hours` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChargingPlan {
    pub mode: ChargingMode,
    pub required_hours: u32,
    pub start_time: DateTime<Tz>,
    pub selected_hours: Vec<DateTime<Tz>>,
    pub total_cost_eur: Decimal,
    pub avg_price_eur_per_kwh: Decimal,
    pub deadline: DateTime<Tz>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Amsterdam;
    use rust_decimal::dec;

    fn request(date: NaiveDate, deadline: NaiveTime) -> ChargingPlanRequest {
        ChargingPlanRequest {
            date,
            deadline,
            timezone: Amsterdam,
            charge_rate_kwh_per_hour: dec!(11),
            energy_needed_kwh: dec!(30),
            continuous: true,
        }
    }

    #[test]
    fn test_deadline_in_request_zone() {
        let req = request(
            NaiveDate::from_ymd_opt(2025, 8, 20).unwrap(),
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
        );
        let deadline = req.deadline_at().unwrap();
        assert_eq!(deadline.to_rfc3339(), "2025-08-20T07:00:00+02:00");
        assert_eq!(req.mode(), ChargingMode::Continuous);
    }

    #[test]
    fn test_deadline_in_dst_gap_is_rejected() {
        // 02:30 does not exist on the spring-forward night.
        let req = request(
            NaiveDate::from_ymd_opt(2025, 3, 30).unwrap(),
            NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
        );
        assert!(matches!(
            req.deadline_at(),
            Err(PlanError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_deadline_in_dst_fold_takes_first_occurrence() {
        let req = request(
            NaiveDate::from_ymd_opt(2025, 10, 26).unwrap(),
            NaiveTime::from_hms_opt(2, 30, 0).unwrap(),
        );
        assert_eq!(
            req.deadline_at().unwrap().to_rfc3339(),
            "2025-10-26T02:30:00+02:00"
        );
    }
}
