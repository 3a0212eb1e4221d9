use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat};
use chrono_tz::Tz;
use rust_decimal::{dec, Decimal};
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::{ChargingMode, ChargingPlan, ChargingPlanRequest, PricePoint};
use crate::error::PlanError;

pub const DEFAULT_TIMEZONE: &str = "Europe/Amsterdam";

/// ISO-8601 with seconds and an explicit offset, `Z` for UTC.
pub fn iso8601(dt: &DateTime<Tz>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Body of `POST /api/plan`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChargingPlanRequestDto {
    #[validate(required(message = "date is required"))]
    pub date: Option<NaiveDate>,

    #[serde(default, deserialize_with = "deserialize_hh_mm")]
    #[validate(required(message = "deadline is required"))]
    pub deadline: Option<NaiveTime>,

    #[serde(default = "default_timezone")]
    #[validate(custom(function = "validate_timezone"))]
    pub timezone: String,

    #[serde(
        default = "default_charge_rate",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    #[validate(custom(function = "validate_charge_rate"))]
    pub charge_rate_kwh_per_hour: Decimal,

    #[serde(
        default = "default_energy_needed",
        with = "rust_decimal::serde::arbitrary_precision"
    )]
    #[validate(custom(function = "validate_energy_needed"))]
    pub energy_needed_kwh: Decimal,

    #[serde(default = "default_continuous")]
    pub continuous: bool,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_charge_rate() -> Decimal {
    dec!(10)
}

fn default_energy_needed() -> Decimal {
    dec!(80)
}

fn default_continuous() -> bool {
    true
}

fn validate_timezone(timezone: &str) -> Result<(), ValidationError> {
    timezone
        .parse::<Tz>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("timezone").with_message("unknown IANA timezone".into()))
}

fn validate_charge_rate(rate: &Decimal) -> Result<(), ValidationError> {
    if *rate < dec!(0.1) || *rate > dec!(350) {
        return Err(ValidationError::new("range")
            .with_message("charge rate must be between 0.1 and 350 kWh/h".into()));
    }
    Ok(())
}

fn validate_energy_needed(energy: &Decimal) -> Result<(), ValidationError> {
    if *energy < dec!(1) || *energy > dec!(1000) {
        return Err(ValidationError::new("range")
            .with_message("energy needed must be between 1 and 1000 kWh".into()));
    }
    Ok(())
}

/// Accepts `HH:mm`, and `HH:mm:ss` for clients that send full times.
fn deserialize_hh_mm<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| serde::de::Error::custom(format!("deadline must be HH:mm, got {raw:?}")))
}

impl TryFrom<ChargingPlanRequestDto> for ChargingPlanRequest {
    type Error = PlanError;

    /// Expects a DTO that already passed `validate()`.
    fn try_from(dto: ChargingPlanRequestDto) -> Result<Self, Self::Error> {
        let date = dto
            .date
            .ok_or_else(|| PlanError::InvalidRequest("date is required".to_string()))?;
        let deadline = dto
            .deadline
            .ok_or_else(|| PlanError::InvalidRequest("deadline is required".to_string()))?;
        let timezone = dto.timezone.parse::<Tz>().map_err(|_| {
            PlanError::InvalidRequest(format!("unknown timezone {}", dto.timezone))
        })?;

        Ok(ChargingPlanRequest {
            date,
            deadline,
            timezone,
            charge_rate_kwh_per_hour: dto.charge_rate_kwh_per_hour,
            energy_needed_kwh: dto.energy_needed_kwh,
            continuous: dto.continuous,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargingPlanDto {
    pub mode: ChargingMode,
    pub required_hours: u32,
    pub start_time: String,
    pub selected_hours: Vec<String>,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub total_cost_eur: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    pub avg_price_eur_per_kwh: Decimal,
    pub deadline: String,
}

impl From<&ChargingPlan> for ChargingPlanDto {
    fn from(plan: &ChargingPlan) -> Self {
        Self {
            mode: plan.mode,
            required_hours: plan.required_hours,
            start_time: iso8601(&plan.start_time),
            selected_hours: plan.selected_hours.iter().map(iso8601).collect(),
            total_cost_eur: plan.total_cost_eur,
            avg_price_eur_per_kwh: plan.avg_price_eur_per_kwh,
            deadline: iso8601(&plan.deadline),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PricePointDto {
    pub hour: String,
    #[serde(rename = "pricePerKWh", with = "rust_decimal::serde::arbitrary_precision")]
    pub price_per_kwh: Decimal,
}

impl From<&PricePoint> for PricePointDto {
    fn from(point: &PricePoint) -> Self {
        Self {
            hour: iso8601(&point.hour),
            price_per_kwh: point.price_per_kwh,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PricesQuery {
    pub date: Option<NaiveDate>,
}
