use chrono::DateTime;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Price of one delivery hour.
///
/// `hour` is the start of the hour in the feed's timezone. Equality compares
/// both the instant and the price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricePoint {
    pub hour: DateTime<Tz>,
    pub price_per_kwh: Decimal,
}

impl PricePoint {
    pub fn new(hour: DateTime<Tz>, price_per_kwh: Decimal) -> Self {
        Self {
            hour,
            price_per_kwh,
        }
    }
}

/// How the selected hours relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChargingMode {
    /// One uninterrupted window.
    Continuous,
    /// Individually cheapest hours, gaps allowed.
    Discrete,
}

impl ChargingMode {
    pub fn from_continuous(continuous: bool) -> Self {
        if continuous {
            Self::Continuous
        } else {
            Self::Discrete
        }
    }
}

impl fmt::Display for ChargingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continuous => write!(f, "CONTINUOUS"),
            Self::Discrete => write!(f, "DISCRETE"),
        }
    }
}
