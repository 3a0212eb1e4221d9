pub mod cache;
pub mod energy_charts;

pub use cache::*;
pub use energy_charts::*;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use chrono_tz::Tz;

use crate::error::PlanError;

/// Hourly day-ahead prices for one calendar date.
///
/// Implementations return the series sorted by hour, restricted to the
/// requested local date.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn fetch(&self, date: NaiveDate) -> Result<DayPrices, PlanError>;

    /// Current instant in the feed's timezone.
    fn now(&self) -> DateTime<Tz>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
