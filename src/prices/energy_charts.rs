use async_trait::async_trait;
use chrono::{DateTime, DurationRound, NaiveDate, TimeDelta};
use chrono_tz::Tz;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::{collections::BTreeMap, str::FromStr, sync::Arc, time::Duration};
use tracing::{info, warn};

use super::{DayPrices, PriceCache, PriceFeed};
use crate::clock::Clock;
use crate::config::PricesConfig;
use crate::domain::PricePoint;
use crate::error::PlanError;
use crate::optimizer::round_fixed;

pub const KWH_PRICE_DECIMALS: u32 = 6;

/// Builds the HTTP client used against the price API.
pub fn build_client(cfg: &PricesConfig) -> reqwest::Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("ev-charge-planner/", env!("CARGO_PKG_VERSION"))),
    );
    reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_seconds))
        .default_headers(headers)
        .build()
}

/// Day-ahead prices from the Energy-Charts API (`GET /price?bzn=..`).
///
/// The API only knows today and tomorrow, so other dates are rejected before
/// any request is made. Successful days are cached per date.
pub struct EnergyChartsFeed {
    base_url: String,
    bidding_zone: String,
    timezone: Tz,
    publication_hour: u32,
    client: reqwest::Client,
    clock: Arc<dyn Clock>,
    cache: PriceCache,
}

impl EnergyChartsFeed {
    pub fn new(client: reqwest::Client, cfg: &PricesConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = TimeDelta::from_std(Duration::from_secs(cfg.cache_ttl_seconds))
            .unwrap_or(TimeDelta::MAX);
        let cache = PriceCache::new(ttl, cfg.cache_capacity, clock.clone());
        Self {
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            bidding_zone: cfg.bidding_zone.clone(),
            timezone: cfg.timezone,
            publication_hour: cfg.publication_hour,
            client,
            clock,
            cache,
        }
    }

    pub fn cache(&self) -> &PriceCache {
        &self.cache
    }

    async fn fetch_day(&self, date: NaiveDate, tomorrow: NaiveDate) -> Result<Vec<PricePoint>, PlanError> {
        let raw = self.fetch_raw().await?;
        let points: Vec<PricePoint> = hourly_points(raw, self.timezone)?
            .into_iter()
            .filter(|p| p.hour.date_naive() == date)
            .collect();

        if points.is_empty() {
            return Err(PlanError::NoDataAvailable {
                date,
                publication_hour: (date == tomorrow).then_some(self.publication_hour),
            });
        }

        info!(%date, bzn = %self.bidding_zone, points = points.len(), "fetched day-ahead prices");
        Ok(points)
    }

    async fn fetch_raw(&self) -> Result<RawPrices, PlanError> {
        let url = format!("{}/price", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("bzn", self.bidding_zone.as_str())])
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, %url, "price GET failed");
                PlanError::from(e)
            })?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            warn!(%status, %url, "price API returned an error status");
            return Err(PlanError::UpstreamFetchFailure(format!(
                "price API error: HTTP {status}"
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            warn!(error = %e, "price JSON parse failed");
            PlanError::UpstreamFetchFailure(format!("price JSON parse failed: {e}"))
        })
    }
}

#[async_trait]
impl PriceFeed for EnergyChartsFeed {
    async fn fetch(&self, date: NaiveDate) -> Result<DayPrices, PlanError> {
        let today = self.today();
        let tomorrow = today
            .succ_opt()
            .ok_or_else(|| PlanError::Internal("calendar overflow".to_string()))?;
        if date < today || date > tomorrow {
            return Err(PlanError::DateOutOfRange {
                date,
                today,
                tomorrow,
            });
        }

        self.cache
            .get_or_fetch(date, || self.fetch_day(date, tomorrow))
            .await
    }

    fn now(&self) -> DateTime<Tz> {
        self.clock.now().with_timezone(&self.timezone)
    }
}

/// Upstream payload: parallel arrays, prices in EUR/MWh.
#[derive(Debug, Default, Deserialize)]
pub struct RawPrices {
    pub price: Option<Vec<Option<f64>>>,
    pub unix_seconds: Option<Vec<Option<i64>>>,
}

/// EUR/MWh to EUR/kWh, half-up to six decimals.
pub fn mwh_to_kwh(price_per_mwh: Decimal) -> Decimal {
    round_fixed(price_per_mwh / Decimal::ONE_THOUSAND, KWH_PRICE_DECIMALS)
}

/// Converts the parallel arrays into one point per local hour.
///
/// Arrays of unequal length are truncated to the shorter one and pairs with a
/// null member are skipped. Sub-hourly points are averaged into the hour they
/// start in.
pub fn hourly_points(raw: RawPrices, timezone: Tz) -> Result<Vec<PricePoint>, PlanError> {
    let (Some(prices), Some(stamps)) = (raw.price, raw.unix_seconds) else {
        return Err(PlanError::UpstreamFetchFailure(
            "price response lacks price or unix_seconds".to_string(),
        ));
    };

    let mut hours: BTreeMap<DateTime<Tz>, (Decimal, u32)> = BTreeMap::new();
    for (stamp, price) in stamps.into_iter().zip(prices) {
        let (Some(stamp), Some(price)) = (stamp, price) else {
            continue;
        };
        let hour = DateTime::from_timestamp(stamp, 0)
            .map(|instant| instant.with_timezone(&timezone))
            .and_then(|local| local.duration_trunc(TimeDelta::hours(1)).ok())
            .ok_or_else(|| {
                PlanError::UpstreamFetchFailure(format!("invalid timestamp {stamp}"))
            })?;
        let price = Decimal::from_str(&price.to_string()).map_err(|e| {
            PlanError::UpstreamFetchFailure(format!("invalid price {price}: {e}"))
        })?;

        let slot = hours.entry(hour).or_insert((Decimal::ZERO, 0));
        slot.0 += price;
        slot.1 += 1;
    }

    if hours.is_empty() {
        return Err(PlanError::UpstreamFetchFailure(
            "price response holds no usable points".to_string(),
        ));
    }

    Ok(hours
        .into_iter()
        .map(|(hour, (sum, count))| PricePoint::new(hour, mwh_to_kwh(sum / Decimal::from(count))))
        .collect())
}
