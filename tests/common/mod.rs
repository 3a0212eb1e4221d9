//! Shared fixtures: a mocked Energy-Charts upstream and a feed pinned to a
//! manual clock.
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use ev_charge_planner::clock::ManualClock;
use ev_charge_planner::config::PricesConfig;
use ev_charge_planner::prices::{build_client, EnergyChartsFeed};

/// 2025-08-20 00:00 in Europe/Amsterdam.
pub const MIDNIGHT: i64 = 1_755_640_800;

/// EUR/MWh for each hour of 2025-08-20.
pub const DAY_PRICES: [f64; 24] = [
    120.0, 70.0, 100.0, 90.0, 80.0, 85.0, 75.0, 130.0, 150.0, 140.0, 120.0, 100.0, 80.0, 60.0,
    50.0, 55.0, 70.0, 110.0, 160.0, 180.0, 170.0, 150.0, 140.0, 130.0,
];

/// 2025-08-20 10:00 in Europe/Amsterdam.
pub fn morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 8, 20, 8, 0, 0).unwrap()
}

/// Upstream body with hourly points from `MIDNIGHT` on.
pub fn payload(prices: &[f64]) -> Value {
    let stamps: Vec<i64> = (0..prices.len() as i64)
        .map(|h| MIDNIGHT + h * 3600)
        .collect();
    json!({
        "license_info": "CC BY 4.0",
        "unix_seconds": stamps,
        "price": prices,
        "unit": "EUR / MWh",
        "deprecated": false
    })
}

/// Today and tomorrow, the second day 10 EUR/MWh dearer.
pub fn two_days() -> Value {
    let mut prices = DAY_PRICES.to_vec();
    prices.extend(DAY_PRICES.iter().map(|p| p + 10.0));
    payload(&prices)
}

pub fn price_mock(body: Value) -> Mock {
    Mock::given(method("GET"))
        .and(path("/price"))
        .and(query_param("bzn", "DE-LU"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
}

pub fn prices_config(server: &MockServer) -> PricesConfig {
    PricesConfig {
        base_url: server.uri(),
        ..PricesConfig::default()
    }
}

pub fn feed(server: &MockServer, clock: Arc<ManualClock>) -> EnergyChartsFeed {
    let cfg = prices_config(server);
    let client = build_client(&cfg).expect("client");
    EnergyChartsFeed::new(client, &cfg, clock)
}
