use anyhow::Result;
use std::sync::Arc;

use crate::clock::SystemClock;
use crate::config::PricesConfig;
use crate::planner::ChargingPlanService;
use crate::prices::{build_client, EnergyChartsFeed, PriceFeed};

/// Shared handler state, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<ChargingPlanService>,
}

impl AppState {
    pub fn new(cfg: &PricesConfig) -> Result<Self> {
        let client = build_client(cfg)?;
        let feed = Arc::new(EnergyChartsFeed::new(client, cfg, Arc::new(SystemClock)));
        Ok(Self::with_feed(feed))
    }

    pub fn with_feed(feed: Arc<dyn PriceFeed>) -> Self {
        Self {
            planner: Arc::new(ChargingPlanService::new(feed)),
        }
    }
}
