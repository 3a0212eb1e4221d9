pub mod deadline;

pub use deadline::*;

use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::{ChargingPlan, ChargingPlanRequest, PricePoint};
use crate::error::PlanError;
use crate::optimizer::{required_hours, summarize, PlanOptimizer};
use crate::prices::{DayPrices, PriceFeed};

/// Price feed → deadline filter → optimizer → cost.
pub struct ChargingPlanService {
    feed: Arc<dyn PriceFeed>,
    optimizer: PlanOptimizer,
}

impl ChargingPlanService {
    pub fn new(feed: Arc<dyn PriceFeed>) -> Self {
        Self {
            feed,
            optimizer: PlanOptimizer::default(),
        }
    }

    pub fn feed(&self) -> &Arc<dyn PriceFeed> {
        &self.feed
    }

    pub async fn prices(&self, date: chrono::NaiveDate) -> Result<DayPrices, PlanError> {
        self.feed.fetch(date).await
    }

    pub async fn plan(&self, request: &ChargingPlanRequest) -> Result<ChargingPlan, PlanError> {
        let required = required_hours(request.energy_needed_kwh, request.charge_rate_kwh_per_hour)?;
        let deadline = request.deadline_at()?;
        let mode = request.mode();

        let mut prices: Vec<PricePoint> = self.feed.fetch(request.date).await?.to_vec();
        prices.sort_by_key(|p| p.hour);
        let eligible = eligible_hours(&prices, deadline);

        let now = || self.feed.now().with_timezone(&request.timezone);

        if eligible.len() < required as usize {
            let (advisory, best_effort) = earliest_feasible_deadline(&prices, required, now());
            debug!(
                required,
                available = eligible.len(),
                %mode,
                "not enough hours before deadline"
            );
            return Err(PlanError::InsufficientHours {
                required,
                available: eligible.len(),
                gapped: false,
                earliest_feasible_deadline: advisory.with_timezone(&request.timezone),
                best_effort,
            });
        }

        // Only a continuous plan can fail here: the hours exist but are not
        // consecutive.
        let selection = match self.optimizer.optimize(mode, &eligible, required as usize) {
            Some(selection) => selection,
            None => {
                let (advisory, best_effort) =
                    earliest_contiguous_deadline(&prices, required, now());
                debug!(
                    required,
                    available = eligible.len(),
                    %mode,
                    "no uninterrupted window before deadline"
                );
                return Err(PlanError::InsufficientHours {
                    required,
                    available: eligible.len(),
                    gapped: true,
                    earliest_feasible_deadline: advisory.with_timezone(&request.timezone),
                    best_effort,
                });
            }
        };
        let cost = summarize(&selection, required, request.energy_needed_kwh)?;

        // Report in the caller's zone; instants are unchanged.
        let selected_hours: Vec<_> = selection
            .iter()
            .map(|p| p.hour.with_timezone(&request.timezone))
            .collect();
        let start_time = *selected_hours
            .first()
            .ok_or_else(|| PlanError::Internal("empty selection".to_string()))?;

        info!(
            %mode,
            date = %request.date,
            required_hours = required,
            start = %start_time.to_rfc3339(),
            total_cost_eur = %cost.total_cost_eur,
            "charging plan computed"
        );

        Ok(ChargingPlan {
            mode,
            required_hours: required,
            start_time,
            selected_hours,
            total_cost_eur: cost.total_cost_eur,
            avg_price_eur_per_kwh: cost.avg_price_eur_per_kwh,
            deadline,
        })
    }
}
