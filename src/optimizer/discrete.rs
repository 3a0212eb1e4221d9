use super::SelectionStrategy;
use crate::domain::{ChargingMode, PricePoint};

/// The individually cheapest hours, regardless of adjacency.
///
/// Ranks by price and then by hour, so equal prices favour the earlier hour.
pub struct CheapestHoursOptimizer;

impl SelectionStrategy for CheapestHoursOptimizer {
    fn mode(&self) -> ChargingMode {
        ChargingMode::Discrete
    }

    fn select(&self, eligible: &[PricePoint], required_hours: usize) -> Option<Vec<PricePoint>> {
        if required_hours == 0 || eligible.len() < required_hours {
            return None;
        }

        let mut ranked: Vec<&PricePoint> = eligible.iter().collect();
        ranked.sort_by(|a, b| {
            a.price_per_kwh
                .cmp(&b.price_per_kwh)
                .then_with(|| a.hour.cmp(&b.hour))
        });

        let mut chosen: Vec<PricePoint> = ranked
            .into_iter()
            .take(required_hours)
            .cloned()
            .collect();
        chosen.sort_by_key(|p| p.hour);
        Some(chosen)
    }
}
