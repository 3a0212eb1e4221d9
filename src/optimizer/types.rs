use crate::domain::{ChargingMode, PricePoint};

/// Picks `required_hours` points out of an ascending, deadline-filtered
/// price series.
///
/// Implementations return `None` when no admissible selection exists. A
/// returned selection is chronological and holds exactly `required_hours`
/// points.
pub trait SelectionStrategy: Send + Sync {
    fn mode(&self) -> ChargingMode;

    fn select(&self, eligible: &[PricePoint], required_hours: usize) -> Option<Vec<PricePoint>>;
}

/// Facade dispatching to the strategy for a given mode.
pub struct PlanOptimizer {
    continuous: Box<dyn SelectionStrategy>,
    discrete: Box<dyn SelectionStrategy>,
}

impl Default for PlanOptimizer {
    fn default() -> Self {
        Self {
            continuous: Box::new(super::ContinuousWindowOptimizer),
            discrete: Box::new(super::CheapestHoursOptimizer),
        }
    }
}

impl PlanOptimizer {
    pub fn strategy(&self, mode: ChargingMode) -> &dyn SelectionStrategy {
        match mode {
            ChargingMode::Continuous => self.continuous.as_ref(),
            ChargingMode::Discrete => self.discrete.as_ref(),
        }
    }

    pub fn optimize(
        &self,
        mode: ChargingMode,
        eligible: &[PricePoint],
        required_hours: usize,
    ) -> Option<Vec<PricePoint>> {
        let strategy = self.strategy(mode);
        debug_assert_eq!(strategy.mode(), mode);
        strategy.select(eligible, required_hours)
    }
}
