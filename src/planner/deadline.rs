use chrono::{DateTime, TimeDelta};
use chrono_tz::Tz;

use crate::domain::PricePoint;

/// Points at or before `deadline`, ascending by hour.
///
/// The boundary is inclusive: an hour starting exactly at the deadline is
/// eligible.
pub fn eligible_hours(prices: &[PricePoint], deadline: DateTime<Tz>) -> Vec<PricePoint> {
    let mut eligible: Vec<PricePoint> = prices
        .iter()
        .filter(|p| p.hour <= deadline)
        .cloned()
        .collect();
    eligible.sort_by_key(|p| p.hour);
    eligible
}

/// Advisory deadline that would have left `required_hours` eligible points.
///
/// `prices` must be ascending. The second element is `true` when the value is
/// a best-effort guess from `now` because no prices are known at all.
pub fn earliest_feasible_deadline(
    prices: &[PricePoint],
    required_hours: u32,
    now: DateTime<Tz>,
) -> (DateTime<Tz>, bool) {
    let required = required_hours as usize;
    let hours = TimeDelta::hours(i64::from(required_hours));

    if required > 0 && prices.len() >= required {
        (prices[required - 1].hour + TimeDelta::hours(1), false)
    } else if let Some(last) = prices.last() {
        (last.hour + hours, false)
    } else {
        (now + hours, true)
    }
}

/// Advisory deadline for a continuous plan that has enough eligible hours but
/// no gap-free run of `required_hours`: the hour after the first such run in
/// the full series.
///
/// When the series has no such run at all the fallback is the last known
/// hour plus `required_hours` (or `now` plus that without prices), flagged
/// best-effort.
pub fn earliest_contiguous_deadline(
    prices: &[PricePoint],
    required_hours: u32,
    now: DateTime<Tz>,
) -> (DateTime<Tz>, bool) {
    let required = required_hours as usize;
    let step = TimeDelta::hours(1);

    let mut run = 0;
    for (i, point) in prices.iter().enumerate() {
        run = if i > 0 && point.hour - prices[i - 1].hour == step {
            run + 1
        } else {
            1
        };
        if required > 0 && run >= required {
            return (point.hour + step, false);
        }
    }

    let hours = TimeDelta::hours(i64::from(required_hours));
    match prices.last() {
        Some(last) => (last.hour + hours, true),
        None => (now + hours, true),
    }
}
