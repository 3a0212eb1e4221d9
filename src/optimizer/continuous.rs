use chrono::TimeDelta;
use rust_decimal::Decimal;

use super::SelectionStrategy;
use crate::domain::{ChargingMode, PricePoint};

/// Cheapest uninterrupted run of hours.
///
/// Single left-to-right pass with a running window sum. A window only counts
/// if its hours are exactly one hour apart, so a hole in the upstream series
/// splits the day into independent runs. The earliest window wins ties.
pub struct ContinuousWindowOptimizer;

impl SelectionStrategy for ContinuousWindowOptimizer {
    fn mode(&self) -> ChargingMode {
        ChargingMode::Continuous
    }

    fn select(&self, eligible: &[PricePoint], required_hours: usize) -> Option<Vec<PricePoint>> {
        cheapest_window(eligible, required_hours)
            .map(|start| eligible[start..start + required_hours].to_vec())
    }
}

/// Start index of the cheapest gap-free window of `width` points.
pub fn cheapest_window(points: &[PricePoint], width: usize) -> Option<usize> {
    if width == 0 || points.len() < width {
        return None;
    }

    let step = TimeDelta::hours(1);
    let mut best: Option<(usize, Decimal)> = None;
    let mut window_sum = Decimal::ZERO;
    let mut run_start = 0;

    for (end, point) in points.iter().enumerate() {
        if end > 0 && point.hour.signed_duration_since(points[end - 1].hour) != step {
            run_start = end;
            window_sum = Decimal::ZERO;
        }

        window_sum += point.price_per_kwh;
        if end - run_start + 1 > width {
            window_sum -= points[end - width].price_per_kwh;
        }

        if end + 1 >= run_start + width {
            let start = end + 1 - width;
            if best.map_or(true, |(_, best_sum)| window_sum < best_sum) {
                best = Some((start, window_sum));
            }
        }
    }

    best.map(|(start, _)| start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone};
    use chrono_tz::{Europe::Amsterdam, Tz};
    use proptest::prelude::*;
    use rust_decimal::dec;

    fn hour(h: u32) -> DateTime<Tz> {
        Amsterdam.with_ymd_and_hms(2025, 8, 20, h, 0, 0).unwrap()
    }

    fn series(start_hour: u32, prices: &[Decimal]) -> Vec<PricePoint> {
        prices
            .iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(hour(start_hour + i as u32), *p))
            .collect()
    }

    #[test]
    fn test_picks_cheapest_leading_window() {
        let points = series(
            6,
            &[dec!(0.10), dec!(0.12), dec!(0.15), dec!(0.20), dec!(0.25), dec!(0.30)],
        );
        let selected = ContinuousWindowOptimizer.select(&points, 2).unwrap();
        assert_eq!(
            selected.iter().map(|p| p.hour).collect::<Vec<_>>(),
            vec![hour(6), hour(7)]
        );
        let sum: Decimal = selected.iter().map(|p| p.price_per_kwh).sum();
        assert_eq!(sum, dec!(0.22));
    }

    #[test]
    fn test_picks_window_in_the_middle() {
        let points = series(0, &[dec!(0.30), dec!(0.05), dec!(0.04), dec!(0.50), dec!(0.01)]);
        assert_eq!(cheapest_window(&points, 2), Some(1));
        assert_eq!(cheapest_window(&points, 1), Some(4));
        assert_eq!(cheapest_window(&points, 5), Some(0));
    }

    #[test]
    fn test_earliest_window_wins_ties() {
        let points = series(0, &[dec!(0.10), dec!(0.20), dec!(0.10), dec!(0.20), dec!(0.10)]);
        assert_eq!(cheapest_window(&points, 2), Some(0));
    }

    #[test]
    fn test_window_does_not_span_gaps() {
        // 02:00 is missing, so 01:00 + 03:00 is not a window.
        let points = vec![
            PricePoint::new(hour(0), dec!(0.50)),
            PricePoint::new(hour(1), dec!(0.01)),
            PricePoint::new(hour(3), dec!(0.01)),
            PricePoint::new(hour(4), dec!(0.40)),
        ];
        assert_eq!(cheapest_window(&points, 2), Some(2));
    }

    #[test]
    fn test_no_window_when_runs_are_too_short() {
        let points = vec![
            PricePoint::new(hour(0), dec!(0.10)),
            PricePoint::new(hour(2), dec!(0.10)),
            PricePoint::new(hour(4), dec!(0.10)),
        ];
        assert_eq!(cheapest_window(&points, 2), None);
        assert!(ContinuousWindowOptimizer.select(&points, 2).is_none());
    }

    #[test]
    fn test_too_few_points() {
        let points = series(0, &[dec!(0.10)]);
        assert_eq!(cheapest_window(&points, 2), None);
        assert_eq!(cheapest_window(&points, 0), None);
    }

    proptest! {
        #[test]
        fn prop_window_is_minimal_and_earliest(
            cents in prop::collection::vec(-50i64..500, 1..24),
            width in 1usize..8,
        ) {
            let prices: Vec<Decimal> = cents.iter().map(|c| Decimal::new(*c, 3)).collect();
            let points = series(0, &prices);
            let chosen = cheapest_window(&points, width);

            if width > points.len() {
                prop_assert!(chosen.is_none());
            } else {
                let sums: Vec<Decimal> = points
                    .windows(width)
                    .map(|w| w.iter().map(|p| p.price_per_kwh).sum())
                    .collect();
                let start = chosen.unwrap();
                let min = *sums.iter().min().unwrap();
                prop_assert_eq!(sums[start], min);
                prop_assert!(sums[..start].iter().all(|s| *s > min));
            }
        }
    }
}
