use chrono::{DateTime, NaiveDate, TimeDelta, Utc};
use parking_lot::Mutex;
use std::{
    collections::{HashMap, VecDeque},
    future::Future,
    sync::Arc,
};
use tracing::debug;

use crate::clock::Clock;
use crate::domain::PricePoint;
use crate::error::PlanError;

/// Shared, immutable price series for one day.
pub type DayPrices = Arc<[PricePoint]>;

pub const DEFAULT_TTL_SECONDS: u64 = 30 * 60;
pub const DEFAULT_CAPACITY: usize = 100;

/// Per-date fetch lock and the number of tasks currently queued on it.
struct FlightSlot {
    lock: Arc<tokio::sync::Mutex<()>>,
    tasks: usize,
}

struct CacheEntry {
    stored_at: DateTime<Utc>,
    prices: DayPrices,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<NaiveDate, CacheEntry>,
    /// Insertion order, oldest first.
    order: VecDeque<NaiveDate>,
}

impl CacheState {
    fn remove(&mut self, date: &NaiveDate) {
        if self.entries.remove(date).is_some() {
            self.order.retain(|d| d != date);
        }
    }
}

/// Per-date price cache with time-to-live and a size bound.
///
/// Entries are written once and only ever removed: on expiry (checked lazily
/// on read) or, when full, oldest-by-insertion first. Concurrent misses on
/// the same date are serialized behind a per-date lock so only one upstream
/// fetch is in flight per date; the waiters then read the stored result.
pub struct PriceCache {
    ttl: TimeDelta,
    capacity: usize,
    clock: Arc<dyn Clock>,
    state: Mutex<CacheState>,
    in_flight: Mutex<HashMap<NaiveDate, FlightSlot>>,
}

impl PriceCache {
    pub fn new(ttl: TimeDelta, capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            capacity: capacity.max(1),
            clock,
            state: Mutex::new(CacheState::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn get(&self, date: NaiveDate) -> Option<DayPrices> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let expired = match state.entries.get(&date) {
            Some(entry) if now - entry.stored_at < self.ttl => {
                debug!(%date, "price cache hit");
                return Some(entry.prices.clone());
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            debug!(%date, "price cache entry expired");
            state.remove(&date);
        }
        None
    }

    pub fn insert(&self, date: NaiveDate, prices: DayPrices) {
        let entry = CacheEntry {
            stored_at: self.clock.now(),
            prices,
        };
        let mut state = self.state.lock();
        state.remove(&date);
        state.entries.insert(date, entry);
        state.order.push_back(date);

        while state.entries.len() > self.capacity {
            let Some(oldest) = state.order.pop_front() else {
                break;
            };
            state.entries.remove(&oldest);
            debug!(date = %oldest, "price cache evicted oldest entry");
        }
    }

    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the cached series for `date`, or runs `fetch` and stores its
    /// result. Failures are returned to the caller that ran the fetch and
    /// are not cached.
    pub async fn get_or_fetch<F, Fut>(&self, date: NaiveDate, fetch: F) -> Result<DayPrices, PlanError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<PricePoint>, PlanError>>,
    {
        if let Some(prices) = self.get(date) {
            return Ok(prices);
        }

        let (_flight, key_lock) = InFlight::join(self, date);

        let _turn = key_lock.lock().await;
        match self.get(date) {
            Some(prices) => Ok(prices),
            None => {
                debug!(%date, "price cache miss");
                fetch().await.map(|points| {
                    let prices: DayPrices = points.into();
                    self.insert(date, prices.clone());
                    prices
                })
            }
        }
    }
}

/// A task's registration on the per-date fetch lock.
///
/// Dropping it, including when the owning future is cancelled mid-fetch,
/// removes the slot once the last registered task is gone.
struct InFlight<'a> {
    cache: &'a PriceCache,
    date: NaiveDate,
}

impl<'a> InFlight<'a> {
    fn join(cache: &'a PriceCache, date: NaiveDate) -> (Self, Arc<tokio::sync::Mutex<()>>) {
        let mut in_flight = cache.in_flight.lock();
        let slot = in_flight.entry(date).or_insert_with(|| FlightSlot {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            tasks: 0,
        });
        slot.tasks += 1;
        (Self { cache, date }, slot.lock.clone())
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut in_flight = self.cache.in_flight.lock();
        if let Some(slot) = in_flight.get_mut(&self.date) {
            slot.tasks -= 1;
            if slot.tasks == 0 {
                in_flight.remove(&self.date);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;
    use chrono_tz::Europe::Amsterdam;
    use rust_decimal::dec;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn ttl() -> TimeDelta {
        TimeDelta::seconds(DEFAULT_TTL_SECONDS as i64)
    }

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 20, 8, 0, 0).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 8, d).unwrap()
    }

    fn prices(d: u32) -> DayPrices {
        vec![PricePoint::new(
            Amsterdam.with_ymd_and_hms(2025, 8, d, 0, 0, 0).unwrap(),
            dec!(0.1),
        )]
        .into()
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = PriceCache::new(ttl(), DEFAULT_CAPACITY, clock.clone());
        cache.insert(day(20), prices(20));

        clock.advance(TimeDelta::minutes(29));
        assert!(cache.get(day(20)).is_some());

        clock.advance(TimeDelta::minutes(1));
        assert!(cache.get(day(20)).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_overflow_evicts_oldest_insertion() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = PriceCache::new(ttl(), 2, clock);
        cache.insert(day(1), prices(1));
        cache.insert(day(2), prices(2));
        // Reading does not refresh the position.
        assert!(cache.get(day(1)).is_some());
        cache.insert(day(3), prices(3));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(day(1)).is_none());
        assert!(cache.get(day(2)).is_some());
        assert!(cache.get(day(3)).is_some());
    }

    #[test]
    fn test_reinsert_moves_entry_to_back() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = PriceCache::new(ttl(), 2, clock);
        cache.insert(day(1), prices(1));
        cache.insert(day(2), prices(2));
        cache.insert(day(1), prices(1));
        cache.insert(day(3), prices(3));

        assert!(cache.get(day(1)).is_some());
        assert!(cache.get(day(2)).is_none());
    }

    #[tokio::test]
    async fn test_concurrent_misses_fetch_once() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = Arc::new(PriceCache::new(ttl(), DEFAULT_CAPACITY, clock));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            let calls = calls.clone();
            tasks.push(tokio::spawn(async move {
                cache
                    .get_or_fetch(day(20), || async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                        Ok(prices(20).to_vec())
                    })
                    .await
            }));
        }
        for task in tasks {
            assert_eq!(task.await.unwrap().unwrap().len(), 1);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.in_flight.lock().is_empty());
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = PriceCache::new(ttl(), DEFAULT_CAPACITY, clock);

        let first = cache
            .get_or_fetch(day(20), || async {
                Err(PlanError::UpstreamFetchFailure("boom".to_string()))
            })
            .await;
        assert!(first.is_err());
        assert!(cache.is_empty());

        let second = cache
            .get_or_fetch(day(20), || async { Ok(prices(20).to_vec()) })
            .await;
        assert!(second.is_ok());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_fetch_releases_in_flight_entry() {
        let clock = Arc::new(ManualClock::new(start()));
        let cache = PriceCache::new(ttl(), DEFAULT_CAPACITY, clock);

        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(10),
            cache.get_or_fetch(day(20), || async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Ok(prices(20).to_vec())
            }),
        )
        .await;
        assert!(outcome.is_err());
        assert!(cache.in_flight.lock().is_empty());
        assert!(cache.is_empty());

        let fetched = cache
            .get_or_fetch(day(20), || async { Ok(prices(20).to_vec()) })
            .await
            .unwrap();
        assert_eq!(fetched.len(), 1);
        assert!(cache.in_flight.lock().is_empty());
    }
}
