//! Time-bounded memoization of feed fetches.
//!
//! Each key owns an async mutex around its entry. A caller that finds the
//! entry absent or expired performs the fetch while holding that mutex, so
//! concurrent callers on the same key queue behind the single in-flight
//! fetch and then read its result instead of fetching again.
//!
//! A failed fetch stores no value. Its error goes to the caller and to any
//! callers queued behind it; the next caller to arrive afterwards retries.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::Error;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

/// Source of "now" for expiry checks.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset_nanos: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset_nanos: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn advance(&self, by: Duration) {
        let nanos = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_nanos.fetch_add(nanos, Ordering::SeqCst);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + Duration::from_nanos(self.offset_nanos.load(Ordering::SeqCst))
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    fetched_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.fetched_at) > ttl
    }
}

/// Per-key state. `attempts` counts finished fetches so a caller can tell
/// whether a fetch completed while it was queued on `state`.
struct Slot<T> {
    attempts: AtomicU64,
    state: Mutex<SlotState<T>>,
}

struct SlotState<T> {
    entry: Option<CacheEntry<T>>,
    /// Error of the most recent attempt, if it failed. Only handed to
    /// callers that were already waiting when that attempt finished.
    last_failure: Option<Error>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            state: Mutex::new(SlotState {
                entry: None,
                last_failure: None,
            }),
        }
    }
}

/// Per-key TTL cache with single-flight refresh.
pub struct TtlCache<T> {
    slots: DashMap<String, Arc<Slot<T>>>,
    clock: Arc<dyn Clock>,
}

impl<T: Clone + Send> TtlCache<T> {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            slots: DashMap::new(),
            clock,
        }
    }

    /// Return the cached value for `key`, fetching it when absent or when
    /// more than `ttl` has passed since it was stored.
    ///
    /// Callers that queue behind an in-flight fetch share its outcome,
    /// success or failure; only callers arriving after it finished retry.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F, ttl: Duration) -> Result<T, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let slot = self.slot(key);
        let seen = slot.attempts.load(Ordering::SeqCst);
        let mut state = slot.state.lock().await;

        if let Some(cached) = state.entry.as_ref() {
            if !cached.is_expired(self.clock.now(), ttl) {
                debug!("cache hit: {}", key);
                return Ok(cached.value.clone());
            }
        }

        if slot.attempts.load(Ordering::SeqCst) != seen {
            if let Some(err) = state.last_failure.as_ref() {
                debug!("cache shared failure: {}", key);
                return Err(err.duplicate());
            }
        }

        debug!("cache miss: {}", key);
        let result = fetch().await;
        slot.attempts.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(value) => {
                state.entry = Some(CacheEntry {
                    value: value.clone(),
                    fetched_at: self.clock.now(),
                });
                state.last_failure = None;
                Ok(value)
            }
            Err(e) => {
                state.last_failure = Some(e.duplicate());
                Err(e)
            }
        }
    }

    /// Drop the entry for `key` so the next call fetches.
    pub async fn invalidate(&self, key: &str) {
        if let Some(slot) = self.slots.get(key).map(|s| Arc::clone(s.value())) {
            slot.state.lock().await.entry = None;
        }
    }

    fn slot(&self, key: &str) -> Arc<Slot<T>> {
        // Clone out of the map so no shard lock is held across an await.
        Arc::clone(self.slots.entry(key.to_owned()).or_default().value())
    }
}

impl<T: Clone + Send> Default for TtlCache<T> {
    fn default() -> Self {
        Self::new()
    }
}
