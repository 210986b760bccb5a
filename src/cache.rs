// src/cache.rs
//! TTL cache over the aggregated result, with single-flight refresh.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use metrics::gauge;
use tracing::{info, warn};

use crate::error::NewsError;
use crate::ingest::types::NewsItem;

/// Time source for freshness decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        if let (Ok(mut now), Ok(by)) = (self.now.lock(), chrono::Duration::from_std(by)) {
            *now += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|n| *n).unwrap_or_else(|_| Utc::now())
    }
}

/// One completed pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub items: Vec<NewsItem>,
    pub computed_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now.signed_duration_since(self.computed_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}

/// Result of a cache read. `hit` is false only for the caller whose read ran
/// the refresh.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub snapshot: Arc<Snapshot>,
    pub hit: bool,
}

pub struct AggregationCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entry: RwLock<Option<Arc<Snapshot>>>,
    refresh_lock: tokio::sync::Mutex<()>,
    /// Finished refresh attempts, successful or not.
    attempts: AtomicU64,
    last_error: Mutex<Option<NewsError>>,
}

impl AggregationCache {
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        gauge!("news_cache_ttl_secs").set(ttl.as_secs_f64());
        Self {
            ttl,
            clock,
            entry: RwLock::new(None),
            refresh_lock: tokio::sync::Mutex::new(()),
            attempts: AtomicU64::new(0),
            last_error: Mutex::new(None),
        }
    }

    /// Stored snapshot regardless of age.
    pub fn peek(&self) -> Option<Arc<Snapshot>> {
        self.entry.read().ok().and_then(|e| e.clone())
    }

    fn fresh(&self) -> Option<Arc<Snapshot>> {
        let snap = self.peek()?;
        (snap.age(self.clock.now()) < self.ttl).then_some(snap)
    }

    fn store(&self, snap: Arc<Snapshot>) {
        if let Ok(mut e) = self.entry.write() {
            *e = Some(snap);
        }
    }

    /// Serve the stored result while fresh, otherwise run `refresh` (at most
    /// one at a time) and swap its output in. Callers that queued behind a
    /// refresh take its outcome instead of running their own. A failed refresh
    /// keeps the previous result and serves it; without one the error is
    /// returned.
    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Result<Lookup, NewsError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<NewsItem>, NewsError>>,
    {
        if let Some(snapshot) = self.fresh() {
            return Ok(Lookup {
                snapshot,
                hit: true,
            });
        }

        let seen = self.attempts.load(Ordering::Acquire);
        let _guard = self.refresh_lock.lock().await;
        // Another caller may have refreshed while we waited.
        if let Some(snapshot) = self.fresh() {
            return Ok(Lookup {
                snapshot,
                hit: true,
            });
        }
        if self.attempts.load(Ordering::Acquire) != seen {
            let last = self.last_error.lock().ok().and_then(|e| e.clone());
            match (last, self.peek()) {
                (Some(e), _) => return self.serve_previous(e),
                (None, Some(snapshot)) => {
                    return Ok(Lookup {
                        snapshot,
                        hit: true,
                    })
                }
                (None, None) => {}
            }
        }

        let result = match refresh().await {
            Ok(items) => {
                let snapshot = Arc::new(Snapshot {
                    items,
                    computed_at: self.clock.now(),
                });
                self.store(snapshot.clone());
                self.record_error(None);
                gauge!("news_cache_last_refresh_ts").set(snapshot.computed_at.timestamp() as f64);
                info!(items = snapshot.items.len(), "cache refreshed");
                Ok(Lookup {
                    snapshot,
                    hit: false,
                })
            }
            Err(e) => {
                self.record_error(Some(e.clone()));
                self.serve_previous(e)
            }
        };
        self.attempts.fetch_add(1, Ordering::Release);
        result
    }

    fn record_error(&self, e: Option<NewsError>) {
        if let Ok(mut last) = self.last_error.lock() {
            *last = e;
        }
    }

    fn serve_previous(&self, e: NewsError) -> Result<Lookup, NewsError> {
        match self.peek() {
            Some(snapshot) => {
                warn!(
                    error = %e,
                    age_secs = snapshot.age(self.clock.now()).as_secs(),
                    "refresh failed, serving previous result"
                );
                Ok(Lookup {
                    snapshot,
                    hit: true,
                })
            }
            None => Err(e),
        }
    }
}
