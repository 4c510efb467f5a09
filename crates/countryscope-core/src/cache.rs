//! In-memory request cache for the country record set.
//!
//! [`QueryCache`] sits between the presentation layer and a
//! [`CountrySource`] and provides:
//!
//! - **De-duplication**: callers arriving while a fetch for the same key is
//!   outstanding attach to the in-flight shared future instead of issuing a
//!   second request.
//! - **Freshness**: a successful result is served without refetching for
//!   [`CacheConfig::stale_time`] (5 minutes by default).
//! - **Garbage collection**: entries unused for [`CacheConfig::gc_time`]
//!   (10 minutes by default) are evicted.
//! - **Retry**: failed fetches are retried per [`CacheConfig::retry`]
//!   (one retry by default) before the final error is surfaced unmodified.
//!
//! The key space is a single key, [`COUNTRIES_QUERY_KEY`]. Each fetch is
//! driven to completion by its own task, so the result is recorded even when
//! every caller stops awaiting.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, warn};

use crate::data_source::{CountrySource, FetchError};
use crate::retry::RetryConfig;
use crate::Country;

/// Query key of the full country list.
pub const COUNTRIES_QUERY_KEY: &str = "countries-list";

/// Immutable snapshot of one fetched record set.
pub type CountrySet = Arc<[Country]>;

type SharedFetch = Shared<BoxFuture<'static, Result<CountrySet, FetchError>>>;

/// Freshness, eviction and retry settings.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
    /// How long an unused entry is kept before eviction.
    pub gc_time: Duration,
    pub retry: RetryConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
            retry: RetryConfig::default(),
        }
    }
}

/// What the presentation layer sees of a query at one instant.
#[derive(Debug, Clone, Default)]
pub struct QuerySnapshot {
    /// Last successful record set, possibly stale.
    pub data: Option<CountrySet>,
    /// No data yet and a fetch is outstanding.
    pub is_loading: bool,
    pub is_fetching: bool,
    pub is_error: bool,
    /// Error of the most recent completed fetch, if it failed.
    pub error: Option<FetchError>,
    pub is_stale: bool,
    pub updated_at: Option<OffsetDateTime>,
}

impl QuerySnapshot {
    /// Records of the snapshot, empty when nothing has been fetched.
    pub fn records(&self) -> &[Country] {
        self.data.as_deref().unwrap_or(&[])
    }
}

struct InFlight {
    generation: u64,
    future: SharedFetch,
    driver: JoinHandle<()>,
}

struct CacheEntry {
    data: Option<CountrySet>,
    updated_at: Option<Instant>,
    updated_at_utc: Option<OffsetDateTime>,
    error: Option<FetchError>,
    invalidated: bool,
    last_used: Instant,
    in_flight: Option<InFlight>,
}

impl CacheEntry {
    fn new(now: Instant) -> Self {
        Self {
            data: None,
            updated_at: None,
            updated_at_utc: None,
            error: None,
            invalidated: false,
            last_used: now,
            in_flight: None,
        }
    }

    fn is_stale(&self, now: Instant, stale_time: Duration) -> bool {
        match self.updated_at {
            Some(updated_at) => self.invalidated || now.duration_since(updated_at) >= stale_time,
            None => true,
        }
    }

    fn fresh_data(&self, now: Instant, stale_time: Duration) -> Option<CountrySet> {
        if self.is_stale(now, stale_time) {
            return None;
        }
        self.data.clone()
    }

    fn record(&mut self, result: &Result<CountrySet, FetchError>, now: Instant) {
        match result {
            Ok(data) => {
                self.data = Some(Arc::clone(data));
                self.updated_at = Some(now);
                self.updated_at_utc = Some(OffsetDateTime::now_utc());
                self.error = None;
                self.invalidated = false;
            }
            // Previous data stays available next to the error.
            Err(error) => self.error = Some(error.clone()),
        }
        self.last_used = now;
    }

    fn is_collectable(&self, now: Instant, gc_time: Duration) -> bool {
        self.in_flight.is_none() && now.duration_since(self.last_used) >= gc_time
    }
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<&'static str, CacheEntry>,
    next_generation: u64,
}

impl CacheInner {
    fn collect_garbage(&mut self, now: Instant, gc_time: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|key, entry| {
            let keep = !entry.is_collectable(now, gc_time);
            if !keep {
                debug!(key, "evicting unused cache entry");
            }
            keep
        });
        before - self.entries.len()
    }
}

/// Request cache wrapping a [`CountrySource`].
#[derive(Clone)]
pub struct QueryCache {
    source: Arc<dyn CountrySource>,
    config: CacheConfig,
    inner: Arc<Mutex<CacheInner>>,
}

impl QueryCache {
    pub fn new(source: Arc<dyn CountrySource>, config: CacheConfig) -> Self {
        Self {
            source,
            config,
            inner: Arc::new(Mutex::new(CacheInner::default())),
        }
    }

    pub fn with_defaults(source: Arc<dyn CountrySource>) -> Self {
        Self::new(source, CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Returns the cached record set when fresh, otherwise fetches (or joins
    /// the outstanding fetch).
    ///
    /// # Errors
    ///
    /// Returns the final [`FetchError`] after the retry budget is spent.
    pub async fn fetch(&self) -> Result<CountrySet, FetchError> {
        self.query(false).await
    }

    /// Fetches regardless of freshness. Still joins an outstanding fetch.
    pub async fn refetch(&self) -> Result<CountrySet, FetchError> {
        self.query(true).await
    }

    /// Marks the cached result stale so the next [`fetch`](Self::fetch)
    /// goes to the source.
    pub async fn invalidate(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(entry) = inner.entries.get_mut(COUNTRIES_QUERY_KEY) {
            entry.invalidated = true;
        }
    }

    /// Current view of the query without triggering a fetch.
    pub async fn snapshot(&self) -> QuerySnapshot {
        let inner = self.inner.lock().await;
        let Some(entry) = inner.entries.get(COUNTRIES_QUERY_KEY) else {
            return QuerySnapshot::default();
        };

        let is_fetching = entry.in_flight.is_some();
        QuerySnapshot {
            data: entry.data.clone(),
            is_loading: entry.data.is_none() && is_fetching,
            is_fetching,
            is_error: entry.error.is_some(),
            error: entry.error.clone(),
            is_stale: entry.is_stale(Instant::now(), self.config.stale_time),
            updated_at: entry.updated_at_utc,
        }
    }

    /// Evicts entries unused for longer than the gc window. Returns the
    /// number of evicted entries.
    pub async fn collect_garbage(&self) -> usize {
        let mut inner = self.inner.lock().await;
        inner.collect_garbage(Instant::now(), self.config.gc_time)
    }

    /// Periodically runs [`collect_garbage`](Self::collect_garbage) until
    /// the returned handle is aborted.
    pub fn spawn_garbage_collector(&self, period: Duration) -> JoinHandle<()> {
        let cache = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                cache.collect_garbage().await;
            }
        })
    }

    /// Drops every entry. Outstanding fetches are cancelled.
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        for (_, entry) in inner.entries.drain() {
            if let Some(in_flight) = entry.in_flight {
                in_flight.driver.abort();
            }
        }
    }

    /// Number of live entries, including ones with a fetch outstanding.
    pub async fn len(&self) -> usize {
        self.inner.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn query(&self, force: bool) -> Result<CountrySet, FetchError> {
        let future = {
            let mut guard = self.inner.lock().await;
            let inner = &mut *guard;
            let now = Instant::now();
            inner.collect_garbage(now, self.config.gc_time);

            let entry = inner
                .entries
                .entry(COUNTRIES_QUERY_KEY)
                .or_insert_with(|| CacheEntry::new(now));
            entry.last_used = now;

            if !force {
                if let Some(data) = entry.fresh_data(now, self.config.stale_time) {
                    debug!(key = COUNTRIES_QUERY_KEY, "serving fresh cached result");
                    return Ok(data);
                }
            }

            match &entry.in_flight {
                Some(in_flight) => {
                    debug!(key = COUNTRIES_QUERY_KEY, "joining in-flight fetch");
                    in_flight.future.clone()
                }
                None => {
                    let generation = inner.next_generation;
                    inner.next_generation += 1;
                    let future = self.start_fetch(generation);
                    let driver = tokio::spawn(future.clone().map(drop));
                    entry.in_flight = Some(InFlight {
                        generation,
                        future: future.clone(),
                        driver,
                    });
                    future
                }
            }
        };

        future.await
    }

    fn start_fetch(&self, generation: u64) -> SharedFetch {
        let source = Arc::clone(&self.source);
        let retry = self.config.retry.clone();
        let inner = Arc::clone(&self.inner);

        async move {
            let result = fetch_with_retry(source.as_ref(), &retry)
                .await
                .map(Arc::<[Country]>::from);

            let mut guard = inner.lock().await;
            if let Some(entry) = guard.entries.get_mut(COUNTRIES_QUERY_KEY) {
                let current = entry
                    .in_flight
                    .as_ref()
                    .is_some_and(|in_flight| in_flight.generation == generation);
                if current {
                    entry.in_flight = None;
                    entry.record(&result, Instant::now());
                }
            }

            result
        }
        .boxed()
        .shared()
    }
}

async fn fetch_with_retry(
    source: &dyn CountrySource,
    retry: &RetryConfig,
) -> Result<Vec<Country>, FetchError> {
    let mut retries = 0;
    loop {
        match source.fetch_countries().await {
            Ok(countries) => return Ok(countries),
            Err(failure) if retry.should_retry(retries) => {
                let delay = retry.delay_for_attempt(retries);
                warn!(
                    source = source.id(),
                    attempt = retries.saturating_add(1),
                    max_attempts = retry.max_attempts(),
                    delay_ms = delay.as_millis() as u64,
                    error = %failure,
                    "fetch failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retries += 1;
            }
            Err(failure) => {
                error!(
                    source = source.id(),
                    attempts = retries.saturating_add(1),
                    error = %failure,
                    "fetch failed"
                );
                return Err(failure);
            }
        }
    }
}
