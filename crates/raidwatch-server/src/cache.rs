//! Event fetcher with TTL (Time-To-Live) caching.
//!
//! [`EventFetcher`] sits between the tick loop and the [`EventSource`]. A
//! fresh cache entry is served without touching the network; a stale or
//! forced fetch goes upstream. Upstream failures never reach the caller: the
//! previous entry (or an empty list) is returned and the error is kept for
//! the status report.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use raidwatch_core::{Clock, Event};
use raidwatch_providers::EventSource;
use tracing::{debug, error, info};

/// Cached events and when they were fetched.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cached events.
    pub events: Vec<Event>,
    /// When the fetch that produced this entry started.
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Creates a new cache entry.
    pub fn new(events: Vec<Event>, fetched_at: DateTime<Utc>) -> Self {
        Self { events, fetched_at }
    }

    /// Returns true if the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
        now - self.fetched_at < ttl
    }
}

/// A snapshot of the fetcher for status reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetcherStatus {
    /// Number of cached events, if anything has been fetched yet.
    pub cached_events: Option<usize>,
    /// Time of the last successful fetch.
    pub last_fetch: Option<DateTime<Utc>>,
    /// The last fetch error, cleared by the next success.
    pub last_error: Option<String>,
}

/// Fetches events from an [`EventSource`], caching them for a TTL.
pub struct EventFetcher {
    source: Arc<dyn EventSource>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cache: Option<CacheEntry>,
    last_error: Option<String>,
}

impl EventFetcher {
    /// Default cache TTL (2 minutes).
    pub const DEFAULT_TTL: Duration = Duration::from_secs(120);

    /// Creates a fetcher with an empty cache.
    pub fn new(source: Arc<dyn EventSource>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            ttl,
            cache: None,
            last_error: None,
        }
    }

    /// Returns the cache TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Returns the current cache entry, fresh or not.
    pub fn cached(&self) -> Option<&CacheEntry> {
        self.cache.as_ref()
    }

    /// Returns the event list, from cache when it is fresh.
    ///
    /// `force_refresh` bypasses the cache. On upstream failure the previous
    /// entry is kept and its events are returned (empty if there is none).
    pub async fn fetch(&mut self, force_refresh: bool) -> Vec<Event> {
        let now = self.clock.now();

        if !force_refresh
            && let Some(entry) = self.cache.as_ref().filter(|e| e.is_fresh(now, self.ttl))
        {
            debug!(event_count = entry.events.len(), "serving cached events");
            return entry.events.clone();
        }

        match self.source.fetch_events().await {
            Ok(events) => {
                info!(
                    event_count = events.len(),
                    source = self.source.name(),
                    "fetched events"
                );
                self.cache = Some(CacheEntry::new(events.clone(), now));
                self.last_error = None;
                events
            }
            Err(e) => {
                error!(error = %e, code = %e.code(), "failed to fetch events");
                self.last_error = Some(e.to_string());
                self.cache
                    .as_ref()
                    .map(|entry| entry.events.clone())
                    .unwrap_or_default()
            }
        }
    }

    /// Returns a status snapshot.
    pub fn status(&self) -> FetcherStatus {
        FetcherStatus {
            cached_events: self.cache.as_ref().map(|entry| entry.events.len()),
            last_fetch: self.cache.as_ref().map(|entry| entry.fetched_at),
            last_error: self.last_error.clone(),
        }
    }
}

impl std::fmt::Debug for EventFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventFetcher")
            .field("source", &self.source.name())
            .field("ttl", &self.ttl)
            .field("cache", &self.cache)
            .field("last_error", &self.last_error)
            .finish()
    }
}
