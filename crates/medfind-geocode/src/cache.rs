//! Memoizing wrapper for forward geocoding.
//!
//! The same `(area, city)` pairs recur across requests, and public providers
//! rate-limit aggressively. Provider answers (including misses) are cached per
//! normalized query string for a fixed TTL. Failed requests are not cached, so
//! an outage only costs the requests made while it lasts. Reverse lookups pass
//! through.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use medfind_core::{Coordinate, Geocoder, Locality};
use tokio::time::Instant;

use crate::provider::{forward_answer, reverse_answer, GeocodeProvider};

const DEFAULT_MAX_ENTRIES: usize = 1_024;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    stored_at: Instant,
    value: Option<Coordinate>,
}

/// A [`Geocoder`] over a [`GeocodeProvider`] that remembers forward answers
/// for `ttl`.
pub struct CachedGeocoder<G> {
    inner: G,
    ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl<G: GeocodeProvider> CachedGeocoder<G> {
    #[must_use]
    pub fn new(inner: G, ttl: Duration) -> Self {
        Self::with_capacity(inner, ttl, DEFAULT_MAX_ENTRIES)
    }

    /// Like [`Self::new`], holding at most `max_entries` queries. When full,
    /// expired entries are purged first, then the oldest entry is evicted.
    #[must_use]
    pub fn with_capacity(inner: G, ttl: Duration, max_entries: usize) -> Self {
        Self {
            inner,
            ttl,
            max_entries: max_entries.max(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn inner(&self) -> &G {
        &self.inner
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get_fresh(&self, key: &str) -> Option<Option<Coordinate>> {
        let entries = self.lock();
        entries
            .get(key)
            .filter(|entry| entry.stored_at.elapsed() < self.ttl)
            .map(|entry| entry.value)
    }

    fn store(&self, key: String, value: Option<Coordinate>) {
        let mut entries = self.lock();
        if entries.len() >= self.max_entries && !entries.contains_key(&key) {
            let ttl = self.ttl;
            entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
            if entries.len() >= self.max_entries {
                let oldest = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.stored_at)
                    .map(|(k, _)| k.clone());
                if let Some(oldest) = oldest {
                    entries.remove(&oldest);
                }
            }
        }
        entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

/// Case- and whitespace-insensitive cache key.
fn cache_key(query: &str) -> String {
    query
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl<G: GeocodeProvider> Geocoder for CachedGeocoder<G> {
    async fn forward_geocode(&self, query: &str) -> Option<Coordinate> {
        let key = cache_key(query);
        if let Some(cached) = self.get_fresh(&key) {
            tracing::debug!(query, hit = cached.is_some(), "geocode cache hit");
            return cached;
        }

        let result = self.inner.search(query).await;
        if let Ok(value) = &result {
            self.store(key, *value);
        }
        forward_answer(query, result)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> Option<Locality> {
        reverse_answer(coordinate, self.inner.reverse(coordinate).await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::GeocodeError;

    struct CountingProvider {
        calls: AtomicUsize,
        failures_left: AtomicUsize,
        answer: Option<Coordinate>,
    }

    impl CountingProvider {
        fn answering(answer: Option<Coordinate>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                failures_left: AtomicUsize::new(0),
                answer,
            }
        }

        fn failing_first(failures: usize, answer: Option<Coordinate>) -> Self {
            Self {
                failures_left: AtomicUsize::new(failures),
                ..Self::answering(answer)
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeocodeProvider for CountingProvider {
        async fn search(&self, _query: &str) -> Result<Option<Coordinate>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let failing = self
                .failures_left
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(GeocodeError::UnexpectedStatus {
                    status: 503,
                    url: "http://geo.test/search".to_string(),
                });
            }
            Ok(self.answer)
        }

        async fn reverse(&self, _coordinate: Coordinate) -> Result<Option<Locality>, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        }
    }

    const KOTHRUD: Coordinate = Coordinate::new(18.5114, 73.8048);

    #[test]
    fn cache_key_normalizes_case_and_spacing() {
        assert_eq!(cache_key("  Kothrud,   PUNE "), "kothrud, pune");
    }

    #[tokio::test]
    async fn repeated_query_is_served_from_cache() {
        let cache = CachedGeocoder::new(
            CountingProvider::answering(Some(KOTHRUD)),
            Duration::from_secs(60),
        );

        assert_eq!(cache.forward_geocode("Kothrud, Pune").await, Some(KOTHRUD));
        assert_eq!(cache.forward_geocode("kothrud,  pune").await, Some(KOTHRUD));
        assert_eq!(cache.inner().calls(), 1);
    }

    #[tokio::test]
    async fn misses_are_cached_too() {
        let cache =
            CachedGeocoder::new(CountingProvider::answering(None), Duration::from_secs(60));

        assert!(cache.forward_geocode("Atlantis").await.is_none());
        assert!(cache.forward_geocode("Atlantis").await.is_none());
        assert_eq!(cache.inner().calls(), 1);
    }

    #[tokio::test]
    async fn provider_failures_are_not_cached() {
        let cache = CachedGeocoder::new(
            CountingProvider::failing_first(1, Some(KOTHRUD)),
            Duration::from_secs(60),
        );

        assert_eq!(cache.forward_geocode("Kothrud, Pune").await, None);
        assert!(cache.is_empty());
        assert_eq!(cache.forward_geocode("Kothrud, Pune").await, Some(KOTHRUD));
        assert_eq!(cache.forward_geocode("Kothrud, Pune").await, Some(KOTHRUD));
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = CachedGeocoder::new(
            CountingProvider::answering(Some(KOTHRUD)),
            Duration::from_secs(60),
        );

        cache.forward_geocode("Kothrud").await;
        tokio::time::advance(Duration::from_secs(61)).await;
        cache.forward_geocode("Kothrud").await;
        assert_eq!(cache.inner().calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn full_cache_evicts_oldest_entry() {
        let cache = CachedGeocoder::with_capacity(
            CountingProvider::answering(Some(KOTHRUD)),
            Duration::from_secs(600),
            2,
        );

        cache.forward_geocode("a").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.forward_geocode("b").await;
        tokio::time::advance(Duration::from_secs(1)).await;
        cache.forward_geocode("c").await;
        assert_eq!(cache.len(), 2);

        cache.forward_geocode("a").await;
        assert_eq!(cache.inner().calls(), 4, "'a' should have been evicted");
    }

    #[tokio::test]
    async fn reverse_lookups_are_not_cached() {
        let cache =
            CachedGeocoder::new(CountingProvider::answering(None), Duration::from_secs(60));
        cache.reverse_geocode(KOTHRUD).await;
        cache.reverse_geocode(KOTHRUD).await;
        assert_eq!(cache.inner().calls(), 2);
        assert!(cache.is_empty());
    }
}
