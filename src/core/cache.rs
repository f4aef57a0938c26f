//! # Query Cache
//!
//! Memoizes country queries by [`QueryKey`] with a per-variant staleness
//! window, and collapses concurrent requests for the same key into a single
//! upstream fetch.
//!
//! ```text
//! get(key)
//!   ├── fresh entry?      → return it, no I/O
//!   ├── fetch in flight?  → attach to the shared handle
//!   └── otherwise         → spawn fetch, register handle, await it
//!                              └── on completion: drop handle, store value (success only)
//! ```
//!
//! The cache is an explicit object. Create one per process (or per test)
//! and share it behind an `Arc`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use log::debug;
use tokio::time::Instant;

use crate::data::{Country, UpstreamError};

/// Country lists change rarely; one hour between refetches.
pub const DEFAULT_ALL_COUNTRIES_STALE: Duration = Duration::from_secs(60 * 60);

/// Identifies a cacheable read.
///
/// `CountriesByCodes` holds a sorted, de-duplicated list so that two
/// requests for the same set of codes share one entry regardless of order.
/// Build it through [`QueryKey::countries_by_codes`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllCountries,
    CountryByCode(String),
    CountriesByCodes(Vec<String>),
}

/// Country codes are matched case-insensitively upstream; keys use upper case.
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

impl QueryKey {
    pub fn country_by_code(code: &str) -> Self {
        QueryKey::CountryByCode(normalize_code(code))
    }

    pub fn countries_by_codes<S: AsRef<str>>(codes: &[S]) -> Self {
        let mut codes: Vec<String> = codes
            .iter()
            .map(|c| normalize_code(c.as_ref()))
            .filter(|c| !c.is_empty())
            .collect();
        codes.sort();
        codes.dedup();
        QueryKey::CountriesByCodes(codes)
    }

    /// The codes this key names, if any.
    pub fn codes(&self) -> &[String] {
        match self {
            QueryKey::AllCountries => &[],
            QueryKey::CountryByCode(code) => std::slice::from_ref(code),
            QueryKey::CountriesByCodes(codes) => codes,
        }
    }
}

/// A cached query result.
#[derive(Debug, Clone)]
pub enum QueryData {
    Countries(Arc<Vec<Country>>),
    Country(Arc<Country>),
}

/// How long each kind of entry is served without refetching.
/// `None` means fresh until invalidated.
#[derive(Debug, Clone, PartialEq)]
pub struct StalePolicy {
    pub all_countries: Option<Duration>,
    pub country: Option<Duration>,
    pub countries_by_codes: Option<Duration>,
}

impl Default for StalePolicy {
    fn default() -> Self {
        Self {
            all_countries: Some(DEFAULT_ALL_COUNTRIES_STALE),
            country: None,
            countries_by_codes: None,
        }
    }
}

impl StalePolicy {
    pub fn stale_time(&self, key: &QueryKey) -> Option<Duration> {
        match key {
            QueryKey::AllCountries => self.all_countries,
            QueryKey::CountryByCode(_) => self.country,
            QueryKey::CountriesByCodes(_) => self.countries_by_codes,
        }
    }
}

type FetchResult = Result<QueryData, UpstreamError>;
type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct CacheEntry {
    data: QueryData,
    fetched_at: Instant,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<QueryKey, CacheEntry>,
    in_flight: HashMap<QueryKey, SharedFetch>,
}

pub struct QueryCache {
    policy: StalePolicy,
    state: Arc<Mutex<CacheState>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(StalePolicy::default())
    }
}

fn lock(state: &Mutex<CacheState>) -> MutexGuard<'_, CacheState> {
    // Critical sections never panic midway, so a poisoned map is still consistent.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl QueryCache {
    pub fn new(policy: StalePolicy) -> Self {
        Self {
            policy,
            state: Arc::new(Mutex::new(CacheState::default())),
        }
    }

    pub fn policy(&self) -> &StalePolicy {
        &self.policy
    }

    fn is_fresh(&self, key: &QueryKey, entry: &CacheEntry) -> bool {
        match self.policy.stale_time(key) {
            Some(window) => entry.fetched_at.elapsed() < window,
            None => true,
        }
    }

    /// Returns the cached value for `key` if it is still fresh.
    pub fn cached(&self, key: &QueryKey) -> Option<QueryData> {
        let state = lock(&self.state);
        state
            .entries
            .get(key)
            .filter(|entry| self.is_fresh(key, entry))
            .map(|entry| entry.data.clone())
    }

    /// Resolves `key`, calling `fetch` only when there is neither a fresh
    /// entry nor an outstanding fetch for it.
    ///
    /// The fetch runs on its own task and completes even if every caller
    /// stops waiting. Failures are not cached; all callers attached to a
    /// failed fetch receive the same error.
    pub async fn get<F, Fut>(&self, key: QueryKey, fetch: F) -> FetchResult
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let pending = {
            let mut state = lock(&self.state);

            if let Some(entry) = state.entries.get(&key)
                && self.is_fresh(&key, entry)
            {
                debug!("Cache hit for {:?}", key);
                return Ok(entry.data.clone());
            }

            match state.in_flight.get(&key) {
                Some(pending) => {
                    debug!("Joining in-flight fetch for {:?}", key);
                    pending.clone()
                }
                None => {
                    debug!("Cache miss for {:?}, fetching", key);
                    let pending = self.spawn_fetch(key.clone(), fetch());
                    state.in_flight.insert(key, pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// Starts `fut` on the runtime and wraps its handle so any number of
    /// callers can await the same result.
    ///
    /// Must be called with the state lock held, so the in-flight marker is
    /// registered before the task can try to remove it.
    fn spawn_fetch<Fut>(&self, key: QueryKey, fut: Fut) -> SharedFetch
    where
        Fut: Future<Output = FetchResult> + Send + 'static,
    {
        let state = Arc::clone(&self.state);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            let mut guard = lock(&state);
            guard.in_flight.remove(&task_key);
            match &result {
                Ok(data) => {
                    guard.entries.insert(
                        task_key,
                        CacheEntry {
                            data: data.clone(),
                            fetched_at: Instant::now(),
                        },
                    );
                }
                Err(e) => debug!("Fetch for {:?} failed, not caching: {}", task_key, e),
            }
            result
        });

        let state = Arc::clone(&self.state);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    lock(&state).in_flight.remove(&key);
                    Err(UpstreamError::Task(e.to_string()))
                }
            }
        }
        .boxed()
        .shared()
    }

    /// Drops the cached value for `key`. An in-flight fetch is unaffected.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        lock(&self.state).entries.remove(key).is_some()
    }

    /// Drops every cached value.
    pub fn clear(&self) {
        lock(&self.state).entries.clear();
    }

    /// True while a fetch for `key` is outstanding.
    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        lock(&self.state).in_flight.contains_key(key)
    }

    /// Number of cached values, fresh or stale.
    pub fn len(&self) -> usize {
        lock(&self.state).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::country;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn countries_fetch(calls: &Arc<AtomicUsize>) -> impl FnOnce() -> BoxFuture<'static, FetchResult> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok(QueryData::Countries(Arc::new(vec![country("FRA", "France")])))
            }
            .boxed()
        }
    }

    fn failing_fetch(calls: &Arc<AtomicUsize>) -> impl FnOnce() -> BoxFuture<'static, FetchResult> {
        let calls = Arc::clone(calls);
        move || {
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Err(UpstreamError::Status {
                    status: 503,
                    message: "unavailable".to_string(),
                })
            }
            .boxed()
        }
    }

    #[test]
    fn test_code_list_keys_are_order_independent() {
        assert_eq!(
            QueryKey::countries_by_codes(&["FRA", "JPN"]),
            QueryKey::countries_by_codes(&["JPN", "fra", "FRA"])
        );
        assert_eq!(
            QueryKey::countries_by_codes(&["jpn", " ", "FRA"]),
            QueryKey::CountriesByCodes(vec!["FRA".to_string(), "JPN".to_string()])
        );
    }

    #[test]
    fn test_country_key_is_case_insensitive() {
        assert_eq!(QueryKey::country_by_code(" fra"), QueryKey::country_by_code("FRA"));
        assert_eq!(QueryKey::country_by_code("fra").codes(), ["FRA".to_string()]);
        assert!(QueryKey::AllCountries.codes().is_empty());
    }

    #[test]
    fn test_default_policy() {
        let policy = StalePolicy::default();
        assert_eq!(
            policy.stale_time(&QueryKey::AllCountries),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(policy.stale_time(&QueryKey::country_by_code("FRA")), None);
    }

    #[tokio::test]
    async fn test_sequential_gets_fetch_once() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();
        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.cached(&QueryKey::AllCountries).is_some());
    }

    #[tokio::test]
    async fn test_concurrent_gets_share_one_fetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::country_by_code("FRA");

        let (a, b) = tokio::join!(
            cache.get(key.clone(), countries_fetch(&calls)),
            cache.get(key.clone(), countries_fetch(&calls)),
        );

        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!cache.is_fetching(&key));
    }

    #[tokio::test]
    async fn test_failures_are_shared_and_not_cached() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.get(QueryKey::AllCountries, failing_fetch(&calls)),
            cache.get(QueryKey::AllCountries, failing_fetch(&calls)),
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(a.unwrap_err(), b.unwrap_err());
        assert!(cache.is_empty());
        assert!(!cache.is_fetching(&QueryKey::AllCountries));

        // Next call retries from scratch.
        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_all_countries_go_stale_after_an_hour() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(3599)).await;
        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.cached(&QueryKey::AllCountries).is_none());
        cache.get(QueryKey::AllCountries, countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_country_entries_never_go_stale() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::country_by_code("FRA");

        cache.get(key.clone(), countries_fetch(&calls)).await.unwrap();
        tokio::time::advance(Duration::from_secs(60 * 60 * 24 * 365)).await;
        cache.get(key.clone(), countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::country_by_code("FRA");

        cache.get(key.clone(), countries_fetch(&calls)).await.unwrap();
        assert!(cache.invalidate(&key));
        assert!(!cache.invalidate(&key));
        cache.get(key.clone(), countries_fetch(&calls)).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_completes_after_caller_gives_up() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicUsize::new(0));

        let abandoned = tokio::time::timeout(
            Duration::from_millis(1),
            cache.get(QueryKey::AllCountries, countries_fetch(&calls)),
        )
        .await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(cache.cached(&QueryKey::AllCountries).is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
