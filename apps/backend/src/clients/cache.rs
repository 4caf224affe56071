//! In-memory request cache — TTL expiry plus in-flight coalescing.
//!
//! Concurrent callers asking for the same key share one underlying fetch
//! (single-flight); completed fetches are served from memory until their
//! TTL lapses. Expiry is checked at read time; entries are never evicted
//! proactively and there is no size bound.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;

use vantage_common::error::VantageResult;
use vantage_common::types::DataSource;

type PendingFetch<T> = Shared<BoxFuture<'static, VantageResult<T>>>;

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    pending: HashMap<String, PendingFetch<T>>,
}

/// Single-flight TTL cache.
///
/// One mutex guards both maps, so the entry check, the pending check, and
/// the pending registration form a single critical section per call — a
/// second caller can never slip in between them and start a duplicate fetch.
pub struct RequestCache<T> {
    ttl: Duration,
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T: Clone + Send + Sync + 'static> RequestCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: Arc::new(Mutex::new(Inner {
                entries: HashMap::new(),
                pending: HashMap::new(),
            })),
        }
    }

    /// Serve `key` from cache, join an in-flight fetch, or start `producer`.
    ///
    /// A valid entry is returned as a clone tagged `Cached`; `producer` is
    /// not invoked. Otherwise callers coalesce onto one shared fetch and
    /// every waiter sees the same value or the same error, tagged `Live`.
    /// The pending slot is cleared on success and failure alike, so a failed
    /// fetch is retried by the next call instead of being replayed. On
    /// failure any previous (stale) entry is left in place.
    pub async fn get_or_fetch<F, Fut>(
        &self,
        key: &str,
        producer: F,
    ) -> VantageResult<(T, DataSource)>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = VantageResult<T>> + Send + 'static,
    {
        let fetch = {
            let mut inner = self.inner.lock().expect("cache lock poisoned");

            if let Some(entry) = inner.entries.get(key) {
                if entry.expires_at > Instant::now() {
                    return Ok((entry.value.clone(), DataSource::Cached));
                }
            }

            match inner.pending.get(key).cloned() {
                Some(pending) => pending,
                None => {
                    let fut = producer();
                    let state = Arc::clone(&self.inner);
                    let owned_key = key.to_string();
                    let ttl = self.ttl;

                    let fetch = async move {
                        let result = fut.await;
                        let mut inner = state.lock().expect("cache lock poisoned");
                        inner.pending.remove(&owned_key);
                        if let Ok(value) = &result {
                            inner.entries.insert(
                                owned_key,
                                CacheEntry {
                                    value: value.clone(),
                                    expires_at: Instant::now() + ttl,
                                },
                            );
                        }
                        result
                    }
                    .boxed()
                    .shared();

                    inner.pending.insert(key.to_string(), fetch.clone());
                    fetch
                }
            }
        };

        fetch.await.map(|value| (value, DataSource::Live))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use vantage_common::error::VantageError;

    #[tokio::test]
    async fn test_single_flight_invokes_producer_once() {
        let cache = RequestCache::<String>::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let futs: Vec<_> = (0..8)
            .map(|_| {
                let calls = Arc::clone(&calls);
                cache.get_or_fetch("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok("value".to_string())
                })
            })
            .collect();

        for result in futures::future::join_all(futs).await {
            let (value, source) = result.unwrap();
            assert_eq!(value, "value");
            assert_eq!(source, DataSource::Live);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_flight_shares_failure() {
        let cache = RequestCache::<String>::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicUsize::new(0));

        let futs: Vec<_> = (0..4)
            .map(|_| {
                let calls = Arc::clone(&calls);
                cache.get_or_fetch("k", move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Err(VantageError::Network("connection reset".into()))
                })
            })
            .collect();

        for result in futures::future::join_all(futs).await {
            let err = result.unwrap_err();
            assert!(matches!(err, VantageError::Network(_)));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hit_within_ttl_is_tagged_cached() {
        let cache = RequestCache::<u32>::new(Duration::from_secs(60));

        let (_, source) = cache
            .get_or_fetch("k", || async { Ok(7) })
            .await
            .unwrap();
        assert_eq!(source, DataSource::Live);

        let (value, source) = cache
            .get_or_fetch("k", || async {
                panic!("producer must not run on a cache hit")
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
        assert_eq!(source, DataSource::Cached);
    }

    #[tokio::test]
    async fn test_ttl_expiry_triggers_refetch() {
        let cache = RequestCache::<u32>::new(Duration::from_millis(50));
        let calls = Arc::new(AtomicUsize::new(0));

        let producer = |calls: Arc<AtomicUsize>| {
            move || async move {
                Ok(calls.fetch_add(1, Ordering::SeqCst) as u32)
            }
        };

        let (value, source) = cache
            .get_or_fetch("k", producer(Arc::clone(&calls)))
            .await
            .unwrap();
        assert_eq!((value, source), (0, DataSource::Live));

        tokio::time::sleep(Duration::from_millis(120)).await;

        let (value, source) = cache
            .get_or_fetch("k", producer(Arc::clone(&calls)))
            .await
            .unwrap();
        assert_eq!((value, source), (1, DataSource::Live));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failure_does_not_poison_cache() {
        let cache = RequestCache::<u32>::new(Duration::from_secs(60));

        let err = cache
            .get_or_fetch("k", || async {
                Err::<u32, _>(VantageError::Network("timeout".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VantageError::Network(_)));

        // Slot was freed — the next call retries and can succeed.
        let (value, source) = cache
            .get_or_fetch("k", || async { Ok(42) })
            .await
            .unwrap();
        assert_eq!((value, source), (42, DataSource::Live));
    }

    #[tokio::test]
    async fn test_stale_entry_survives_failed_refresh() {
        let cache = RequestCache::<u32>::new(Duration::from_millis(50));

        cache.get_or_fetch("k", || async { Ok(1) }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(120)).await;

        let err = cache
            .get_or_fetch("k", || async {
                Err::<u32, _>(VantageError::Network("flap".into()))
            })
            .await
            .unwrap_err();
        assert!(matches!(err, VantageError::Network(_)));

        // The stale value was not clobbered; a successful refresh replaces it.
        let (value, _) = cache.get_or_fetch("k", || async { Ok(2) }).await.unwrap();
        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_hit_returns_independent_copy() {
        let cache = RequestCache::<Vec<String>>::new(Duration::from_secs(60));

        cache
            .get_or_fetch("k", || async { Ok(vec!["a".to_string()]) })
            .await
            .unwrap();

        let (mut copy, _) = cache
            .get_or_fetch("k", || async { Ok(vec![]) })
            .await
            .unwrap();
        copy.push("mutated".to_string());

        let (stored, source) = cache
            .get_or_fetch("k", || async { Ok(vec![]) })
            .await
            .unwrap();
        assert_eq!(source, DataSource::Cached);
        assert_eq!(stored, vec!["a".to_string()]);
    }

    #[tokio::test]
    async fn test_distinct_keys_fetch_independently() {
        let cache = RequestCache::<u32>::new(Duration::from_secs(60));

        cache.get_or_fetch("a", || async { Ok(1) }).await.unwrap();
        let (value, source) = cache.get_or_fetch("b", || async { Ok(2) }).await.unwrap();

        assert_eq!((value, source), (2, DataSource::Live));
    }
}
