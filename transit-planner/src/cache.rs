//! Request-scoped memoisation of data-source lookups.
//!
//! A [`RequestCache`] lives for one planning call and is dropped with it, so
//! nothing is shared between requests. Within a call, the same route's stop
//! set or the same stop record is fetched at most once; concurrent lookups of
//! one key wait on a single fetch. Failed fetches are not cached.

use std::collections::BTreeSet;
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use moka::future::Cache as MokaCache;

use crate::domain::{RouteId, Stop, StopId};
use crate::mbta::SourceError;

/// Membership is keyed by service date as well as id; `None` means the
/// query carried no date filter.
type StopKey = (StopId, Option<NaiveDate>);
type RouteKey = (RouteId, Option<NaiveDate>);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries per table.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { max_capacity: 10_000 }
    }
}

/// Memo tables for one call.
pub struct RequestCache {
    /// Routes serving a stop.
    routes_at_stop: MokaCache<StopKey, Arc<BTreeSet<RouteId>>>,

    /// Stations served by a route.
    stops_on_route: MokaCache<RouteKey, Arc<BTreeSet<StopId>>>,

    /// Stop records by id.
    stops: MokaCache<StopId, Arc<Stop>>,
}

impl RequestCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            routes_at_stop: MokaCache::builder().max_capacity(config.max_capacity).build(),
            stops_on_route: MokaCache::builder().max_capacity(config.max_capacity).build(),
            stops: MokaCache::builder().max_capacity(config.max_capacity).build(),
        }
    }

    /// Routes serving `stop`, fetching with `fetch` on a miss.
    pub async fn routes_at_stop<F>(
        &self,
        stop: &StopId,
        date: Option<NaiveDate>,
        fetch: F,
    ) -> Result<Arc<BTreeSet<RouteId>>, Arc<SourceError>>
    where
        F: Future<Output = Result<BTreeSet<RouteId>, SourceError>>,
    {
        self.routes_at_stop
            .try_get_with((stop.clone(), date), async { fetch.await.map(Arc::new) })
            .await
    }

    /// Stations served by `route`, fetching with `fetch` on a miss.
    pub async fn stops_on_route<F>(
        &self,
        route: &RouteId,
        date: Option<NaiveDate>,
        fetch: F,
    ) -> Result<Arc<BTreeSet<StopId>>, Arc<SourceError>>
    where
        F: Future<Output = Result<BTreeSet<StopId>, SourceError>>,
    {
        self.stops_on_route
            .try_get_with((route.clone(), date), async { fetch.await.map(Arc::new) })
            .await
    }

    /// The stop record for `id`, fetching with `fetch` on a miss.
    pub async fn stop<F>(&self, id: &StopId, fetch: F) -> Result<Arc<Stop>, Arc<SourceError>>
    where
        F: Future<Output = Result<Stop, SourceError>>,
    {
        self.stops
            .try_get_with(id.clone(), async { fetch.await.map(Arc::new) })
            .await
    }
}

impl Default for RequestCache {
    fn default() -> Self {
        Self::new(&CacheConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::domain::Coordinate;

    fn park_street() -> Stop {
        Stop::new(
            "place-pktrm",
            "Park Street",
            Coordinate::new(42.356395, -71.062424).unwrap(),
        )
    }

    #[tokio::test]
    async fn fetches_once_per_key() {
        let cache = RequestCache::default();
        let calls = AtomicUsize::new(0);
        let id = StopId::from("place-pktrm");

        for _ in 0..3 {
            let stop = cache
                .stop(&id, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(park_street())
                })
                .await
                .unwrap();
            assert_eq!(stop.name, "Park Street");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_lookups_share_a_fetch() {
        let cache = RequestCache::default();
        let calls = AtomicUsize::new(0);
        let route = RouteId::from("Red");

        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::task::yield_now().await;
            Ok::<_, SourceError>(BTreeSet::from([StopId::from("place-pktrm")]))
        };
        let (a, b) = tokio::join!(
            cache.stops_on_route(&route, None, fetch()),
            cache.stops_on_route(&route, None, fetch()),
        );
        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dates_are_distinct_keys() {
        let cache = RequestCache::default();
        let calls = AtomicUsize::new(0);
        let stop = StopId::from("place-pktrm");
        let counter = &calls;
        let fetch = move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<_, SourceError>(BTreeSet::from([RouteId::from("Red")]))
        };

        let d1 = NaiveDate::from_ymd_opt(2024, 3, 15);
        let d2 = NaiveDate::from_ymd_opt(2024, 3, 16);
        cache.routes_at_stop(&stop, d1, fetch()).await.unwrap();
        cache.routes_at_stop(&stop, d2, fetch()).await.unwrap();
        cache.routes_at_stop(&stop, d1, fetch()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let cache = RequestCache::default();
        let id = StopId::from("place-pktrm");

        let err = cache
            .stop(&id, async { Err(SourceError::Timeout) })
            .await
            .unwrap_err();
        assert!(matches!(*err, SourceError::Timeout));

        let stop = cache.stop(&id, async { Ok(park_street()) }).await.unwrap();
        assert_eq!(stop.id, id);
    }
}
