//! Route/stop membership.
//!
//! Answers "which routes serve this stop?" and "which stations does this
//! route serve?" from schedule queries. Lookups go through the call's
//! [`RequestCache`], so each key is fetched at most once per call.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use tracing::debug;

use crate::cache::RequestCache;
use crate::domain::{RouteId, Stop, StopId};
use crate::mbta::{Include, ScheduleQuery, SourceError};

use super::source::ScheduleSource;

/// Result of a memoised lookup. Errors are shared between waiters.
pub type Shared<T> = Result<Arc<T>, Arc<SourceError>>;

/// Distinct routes with a scheduled event at `stop`.
pub async fn routes_serving<S: ScheduleSource>(
    source: &S,
    stop: &StopId,
    date: Option<NaiveDate>,
    page_limit: Option<u32>,
) -> Result<BTreeSet<RouteId>, SourceError> {
    let query = ScheduleQuery::new()
        .stop(stop)
        .maybe_date(date)
        .fields(&["stop_sequence"])
        .page_limit(page_limit);
    let set = source.get_schedules(&query).await?;

    let routes: BTreeSet<RouteId> = set.events.iter().map(|e| e.route_id.clone()).collect();
    debug!(stop = %stop, routes = routes.len(), "resolved routes serving stop");
    Ok(routes)
}

/// Distinct stations with a scheduled event on `route`.
///
/// Platform stops are reported as their parent station.
pub async fn stops_serving<S: ScheduleSource>(
    source: &S,
    route: &RouteId,
    date: Option<NaiveDate>,
    page_limit: Option<u32>,
) -> Result<BTreeSet<StopId>, SourceError> {
    let query = ScheduleQuery::new()
        .route(route)
        .maybe_date(date)
        .include(Include::Stop)
        .fields(&["stop_sequence"])
        .page_limit(page_limit);
    let set = source.get_schedules(&query).await?;

    let stops: BTreeSet<StopId> = set
        .events
        .iter()
        .map(|e| set.station_of(&e.stop_id).clone())
        .collect();
    debug!(route = %route, stops = stops.len(), "resolved stops served by route");
    Ok(stops)
}

/// Memoised membership lookups for one call.
pub struct Membership<'a, S> {
    source: &'a S,
    cache: &'a RequestCache,
    date: Option<NaiveDate>,
    page_limit: Option<u32>,
}

impl<'a, S: ScheduleSource> Membership<'a, S> {
    pub fn new(source: &'a S, cache: &'a RequestCache, date: Option<NaiveDate>) -> Self {
        Self {
            source,
            cache,
            date,
            page_limit: None,
        }
    }

    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    pub async fn routes_serving(&self, stop: &StopId) -> Shared<BTreeSet<RouteId>> {
        self.cache
            .routes_at_stop(
                stop,
                self.date,
                routes_serving(self.source, stop, self.date, self.page_limit),
            )
            .await
    }

    pub async fn stops_serving(&self, route: &RouteId) -> Shared<BTreeSet<StopId>> {
        self.cache
            .stops_on_route(
                route,
                self.date,
                stops_serving(self.source, route, self.date, self.page_limit),
            )
            .await
    }

    /// The stop record for `id`.
    pub async fn stop(&self, id: &StopId) -> Shared<Stop> {
        self.cache.stop(id, self.source.get_stop(id)).await
    }

    /// Resolve the stations of many routes, `concurrency` at a time.
    ///
    /// Results come back in input order. Later `stops_serving` calls for
    /// these routes are cache hits.
    pub async fn prefetch_stops(
        &self,
        routes: &[RouteId],
        concurrency: usize,
    ) -> Vec<(RouteId, Shared<BTreeSet<StopId>>)> {
        let mut results = Vec::with_capacity(routes.len());

        for batch in routes.chunks(concurrency.max(1)) {
            let futures: Vec<_> = batch
                .to_vec()
                .into_iter()
                .map(|route| async move {
                    let stops = self.stops_serving(&route).await;
                    (route, stops)
                })
                .collect();

            results.extend(join_all(futures).await);
        }

        results
    }
}
