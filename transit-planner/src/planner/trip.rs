//! Trip planning.
//!
//! [`TripPlanner`] answers "how do I get from this stop to that one, leaving
//! at this time?" with at most one transfer:
//!
//! 1. Resolve both stops (a platform resolves to its parent station) and
//!    the routes serving each.
//! 2. Try each route serving both stops, in id order, for a direct leg.
//! 3. Otherwise, find transfer points between the two route sets and try
//!    each: a first leg to the transfer stop, then a second leg onward that
//!    departs after the transfer time has elapsed.
//!
//! All data-source lookups for one call share a [`RequestCache`]. Dropping
//! the returned future cancels every in-flight request.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::cache::{CacheConfig, RequestCache};
use crate::domain::{
    RouteId, Stop, StopId, Timestamp, TransferPoint, TripPlan, service_date, service_time,
};
use crate::mbta::SourceError;

use super::config::PlannerConfig;
use super::error::{PlanError, skip_or_abort};
use super::leg_finder::{LegRequest, fetch_leg};
use super::membership::Membership;
use super::nearby::{NearbyQuery, NearbyStop, find_nearby};
use super::rank::{FirstViable, SelectionPolicy};
use super::source::ScheduleSource;
use super::transfer::find_transfer_points;

/// Request for a trip plan.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub origin: StopId,
    pub destination: StopId,
    /// Earliest departure from the origin.
    pub departure: Timestamp,
    /// Only use trips known to be wheelchair accessible.
    pub wheelchair_accessible: bool,
}

impl PlanRequest {
    pub fn new(
        origin: impl Into<StopId>,
        destination: impl Into<StopId>,
        departure: Timestamp,
    ) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            departure,
            wheelchair_accessible: false,
        }
    }

    pub fn accessible(mut self, accessible: bool) -> Self {
        self.wheelchair_accessible = accessible;
        self
    }

    /// Validate the request.
    pub fn validate(&self) -> Result<(), PlanError> {
        if self.origin.as_str().is_empty() || self.destination.as_str().is_empty() {
            return Err(PlanError::InvalidInput(
                "origin and destination are required".to_string(),
            ));
        }
        if self.origin == self.destination {
            return Err(PlanError::InvalidInput(
                "origin and destination are the same stop".to_string(),
            ));
        }
        Ok(())
    }

    fn no_trip(&self) -> PlanError {
        PlanError::NoTripFound {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
        }
    }
}

/// The resolved endpoints of a request.
struct Endpoints {
    origin: Arc<Stop>,
    destination: Arc<Stop>,
    origin_routes: Arc<BTreeSet<RouteId>>,
    destination_routes: Arc<BTreeSet<RouteId>>,
}

/// Trip planner over a data source.
#[derive(Clone)]
pub struct TripPlanner<S> {
    source: S,
    config: PlannerConfig,
    cache_config: CacheConfig,
    policy: Arc<dyn SelectionPolicy>,
}

impl<S: ScheduleSource> TripPlanner<S> {
    /// Create a planner using the [`FirstViable`] policy.
    pub fn new(source: S, config: PlannerConfig) -> Self {
        Self {
            source,
            config,
            cache_config: CacheConfig::default(),
            policy: Arc::new(FirstViable),
        }
    }

    /// Use a different selection policy.
    pub fn with_policy(mut self, policy: impl SelectionPolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_cache_config(mut self, config: CacheConfig) -> Self {
        self.cache_config = config;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Plan a trip with at most one transfer.
    ///
    /// Fails with `Timeout` if the configured deadline passes first. No
    /// partial plan is returned.
    pub async fn plan_trip(&self, request: &PlanRequest) -> Result<TripPlan, PlanError> {
        request.validate()?;

        match self.config.deadline() {
            Some(deadline) => tokio::time::timeout(deadline, self.plan(request))
                .await
                .map_err(|_| {
                    warn!(
                        origin = %request.origin,
                        destination = %request.destination,
                        ?deadline,
                        "planning deadline exceeded"
                    );
                    PlanError::Timeout
                })?,
            None => self.plan(request).await,
        }
    }

    /// Transfer points between two route sets.
    pub async fn find_transfer_points(
        &self,
        from_routes: &BTreeSet<RouteId>,
        to_routes: &BTreeSet<RouteId>,
    ) -> Result<Vec<TransferPoint>, PlanError> {
        let cache = RequestCache::new(&self.cache_config);
        let membership =
            Membership::new(&self.source, &cache, None).with_page_limit(self.config.page_limit);
        find_transfer_points(
            &membership,
            from_routes,
            to_routes,
            self.config.default_min_transfer(),
            self.config.concurrency,
        )
        .await
    }

    /// Stops near a point, nearest first.
    pub async fn find_nearby_stations(
        &self,
        query: &NearbyQuery,
    ) -> Result<Vec<NearbyStop>, PlanError> {
        find_nearby(&self.source, query, self.config.page_limit).await
    }

    async fn plan(&self, request: &PlanRequest) -> Result<TripPlan, PlanError> {
        let cache = RequestCache::new(&self.cache_config);
        let date = service_date(&request.departure, self.config.timezone);
        let membership = Membership::new(&self.source, &cache, Some(date))
            .with_page_limit(self.config.page_limit);

        let endpoints = self.resolve(&membership, request).await?;

        if let Some(plan) = self.plan_direct(&endpoints, request).await? {
            info!(
                origin = %request.origin,
                destination = %request.destination,
                route = %plan.legs()[0].route_id(),
                "planned direct trip"
            );
            return Ok(plan);
        }

        let points = find_transfer_points(
            &membership,
            &endpoints.origin_routes,
            &endpoints.destination_routes,
            self.config.default_min_transfer(),
            self.config.concurrency,
        )
        .await?;

        match self.plan_with_transfer(&endpoints, request, points).await? {
            Some(plan) => {
                info!(
                    origin = %request.origin,
                    destination = %request.destination,
                    transfer = %plan.legs()[0].destination().id,
                    "planned trip with one transfer"
                );
                Ok(plan)
            }
            None => {
                debug!(
                    origin = %request.origin,
                    destination = %request.destination,
                    "transfer candidates exhausted"
                );
                Err(request.no_trip())
            }
        }
    }

    /// Fetch both stops, lift platforms to their stations, and fetch the
    /// routes serving each. Any failure aborts.
    async fn resolve(
        &self,
        membership: &Membership<'_, S>,
        request: &PlanRequest,
    ) -> Result<Endpoints, PlanError> {
        let (origin, destination) = tokio::try_join!(
            station_for(membership, &request.origin),
            station_for(membership, &request.destination),
        )
        .map_err(|e| PlanError::from(&*e))?;

        if origin.id == destination.id {
            return Err(PlanError::InvalidInput(format!(
                "origin and destination are both at {}",
                origin.id
            )));
        }

        let (origin_routes, destination_routes) = tokio::try_join!(
            membership.routes_serving(&origin.id),
            membership.routes_serving(&destination.id),
        )
        .map_err(|e| PlanError::from(&*e))?;

        debug!(
            origin = %origin.id,
            destination = %destination.id,
            origin_routes = origin_routes.len(),
            destination_routes = destination_routes.len(),
            "resolved endpoints"
        );
        Ok(Endpoints {
            origin,
            destination,
            origin_routes,
            destination_routes,
        })
    }

    /// Try each route serving both endpoints, in id order.
    async fn plan_direct(
        &self,
        endpoints: &Endpoints,
        request: &PlanRequest,
    ) -> Result<Option<TripPlan>, PlanError> {
        let leg_request = LegRequest::new(
            Stop::clone(&endpoints.origin),
            Stop::clone(&endpoints.destination),
        )
        .accessible(request.wheelchair_accessible)
        .not_before(request.departure);
        let date = service_date(&request.departure, self.config.timezone);
        let min_time = service_time(&request.departure, self.config.timezone);

        let mut plans = Vec::new();
        for route in endpoints
            .origin_routes
            .intersection(&endpoints.destination_routes)
        {
            let found = fetch_leg(
                &self.source,
                route,
                &leg_request,
                date,
                min_time,
                self.config.page_limit,
                &*self.policy,
            )
            .await;

            match found {
                Ok(Some(leg)) => {
                    plans.push(TripPlan::direct(leg));
                    if self.policy.short_circuits() {
                        break;
                    }
                }
                Ok(None) => debug!(route = %route, "no direct leg on route"),
                Err(e) => skip_or_abort(&e, "route", route.as_str())?,
            }
        }

        Ok(self.policy.pick_plan(plans))
    }

    /// Evaluate transfer points `concurrency` at a time, in discovery order.
    async fn plan_with_transfer(
        &self,
        endpoints: &Endpoints,
        request: &PlanRequest,
        points: Vec<TransferPoint>,
    ) -> Result<Option<TripPlan>, PlanError> {
        let points: Vec<TransferPoint> = points
            .into_iter()
            .filter(|p| p.stop.id != endpoints.origin.id && p.stop.id != endpoints.destination.id)
            .collect();

        let mut plans = Vec::new();
        for batch in points.chunks(self.config.concurrency.max(1)) {
            let futures: Vec<_> = batch
                .to_vec()
                .into_iter()
                .map(|point| async move {
                    let result = self.try_transfer(endpoints, request, &point).await;
                    (point, result)
                })
                .collect();

            for (point, result) in join_all(futures).await {
                match result {
                    Ok(Some(plan)) => {
                        if self.policy.short_circuits() {
                            return Ok(Some(plan));
                        }
                        plans.push(plan);
                    }
                    Ok(None) => debug!(
                        stop = %point.stop.id,
                        from = %point.from_route,
                        to = %point.to_route,
                        "no connection via transfer point"
                    ),
                    Err(e) => skip_or_abort(&e, "transfer", point.stop.id.as_str())?,
                }
            }
        }

        Ok(self.policy.pick_plan(plans))
    }

    /// Two legs through one transfer point, or `None`.
    async fn try_transfer(
        &self,
        endpoints: &Endpoints,
        request: &PlanRequest,
        point: &TransferPoint,
    ) -> Result<Option<TripPlan>, SourceError> {
        let first_request = LegRequest::new(Stop::clone(&endpoints.origin), point.stop.clone())
            .accessible(request.wheelchair_accessible)
            .not_before(request.departure);
        let Some(first) = fetch_leg(
            &self.source,
            &point.from_route,
            &first_request,
            service_date(&request.departure, self.config.timezone),
            service_time(&request.departure, self.config.timezone),
            self.config.page_limit,
            &*self.policy,
        )
        .await?
        else {
            return Ok(None);
        };

        let gap: Duration = point.min_transfer_time.max(self.config.min_transfer_floor());
        let earliest = first.arrival() + gap;

        let second_request = LegRequest::new(point.stop.clone(), Stop::clone(&endpoints.destination))
            .accessible(request.wheelchair_accessible)
            .not_before(earliest);
        let Some(second) = fetch_leg(
            &self.source,
            &point.to_route,
            &second_request,
            service_date(&earliest, self.config.timezone),
            service_time(&earliest, self.config.timezone),
            self.config.page_limit,
            &*self.policy,
        )
        .await?
        else {
            return Ok(None);
        };

        match TripPlan::new(vec![first, second]) {
            Ok(plan) => Ok(Some(plan)),
            Err(e) => {
                debug!(stop = %point.stop.id, error = %e, "discarding inconsistent plan");
                Ok(None)
            }
        }
    }
}

/// The stop record for `id`, or its parent station's record when it has one.
async fn station_for<S: ScheduleSource>(
    membership: &Membership<'_, S>,
    id: &StopId,
) -> Result<Arc<Stop>, Arc<SourceError>> {
    let stop = membership.stop(id).await?;
    match &stop.parent_station {
        Some(parent) => {
            debug!(stop = %id, station = %parent, "using parent station");
            membership.stop(parent).await
        }
        None => Ok(stop),
    }
}
