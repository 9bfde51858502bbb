//! Data transfer objects for web requests and responses.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::{RouteId, Stop, Timestamp, TransferPoint, TripLeg, TripPlan};
use crate::planner::{NearbyQuery, NearbyStop};

/// Default search radius when none is given.
const DEFAULT_RADIUS_KM: f64 = 1.0;

/// Query for `GET /trip/plan`.
#[derive(Debug, Deserialize)]
pub struct PlanTripRequest {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Departure time, RFC 3339 (defaults to now)
    pub time: Option<String>,

    /// Only use wheelchair accessible trips
    #[serde(default)]
    pub accessible: bool,
}

/// Query for `GET /stops/nearby`.
#[derive(Debug, Deserialize)]
pub struct NearbyRequest {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: Option<f64>,
    /// Maximum results; 0 or absent means no limit
    pub max_results: Option<usize>,
    pub stations_only: Option<bool>,
    #[serde(default)]
    pub accessible_only: bool,
}

impl NearbyRequest {
    pub fn to_query(&self) -> NearbyQuery {
        let mut query = NearbyQuery::new(
            self.lat,
            self.lon,
            self.radius_km.unwrap_or(DEFAULT_RADIUS_KM),
        )
        .max_results(self.max_results.unwrap_or(0))
        .accessible_only(self.accessible_only);
        if let Some(only) = self.stations_only {
            query = query.only_stations(only);
        }
        query
    }
}

/// Query for `GET /transfers`. Route lists are comma separated.
#[derive(Debug, Deserialize)]
pub struct TransfersRequest {
    pub from_routes: String,
    pub to_routes: String,
}

/// Split a comma-separated id list, dropping blanks.
pub fn parse_route_list(s: &str) -> BTreeSet<RouteId> {
    s.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(RouteId::from)
        .collect()
}

/// A stop in a response.
#[derive(Debug, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub accessible: bool,
}

impl StopResult {
    pub fn from_stop(stop: &Stop) -> Self {
        Self {
            id: stop.id.to_string(),
            name: stop.name.clone(),
            lat: stop.coordinate.lat(),
            lon: stop.coordinate.lon(),
            accessible: stop.is_accessible(),
        }
    }
}

/// One ride in a plan.
#[derive(Debug, Serialize)]
pub struct LegResult {
    pub route_id: String,
    pub route_name: String,
    pub trip_id: String,
    pub headsign: Option<String>,
    pub origin: StopResult,
    pub destination: StopResult,
    /// RFC 3339
    pub departure: String,
    pub arrival: String,
    pub duration_mins: i64,
    pub distance_km: f64,
    pub accessible: bool,
    pub instruction: String,
}

impl LegResult {
    pub fn from_leg(leg: &TripLeg) -> Self {
        Self {
            route_id: leg.route_id().to_string(),
            route_name: leg.route_name().to_string(),
            trip_id: leg.trip_id().to_string(),
            headsign: leg.headsign().map(str::to_string),
            origin: StopResult::from_stop(leg.origin()),
            destination: StopResult::from_stop(leg.destination()),
            departure: format_timestamp(&leg.departure()),
            arrival: format_timestamp(&leg.arrival()),
            duration_mins: leg.duration().num_minutes(),
            distance_km: leg.distance_km(),
            accessible: leg.is_accessible(),
            instruction: leg.instruction().to_string(),
        }
    }
}

/// Response for `GET /trip/plan`.
#[derive(Debug, Serialize)]
pub struct PlanTripResponse {
    pub origin: StopResult,
    pub destination: StopResult,
    pub departure: String,
    pub arrival: String,
    pub duration_mins: i64,
    pub distance_km: f64,
    pub transfers: usize,
    pub accessible: bool,
    pub legs: Vec<LegResult>,
}

impl PlanTripResponse {
    pub fn from_plan(plan: &TripPlan) -> Self {
        Self {
            origin: StopResult::from_stop(plan.origin()),
            destination: StopResult::from_stop(plan.destination()),
            departure: format_timestamp(&plan.departure()),
            arrival: format_timestamp(&plan.arrival()),
            duration_mins: plan.duration().num_minutes(),
            distance_km: plan.distance_km(),
            transfers: plan.transfer_count(),
            accessible: plan.is_accessible(),
            legs: plan.legs().iter().map(LegResult::from_leg).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NearbyResult {
    pub stop: StopResult,
    pub distance_km: f64,
}

/// Response for `GET /stops/nearby`, nearest first.
#[derive(Debug, Serialize)]
pub struct NearbyResponse {
    pub stops: Vec<NearbyResult>,
}

impl NearbyResponse {
    pub fn from_results(results: &[NearbyStop]) -> Self {
        Self {
            stops: results
                .iter()
                .map(|n| NearbyResult {
                    stop: StopResult::from_stop(&n.stop),
                    distance_km: n.distance_km,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub stop: StopResult,
    pub from_route: String,
    pub to_route: String,
    pub min_transfer_mins: i64,
}

impl TransferResult {
    pub fn from_point(point: &TransferPoint) -> Self {
        Self {
            stop: StopResult::from_stop(&point.stop),
            from_route: point.from_route.to_string(),
            to_route: point.to_route.to_string(),
            min_transfer_mins: point.min_transfer_time.num_minutes(),
        }
    }
}

/// Response for `GET /transfers`.
#[derive(Debug, Serialize)]
pub struct TransfersResponse {
    pub transfers: Vec<TransferResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn format_timestamp(t: &Timestamp) -> String {
    t.to_rfc3339()
}
