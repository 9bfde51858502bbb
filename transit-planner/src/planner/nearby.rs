//! Proximity search: stops within a radius of a point, nearest first.

use serde::Serialize;
use tracing::debug;

use crate::domain::{Coordinate, Stop};
use crate::mbta::StopQuery;

use super::error::PlanError;
use super::source::ScheduleSource;

/// Parameters for a proximity search.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    pub lat: f64,
    pub lon: f64,
    pub radius_km: f64,
    /// Maximum results; 0 means no limit.
    pub max_results: usize,
    /// Only parent stations, not platforms or entrances.
    pub only_stations: bool,
    /// Only stops with accessible boarding.
    pub accessible_only: bool,
}

impl NearbyQuery {
    pub fn new(lat: f64, lon: f64, radius_km: f64) -> Self {
        Self {
            lat,
            lon,
            radius_km,
            max_results: 0,
            only_stations: true,
            accessible_only: false,
        }
    }

    pub fn max_results(mut self, n: usize) -> Self {
        self.max_results = n;
        self
    }

    pub fn only_stations(mut self, only: bool) -> Self {
        self.only_stations = only;
        self
    }

    pub fn accessible_only(mut self, only: bool) -> Self {
        self.accessible_only = only;
        self
    }

    fn validate(&self) -> Result<Coordinate, PlanError> {
        let center =
            Coordinate::new(self.lat, self.lon).map_err(|e| PlanError::InvalidInput(e.to_string()))?;
        if !self.radius_km.is_finite() || self.radius_km < 0.0 {
            return Err(PlanError::InvalidInput(format!(
                "radius must be a non-negative number of kilometres, got {}",
                self.radius_km
            )));
        }
        Ok(center)
    }
}

/// A stop with its distance from the search centre.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearbyStop {
    pub stop: Stop,
    pub distance_km: f64,
}

/// Find stops within `query.radius_km` of the centre, nearest first.
///
/// Ties in distance are broken by stop id.
pub async fn find_nearby<S: ScheduleSource>(
    source: &S,
    query: &NearbyQuery,
    page_limit: Option<u32>,
) -> Result<Vec<NearbyStop>, PlanError> {
    let center = query.validate()?;

    let stop_query = if query.only_stations {
        StopQuery::stations()
    } else {
        StopQuery::new()
    }
    .page_limit(page_limit);
    let candidates = source.list_stops(&stop_query).await?;
    let total = candidates.len();

    let mut nearby: Vec<NearbyStop> = candidates
        .into_iter()
        .map(|stop| {
            let distance_km = center.distance_km(&stop.coordinate);
            NearbyStop { stop, distance_km }
        })
        .filter(|n| n.distance_km <= query.radius_km)
        .collect();

    nearby.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.stop.id.cmp(&b.stop.id))
    });

    if query.accessible_only {
        nearby.retain(|n| n.stop.is_accessible());
    }
    if query.max_results > 0 {
        nearby.truncate(query.max_results);
    }

    debug!(
        candidates = total,
        results = nearby.len(),
        radius_km = query.radius_km,
        "proximity search"
    );
    Ok(nearby)
}
