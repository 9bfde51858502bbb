//! In-memory data source for testing without API access.
//!
//! Serves stops and schedule events from memory, applying the same filters
//! the live API applies. Data can be built up programmatically or loaded from
//! a directory of JSON:API documents (`stops.json`, `schedules.json`).
//! Failures can be injected per route or per stop.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{
    AGENCY_TIMEZONE, Route, RouteId, ScheduleEvent, ScheduleSet, Stop, StopId, Timestamp, Trip,
    TripId, service_date, service_time,
};
use crate::planner::ScheduleSource;

use super::convert::{convert_schedules, convert_stops};
use super::error::SourceError;
use super::query::{Include, ScheduleQuery, ScheduleSort, StopQuery};
use super::types::{ScheduleDocument, StopsDocument};

/// A failure to return in place of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Failure {
    NotFound,
    Unauthorized,
    RateLimited,
    Timeout,
}

impl Failure {
    fn to_error(self, what: &str) -> SourceError {
        match self {
            Failure::NotFound => SourceError::NotFound(what.to_string()),
            Failure::Unauthorized => SourceError::Unauthorized,
            Failure::RateLimited => SourceError::RateLimited,
            Failure::Timeout => SourceError::Timeout,
        }
    }
}

/// Mock data source backed by in-memory collections.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    /// Stops in insertion order; `list_stops` preserves it.
    stops: Vec<Stop>,
    events: Vec<ScheduleEvent>,
    trips: HashMap<TripId, Trip>,
    routes: HashMap<RouteId, Route>,
    route_failures: HashMap<RouteId, Failure>,
    stop_failures: HashMap<StopId, Failure>,
    listing_failure: Option<Failure>,
    schedule_calls: Arc<AtomicUsize>,
    stop_calls: Arc<AtomicUsize>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `stops.json` and `schedules.json` from a directory.
    ///
    /// `schedules.json` is a schedule document; its `included` trips, routes
    /// and stops are loaded too. Either file may be absent, but not both.
    pub fn from_dir(data_dir: impl AsRef<Path>) -> Result<Self, SourceError> {
        let data_dir = data_dir.as_ref();
        let mut source = Self::new();
        let mut loaded = false;

        let stops_path = data_dir.join("stops.json");
        if stops_path.is_file() {
            let doc: StopsDocument = read_json(&stops_path)?;
            for stop in convert_stops(&doc.data) {
                source = source.with_stop(stop);
            }
            loaded = true;
        }

        let schedules_path = data_dir.join("schedules.json");
        if schedules_path.is_file() {
            let doc: ScheduleDocument = read_json(&schedules_path)?;
            let set = convert_schedules(&doc);
            for stop in set.stops.into_values() {
                source = source.with_stop(stop);
            }
            source.events.extend(set.events);
            source.trips.extend(set.trips);
            source.routes.extend(set.routes);
            loaded = true;
        }

        if !loaded {
            return Err(SourceError::Api {
                status: 0,
                message: format!("No mock data files found in {:?}", data_dir),
            });
        }

        tracing::info!(
            stops = source.stops.len(),
            events = source.events.len(),
            trips = source.trips.len(),
            "loaded mock data"
        );
        Ok(source)
    }

    /// Add or replace a stop.
    pub fn with_stop(mut self, stop: Stop) -> Self {
        match self.stops.iter_mut().find(|s| s.id == stop.id) {
            Some(existing) => *existing = stop,
            None => self.stops.push(stop),
        }
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.routes.insert(route.id.clone(), route);
        self
    }

    pub fn with_trip(mut self, trip: Trip) -> Self {
        self.trips.insert(trip.id.clone(), trip);
        self
    }

    pub fn with_event(mut self, event: ScheduleEvent) -> Self {
        self.events.push(event);
        self
    }

    /// Fail every schedule query that filters on this route.
    pub fn fail_route(mut self, route: impl Into<RouteId>, failure: Failure) -> Self {
        self.route_failures.insert(route.into(), failure);
        self
    }

    /// Fail lookups of this stop, and schedule queries filtering on it.
    pub fn fail_stop(mut self, stop: impl Into<StopId>, failure: Failure) -> Self {
        self.stop_failures.insert(stop.into(), failure);
        self
    }

    /// Fail every stop listing.
    pub fn fail_listing(mut self, failure: Failure) -> Self {
        self.listing_failure = Some(failure);
        self
    }

    /// Number of schedule queries served so far.
    pub fn schedule_calls(&self) -> usize {
        self.schedule_calls.load(Ordering::Relaxed)
    }

    /// Number of single-stop lookups served so far.
    pub fn stop_calls(&self) -> usize {
        self.stop_calls.load(Ordering::Relaxed)
    }

    fn stop(&self, id: &StopId) -> Option<&Stop> {
        self.stops.iter().find(|s| &s.id == id)
    }

    fn station_of<'a>(&'a self, id: &'a StopId) -> &'a StopId {
        self.stop(id)
            .and_then(|s| s.parent_station.as_ref())
            .unwrap_or(id)
    }

    fn check_failures(&self, query: &ScheduleQuery) -> Result<(), SourceError> {
        for route in &query.routes {
            if let Some(f) = self.route_failures.get(route) {
                return Err(f.to_error(&format!("route {route}")));
            }
        }
        for stop in &query.stops {
            if let Some(f) = self.stop_failures.get(stop) {
                return Err(f.to_error(&format!("stop {stop}")));
            }
        }
        Ok(())
    }

    fn matches(&self, event: &ScheduleEvent, query: &ScheduleQuery) -> bool {
        if !query.routes.is_empty() && !query.routes.contains(&event.route_id) {
            return false;
        }
        if !query.stops.is_empty()
            && !query.stops.contains(&event.stop_id)
            && !query.stops.contains(self.station_of(&event.stop_id))
        {
            return false;
        }
        if !query.trips.is_empty() && !query.trips.contains(&event.trip_id) {
            return false;
        }
        if let Some(direction) = query.direction {
            if event.direction_id != Some(direction) {
                return false;
            }
        }

        let time = event_time(event);
        if let (Some(date), Some(t)) = (query.date, time) {
            if service_date(&t, AGENCY_TIMEZONE) != date {
                return false;
            }
        }
        if let (Some(min), Some(t)) = (query.min_time, time) {
            if service_time(&t, AGENCY_TIMEZONE) < min {
                return false;
            }
        }
        if let (Some(max), Some(t)) = (query.max_time, time) {
            if service_time(&t, AGENCY_TIMEZONE) > max {
                return false;
            }
        }
        true
    }
}

/// The time the API filters and sorts on: departure, else arrival.
fn event_time(event: &ScheduleEvent) -> Option<Timestamp> {
    event.departure.or(event.arrival)
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, SourceError> {
    let json = std::fs::read_to_string(path).map_err(|e| SourceError::Api {
        status: 0,
        message: format!("Failed to read {:?}: {}", path, e),
    })?;
    serde_json::from_str(&json).map_err(|e| SourceError::Json {
        message: format!("{:?}: {}", path, e),
        body: None,
    })
}

impl ScheduleSource for MockSource {
    async fn get_stop(&self, id: &StopId) -> Result<Stop, SourceError> {
        self.stop_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(f) = self.stop_failures.get(id) {
            return Err(f.to_error(&format!("stop {id}")));
        }
        self.stop(id)
            .cloned()
            .ok_or_else(|| SourceError::NotFound(format!("stop {id}")))
    }

    async fn list_stops(&self, query: &StopQuery) -> Result<Vec<Stop>, SourceError> {
        if let Some(f) = self.listing_failure {
            return Err(f.to_error("stops"));
        }
        let on_routes: Option<HashSet<&StopId>> = (!query.routes.is_empty()).then(|| {
            self.events
                .iter()
                .filter(|e| query.routes.contains(&e.route_id))
                .map(|e| self.station_of(&e.stop_id))
                .collect()
        });

        let mut stops: Vec<Stop> = self
            .stops
            .iter()
            .filter(|s| {
                query.location_types.is_empty() || query.location_types.contains(&s.location_type)
            })
            .filter(|s| query.ids.is_empty() || query.ids.contains(&s.id))
            .filter(|s| {
                on_routes
                    .as_ref()
                    .is_none_or(|ids| ids.contains(&s.id) || ids.contains(self.station_of(&s.id)))
            })
            .cloned()
            .collect();

        if let Some(limit) = query.page_limit {
            stops.truncate(limit as usize);
        }
        Ok(stops)
    }

    async fn get_schedules(&self, query: &ScheduleQuery) -> Result<ScheduleSet, SourceError> {
        self.schedule_calls.fetch_add(1, Ordering::Relaxed);
        self.check_failures(query)?;

        let mut events: Vec<ScheduleEvent> = self
            .events
            .iter()
            .filter(|e| self.matches(e, query))
            .cloned()
            .collect();

        match query.sort {
            Some(ScheduleSort::DepartureTime) => {
                events.sort_by_key(|e| (e.departure.is_none(), e.departure));
            }
            Some(ScheduleSort::ArrivalTime) => {
                events.sort_by_key(|e| (e.arrival.is_none(), e.arrival));
            }
            Some(ScheduleSort::StopSequence) => events.sort_by_key(|e| e.stop_sequence),
            None => {}
        }
        if let Some(limit) = query.page_limit {
            events.truncate(limit as usize);
        }

        let mut set = ScheduleSet::from_events(events);
        for event in &set.events {
            if query.includes(Include::Trip) {
                if let Some(trip) = self.trips.get(&event.trip_id) {
                    set.trips.insert(trip.id.clone(), trip.clone());
                }
            }
            if query.includes(Include::Route) {
                if let Some(route) = self.routes.get(&event.route_id) {
                    set.routes.insert(route.id.clone(), route.clone());
                }
            }
            if query.includes(Include::Stop) {
                if let Some(stop) = self.stop(&event.stop_id) {
                    set.stops.insert(stop.id.clone(), stop.clone());
                }
            }
        }
        Ok(set)
    }
}
