//! Schedule events, trips, and the typed result of a schedule query.

use std::collections::HashMap;

use serde::Serialize;

use super::{Accessibility, Route, RouteId, Stop, StopId, Timestamp, TripId};

/// One scheduled stop of one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    pub trip_id: TripId,
    pub stop_id: StopId,
    pub route_id: RouteId,
    /// Position of the stop along the trip; increases along the path.
    pub stop_sequence: u32,
    /// `None` when absent or unparseable.
    pub arrival: Option<Timestamp>,
    /// `None` when absent or unparseable.
    pub departure: Option<Timestamp>,
    pub direction_id: Option<u8>,
    pub timepoint: Option<bool>,
}

/// A scheduled trip.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trip {
    pub id: TripId,
    pub route_id: RouteId,
    pub headsign: String,
    pub direction_id: Option<u8>,
    pub wheelchair_accessible: Accessibility,
    pub bikes_allowed: bool,
}

impl Trip {
    pub fn is_accessible(&self) -> bool {
        self.wheelchair_accessible.is_accessible()
    }
}

/// Events from one schedule query, with the trips, routes and stops the
/// response side-loaded.
///
/// Events keep response order; everything keyed by id is only a lookup aid.
#[derive(Debug, Clone, Default)]
pub struct ScheduleSet {
    pub events: Vec<ScheduleEvent>,
    pub trips: HashMap<TripId, Trip>,
    pub routes: HashMap<RouteId, Route>,
    pub stops: HashMap<StopId, Stop>,
}

impl ScheduleSet {
    /// Create a set from events alone.
    pub fn from_events(events: Vec<ScheduleEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn trip(&self, id: &TripId) -> Option<&Trip> {
        self.trips.get(id)
    }

    pub fn route(&self, id: &RouteId) -> Option<&Route> {
        self.routes.get(id)
    }

    /// The station a stop belongs to: its parent station when the response
    /// side-loaded the stop with one, otherwise the stop itself.
    ///
    /// Schedules reference platforms, while riders (and transfer lookups)
    /// reason about stations.
    pub fn station_of<'a>(&'a self, stop_id: &'a StopId) -> &'a StopId {
        self.stops
            .get(stop_id)
            .and_then(|stop| stop.parent_station.as_ref())
            .unwrap_or(stop_id)
    }
}
