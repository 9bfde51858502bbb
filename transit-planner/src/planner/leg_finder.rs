//! Leg finder.
//!
//! Given the schedule events of one route, finds a trip that calls at the
//! origin and later at the destination. Candidates are produced lazily in
//! response order and handed to a [`SelectionPolicy`].

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::domain::{Ride, RouteId, ScheduleSet, Stop, StopId, Timestamp, TripId, TripLeg};
use crate::mbta::{Include, ScheduleQuery, ScheduleSort, SourceError};

use super::rank::SelectionPolicy;
use super::source::ScheduleSource;

/// What a leg must satisfy.
#[derive(Debug, Clone)]
pub struct LegRequest {
    /// Boarding station.
    pub origin: Stop,
    /// Alighting station.
    pub destination: Stop,
    /// Only accept trips known to be wheelchair accessible.
    pub require_accessible: bool,
    /// Earliest acceptable departure from the origin.
    pub not_before: Option<Timestamp>,
}

impl LegRequest {
    pub fn new(origin: Stop, destination: Stop) -> Self {
        Self {
            origin,
            destination,
            require_accessible: false,
            not_before: None,
        }
    }

    pub fn accessible(mut self, require: bool) -> Self {
        self.require_accessible = require;
        self
    }

    pub fn not_before(mut self, t: Timestamp) -> Self {
        self.not_before = Some(t);
        self
    }

    /// Station the origin belongs to (itself when it is a station).
    fn origin_station(&self) -> &StopId {
        self.origin.parent_station.as_ref().unwrap_or(&self.origin.id)
    }

    fn destination_station(&self) -> &StopId {
        self.destination
            .parent_station
            .as_ref()
            .unwrap_or(&self.destination.id)
    }
}

/// One trip's call at a station.
#[derive(Debug, Clone, Copy)]
struct StationCall {
    sequence: u32,
    arrival: Option<Timestamp>,
    departure: Option<Timestamp>,
}

/// Events of one trip, indexed by station. The first call at a station wins.
struct TripCalls<'a> {
    trip_id: &'a TripId,
    route_id: &'a RouteId,
    direction_id: Option<u8>,
    calls: HashMap<&'a StopId, StationCall>,
}

/// Group events by trip, in order of each trip's first appearance.
fn group_by_trip(schedules: &ScheduleSet) -> Vec<TripCalls<'_>> {
    let mut order: HashMap<&TripId, usize> = HashMap::new();
    let mut trips: Vec<TripCalls<'_>> = Vec::new();

    for event in &schedules.events {
        let idx = *order.entry(&event.trip_id).or_insert_with(|| {
            trips.push(TripCalls {
                trip_id: &event.trip_id,
                route_id: &event.route_id,
                direction_id: event.direction_id,
                calls: HashMap::new(),
            });
            trips.len() - 1
        });

        let station = schedules.station_of(&event.stop_id);
        trips[idx].calls.entry(station).or_insert(StationCall {
            sequence: event.stop_sequence,
            arrival: event.arrival,
            departure: event.departure,
        });
    }

    trips
}

/// Build a leg from one trip, or `None` if the trip doesn't qualify.
fn leg_for_trip(
    schedules: &ScheduleSet,
    trip: &TripCalls<'_>,
    request: &LegRequest,
) -> Option<TripLeg> {
    let from = trip.calls.get(request.origin_station())?;
    let to = trip.calls.get(request.destination_station())?;

    if to.sequence <= from.sequence {
        return None;
    }

    let record = schedules.trip(trip.trip_id);
    let accessible = record.is_some_and(|t| t.is_accessible());
    if request.require_accessible && !accessible {
        return None;
    }

    let departure = from.departure?;
    let arrival = to.arrival.or(to.departure)?;
    if request.not_before.is_some_and(|t| departure < t) {
        return None;
    }

    let route = schedules.route(trip.route_id);
    let route_name = route
        .map(|r| r.display_name().to_string())
        .unwrap_or_else(|| trip.route_id.to_string());
    let headsign = record
        .map(|t| t.headsign.clone())
        .filter(|h| !h.is_empty())
        .or_else(|| {
            let direction = record.and_then(|t| t.direction_id).or(trip.direction_id)?;
            route?.destination_for(direction).map(str::to_string)
        });

    let ride = Ride {
        route_id: trip.route_id.clone(),
        route_name,
        trip_id: trip.trip_id.clone(),
        headsign,
        accessible,
    };

    TripLeg::new(
        request.origin.clone(),
        request.destination.clone(),
        ride,
        departure,
        arrival,
    )
    .ok()
}

/// Find a leg from `request.origin` to `request.destination` in `schedules`.
///
/// `None` means no trip qualified; it is not an error.
pub fn find_leg(
    schedules: &ScheduleSet,
    request: &LegRequest,
    policy: &dyn SelectionPolicy,
) -> Option<TripLeg> {
    let trips = group_by_trip(schedules);
    let mut candidates = trips
        .iter()
        .filter_map(|trip| leg_for_trip(schedules, trip, request));

    let leg = policy.pick_leg(&mut candidates);
    match &leg {
        Some(leg) => debug!(
            origin = %request.origin.id,
            destination = %request.destination.id,
            trip = %leg.trip_id(),
            departure = %leg.departure(),
            "found leg"
        ),
        None => debug!(
            origin = %request.origin.id,
            destination = %request.destination.id,
            trips = trips.len(),
            "no qualifying trip"
        ),
    }
    leg
}

/// Query `route`'s schedules at both stops and find a leg.
pub async fn fetch_leg<S: ScheduleSource>(
    source: &S,
    route: &RouteId,
    request: &LegRequest,
    date: NaiveDate,
    min_time: NaiveTime,
    page_limit: Option<u32>,
    policy: &dyn SelectionPolicy,
) -> Result<Option<TripLeg>, SourceError> {
    let query = ScheduleQuery::new()
        .route(route)
        .stop(request.origin_station())
        .stop(request.destination_station())
        .date(date)
        .min_time(min_time)
        .include(Include::Trip)
        .include(Include::Route)
        .include(Include::Stop)
        .sort(ScheduleSort::DepartureTime)
        .page_limit(page_limit);

    let schedules = source.get_schedules(&query).await?;
    Ok(find_leg(&schedules, request, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Accessibility, Coordinate, Route, RouteType, ScheduleEvent, Trip, parse_timestamp,
    };
    use crate::planner::rank::{EarliestArrival, FirstViable};

    fn ts(hm: &str) -> Timestamp {
        parse_timestamp(&format!("2024-03-15T{hm}:00-04:00")).unwrap()
    }

    fn park() -> Stop {
        Stop::new(
            "place-pktrm",
            "Park Street",
            Coordinate::new(42.356395, -71.062424).unwrap(),
        )
        .as_station()
    }

    fn harvard() -> Stop {
        Stop::new(
            "place-harsq",
            "Harvard",
            Coordinate::new(42.373362, -71.118956).unwrap(),
        )
        .as_station()
    }

    fn event(trip: &str, stop: &str, seq: u32, arr: Option<&str>, dep: Option<&str>) -> ScheduleEvent {
        ScheduleEvent {
            trip_id: trip.into(),
            stop_id: stop.into(),
            route_id: "Red".into(),
            stop_sequence: seq,
            arrival: arr.map(ts),
            departure: dep.map(ts),
            direction_id: Some(1),
            timepoint: None,
        }
    }

    fn trip(id: &str, headsign: &str, access: Accessibility) -> Trip {
        Trip {
            id: id.into(),
            route_id: "Red".into(),
            headsign: headsign.into(),
            direction_id: Some(1),
            wheelchair_accessible: access,
            bikes_allowed: false,
        }
    }

    fn red_line() -> Route {
        Route {
            id: "Red".into(),
            long_name: "Red Line".into(),
            short_name: String::new(),
            route_type: RouteType::Subway,
            direction_names: vec!["South".into(), "North".into()],
            direction_destinations: vec!["Ashmont/Braintree".into(), "Alewife".into()],
        }
    }

    fn with_records(events: Vec<ScheduleEvent>, trips: Vec<Trip>) -> ScheduleSet {
        let mut set = ScheduleSet::from_events(events);
        for t in trips {
            set.trips.insert(t.id.clone(), t);
        }
        set.routes.insert("Red".into(), red_line());
        set
    }

    fn request() -> LegRequest {
        LegRequest::new(park(), harvard())
    }

    #[test]
    fn finds_direct_leg() {
        let set = with_records(
            vec![
                event("T1", "place-pktrm", 5, None, Some("10:00")),
                event("T1", "place-harsq", 9, Some("10:12"), None),
            ],
            vec![trip("T1", "Alewife", Accessibility::Accessible)],
        );

        let leg = find_leg(&set, &request(), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T1");
        assert_eq!(leg.departure(), ts("10:00"));
        assert_eq!(leg.arrival(), ts("10:12"));
        assert_eq!(leg.route_name(), "Red Line");
        assert_eq!(
            leg.instruction(),
            "Take Red Line toward Alewife from Park Street to Harvard"
        );
        assert!((leg.distance_km() - 5.013).abs() < 0.01);
        assert!(leg.is_accessible());
    }

    #[test]
    fn wrong_direction_is_skipped() {
        let set = with_records(
            vec![
                event("T1", "place-harsq", 1, None, Some("10:00")),
                event("T1", "place-pktrm", 5, Some("10:12"), Some("10:13")),
            ],
            vec![],
        );
        assert!(find_leg(&set, &request(), &FirstViable).is_none());
    }

    #[test]
    fn accessibility_filter() {
        let set = with_records(
            vec![
                event("T1", "place-pktrm", 1, None, Some("10:00")),
                event("T1", "place-harsq", 5, Some("10:12"), None),
                event("T2", "place-pktrm", 1, None, Some("10:05")),
                event("T2", "place-harsq", 5, Some("10:17"), None),
                event("T3", "place-pktrm", 1, None, Some("10:10")),
                event("T3", "place-harsq", 5, Some("10:22"), None),
            ],
            vec![
                trip("T1", "Alewife", Accessibility::Inaccessible),
                trip("T3", "Alewife", Accessibility::Accessible),
            ],
        );

        // T1 is inaccessible, T2 has no trip record
        let leg = find_leg(&set, &request().accessible(true), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T3");

        let leg = find_leg(&set, &request(), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T1");
        assert!(!leg.is_accessible());
    }

    #[test]
    fn missing_times_and_fallback() {
        let set = with_records(
            vec![
                // No departure at origin
                event("T1", "place-pktrm", 1, Some("10:00"), None),
                event("T1", "place-harsq", 5, Some("10:12"), None),
                // Destination only has a departure time
                event("T2", "place-pktrm", 1, None, Some("10:05")),
                event("T2", "place-harsq", 5, None, Some("10:18")),
            ],
            vec![],
        );

        let leg = find_leg(&set, &request(), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T2");
        assert_eq!(leg.arrival(), ts("10:18"));
        // No trip record: headsign from the route's direction destination
        assert_eq!(leg.headsign(), Some("Alewife"));
    }

    #[test]
    fn not_before_is_respected() {
        let set = with_records(
            vec![
                event("T1", "place-pktrm", 1, None, Some("09:55")),
                event("T1", "place-harsq", 5, Some("10:07"), None),
                event("T2", "place-pktrm", 1, None, Some("10:05")),
                event("T2", "place-harsq", 5, Some("10:17"), None),
            ],
            vec![],
        );
        let leg = find_leg(&set, &request().not_before(ts("10:00")), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T2");
    }

    #[test]
    fn first_viable_is_greedy() {
        // T1 appears first in the response but arrives later
        let set = with_records(
            vec![
                event("T1", "place-pktrm", 1, None, Some("10:00")),
                event("T2", "place-pktrm", 1, None, Some("10:02")),
                event("T2", "place-harsq", 5, Some("10:10"), None),
                event("T1", "place-harsq", 8, Some("10:30"), None),
            ],
            vec![],
        );

        let greedy = find_leg(&set, &request(), &FirstViable).unwrap();
        assert_eq!(greedy.trip_id().as_str(), "T1");

        let best = find_leg(&set, &request(), &EarliestArrival).unwrap();
        assert_eq!(best.trip_id().as_str(), "T2");
    }

    #[test]
    fn platforms_resolve_to_stations() {
        let coord = Coordinate::new(42.356395, -71.062424).unwrap();
        let mut set = with_records(
            vec![
                event("T1", "70075", 1, None, Some("10:00")),
                event("T1", "place-harsq", 5, Some("10:12"), None),
            ],
            vec![],
        );
        set.stops.insert(
            "70075".into(),
            Stop::new("70075", "Park Street", coord).with_parent("place-pktrm"),
        );

        let leg = find_leg(&set, &request(), &FirstViable).unwrap();
        assert_eq!(leg.origin().id.as_str(), "place-pktrm");
    }

    #[test]
    fn platform_endpoint_matches_its_station() {
        let coord = Coordinate::new(42.356395, -71.062424).unwrap();
        let set = with_records(
            vec![
                event("T1", "place-pktrm", 1, None, Some("10:00")),
                event("T1", "place-harsq", 5, Some("10:12"), None),
            ],
            vec![],
        );
        let platform = Stop::new("70075", "Park Street - Red Line", coord).with_parent("place-pktrm");

        let leg = find_leg(&set, &LegRequest::new(platform, harvard()), &FirstViable).unwrap();
        assert_eq!(leg.trip_id().as_str(), "T1");
        assert_eq!(leg.origin().id.as_str(), "70075");
    }

    #[test]
    fn empty_schedules() {
        assert!(find_leg(&ScheduleSet::default(), &request(), &FirstViable).is_none());
    }
}
