//! Conversion from JSON:API DTOs to domain types.
//!
//! Schedule rows missing a required relationship are skipped with a warning
//! rather than failing the whole document. Timestamps that fail to parse are
//! treated as absent.

use crate::domain::{
    Accessibility, Coordinate, LocationType, Route, RouteId, RouteType, ScheduleEvent,
    ScheduleSet, Stop, Trip, TripId, parse_timestamp,
};

use super::types::{
    IncludedResource, Resource, RouteAttributes, ScheduleAttributes, ScheduleDocument,
    StopAttributes, TripAttributes,
};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConversionError {
    /// Missing required field or relationship
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Coordinates absent or out of range
    #[error("invalid location for stop {0}")]
    InvalidLocation(String),
}

/// Convert a schedule document, with any side-loaded resources, to a
/// [`ScheduleSet`].
pub fn convert_schedules(doc: &ScheduleDocument) -> ScheduleSet {
    let mut events = Vec::with_capacity(doc.data.len());
    for resource in &doc.data {
        match convert_schedule(resource) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(schedule = %resource.id, error = %e, "skipping schedule row");
            }
        }
    }

    let mut set = ScheduleSet::from_events(events);
    for included in &doc.included {
        match included {
            IncludedResource::Trip(trip) => match convert_trip(trip) {
                Ok(trip) => {
                    set.trips.insert(trip.id.clone(), trip);
                }
                Err(e) => tracing::warn!(trip = %trip.id, error = %e, "skipping included trip"),
            },
            IncludedResource::Route(route) => {
                let route = convert_route(route);
                set.routes.insert(route.id.clone(), route);
            }
            IncludedResource::Stop(stop) => match convert_stop(stop) {
                Ok(stop) => {
                    set.stops.insert(stop.id.clone(), stop);
                }
                Err(e) => tracing::warn!(stop = %stop.id, error = %e, "skipping included stop"),
            },
            IncludedResource::Other => {}
        }
    }
    set
}

/// Convert a single schedule row.
pub fn convert_schedule(
    resource: &Resource<ScheduleAttributes>,
) -> Result<ScheduleEvent, ConversionError> {
    let rel = &resource.relationships;
    let trip_id = rel.trip_id().ok_or(ConversionError::MissingField("trip"))?;
    let stop_id = rel.stop_id().ok_or(ConversionError::MissingField("stop"))?;
    let route_id = rel
        .route_id()
        .ok_or(ConversionError::MissingField("route"))?;
    let attrs = &resource.attributes;

    Ok(ScheduleEvent {
        trip_id: trip_id.into(),
        stop_id: stop_id.into(),
        route_id: route_id.into(),
        stop_sequence: attrs.stop_sequence.unwrap_or(0),
        arrival: attrs.arrival_time.as_deref().and_then(lenient_timestamp),
        departure: attrs.departure_time.as_deref().and_then(lenient_timestamp),
        direction_id: attrs.direction_id,
        timepoint: attrs.timepoint,
    })
}

fn lenient_timestamp(s: &str) -> Option<crate::domain::Timestamp> {
    match parse_timestamp(s) {
        Ok(t) => Some(t),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring unparseable timestamp");
            None
        }
    }
}

/// Convert a stop resource. The parent station comes from the
/// `parent_station` relationship.
pub fn convert_stop(resource: &Resource<StopAttributes>) -> Result<Stop, ConversionError> {
    let attrs = &resource.attributes;
    let (Some(lat), Some(lon)) = (attrs.latitude, attrs.longitude) else {
        return Err(ConversionError::InvalidLocation(resource.id.clone()));
    };
    let coordinate = Coordinate::new(lat, lon)
        .map_err(|_| ConversionError::InvalidLocation(resource.id.clone()))?;

    let name = attrs.name.clone().unwrap_or_else(|| resource.id.clone());
    let mut stop = Stop::new(resource.id.as_str(), name, coordinate);
    stop.location_type = attrs
        .location_type
        .map(LocationType::from_code)
        .unwrap_or(LocationType::Platform);
    stop.wheelchair_boarding = attrs
        .wheelchair_boarding
        .map(Accessibility::from_code)
        .unwrap_or_default();
    stop.municipality = attrs.municipality.clone();
    stop.platform_name = attrs.platform_name.clone();
    stop.parent_station = resource.relationships.parent_station_id().map(Into::into);
    Ok(stop)
}

/// Convert a list of stop resources, skipping any without a usable location.
pub fn convert_stops(resources: &[Resource<StopAttributes>]) -> Vec<Stop> {
    resources
        .iter()
        .filter_map(|r| match convert_stop(r) {
            Ok(stop) => Some(stop),
            Err(e) => {
                tracing::warn!(stop = %r.id, error = %e, "skipping stop");
                None
            }
        })
        .collect()
}

pub fn convert_trip(resource: &Resource<TripAttributes>) -> Result<Trip, ConversionError> {
    let attrs = &resource.attributes;
    let route_id: RouteId = resource
        .relationships
        .route_id()
        .map(Into::into)
        .unwrap_or_else(|| RouteId::new(""));

    Ok(Trip {
        id: TripId::new(resource.id.as_str()),
        route_id,
        headsign: attrs.headsign.clone().unwrap_or_default(),
        direction_id: attrs.direction_id,
        wheelchair_accessible: attrs
            .wheelchair_accessible
            .map(Accessibility::from_code)
            .unwrap_or_default(),
        bikes_allowed: attrs.bikes_allowed == Some(1),
    })
}

pub fn convert_route(resource: &Resource<RouteAttributes>) -> Route {
    let attrs = &resource.attributes;
    let flatten = |v: &[Option<String>]| -> Vec<String> {
        v.iter().map(|s| s.clone().unwrap_or_default()).collect()
    };

    Route {
        id: RouteId::new(resource.id.as_str()),
        long_name: attrs.long_name.clone().unwrap_or_default(),
        short_name: attrs.short_name.clone().unwrap_or_default(),
        route_type: RouteType::from_code(attrs.route_type.unwrap_or(-1)),
        direction_names: flatten(&attrs.direction_names),
        direction_destinations: flatten(&attrs.direction_destinations),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mbta::types::{StopDocument, StopsDocument};

    const DOC: &str = r#"{
        "data": [
            {"type": "schedule", "id": "s1",
             "attributes": {"arrival_time": null, "departure_time": "2024-03-15T10:00:00-04:00", "stop_sequence": 10, "direction_id": 0},
             "relationships": {"route": {"data": {"type": "route", "id": "Red"}}, "stop": {"data": {"type": "stop", "id": "70077"}}, "trip": {"data": {"type": "trip", "id": "T1"}}}},
            {"type": "schedule", "id": "s2",
             "attributes": {"arrival_time": "not a time", "departure_time": "2024-03-15T10:02:00-04:00", "stop_sequence": 11},
             "relationships": {"route": {"data": {"type": "route", "id": "Red"}}, "stop": {"data": {"type": "stop", "id": "70075"}}, "trip": {"data": {"type": "trip", "id": "T1"}}}},
            {"type": "schedule", "id": "s3",
             "attributes": {"stop_sequence": 12},
             "relationships": {"route": {"data": {"type": "route", "id": "Red"}}, "trip": {"data": {"type": "trip", "id": "T1"}}}}
        ],
        "included": [
            {"type": "trip", "id": "T1", "attributes": {"headsign": "Ashmont", "wheelchair_accessible": 1},
             "relationships": {"route": {"data": {"type": "route", "id": "Red"}}}},
            {"type": "route", "id": "Red", "attributes": {"long_name": "Red Line", "type": 1,
             "direction_names": ["South", "North"], "direction_destinations": ["Ashmont/Braintree", null]}},
            {"type": "stop", "id": "70077", "attributes": {"name": "Downtown Crossing", "latitude": 42.355518, "longitude": -71.060225},
             "relationships": {"parent_station": {"data": {"type": "stop", "id": "place-dwnxg"}}}}
        ]
    }"#;

    #[test]
    fn converts_schedule_document() {
        let doc: ScheduleDocument = serde_json::from_str(DOC).unwrap();
        let set = convert_schedules(&doc);

        // s3 has no stop relationship
        assert_eq!(set.events.len(), 2);
        assert_eq!(set.events[0].stop_sequence, 10);
        assert!(set.events[0].arrival.is_none());
        assert!(set.events[0].departure.is_some());
        // unparseable arrival is dropped, departure kept
        assert!(set.events[1].arrival.is_none());
        assert!(set.events[1].departure.is_some());

        let trip = set.trip(&"T1".into()).unwrap();
        assert_eq!(trip.headsign, "Ashmont");
        assert!(trip.is_accessible());
        assert_eq!(trip.route_id.as_str(), "Red");

        let route = set.route(&"Red".into()).unwrap();
        assert_eq!(route.display_name(), "Red Line");
        assert_eq!(route.route_type, RouteType::Subway);
        assert_eq!(route.direction_destinations, vec!["Ashmont/Braintree", ""]);

        assert_eq!(set.station_of(&"70077".into()).as_str(), "place-dwnxg");
    }

    #[test]
    fn missing_relationship_is_reported() {
        let doc: ScheduleDocument = serde_json::from_str(DOC).unwrap();
        assert_eq!(
            convert_schedule(&doc.data[2]),
            Err(ConversionError::MissingField("stop"))
        );
    }

    #[test]
    fn converts_station() {
        let doc: StopDocument = serde_json::from_str(
            r#"{"data": {"type": "stop", "id": "place-pktrm", "attributes": {
                "name": "Park Street", "latitude": 42.356395, "longitude": -71.062424,
                "location_type": 1, "wheelchair_boarding": 1, "municipality": "Boston"}}}"#,
        )
        .unwrap();
        let stop = convert_stop(&doc.data).unwrap();
        assert!(stop.is_station());
        assert!(stop.is_accessible());
        assert_eq!(stop.municipality.as_deref(), Some("Boston"));
        assert_eq!(stop.parent_station, None);
    }

    #[test]
    fn stops_without_location_are_skipped() {
        let doc: StopsDocument = serde_json::from_str(
            r#"{"data": [
                {"type": "stop", "id": "a", "attributes": {"name": "A", "latitude": 42.0, "longitude": -71.0}},
                {"type": "stop", "id": "b", "attributes": {"name": "B", "latitude": null, "longitude": -71.0}},
                {"type": "stop", "id": "c", "attributes": {"name": "C", "latitude": 142.0, "longitude": -71.0}}
            ]}"#,
        )
        .unwrap();
        let stops = convert_stops(&doc.data);
        assert_eq!(stops.len(), 1);
        assert_eq!(stops[0].id.as_str(), "a");
    }
}
