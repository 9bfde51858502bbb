//! JSON:API response DTOs.
//!
//! These types map directly to the V3 API's JSON:API documents. Attributes
//! use `Option` liberally because the API sends `null` (or omits fields
//! under sparse fieldsets) in many cases.
//!
//! Relationships are deserialized once into [`Relationship`] values with
//! typed accessors, so conversion code never walks untyped maps.

use serde::Deserialize;

/// A top-level document: primary data plus side-loaded resources.
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T> {
    pub data: T,
    #[serde(default)]
    pub included: Vec<IncludedResource>,
}

/// A resource object with typed attributes.
#[derive(Debug, Clone, Deserialize)]
pub struct Resource<A> {
    pub id: String,
    pub attributes: A,
    #[serde(default)]
    pub relationships: Relationships,
}

/// A side-loaded resource, tagged by its JSON:API `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IncludedResource {
    Trip(Resource<TripAttributes>),
    Route(Resource<RouteAttributes>),
    Stop(Resource<StopAttributes>),
    /// Predictions, vehicles and anything else we don't use.
    #[serde(other)]
    Other,
}

/// Reference to another resource (`{"type": "stop", "id": "70077"}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceRef {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

/// A to-one relationship. `data` is `null` when the relation is empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationship {
    #[serde(default)]
    pub data: Option<ResourceRef>,
}

impl Relationship {
    pub fn id(&self) -> Option<&str> {
        self.data.as_ref().map(|r| r.id.as_str())
    }
}

/// The relationships this client reads. Others are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Relationships {
    pub route: Option<Relationship>,
    pub stop: Option<Relationship>,
    pub trip: Option<Relationship>,
    pub parent_station: Option<Relationship>,
}

impl Relationships {
    pub fn route_id(&self) -> Option<&str> {
        self.route.as_ref().and_then(Relationship::id)
    }

    pub fn stop_id(&self) -> Option<&str> {
        self.stop.as_ref().and_then(Relationship::id)
    }

    pub fn trip_id(&self) -> Option<&str> {
        self.trip.as_ref().and_then(Relationship::id)
    }

    pub fn parent_station_id(&self) -> Option<&str> {
        self.parent_station.as_ref().and_then(Relationship::id)
    }
}

/// Attributes of a `schedule` resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScheduleAttributes {
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,
    pub stop_sequence: Option<u32>,
    pub direction_id: Option<u8>,
    pub timepoint: Option<bool>,
}

/// Attributes of a `trip` resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TripAttributes {
    pub headsign: Option<String>,
    pub direction_id: Option<u8>,
    pub wheelchair_accessible: Option<u8>,
    pub bikes_allowed: Option<u8>,
}

/// Attributes of a `route` resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteAttributes {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    #[serde(rename = "type")]
    pub route_type: Option<i32>,
    /// Entries may be `null` for routes that only run one way.
    #[serde(default)]
    pub direction_names: Vec<Option<String>>,
    #[serde(default)]
    pub direction_destinations: Vec<Option<String>>,
}

/// Attributes of a `stop` resource.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopAttributes {
    pub name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub location_type: Option<u8>,
    pub wheelchair_boarding: Option<u8>,
    pub municipality: Option<String>,
    pub platform_name: Option<String>,
}

pub type ScheduleDocument = Document<Vec<Resource<ScheduleAttributes>>>;
pub type StopsDocument = Document<Vec<Resource<StopAttributes>>>;
pub type StopDocument = Document<Resource<StopAttributes>>;
