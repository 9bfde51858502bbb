//! Stop types.

use serde::Serialize;

use super::{Coordinate, StopId};

/// What kind of place a stop record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    /// A boarding platform or stop pole
    Platform,
    /// A parent station grouping platforms
    Station,
    /// A station entrance or exit
    Entrance,
    /// A pathway node inside a station
    GenericNode,
    /// A boarding area on a platform
    BoardingArea,
}

impl LocationType {
    /// Map a GTFS `location_type` code. Unknown codes are treated as platforms,
    /// which is also what a missing code means.
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => LocationType::Station,
            2 => LocationType::Entrance,
            3 => LocationType::GenericNode,
            4 => LocationType::BoardingArea,
            _ => LocationType::Platform,
        }
    }

    /// The GTFS `location_type` code.
    pub fn code(self) -> u8 {
        match self {
            LocationType::Platform => 0,
            LocationType::Station => 1,
            LocationType::Entrance => 2,
            LocationType::GenericNode => 3,
            LocationType::BoardingArea => 4,
        }
    }
}

/// Wheelchair accessibility as published for stops and trips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    /// No information
    #[default]
    Unknown,
    /// Accessible
    Accessible,
    /// Not accessible
    Inaccessible,
}

impl Accessibility {
    /// Map a GTFS accessibility code (0 unknown, 1 accessible, 2 not).
    pub fn from_code(code: u8) -> Self {
        match code {
            1 => Accessibility::Accessible,
            2 => Accessibility::Inaccessible,
            _ => Accessibility::Unknown,
        }
    }

    /// True only for a positive accessibility statement.
    pub fn is_accessible(self) -> bool {
        self == Accessibility::Accessible
    }
}

/// A stop snapshot as returned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub coordinate: Coordinate,
    pub location_type: LocationType,
    pub wheelchair_boarding: Accessibility,
    pub municipality: Option<String>,
    /// Parent station, for platforms and entrances.
    pub parent_station: Option<StopId>,
    pub platform_name: Option<String>,
}

impl Stop {
    /// Create a platform-level stop with no optional details.
    pub fn new(id: impl Into<StopId>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            coordinate,
            location_type: LocationType::Platform,
            wheelchair_boarding: Accessibility::Unknown,
            municipality: None,
            parent_station: None,
            platform_name: None,
        }
    }

    /// Mark this stop as a parent station.
    pub fn as_station(mut self) -> Self {
        self.location_type = LocationType::Station;
        self
    }

    /// Set the wheelchair boarding flag.
    pub fn with_accessibility(mut self, accessibility: Accessibility) -> Self {
        self.wheelchair_boarding = accessibility;
        self
    }

    /// Set the parent station.
    pub fn with_parent(mut self, parent: impl Into<StopId>) -> Self {
        self.parent_station = Some(parent.into());
        self
    }

    /// True if this record is a parent station.
    pub fn is_station(&self) -> bool {
        self.location_type == LocationType::Station
    }

    /// True if the stop reports wheelchair-accessible boarding.
    pub fn is_accessible(&self) -> bool {
        self.wheelchair_boarding.is_accessible()
    }

    /// Distance to another stop in kilometres.
    pub fn distance_km(&self, other: &Stop) -> f64 {
        self.coordinate.distance_km(&other.coordinate)
    }
}
