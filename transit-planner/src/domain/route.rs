//! Route types.

use serde::Serialize;

use super::RouteId;

/// Mode of a route, from the GTFS `route_type` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    LightRail,
    Subway,
    CommuterRail,
    Bus,
    Ferry,
    Other(i32),
}

impl RouteType {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => RouteType::LightRail,
            1 => RouteType::Subway,
            2 => RouteType::CommuterRail,
            3 => RouteType::Bus,
            4 => RouteType::Ferry,
            other => RouteType::Other(other),
        }
    }

    /// Rail modes run on fixed infrastructure with stations.
    pub fn is_rail(self) -> bool {
        matches!(
            self,
            RouteType::LightRail | RouteType::Subway | RouteType::CommuterRail
        )
    }
}

/// A route as returned by the data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Route {
    pub id: RouteId,
    pub long_name: String,
    pub short_name: String,
    pub route_type: RouteType,
    /// Indexed by direction id (e.g. `["South", "North"]`).
    pub direction_names: Vec<String>,
    /// Indexed by direction id (e.g. `["Ashmont/Braintree", "Alewife"]`).
    pub direction_destinations: Vec<String>,
}

impl Route {
    /// The name to show a rider: long name, else short name, else the id.
    pub fn display_name(&self) -> &str {
        if !self.long_name.is_empty() {
            &self.long_name
        } else if !self.short_name.is_empty() {
            &self.short_name
        } else {
            self.id.as_str()
        }
    }

    /// Destination label for a direction id, if published.
    pub fn destination_for(&self, direction_id: u8) -> Option<&str> {
        self.direction_destinations
            .get(direction_id as usize)
            .map(String::as_str)
    }
}
