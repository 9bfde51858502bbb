//! Trip leg type.
//!
//! A `TripLeg` is one uninterrupted ride on a single trip between two stops.

use chrono::Duration;

use super::{DomainError, RouteId, Stop, Timestamp, TripId};

/// The vehicle side of a leg: which route and trip is ridden.
#[derive(Debug, Clone, PartialEq)]
pub struct Ride {
    pub route_id: RouteId,
    /// Display name of the route (falls back to the id).
    pub route_name: String,
    pub trip_id: TripId,
    pub headsign: Option<String>,
    /// Wheelchair accessibility of the trip.
    pub accessible: bool,
}

/// A leg of a trip plan (one ride).
///
/// # Invariants
///
/// - `arrival >= departure`
/// - `distance_km` is the great-circle distance between the two stops,
///   not the length of the vehicle's path
#[derive(Debug, Clone, PartialEq)]
pub struct TripLeg {
    origin: Stop,
    destination: Stop,
    ride: Ride,
    departure: Timestamp,
    arrival: Timestamp,
    distance_km: f64,
    instruction: String,
}

impl TripLeg {
    /// Construct a leg, validating that it does not arrive before it departs.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_planner::domain::{parse_timestamp, Coordinate, Ride, Stop, TripLeg};
    ///
    /// let park = Stop::new("place-pktrm", "Park Street", Coordinate::new(42.356395, -71.062424).unwrap());
    /// let harvard = Stop::new("place-harsq", "Harvard", Coordinate::new(42.373362, -71.118956).unwrap());
    /// let ride = Ride {
    ///     route_id: "Red".into(),
    ///     route_name: "Red Line".into(),
    ///     trip_id: "T-100".into(),
    ///     headsign: Some("Alewife".into()),
    ///     accessible: true,
    /// };
    ///
    /// let leg = TripLeg::new(
    ///     park,
    ///     harvard,
    ///     ride,
    ///     parse_timestamp("2024-03-15T10:00:00-04:00").unwrap(),
    ///     parse_timestamp("2024-03-15T10:12:00-04:00").unwrap(),
    /// )
    /// .unwrap();
    ///
    /// assert_eq!(leg.duration().num_minutes(), 12);
    /// assert_eq!(leg.instruction(), "Take Red Line toward Alewife from Park Street to Harvard");
    /// ```
    pub fn new(
        origin: Stop,
        destination: Stop,
        ride: Ride,
        departure: Timestamp,
        arrival: Timestamp,
    ) -> Result<Self, DomainError> {
        if arrival < departure {
            return Err(DomainError::InvalidLeg("arrival is before departure"));
        }

        let distance_km = origin.distance_km(&destination);
        let instruction = match &ride.headsign {
            Some(headsign) if !headsign.is_empty() => format!(
                "Take {} toward {} from {} to {}",
                ride.route_name, headsign, origin.name, destination.name
            ),
            _ => format!(
                "Take {} from {} to {}",
                ride.route_name, origin.name, destination.name
            ),
        };

        Ok(Self {
            origin,
            destination,
            ride,
            departure,
            arrival,
            distance_km,
            instruction,
        })
    }

    pub fn origin(&self) -> &Stop {
        &self.origin
    }

    pub fn destination(&self) -> &Stop {
        &self.destination
    }

    pub fn route_id(&self) -> &RouteId {
        &self.ride.route_id
    }

    pub fn route_name(&self) -> &str {
        &self.ride.route_name
    }

    pub fn trip_id(&self) -> &TripId {
        &self.ride.trip_id
    }

    pub fn headsign(&self) -> Option<&str> {
        self.ride.headsign.as_deref()
    }

    pub fn departure(&self) -> Timestamp {
        self.departure
    }

    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }

    /// Time on board.
    pub fn duration(&self) -> Duration {
        self.arrival.signed_duration_since(self.departure)
    }

    /// Estimated distance in kilometres.
    pub fn distance_km(&self) -> f64 {
        self.distance_km
    }

    /// Whether the trip ridden is wheelchair accessible.
    pub fn is_accessible(&self) -> bool {
        self.ride.accessible
    }

    /// Human-readable instruction, e.g. "Take Red Line from Park Street to Harvard".
    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}
