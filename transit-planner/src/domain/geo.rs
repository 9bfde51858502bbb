//! Coordinates and great-circle distance.

use std::fmt;

use serde::Serialize;

use super::DomainError;

/// Mean Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometres (haversine).
///
/// Inputs are not validated: out-of-range degrees still produce a number,
/// just not a meaningful one. Use [`Coordinate`] where validation matters.
///
/// # Examples
///
/// ```
/// use transit_planner::domain::distance_km;
///
/// assert_eq!(distance_km(42.3555, -71.0602, 42.3555, -71.0602), 0.0);
///
/// let d = distance_km(42.3601, -71.0589, 40.7128, -74.0060);
/// assert!((d - 306.1).abs() < 0.5);
/// ```
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if lat1 == lat2 && lon1 == lon2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// A validated latitude/longitude pair in degrees.
#[derive(Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::InvalidCoordinate(format!(
                "latitude {lat} outside [-90, 90]"
            )));
        }
        if !lon.is_finite() || !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::InvalidCoordinate(format!(
                "longitude {lon} outside [-180, 180]"
            )));
        }
        Ok(Self { lat, lon })
    }

    /// Latitude in degrees.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees.
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Distance to another coordinate in kilometres.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        distance_km(self.lat, self.lon, other.lat, other.lon)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_points_are_exactly_zero() {
        assert_eq!(distance_km(42.355518, -71.060225, 42.355518, -71.060225), 0.0);
    }

    #[test]
    fn downtown_crossing_to_park_street() {
        let d = distance_km(42.355518, -71.060225, 42.356395, -71.062424);
        assert!((d - 0.20).abs() < 0.02, "got {d}");
    }

    #[test]
    fn boston_to_new_york() {
        let d = distance_km(42.3601, -71.0589, 40.7128, -74.0060);
        assert!((d - 306.1).abs() < 0.5, "got {d}");
    }

    #[test]
    fn antipodes_are_half_circumference() {
        let d = distance_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);
    }

    #[test]
    fn coordinate_validation() {
        assert!(Coordinate::new(42.355, -71.060).is_ok());
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(90.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -180.1).is_err());
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn coordinate_distance_delegates() {
        let a = Coordinate::new(42.355518, -71.060225).unwrap();
        let b = Coordinate::new(42.358978, -71.057598).unwrap();
        assert_eq!(a.distance_km(&b), distance_km(a.lat(), a.lon(), b.lat(), b.lon()));
    }
}
