//! Domain types for the trip planner.
//!
//! This module contains the value types built from data-source responses:
//! stops, routes, trips, schedule events, and the legs and plans the
//! planner assembles from them. Types that carry invariants enforce them at
//! construction time, so code that receives them can trust their validity.

mod error;
mod geo;
mod ids;
mod leg;
mod plan;
mod route;
mod schedule;
mod stop;
mod time;
mod transfer;

pub use error::DomainError;
pub use geo::{Coordinate, EARTH_RADIUS_KM, distance_km};
pub use ids::{RouteId, StopId, TripId};
pub use leg::{Ride, TripLeg};
pub use plan::{MAX_LEGS, TripPlan};
pub use route::{Route, RouteType};
pub use schedule::{ScheduleEvent, ScheduleSet, Trip};
pub use stop::{Accessibility, LocationType, Stop};
pub use time::{
    AGENCY_TIMEZONE, TimeError, Timestamp, format_service_date, format_time_of_day,
    parse_timestamp, service_date, service_time,
};
pub use transfer::{TransferPoint, TransferType};
