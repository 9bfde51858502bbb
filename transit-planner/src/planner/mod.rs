//! Trip planner.
//!
//! This module implements the planning algorithms over a [`ScheduleSource`]:
//! route/stop membership, finding a leg on one route, discovering transfer
//! points between route sets, assembling trips with at most one transfer,
//! and ranking stops by distance from a point.

mod config;
mod error;
mod leg_finder;
mod membership;
mod nearby;
mod rank;
mod source;
mod transfer;
mod trip;


pub use config::PlannerConfig;
pub use error::PlanError;
pub use leg_finder::{LegRequest, fetch_leg, find_leg};
pub use membership::{Membership, routes_serving, stops_serving};
pub use nearby::{NearbyQuery, NearbyStop, find_nearby};
pub use rank::{EarliestArrival, FirstViable, SelectionPolicy, rank_plans};
pub use source::ScheduleSource;
pub use transfer::find_transfer_points;
pub use trip::{PlanRequest, TripPlanner};
