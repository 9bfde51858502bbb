//! Web layer for the trip planner.
//!
//! Provides JSON endpoints for planning trips, finding nearby stops and
//! listing transfer points.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, DataSource};
