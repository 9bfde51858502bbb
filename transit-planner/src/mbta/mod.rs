//! MBTA V3 API client.
//!
//! This module provides an HTTP client for the MBTA's JSON:API service, which
//! publishes routes, stops, trips and scheduled stop events.
//!
//! Key characteristics of the V3 API:
//! - Every response is a JSON:API document; related resources are linked
//!   through `relationships` and side-loaded with `include=`
//! - Schedules reference platform stops, whose parent station is a separate
//!   stop resource
//! - Times are ISO 8601 with a UTC offset; `filter[min_time]` takes `HH:MM`

mod client;
mod convert;
mod error;
mod mock;
mod query;
mod types;

pub use client::{DEFAULT_BASE_URL, MbtaClient, MbtaConfig};
pub use convert::ConversionError;
pub use error::SourceError;
pub use mock::{Failure, MockSource};
pub use query::{Include, ScheduleQuery, ScheduleSort, StopQuery};
pub use types::{
    Document, IncludedResource, Relationship, Relationships, Resource, ResourceRef,
    ScheduleDocument, StopDocument, StopsDocument,
};
