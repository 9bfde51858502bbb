//! The data-source seam the planner is written against.

use std::future::Future;

use crate::domain::{ScheduleSet, Stop, StopId};
use crate::mbta::{ScheduleQuery, SourceError, StopQuery};

/// Trait for fetching stops and schedules.
///
/// This abstraction allows the planner to run against the live API or an
/// in-memory source in tests. Futures are `Send` so planner calls can be
/// awaited from multi-threaded handlers.
pub trait ScheduleSource: Send + Sync {
    /// Fetch a single stop by id.
    fn get_stop(&self, id: &StopId) -> impl Future<Output = Result<Stop, SourceError>> + Send;

    /// List stops matching a query.
    fn list_stops(
        &self,
        query: &StopQuery,
    ) -> impl Future<Output = Result<Vec<Stop>, SourceError>> + Send;

    /// Fetch schedule events matching a query, with any requested
    /// side-loaded resources.
    fn get_schedules(
        &self,
        query: &ScheduleQuery,
    ) -> impl Future<Output = Result<ScheduleSet, SourceError>> + Send;
}

impl<S: ScheduleSource> ScheduleSource for std::sync::Arc<S> {
    fn get_stop(&self, id: &StopId) -> impl Future<Output = Result<Stop, SourceError>> + Send {
        (**self).get_stop(id)
    }

    fn list_stops(
        &self,
        query: &StopQuery,
    ) -> impl Future<Output = Result<Vec<Stop>, SourceError>> + Send {
        (**self).list_stops(query)
    }

    fn get_schedules(
        &self,
        query: &ScheduleQuery,
    ) -> impl Future<Output = Result<ScheduleSet, SourceError>> + Send {
        (**self).get_schedules(query)
    }
}
