//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::{ScheduleSet, Stop, StopId};
use crate::mbta::{MbtaClient, MockSource, ScheduleQuery, SourceError, StopQuery};
use crate::planner::{ScheduleSource, TripPlanner};

/// Where the server gets its data.
pub enum DataSource {
    /// The live V3 API
    Live(MbtaClient),
    /// Documents loaded from disk
    Fixtures(MockSource),
}

impl ScheduleSource for DataSource {
    async fn get_stop(&self, id: &StopId) -> Result<Stop, SourceError> {
        match self {
            DataSource::Live(client) => client.get_stop(id).await,
            DataSource::Fixtures(mock) => mock.get_stop(id).await,
        }
    }

    async fn list_stops(&self, query: &StopQuery) -> Result<Vec<Stop>, SourceError> {
        match self {
            DataSource::Live(client) => client.list_stops(query).await,
            DataSource::Fixtures(mock) => mock.list_stops(query).await,
        }
    }

    async fn get_schedules(&self, query: &ScheduleQuery) -> Result<ScheduleSet, SourceError> {
        match self {
            DataSource::Live(client) => client.get_schedules(query).await,
            DataSource::Fixtures(mock) => mock.get_schedules(query).await,
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner<DataSource>>,
}

impl AppState {
    pub fn new(planner: TripPlanner<DataSource>) -> Self {
        Self {
            planner: Arc::new(planner),
        }
    }
}
