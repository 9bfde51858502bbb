//! Planner error types.

use crate::domain::StopId;
use crate::mbta::SourceError;

/// Error from a planning or query operation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// A stop or route the request names does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// The data source rejected our credentials
    #[error("data source rejected credentials")]
    Unauthorized,

    /// The data source is throttling us
    #[error("rate limited by the data source")]
    RateLimited,

    /// Transport or upstream failure
    #[error("data source unavailable: {0}")]
    Network(String),

    /// The call exceeded its deadline, or a request timed out
    #[error("timed out")]
    Timeout,

    /// Every candidate was exhausted without a complete itinerary
    #[error("no trip found from {origin} to {destination}")]
    NoTripFound { origin: StopId, destination: StopId },

    /// Request parameters are malformed
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl From<&SourceError> for PlanError {
    fn from(err: &SourceError) -> Self {
        match err {
            SourceError::NotFound(what) => PlanError::NotFound(what.clone()),
            SourceError::Unauthorized => PlanError::Unauthorized,
            SourceError::RateLimited => PlanError::RateLimited,
            SourceError::Timeout => PlanError::Timeout,
            SourceError::Http(_) | SourceError::Json { .. } | SourceError::Api { .. } => {
                PlanError::Network(err.to_string())
            }
        }
    }
}

impl From<SourceError> for PlanError {
    fn from(err: SourceError) -> Self {
        PlanError::from(&err)
    }
}

/// Handle a failed lookup for one candidate (a route, stop or transfer
/// point): fatal errors abort, anything else is logged and skipped.
pub(super) fn skip_or_abort(err: &SourceError, kind: &str, id: &str) -> Result<(), PlanError> {
    if err.is_fatal() {
        return Err(PlanError::from(err));
    }
    tracing::warn!(%kind, %id, error = %err, "skipping candidate after data-source error");
    Ok(())
}
