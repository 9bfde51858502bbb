//! Domain error types.
//!
//! These errors represent validation failures when constructing domain
//! values. They are distinct from data-source and planning errors.

use super::StopId;

/// Domain-level errors for validation and data consistency.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Latitude or longitude outside its valid range
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    /// Invalid leg construction (e.g., arrives before it departs)
    #[error("invalid leg: {0}")]
    InvalidLeg(&'static str),

    /// Plan has no legs
    #[error("trip plan must have at least one leg")]
    EmptyPlan,

    /// Plan exceeds the supported number of legs
    #[error("trip plan has {0} legs; at most {max} are supported", max = super::MAX_LEGS)]
    TooManyLegs(usize),

    /// A leg departs before the previous one arrives
    #[error("leg {0} departs before the previous leg arrives")]
    LegsOutOfOrder(usize),

    /// Consecutive legs don't meet at the same stop
    #[error("legs do not connect: {0} and {1}")]
    LegsNotConnected(StopId, StopId),
}
