//! Transfer point type.

use chrono::Duration;
use serde::Serialize;

use super::{RouteId, Stop};

/// Kind of transfer, following GTFS `transfer_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferType {
    /// A recommended transfer point between routes
    Recommended,
    /// The departing vehicle waits for the arriving one
    Timed,
    /// Requires at least `min_transfer_time`
    MinimumTime,
    /// Transfers are not possible here
    NotPossible,
}

impl TransferType {
    pub fn is_possible(self) -> bool {
        self != TransferType::NotPossible
    }
}

/// A stop where a rider can leave one route and board another.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPoint {
    pub stop: Stop,
    pub from_route: RouteId,
    pub to_route: RouteId,
    pub transfer_type: TransferType,
    pub min_transfer_time: Duration,
    pub suggested_wait: Option<Duration>,
}

impl TransferPoint {
    /// A recommended transfer with the given minimum transfer time.
    pub fn recommended(
        stop: Stop,
        from_route: RouteId,
        to_route: RouteId,
        min_transfer_time: Duration,
    ) -> Self {
        Self {
            stop,
            from_route,
            to_route,
            transfer_type: TransferType::Recommended,
            min_transfer_time,
            suggested_wait: None,
        }
    }
}
