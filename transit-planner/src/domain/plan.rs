//! Trip plan type.
//!
//! A `TripPlan` is a complete itinerary from origin to destination: one
//! direct leg, or two legs joined at a transfer stop.

use chrono::Duration;

use super::{DomainError, Stop, Timestamp, TripLeg};

/// Maximum number of legs in a plan (one transfer).
pub const MAX_LEGS: usize = 2;

/// A complete itinerary.
///
/// # Invariants
///
/// - 1 to [`MAX_LEGS`] legs
/// - Consecutive legs meet at the same stop
/// - `legs[i].arrival() <= legs[i + 1].departure()`
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlan {
    legs: Vec<TripLeg>,
}

impl TripPlan {
    /// Construct a plan from legs in travel order.
    pub fn new(legs: Vec<TripLeg>) -> Result<Self, DomainError> {
        if legs.is_empty() {
            return Err(DomainError::EmptyPlan);
        }
        if legs.len() > MAX_LEGS {
            return Err(DomainError::TooManyLegs(legs.len()));
        }

        for (i, window) in legs.windows(2).enumerate() {
            let (prev, next) = (&window[0], &window[1]);
            if prev.destination().id != next.origin().id {
                return Err(DomainError::LegsNotConnected(
                    prev.destination().id.clone(),
                    next.origin().id.clone(),
                ));
            }
            if prev.arrival() > next.departure() {
                return Err(DomainError::LegsOutOfOrder(i + 1));
            }
        }

        Ok(Self { legs })
    }

    /// A single-leg plan.
    pub fn direct(leg: TripLeg) -> Self {
        Self { legs: vec![leg] }
    }

    pub fn legs(&self) -> &[TripLeg] {
        &self.legs
    }

    fn first(&self) -> &TripLeg {
        // Non-empty by construction
        &self.legs[0]
    }

    fn last(&self) -> &TripLeg {
        &self.legs[self.legs.len() - 1]
    }

    pub fn origin(&self) -> &Stop {
        self.first().origin()
    }

    pub fn destination(&self) -> &Stop {
        self.last().destination()
    }

    /// Departure of the first leg.
    pub fn departure(&self) -> Timestamp {
        self.first().departure()
    }

    /// Arrival of the last leg.
    pub fn arrival(&self) -> Timestamp {
        self.last().arrival()
    }

    /// Door-to-door time, transfer waits included.
    pub fn duration(&self) -> Duration {
        self.arrival().signed_duration_since(self.departure())
    }

    /// Sum of leg distances.
    pub fn distance_km(&self) -> f64 {
        self.legs.iter().map(TripLeg::distance_km).sum()
    }

    /// True only if every leg is accessible.
    pub fn is_accessible(&self) -> bool {
        self.legs.iter().all(TripLeg::is_accessible)
    }

    pub fn transfer_count(&self) -> usize {
        self.legs.len() - 1
    }

    pub fn is_direct(&self) -> bool {
        self.legs.len() == 1
    }
}
