//! Selection policies for legs and plans.
//!
//! The leg finder and the trip planner produce candidates lazily, in data
//! source order. A [`SelectionPolicy`] decides which candidate wins and
//! whether the search may stop at the first viable one.

use crate::domain::{TripLeg, TripPlan};

/// Chooses among viable candidates.
pub trait SelectionPolicy: Send + Sync {
    /// Pick one leg from viable legs, in response order. The iterator is
    /// lazy: a policy that returns early avoids building later legs.
    fn pick_leg(&self, legs: &mut dyn Iterator<Item = TripLeg>) -> Option<TripLeg>;

    /// Pick one plan from complete plans, in discovery order.
    fn pick_plan(&self, plans: Vec<TripPlan>) -> Option<TripPlan>;

    /// Whether the first complete plan ends the search.
    fn short_circuits(&self) -> bool;
}

/// Take the first viable candidate and stop.
///
/// This is greedy: the first trip in response order that serves both stops
/// wins, even if a later trip arrives sooner.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstViable;

impl SelectionPolicy for FirstViable {
    fn pick_leg(&self, legs: &mut dyn Iterator<Item = TripLeg>) -> Option<TripLeg> {
        legs.next()
    }

    fn pick_plan(&self, plans: Vec<TripPlan>) -> Option<TripPlan> {
        plans.into_iter().next()
    }

    fn short_circuits(&self) -> bool {
        true
    }
}

/// Consider every candidate and take the one arriving earliest.
#[derive(Debug, Clone, Copy, Default)]
pub struct EarliestArrival;

impl SelectionPolicy for EarliestArrival {
    fn pick_leg(&self, legs: &mut dyn Iterator<Item = TripLeg>) -> Option<TripLeg> {
        // min_by_key keeps the first of equal minima
        legs.min_by_key(|leg| leg.arrival())
    }

    fn pick_plan(&self, plans: Vec<TripPlan>) -> Option<TripPlan> {
        rank_plans(plans).into_iter().next()
    }

    fn short_circuits(&self) -> bool {
        false
    }
}

/// Rank plans by preference.
///
/// Plans are ranked by:
/// 1. Arrival time (earlier is better)
/// 2. Number of transfers (fewer is better)
/// 3. Total duration (shorter is better)
///
/// The sort is stable, so equal plans keep discovery order.
pub fn rank_plans(mut plans: Vec<TripPlan>) -> Vec<TripPlan> {
    plans.sort_by_key(|p| (p.arrival(), p.transfer_count(), p.duration()));
    plans
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::{Coordinate, Ride, Stop, Timestamp, parse_timestamp};

    fn base() -> Timestamp {
        parse_timestamp("2024-03-15T05:00:00-04:00").unwrap()
    }

    fn stop(id: &str) -> Stop {
        Stop::new(id, id, Coordinate::new(42.35, -71.06).unwrap())
    }

    fn make_leg(id: u32, from: &str, to: &str, dep_mins: i64, duration: i64) -> TripLeg {
        let departure = base() + chrono::Duration::minutes(dep_mins);
        TripLeg::new(
            stop(from),
            stop(to),
            Ride {
                route_id: "Red".into(),
                route_name: "Red Line".into(),
                trip_id: format!("T{id}").into(),
                headsign: None,
                accessible: true,
            },
            departure,
            departure + chrono::Duration::minutes(duration),
        )
        .unwrap()
    }

    fn make_two_leg_plan(id: u32, dep: i64, d1: i64, wait: i64, d2: i64) -> TripPlan {
        let first = make_leg(id, "a", "x", dep, d1);
        let second = make_leg(id + 10_000, "x", "b", dep + d1 + wait, d2);
        TripPlan::new(vec![first, second]).unwrap()
    }

    #[test]
    fn first_viable_takes_first() {
        let legs = vec![make_leg(1, "a", "b", 30, 20), make_leg(2, "a", "b", 10, 5)];
        let picked = FirstViable.pick_leg(&mut legs.into_iter()).unwrap();
        assert_eq!(picked.trip_id().as_str(), "T1");
        assert!(FirstViable.short_circuits());
    }

    #[test]
    fn first_viable_stops_consuming() {
        let mut built = 0;
        let mut legs = (0..5).map(|i| {
            built += 1;
            make_leg(i, "a", "b", i as i64, 5)
        });
        FirstViable.pick_leg(&mut legs);
        drop(legs);
        assert_eq!(built, 1);
    }

    #[test]
    fn earliest_arrival_scans_all() {
        let legs = vec![
            make_leg(1, "a", "b", 30, 20),
            make_leg(2, "a", "b", 10, 5),
            make_leg(3, "a", "b", 12, 3),
        ];
        let picked = EarliestArrival.pick_leg(&mut legs.into_iter()).unwrap();
        // T2 and T3 both arrive at +15; the first wins
        assert_eq!(picked.trip_id().as_str(), "T2");
        assert!(!EarliestArrival.short_circuits());
    }

    #[test]
    fn empty_candidates() {
        assert!(FirstViable.pick_leg(&mut std::iter::empty()).is_none());
        assert!(EarliestArrival.pick_plan(Vec::new()).is_none());
    }

    #[test]
    fn earliest_arrival_prefers_fewer_transfers_on_tie() {
        let two_leg = make_two_leg_plan(1, 0, 10, 5, 10);
        let direct = TripPlan::direct(make_leg(2, "a", "b", 5, 20));
        assert_eq!(two_leg.arrival(), direct.arrival());

        let picked = EarliestArrival.pick_plan(vec![two_leg, direct]).unwrap();
        assert!(picked.is_direct());
    }

    fn plan_strategy() -> impl Strategy<Value = TripPlan> {
        prop_oneof![
            (0u32..1000, 0i64..1200, 5i64..90)
                .prop_map(|(id, dep, dur)| TripPlan::direct(make_leg(id, "a", "b", dep, dur))),
            (0u32..1000, 0i64..1200, 5i64..60, 2i64..30, 5i64..60)
                .prop_map(|(id, dep, d1, wait, d2)| make_two_leg_plan(id, dep, d1, wait, d2)),
        ]
    }

    proptest! {
        #[test]
        fn rank_plans_is_sorted(plans in prop::collection::vec(plan_strategy(), 0..15)) {
            let n = plans.len();
            let ranked = rank_plans(plans);
            prop_assert_eq!(ranked.len(), n);

            for window in ranked.windows(2) {
                let a = &window[0];
                let b = &window[1];
                let a_key = (a.arrival(), a.transfer_count(), a.duration());
                let b_key = (b.arrival(), b.transfer_count(), b.duration());
                prop_assert!(a_key <= b_key, "Not sorted: {:?} before {:?}", a_key, b_key);
            }
        }

        #[test]
        fn earliest_arrival_leg_is_minimal(
            times in prop::collection::vec((0i64..1200, 1i64..120), 1..20)
        ) {
            let legs: Vec<TripLeg> = times
                .iter()
                .enumerate()
                .map(|(i, &(dep, dur))| make_leg(i as u32, "a", "b", dep, dur))
                .collect();
            let best = legs.iter().map(TripLeg::arrival).min();

            let picked = EarliestArrival.pick_leg(&mut legs.into_iter()).unwrap();
            prop_assert_eq!(Some(picked.arrival()), best);
        }
    }
}
