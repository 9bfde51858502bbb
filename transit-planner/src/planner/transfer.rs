//! Transfer point discovery.
//!
//! A transfer point is a station served by both a route from the first set
//! and a different route from the second. Points are emitted per route pair,
//! so a station shared by several pairs appears once for each.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Duration;
use futures::future::join_all;
use tracing::debug;

use crate::domain::{RouteId, Stop, StopId, TransferPoint};

use super::error::{PlanError, skip_or_abort};
use super::membership::Membership;
use super::source::ScheduleSource;

/// Find transfer points from any route in `from_routes` to any other route
/// in `to_routes`.
///
/// Pairs are visited in lexical `(from, to)` order and stations within a
/// pair in lexical id order. Route membership and stop records are fetched
/// `concurrency` at a time.
pub async fn find_transfer_points<S: ScheduleSource>(
    membership: &Membership<'_, S>,
    from_routes: &BTreeSet<RouteId>,
    to_routes: &BTreeSet<RouteId>,
    min_transfer: Duration,
    concurrency: usize,
) -> Result<Vec<TransferPoint>, PlanError> {
    let all_routes: Vec<RouteId> = from_routes.union(to_routes).cloned().collect();
    let mut route_stops: BTreeMap<RouteId, Arc<BTreeSet<StopId>>> = BTreeMap::new();
    for (route, result) in membership.prefetch_stops(&all_routes, concurrency).await {
        match result {
            Ok(stops) => {
                route_stops.insert(route, stops);
            }
            Err(e) => skip_or_abort(&e, "route", route.as_str())?,
        }
    }

    let mut pairs: Vec<(&RouteId, &RouteId, Vec<&StopId>)> = Vec::new();
    for a in from_routes {
        for b in to_routes {
            if a == b {
                continue;
            }
            let (Some(stops_a), Some(stops_b)) = (route_stops.get(a), route_stops.get(b)) else {
                continue;
            };
            let shared: Vec<&StopId> = stops_a.intersection(stops_b).collect();
            if !shared.is_empty() {
                pairs.push((a, b, shared));
            }
        }
    }

    let needed: Vec<StopId> = pairs
        .iter()
        .flat_map(|(_, _, stops)| stops.iter().map(|&s| s.clone()))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let mut records: BTreeMap<StopId, Arc<Stop>> = BTreeMap::new();
    for batch in needed.chunks(concurrency.max(1)) {
        let futures: Vec<_> = batch
            .to_vec()
            .into_iter()
            .map(|id| async move {
                let stop = membership.stop(&id).await;
                (id, stop)
            })
            .collect();

        for (id, result) in join_all(futures).await {
            match result {
                Ok(stop) => {
                    records.insert(id, stop);
                }
                Err(e) => skip_or_abort(&e, "stop", id.as_str())?,
            }
        }
    }

    let mut points = Vec::new();
    for (a, b, stops) in pairs {
        for id in stops {
            if let Some(stop) = records.get(id) {
                points.push(TransferPoint::recommended(
                    Stop::clone(stop),
                    a.clone(),
                    b.clone(),
                    min_transfer,
                ));
            }
        }
    }

    debug!(
        from = from_routes.len(),
        to = to_routes.len(),
        points = points.len(),
        "found transfer points"
    );
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RequestCache;
    use crate::domain::{Coordinate, ScheduleEvent, TransferType, parse_timestamp};
    use crate::mbta::{Failure, MockSource};

    fn event(trip: &str, route: &str, stop: &str, seq: u32) -> ScheduleEvent {
        let t = parse_timestamp("2024-03-15T10:00:00-04:00").unwrap();
        ScheduleEvent {
            trip_id: trip.into(),
            stop_id: stop.into(),
            route_id: route.into(),
            stop_sequence: seq,
            arrival: Some(t),
            departure: Some(t),
            direction_id: Some(0),
            timepoint: None,
        }
    }

    fn station(id: &str, name: &str) -> Stop {
        Stop::new(id, name, Coordinate::new(42.35, -71.06).unwrap()).as_station()
    }

    /// Red: pktrm, dwnxg. Orange: dwnxg, state. Green-B: pktrm, gover.
    /// Blue: gover, state.
    fn source() -> MockSource {
        MockSource::new()
            .with_stop(station("place-pktrm", "Park Street"))
            .with_stop(station("place-dwnxg", "Downtown Crossing"))
            .with_stop(station("place-state", "State"))
            .with_stop(station("place-gover", "Government Center"))
            .with_event(event("R1", "Red", "place-pktrm", 1))
            .with_event(event("R1", "Red", "place-dwnxg", 2))
            .with_event(event("O1", "Orange", "place-state", 1))
            .with_event(event("O1", "Orange", "place-dwnxg", 2))
            .with_event(event("G1", "Green-B", "place-pktrm", 1))
            .with_event(event("G1", "Green-B", "place-gover", 2))
            .with_event(event("B1", "Blue", "place-gover", 1))
            .with_event(event("B1", "Blue", "place-state", 2))
    }

    fn routes(ids: &[&str]) -> BTreeSet<RouteId> {
        ids.iter().map(|&s| RouteId::from(s)).collect()
    }

    fn describe(points: &[TransferPoint]) -> Vec<(String, String, String)> {
        points
            .iter()
            .map(|p| {
                (
                    p.from_route.to_string(),
                    p.to_route.to_string(),
                    p.stop.id.to_string(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn finds_points_in_lexical_order() {
        let source = source();
        let cache = RequestCache::default();
        let membership = Membership::new(&source, &cache, None);

        let points = find_transfer_points(
            &membership,
            &routes(&["Red", "Green-B"]),
            &routes(&["Orange", "Blue", "Red"]),
            Duration::minutes(3),
            2,
        )
        .await
        .unwrap();

        assert_eq!(
            describe(&points),
            vec![
                ("Green-B".into(), "Blue".into(), "place-gover".into()),
                ("Green-B".into(), "Red".into(), "place-pktrm".into()),
                ("Red".into(), "Orange".into(), "place-dwnxg".into()),
            ]
        );
        assert!(points.iter().all(|p| p.transfer_type == TransferType::Recommended));
        assert!(points.iter().all(|p| p.min_transfer_time == Duration::minutes(3)));
        assert_eq!(points[0].stop.name, "Government Center");
    }

    #[tokio::test]
    async fn same_route_pairs_are_skipped() {
        let source = source();
        let cache = RequestCache::default();
        let membership = Membership::new(&source, &cache, None);

        let points = find_transfer_points(
            &membership,
            &routes(&["Red"]),
            &routes(&["Red"]),
            Duration::minutes(3),
            4,
        )
        .await
        .unwrap();
        assert!(points.is_empty());
    }

    #[tokio::test]
    async fn each_route_fetched_once() {
        let source = source();
        let cache = RequestCache::default();
        let membership = Membership::new(&source, &cache, None);

        find_transfer_points(
            &membership,
            &routes(&["Red", "Green-B"]),
            &routes(&["Orange", "Blue"]),
            Duration::minutes(3),
            4,
        )
        .await
        .unwrap();
        assert_eq!(source.schedule_calls(), 4);
    }

    #[tokio::test]
    async fn failed_candidates_are_skipped() {
        let source = source()
            .fail_route("Blue", Failure::Timeout)
            .fail_stop("place-dwnxg", Failure::NotFound);
        let cache = RequestCache::default();
        let membership = Membership::new(&source, &cache, None);

        let points = find_transfer_points(
            &membership,
            &routes(&["Red", "Green-B"]),
            &routes(&["Orange", "Blue", "Red"]),
            Duration::minutes(3),
            4,
        )
        .await
        .unwrap();
        assert_eq!(
            describe(&points),
            vec![("Green-B".into(), "Red".into(), "place-pktrm".into())]
        );
    }

    #[tokio::test]
    async fn fatal_errors_abort() {
        let source = source().fail_route("Orange", Failure::Unauthorized);
        let cache = RequestCache::default();
        let membership = Membership::new(&source, &cache, None);

        let err = find_transfer_points(
            &membership,
            &routes(&["Red"]),
            &routes(&["Orange"]),
            Duration::minutes(3),
            4,
        )
        .await
        .unwrap_err();
        assert_eq!(err, PlanError::Unauthorized);
    }
}
