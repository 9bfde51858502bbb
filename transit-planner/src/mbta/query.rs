//! Query builders for the schedule and stop endpoints.
//!
//! Filters are encoded as JSON:API query parameters (`filter[route]=Red`,
//! `page[limit]=100`, ...). Multi-valued filters are comma-joined.

use chrono::{NaiveDate, NaiveTime};

use crate::domain::{LocationType, RouteId, StopId, TripId, format_service_date, format_time_of_day};

/// Related resources a schedule query can side-load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Include {
    Trip,
    Route,
    Stop,
}

impl Include {
    fn as_str(self) -> &'static str {
        match self {
            Include::Trip => "trip",
            Include::Route => "route",
            Include::Stop => "stop",
        }
    }
}

/// Sort order for schedule results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleSort {
    DepartureTime,
    ArrivalTime,
    StopSequence,
}

impl ScheduleSort {
    fn as_str(self) -> &'static str {
        match self {
            ScheduleSort::DepartureTime => "departure_time",
            ScheduleSort::ArrivalTime => "arrival_time",
            ScheduleSort::StopSequence => "stop_sequence",
        }
    }
}

/// Filters for `GET /schedules`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScheduleQuery {
    pub routes: Vec<RouteId>,
    pub stops: Vec<StopId>,
    pub trips: Vec<TripId>,
    /// Service date.
    pub date: Option<NaiveDate>,
    pub direction: Option<u8>,
    /// Earliest time of day, compared against departures.
    pub min_time: Option<NaiveTime>,
    pub max_time: Option<NaiveTime>,
    pub sort: Option<ScheduleSort>,
    pub include: Vec<Include>,
    /// Sparse fieldset for schedule attributes.
    pub fields: Vec<&'static str>,
    pub page_limit: Option<u32>,
}

impl ScheduleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, route: &RouteId) -> Self {
        self.routes.push(route.clone());
        self
    }

    pub fn stop(mut self, stop: &StopId) -> Self {
        self.stops.push(stop.clone());
        self
    }

    pub fn trip(mut self, trip: &TripId) -> Self {
        self.trips.push(trip.clone());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn maybe_date(mut self, date: Option<NaiveDate>) -> Self {
        self.date = date;
        self
    }

    pub fn direction(mut self, direction: u8) -> Self {
        self.direction = Some(direction);
        self
    }

    pub fn min_time(mut self, time: NaiveTime) -> Self {
        self.min_time = Some(time);
        self
    }

    pub fn max_time(mut self, time: NaiveTime) -> Self {
        self.max_time = Some(time);
        self
    }

    pub fn sort(mut self, sort: ScheduleSort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn include(mut self, include: Include) -> Self {
        if !self.include.contains(&include) {
            self.include.push(include);
        }
        self
    }

    pub fn fields(mut self, fields: &[&'static str]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    /// Whether `include` asks for a resource type.
    pub fn includes(&self, include: Include) -> bool {
        self.include.contains(&include)
    }

    /// Encode as query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        push_joined(&mut params, "filter[route]", &self.routes);
        push_joined(&mut params, "filter[stop]", &self.stops);
        push_joined(&mut params, "filter[trip]", &self.trips);

        if let Some(date) = self.date {
            params.push(("filter[date]".into(), format_service_date(date)));
        }
        if let Some(direction) = self.direction {
            params.push(("filter[direction_id]".into(), direction.to_string()));
        }
        if let Some(t) = self.min_time {
            params.push(("filter[min_time]".into(), format_time_of_day(t)));
        }
        if let Some(t) = self.max_time {
            params.push(("filter[max_time]".into(), format_time_of_day(t)));
        }
        if let Some(sort) = self.sort {
            params.push(("sort".into(), sort.as_str().into()));
        }
        if !self.include.is_empty() {
            let include: Vec<&str> = self.include.iter().map(|i| i.as_str()).collect();
            params.push(("include".into(), include.join(",")));
        }
        if !self.fields.is_empty() {
            params.push(("fields[schedule]".into(), self.fields.join(",")));
        }
        if let Some(limit) = self.page_limit {
            params.push(("page[limit]".into(), limit.to_string()));
        }

        params
    }
}

/// Filters for `GET /stops`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopQuery {
    pub location_types: Vec<LocationType>,
    pub routes: Vec<RouteId>,
    pub ids: Vec<StopId>,
    pub page_limit: Option<u32>,
}

impl StopQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only parent stations.
    pub fn stations() -> Self {
        Self {
            location_types: vec![LocationType::Station],
            ..Self::default()
        }
    }

    pub fn page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if !self.location_types.is_empty() {
            let codes: Vec<String> = self
                .location_types
                .iter()
                .map(|t| t.code().to_string())
                .collect();
            params.push(("filter[location_type]".into(), codes.join(",")));
        }
        push_joined(&mut params, "filter[route]", &self.routes);
        push_joined(&mut params, "filter[id]", &self.ids);
        if let Some(limit) = self.page_limit {
            params.push(("page[limit]".into(), limit.to_string()));
        }

        params
    }
}

fn push_joined<T: AsRef<str>>(params: &mut Vec<(String, String)>, key: &str, values: &[T]) {
    if values.is_empty() {
        return;
    }
    let joined: Vec<&str> = values.iter().map(AsRef::as_ref).collect();
    params.push((key.to_string(), joined.join(",")));
}
