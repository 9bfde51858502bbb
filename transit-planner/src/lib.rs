//! Transit trip planner server.
//!
//! Answers "how do I get from this stop to that one?" against the MBTA V3
//! schedule API, with at most one transfer, and finds stations near a point.

pub mod cache;
pub mod domain;
pub mod mbta;
pub mod planner;
pub mod web;
