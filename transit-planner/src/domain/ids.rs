//! Identifier newtypes for data-source entities.
//!
//! The data source hands out opaque string ids. Wrapping them keeps a stop id
//! from being passed where a route id is expected, and gives every id the
//! same lexical `Ord`, which the planner uses as its deterministic tie-break.

use std::fmt;

use serde::Serialize;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Identifier of a stop, platform or parent station (e.g. `place-dwnxg`).
    StopId
);

string_id!(
    /// Identifier of a route (e.g. `Red`, `Green-B`, `CR-Fitchburg`).
    RouteId
);

string_id!(
    /// Identifier of a single scheduled trip.
    TripId
);
