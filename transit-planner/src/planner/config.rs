//! Configuration for the trip planner.

use chrono::Duration;
use chrono_tz::Tz;

use crate::domain::AGENCY_TIMEZONE;

/// Configuration parameters for trip planning.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannerConfig {
    /// Minimum transfer time given to each discovered transfer point
    /// (minutes).
    pub default_min_transfer_mins: i64,

    /// Floor on the gap between arriving on the first leg and departing on
    /// the second (minutes). Applied even when a transfer point asks for
    /// less.
    pub min_transfer_floor_mins: i64,

    /// Maximum number of data-source requests issued together when
    /// prefetching route membership or evaluating transfer candidates.
    pub concurrency: usize,

    /// Page size passed to schedule queries. `None` leaves it to the API.
    pub page_limit: Option<u32>,

    /// Deadline for a whole planning call (seconds). `None` means no
    /// deadline.
    pub deadline_secs: Option<u64>,

    /// Zone the data source reads date and time-of-day filters in.
    pub timezone: Tz,
}

impl PlannerConfig {
    /// Set the per-transfer minimum.
    pub fn with_min_transfer_mins(mut self, mins: i64) -> Self {
        self.default_min_transfer_mins = mins;
        self
    }

    pub fn with_concurrency(mut self, n: usize) -> Self {
        self.concurrency = n.max(1);
        self
    }

    pub fn with_page_limit(mut self, limit: Option<u32>) -> Self {
        self.page_limit = limit;
        self
    }

    pub fn with_deadline_secs(mut self, secs: Option<u64>) -> Self {
        self.deadline_secs = secs;
        self
    }

    pub fn with_timezone(mut self, tz: Tz) -> Self {
        self.timezone = tz;
        self
    }

    /// Returns the default minimum transfer time as a Duration.
    pub fn default_min_transfer(&self) -> Duration {
        Duration::minutes(self.default_min_transfer_mins)
    }

    /// Returns the transfer floor as a Duration.
    pub fn min_transfer_floor(&self) -> Duration {
        Duration::minutes(self.min_transfer_floor_mins)
    }

    /// Returns the planning deadline, if any.
    pub fn deadline(&self) -> Option<std::time::Duration> {
        self.deadline_secs.map(std::time::Duration::from_secs)
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            default_min_transfer_mins: 3,
            min_transfer_floor_mins: 2,
            concurrency: 4,
            page_limit: None,
            deadline_secs: None,
            timezone: AGENCY_TIMEZONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlannerConfig::default();

        assert_eq!(config.default_min_transfer_mins, 3);
        assert_eq!(config.min_transfer_floor_mins, 2);
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.page_limit, None);
        assert_eq!(config.deadline_secs, None);
        assert_eq!(config.timezone, chrono_tz::America::New_York);
    }

    #[test]
    fn duration_methods() {
        let config = PlannerConfig::default().with_deadline_secs(Some(10));

        assert_eq!(config.default_min_transfer(), Duration::minutes(3));
        assert_eq!(config.min_transfer_floor(), Duration::minutes(2));
        assert_eq!(config.deadline(), Some(std::time::Duration::from_secs(10)));
    }

    #[test]
    fn builder() {
        let config = PlannerConfig::default()
            .with_min_transfer_mins(1)
            .with_concurrency(0)
            .with_page_limit(Some(100))
            .with_timezone(chrono_tz::America::Chicago);

        assert_eq!(config.default_min_transfer_mins, 1);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.page_limit, Some(100));
        assert_eq!(config.timezone, chrono_tz::America::Chicago);
    }
}
