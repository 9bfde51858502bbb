//! Data-source error types.

/// Errors from the transit data source.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP request failed (connection refused, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON deserialization failed
    #[error("JSON parse error: {message}")]
    Json {
        message: String,
        body: Option<String>,
    },

    /// API returned an unexpected error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The requested resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Invalid API key or forbidden
    #[error("unauthorized (check MBTA_API_KEY)")]
    Unauthorized,

    /// Rate limited by the API
    #[error("rate limited by the data source")]
    RateLimited,

    /// The request did not complete in time
    #[error("request timed out")]
    Timeout,
}

impl SourceError {
    /// Errors that will recur on every further request in this call.
    ///
    /// A planner can skip a candidate whose fetch failed, but not these:
    /// every later candidate would fail the same way.
    pub fn is_fatal(&self) -> bool {
        matches!(self, SourceError::Unauthorized | SourceError::RateLimited)
    }

    /// Classify a transport error, separating timeouts from other failures.
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else {
            SourceError::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SourceError::NotFound("stop place-nope".into());
        assert_eq!(err.to_string(), "not found: stop place-nope");

        let err = SourceError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        assert_eq!(err.to_string(), "API error 500: Internal Server Error");

        let err = SourceError::Json {
            message: "expected string".into(),
            body: Some("{}".into()),
        };
        assert_eq!(err.to_string(), "JSON parse error: expected string");
    }

    #[test]
    fn fatal_errors() {
        assert!(SourceError::Unauthorized.is_fatal());
        assert!(SourceError::RateLimited.is_fatal());
        assert!(!SourceError::Timeout.is_fatal());
        assert!(!SourceError::NotFound("x".into()).is_fatal());
    }
}
