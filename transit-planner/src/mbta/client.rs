//! MBTA V3 API HTTP client.
//!
//! Provides async methods for the `/stops` and `/schedules` endpoints.
//! Handles authentication, concurrency limiting, status mapping, and
//! conversion to domain types.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;

use crate::domain::{ScheduleSet, Stop, StopId};
use crate::planner::ScheduleSource;

use super::convert::{convert_schedules, convert_stop, convert_stops};
use super::error::SourceError;
use super::query::{ScheduleQuery, StopQuery};
use super::types::{ScheduleDocument, StopDocument, StopsDocument};

/// Default base URL for the V3 API.
pub const DEFAULT_BASE_URL: &str = "https://api-v3.mbta.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the MBTA client.
#[derive(Debug, Clone)]
pub struct MbtaConfig {
    /// API key. Without one the API applies a much lower rate limit.
    pub api_key: Option<String>,
    /// Base URL for the API
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for MbtaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
        }
    }
}

impl MbtaConfig {
    /// Create a config that authenticates with the given key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// MBTA V3 API client.
///
/// Uses a semaphore to limit concurrent requests and stay under the API's
/// rate limit.
#[derive(Debug, Clone)]
pub struct MbtaClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl MbtaClient {
    pub fn new(config: MbtaConfig) -> Result<Self, SourceError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            HeaderValue::from_static("application/vnd.api+json"),
        );
        if let Some(key) = &config.api_key {
            let value = HeaderValue::from_str(key).map_err(|_| SourceError::Api {
                status: 0,
                message: "Invalid API key format".to_string(),
            })?;
            headers.insert("x-api-key", value);
        }

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Fetch a single stop. A missing stop is `NotFound`.
    pub async fn get_stop(&self, id: &StopId) -> Result<Stop, SourceError> {
        let path = format!("/stops/{}", id.as_str());
        let doc: StopDocument = self
            .get_json(&path, &[])
            .await
            .map_err(|e| match e {
                SourceError::NotFound(_) => SourceError::NotFound(format!("stop {id}")),
                other => other,
            })?;

        convert_stop(&doc.data).map_err(|e| SourceError::Json {
            message: e.to_string(),
            body: None,
        })
    }

    pub async fn list_stops(&self, query: &StopQuery) -> Result<Vec<Stop>, SourceError> {
        let doc: StopsDocument = self.get_json("/stops", &query.to_params()).await?;
        Ok(convert_stops(&doc.data))
    }

    pub async fn get_schedules(&self, query: &ScheduleQuery) -> Result<ScheduleSet, SourceError> {
        let doc: ScheduleDocument = self.get_json("/schedules", &query.to_params()).await?;
        let set = convert_schedules(&doc);
        tracing::debug!(
            events = set.events.len(),
            trips = set.trips.len(),
            "fetched schedules"
        );
        Ok(set)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, SourceError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| SourceError::Api {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(url = %url, ?params, "GET");

        let response = self
            .http
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(SourceError::from_transport)?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(SourceError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(SourceError::RateLimited);
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SourceError::NotFound(path.to_string()));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await.map_err(SourceError::from_transport)?;

        serde_json::from_str(&body).map_err(|e| SourceError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}

impl ScheduleSource for MbtaClient {
    async fn get_stop(&self, id: &StopId) -> Result<Stop, SourceError> {
        MbtaClient::get_stop(self, id).await
    }

    async fn list_stops(&self, query: &StopQuery) -> Result<Vec<Stop>, SourceError> {
        MbtaClient::list_stops(self, query).await
    }

    async fn get_schedules(&self, query: &ScheduleQuery) -> Result<ScheduleSet, SourceError> {
        MbtaClient::get_schedules(self, query).await
    }
}
