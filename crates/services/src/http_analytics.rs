use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::analytics::{AnalyticsEvent, AnalyticsSink};
use crate::error::AnalyticsError;

/// Collector endpoint configuration, read from the environment.
#[derive(Clone, Debug)]
pub struct HttpSinkConfig {
    pub endpoint: String,
    pub api_key: String,
}

impl HttpSinkConfig {
    /// Reads `COURSE_ANALYTICS_URL` and `COURSE_ANALYTICS_API_KEY`.
    /// Returns `None` when the endpoint is unset or blank, which disables
    /// HTTP analytics entirely.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let endpoint = env::var("COURSE_ANALYTICS_URL").ok()?;
        if endpoint.trim().is_empty() {
            return None;
        }
        let api_key = env::var("COURSE_ANALYTICS_API_KEY").unwrap_or_default();
        Some(Self { endpoint, api_key })
    }
}

/// Sink that POSTs each event to an HTTP collector.
#[derive(Clone)]
pub struct HttpSink {
    client: Client,
    config: HttpSinkConfig,
}

impl HttpSink {
    #[must_use]
    pub fn new(config: HttpSinkConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Builds a sink from the environment, or `None` when unconfigured.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        HttpSinkConfig::from_env().map(Self::new)
    }
}

#[derive(Debug, Serialize)]
struct EventPayload<'a> {
    event: &'a str,
    params: serde_json::Value,
}

#[async_trait]
impl AnalyticsSink for HttpSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), AnalyticsError> {
        let payload = EventPayload {
            event: event.name(),
            params: event.params(),
        };

        let mut request = self.client.post(&self.config.endpoint).json(&payload);
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(AnalyticsError::HttpStatus(response.status()));
        }
        Ok(())
    }
}
