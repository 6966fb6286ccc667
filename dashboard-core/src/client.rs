//! Client for the dashboard's own HTTP endpoints.
//!
//! Location and quote are fetched concurrently; weather depends on the
//! resolved location and only starts once it is known.

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

use crate::model::{ErrorBody, LocationResult, QuoteResult, WeatherResult};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{message} (status {status})")]
    Api { status: StatusCode, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Whether trying again could plausibly help.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport(_) => true,
            ClientError::Api { status, .. } => matches!(
                *status,
                StatusCode::TOO_MANY_REQUESTS
                    | StatusCode::BAD_GATEWAY
                    | StatusCode::SERVICE_UNAVAILABLE
                    | StatusCode::GATEWAY_TIMEOUT
            ),
            ClientError::Decode(_) => false,
        }
    }
}

/// Fixed-delay retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

#[derive(Debug)]
pub struct DashboardSnapshot {
    pub location: Result<LocationResult, ClientError>,
    /// `None` when there was no location to ask about.
    pub weather: Option<Result<WeatherResult, ClientError>>,
    pub quote: Result<QuoteResult, ClientError>,
}

impl DashboardSnapshot {
    pub fn has_errors(&self) -> bool {
        self.location.is_err()
            || matches!(self.weather, Some(Err(_)))
            || self.quote.is_err()
    }
}

#[derive(Debug, Clone)]
pub struct DashboardClient {
    base_url: String,
    http: Client,
    retry: RetryPolicy,
}

impl DashboardClient {
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Result<Self, ClientError> {
        let http = Client::builder().timeout(Duration::from_secs(15)).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            retry,
        })
    }

    pub async fn location(&self, ip_consent: bool) -> Result<LocationResult, ClientError> {
        let consent = if ip_consent { "true" } else { "false" };
        self.get_json("/api/location", &[("useIP", consent)]).await
    }

    pub async fn weather(&self, location: &LocationResult) -> Result<WeatherResult, ClientError> {
        self.get_json(
            "/api/weather",
            &[
                ("lat", location.latitude.as_str()),
                ("lon", location.longitude.as_str()),
            ],
        )
        .await
    }

    pub async fn quote(&self) -> Result<QuoteResult, ClientError> {
        self.get_json("/api/quote", &[]).await
    }

    /// Fetch everything the dashboard shows.
    pub async fn load(&self, ip_consent: bool) -> DashboardSnapshot {
        let location_then_weather = async {
            let location = self.location(ip_consent).await;
            let weather = match &location {
                Ok(loc) => Some(self.weather(loc).await),
                Err(_) => None,
            };
            (location, weather)
        };

        let ((location, weather), quote) = tokio::join!(location_then_weather, self.quote());

        DashboardSnapshot {
            location,
            weather,
            quote,
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut attempt = 1;

        loop {
            match self.get_once(&url, query).await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.retry.attempts => {
                    tracing::debug!(%url, attempt, error = %err, "retrying");
                    attempt += 1;
                    tokio::time::sleep(self.retry.delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let res = self.http.get(url).query(query).send().await?;
        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("request failed with status {status}"));
            return Err(ClientError::Api { status, message });
        }

        serde_json::from_str(&body).map_err(|e| ClientError::Decode(e.to_string()))
    }
}
