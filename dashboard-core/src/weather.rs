use reqwest::Client;

use crate::{
    config::Config,
    error::WeatherError,
    model::WeatherResult,
    provider::{WeatherProvider, weather_provider_from_config},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coordinates {
    pub lat: String,
    pub lon: String,
}

impl Coordinates {
    /// Both values must be present and non-blank.
    pub fn from_query(lat: Option<&str>, lon: Option<&str>) -> Result<Self, WeatherError> {
        fn clean(v: Option<&str>) -> Option<&str> {
            v.map(str::trim).filter(|s| !s.is_empty())
        }

        match (clean(lat), clean(lon)) {
            (Some(lat), Some(lon)) => Ok(Self {
                lat: lat.to_string(),
                lon: lon.to_string(),
            }),
            _ => Err(WeatherError::MissingCoordinates),
        }
    }
}

/// Current weather for a pair of coordinates.
///
/// A proxy built without a provider represents a deployment with no API
/// key; every well-formed request to it fails as [`WeatherError::NotConfigured`].
#[derive(Debug)]
pub struct WeatherProxy {
    provider: Option<Box<dyn WeatherProvider>>,
}

impl WeatherProxy {
    pub fn new(provider: Option<Box<dyn WeatherProvider>>) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        let provider = weather_provider_from_config(config, http);
        if provider.is_none() {
            tracing::warn!("no weather API key configured, weather requests will fail");
        }
        Self::new(provider)
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn fetch(
        &self,
        lat: Option<&str>,
        lon: Option<&str>,
    ) -> Result<WeatherResult, WeatherError> {
        let at = Coordinates::from_query(lat, lon)?;
        let provider = self.provider.as_ref().ok_or(WeatherError::NotConfigured)?;

        let result = provider.current(&at).await;
        if let Err(WeatherError::Unavailable(cause)) = &result {
            tracing::error!(lat = %at.lat, lon = %at.lon, error = %cause, "weather fetch failed");
        }
        result
    }
}
