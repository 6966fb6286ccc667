use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::{SoftFailure, WeatherError},
    model::WeatherResult,
    weather::Coordinates,
};

use super::{WeatherProvider, fetch_text, join_url, truncate_body};

/// Current conditions from WeatherAPI.com.
#[derive(Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

// Keeps the key out of logs.
impl std::fmt::Debug for WeatherApiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherApiProvider")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherApiProvider {
    pub fn new(api_key: String, http: Client, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    text: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Deserialize)]
struct WaCurrent {
    temp_c: f64,
    #[serde(default)]
    feelslike_c: Option<f64>,
    #[serde(default)]
    humidity: Option<u8>,
    #[serde(default)]
    wind_kph: Option<f64>,
    condition: WaCondition,
}

#[derive(Debug, Deserialize)]
struct WaResponse {
    current: WaCurrent,
}

#[derive(Debug, Deserialize)]
struct WaErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct WaErrorResponse {
    error: WaErrorDetail,
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn current(&self, at: &Coordinates) -> Result<WeatherResult, WeatherError> {
        let url = join_url(&self.base_url, "v1/current.json");
        let q = format!("{},{}", at.lat, at.lon);

        let request = self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", q.as_str()),
            ("aqi", "no"),
        ]);

        let (status, body) = fetch_text(request)
            .await
            .map_err(WeatherError::Unavailable)?;

        // WeatherAPI reports bad input as a JSON error object, usually with a 400.
        if let Ok(err) = serde_json::from_str::<WaErrorResponse>(&body) {
            tracing::warn!(%status, message = %err.error.message, "weather provider reported an error");
            return Err(WeatherError::Provider(err.error.message));
        }

        if !status.is_success() {
            return Err(WeatherError::Unavailable(SoftFailure::Status {
                status,
                body: truncate_body(&body),
            }));
        }

        let parsed: WaResponse = serde_json::from_str(&body)
            .map_err(|e| WeatherError::Unavailable(SoftFailure::payload(e)))?;

        Ok(WeatherResult {
            temp_c: parsed.current.temp_c,
            condition: parsed.current.condition.text,
            icon: parsed.current.condition.icon,
            humidity: parsed.current.humidity,
            wind_kph: parsed.current.wind_kph,
            feelslike_c: parsed.current.feelslike_c,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coords() -> Coordinates {
        Coordinates {
            lat: "69.6492".into(),
            lon: "18.9553".into(),
        }
    }

    #[tokio::test]
    async fn trims_current_conditions() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/current.json"))
            .and(query_param("key", "KEY"))
            .and(query_param("q", "69.6492,18.9553"))
            .and(query_param("aqi", "no"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "location": { "name": "Tromso", "country": "Norway" },
                "current": {
                    "temp_c": -4.0,
                    "feelslike_c": -9.3,
                    "humidity": 86,
                    "wind_kph": 18.4,
                    "pressure_mb": 1003.0,
                    "condition": {
                        "text": "Light snow",
                        "icon": "//cdn.weatherapi.com/weather/64x64/night/326.png",
                        "code": 1213
                    }
                }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into(), Client::new(), server.uri());
        let weather = provider.current(&coords()).await.unwrap();

        assert_eq!(weather.temp_c, -4.0);
        assert_eq!(weather.condition, "Light snow");
        assert_eq!(weather.icon, "//cdn.weatherapi.com/weather/64x64/night/326.png");
        assert_eq!(weather.humidity, Some(86));
        assert_eq!(weather.wind_kph, Some(18.4));
        assert_eq!(weather.feelslike_c, Some(-9.3));
    }

    #[tokio::test]
    async fn provider_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "error": { "code": 1006, "message": "No matching location found." }
            })))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into(), Client::new(), server.uri());
        let err = provider.current(&coords()).await.unwrap_err();

        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), "No matching location found.");
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let provider = WeatherApiProvider::new("KEY".into(), Client::new(), server.uri());
        let err = provider.current(&coords()).await.unwrap_err();

        assert_eq!(err.status_code(), 503);
    }

    #[test]
    fn debug_output_hides_key() {
        let provider = WeatherApiProvider::new("SECRET".into(), Client::new(), "http://x");
        assert!(!format!("{provider:?}").contains("SECRET"));
    }
}
