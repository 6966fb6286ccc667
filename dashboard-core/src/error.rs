use thiserror::Error;

/// A provider could not produce a usable value.
///
/// Soft failures are caught inside a resolution chain and only ever move
/// it on to the next provider.
#[derive(Debug, Error)]
pub enum SoftFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider responded with status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("malformed payload: {0}")]
    Payload(String),

    #[error("payload rejected: {0}")]
    Rejected(String),
}

impl SoftFailure {
    pub fn payload(err: serde_json::Error) -> Self {
        SoftFailure::Payload(err.to_string())
    }
}

/// Every provider in a chain failed.
#[derive(Debug, Error)]
#[error("all {} providers failed", .failures.len())]
pub struct ChainExhausted {
    pub failures: Vec<(&'static str, SoftFailure)>,
}

impl ChainExhausted {
    pub const QUOTE_MESSAGE: &'static str = "Unable to fetch quote from external APIs";

    pub fn providers(&self) -> Vec<&'static str> {
        self.failures.iter().map(|(id, _)| *id).collect()
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Latitude and longitude are required")]
    MissingCoordinates,

    #[error("Weather API key not configured")]
    NotConfigured,

    /// Error text reported by the weather provider itself.
    #[error("{0}")]
    Provider(String),

    #[error("Failed to fetch weather data")]
    Unavailable(#[source] SoftFailure),
}

impl WeatherError {
    pub fn status_code(&self) -> u16 {
        match self {
            WeatherError::MissingCoordinates | WeatherError::Provider(_) => 400,
            WeatherError::NotConfigured => 500,
            WeatherError::Unavailable(_) => 503,
        }
    }
}
