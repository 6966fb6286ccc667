use serde::{Deserialize, Serialize};

use crate::error::SoftFailure;

/// Where a [`LocationResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocationSource {
    #[serde(rename = "edge")]
    Edge,
    #[serde(rename = "ip-api")]
    IpApi,
    #[serde(rename = "fallback")]
    Fallback,
}

impl LocationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationSource::Edge => "edge",
            LocationSource::IpApi => "ip-api",
            LocationSource::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for LocationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResult {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub country: String,
    pub region: String,
    pub source: LocationSource,
}

impl LocationResult {
    /// True when every string field carries a value.
    pub fn is_complete(&self) -> bool {
        [
            &self.city,
            &self.latitude,
            &self.longitude,
            &self.country,
            &self.region,
        ]
        .iter()
        .all(|field| !field.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub temp_c: f64,
    pub condition: String,
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_kph: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feelslike_c: Option<f64>,
}

/// A quote with a non-empty body and author.
///
/// The only way to obtain one is [`QuoteResult::new`]; deserialization is
/// routed through it as well, so a payload with a blank field never becomes
/// a `QuoteResult`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawQuote")]
pub struct QuoteResult {
    content: String,
    author: String,
}

#[derive(Deserialize)]
struct RawQuote {
    content: String,
    author: String,
}

impl TryFrom<RawQuote> for QuoteResult {
    type Error = SoftFailure;

    fn try_from(raw: RawQuote) -> Result<Self, Self::Error> {
        QuoteResult::new(raw.content, raw.author)
    }
}

impl QuoteResult {
    pub fn new(content: impl Into<String>, author: impl Into<String>) -> Result<Self, SoftFailure> {
        let content = content.into().trim().to_string();
        let author = author.into().trim().to_string();

        if content.is_empty() {
            return Err(SoftFailure::Rejected("quote content is empty".to_string()));
        }
        if author.is_empty() {
            return Err(SoftFailure::Rejected("quote author is empty".to_string()));
        }

        Ok(Self { content, author })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &str {
        &self.author
    }
}

/// Body returned by every endpoint that can fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self { error: error.into() }
    }
}
