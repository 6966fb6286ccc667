use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, header};
use std::{convert::TryFrom, fmt::Debug};

use crate::{
    config::{Config, HttpConfig},
    edge::RequestContext,
    error::{SoftFailure, WeatherError},
    model::{LocationResult, QuoteResult, WeatherResult},
    weather::Coordinates,
};

pub mod edge_geo;
pub mod ipapi;
pub mod quotable;
pub mod weatherapi;
pub mod zenquotes;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    WeatherApi,
    IpApi,
    Quotable,
    ZenQuotes,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "weatherapi",
            ProviderId::IpApi => "ip-api",
            ProviderId::Quotable => "quotable",
            ProviderId::ZenQuotes => "zenquotes",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderId::WeatherApi => "https://api.weatherapi.com",
            // The free tier of ip-api is only served over plain http.
            ProviderId::IpApi => "http://ip-api.com",
            ProviderId::Quotable => "https://api.quotable.io",
            ProviderId::ZenQuotes => "https://zenquotes.io",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::WeatherApi,
            ProviderId::IpApi,
            ProviderId::Quotable,
            ProviderId::ZenQuotes,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "weatherapi" => Ok(ProviderId::WeatherApi),
            "ip-api" | "ipapi" => Ok(ProviderId::IpApi),
            "quotable" => Ok(ProviderId::Quotable),
            "zenquotes" => Ok(ProviderId::ZenQuotes),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weatherapi, ip-api, quotable, zenquotes."
            )),
        }
    }
}

/// One step of the location chain.
#[async_trait]
pub trait LocationProvider: Send + Sync + Debug {
    fn id(&self) -> &'static str;

    /// Providers that leak the client address to a third party must return true.
    fn requires_consent(&self) -> bool {
        false
    }

    async fn locate(&self, ctx: &RequestContext) -> Result<LocationResult, SoftFailure>;
}

/// One step of the quote chain.
#[async_trait]
pub trait QuoteProvider: Send + Sync + Debug {
    fn id(&self) -> &'static str;

    async fn fetch_quote(&self) -> Result<QuoteResult, SoftFailure>;
}

/// Current conditions keyed by coordinates.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current(&self, at: &Coordinates) -> Result<WeatherResult, WeatherError>;
}

/// Build the HTTP client shared by every outbound provider call.
pub fn http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/json"),
    );

    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.as_str())
        .default_headers(headers)
        .build()
}

/// Default location providers, in chain order.
pub fn location_providers_from_config(
    config: &Config,
    http: &Client,
) -> Vec<Box<dyn LocationProvider>> {
    vec![
        Box::new(edge_geo::EdgeGeoProvider),
        Box::new(ipapi::IpApiProvider::new(
            http.clone(),
            config.provider_base_url(ProviderId::IpApi),
        )),
    ]
}

/// Construct the weather provider, if an API key is configured.
pub fn weather_provider_from_config(
    config: &Config,
    http: &Client,
) -> Option<Box<dyn WeatherProvider>> {
    let api_key = config.provider_api_key(ProviderId::WeatherApi)?;

    Some(Box::new(weatherapi::WeatherApiProvider::new(
        api_key.to_owned(),
        http.clone(),
        config.provider_base_url(ProviderId::WeatherApi),
    )))
}

/// Default quote providers, primary first.
pub fn quote_providers_from_config(config: &Config, http: &Client) -> Vec<Box<dyn QuoteProvider>> {
    vec![
        Box::new(quotable::QuotableProvider::new(
            http.clone(),
            config.provider_base_url(ProviderId::Quotable),
        )),
        Box::new(zenquotes::ZenQuotesProvider::new(
            http.clone(),
            config.provider_base_url(ProviderId::ZenQuotes),
        )),
    ]
}

/// Send a request and return status and body text.
pub(crate) async fn fetch_text(request: RequestBuilder) -> Result<(StatusCode, String), SoftFailure> {
    let res = request.send().await?;
    let status = res.status();
    let body = res.text().await?;
    Ok((status, body))
}

/// Like [`fetch_text`], but any non-success status is a failure.
pub(crate) async fn fetch_success(request: RequestBuilder) -> Result<String, SoftFailure> {
    let (status, body) = fetch_text(request).await?;

    if !status.is_success() {
        return Err(SoftFailure::Status {
            status,
            body: truncate_body(&body),
        });
    }

    Ok(body)
}

pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let s = id.as_str();
            let parsed = ProviderId::try_from(s).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
    }

    #[test]
    fn provider_id_is_case_insensitive() {
        assert_eq!(ProviderId::try_from("ZenQuotes").unwrap(), ProviderId::ZenQuotes);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn default_chains_are_ordered() {
        let cfg = Config::default();
        let http = http_client(&cfg.http).unwrap();

        let location: Vec<_> = location_providers_from_config(&cfg, &http)
            .iter()
            .map(|p| (p.id(), p.requires_consent()))
            .collect();
        assert_eq!(location, vec![("edge", false), ("ip-api", true)]);

        let quotes: Vec<_> = quote_providers_from_config(&cfg, &http)
            .iter()
            .map(|p| p.id())
            .collect();
        assert_eq!(quotes, vec!["quotable", "zenquotes"]);
    }

    #[test]
    fn weather_provider_requires_api_key() {
        let mut cfg = Config::default();
        let http = http_client(&cfg.http).unwrap();
        assert!(weather_provider_from_config(&cfg, &http).is_none());

        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".to_string());
        assert!(weather_provider_from_config(&cfg, &http).is_some());
    }

    #[test]
    fn join_url_handles_slashes() {
        assert_eq!(join_url("http://a/", "/json/"), "http://a/json/");
        assert_eq!(join_url("http://a", "random"), "http://a/random");
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "ø".repeat(150);
        let out = truncate_body(&body);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
    }
}
