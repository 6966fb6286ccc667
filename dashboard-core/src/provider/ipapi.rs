use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    edge::{RequestContext, is_public_ip},
    error::SoftFailure,
    model::{LocationResult, LocationSource},
};

use super::{LocationProvider, fetch_success, join_url};

/// IP geolocation through ip-api.com. Only used with the user's consent.
#[derive(Debug, Clone)]
pub struct IpApiProvider {
    http: Client,
    base_url: String,
}

impl IpApiProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn url_for(&self, ctx: &RequestContext) -> String {
        match ctx.client_ip.filter(is_public_ip) {
            Some(ip) => join_url(&self.base_url, &format!("json/{ip}")),
            // Without a routable client address the service geolocates the caller.
            None => join_url(&self.base_url, "json/"),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    region_name: Option<String>,
}

impl IpApiResponse {
    fn into_location(self) -> Result<LocationResult, SoftFailure> {
        if self.status != "success" {
            return Err(SoftFailure::Rejected(format!(
                "ip-api status '{}': {}",
                self.status,
                self.message.as_deref().unwrap_or("no message")
            )));
        }

        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let city = non_empty(self.city)
            .ok_or_else(|| SoftFailure::Rejected("ip-api returned no city".to_string()))?;
        let (lat, lon) = self
            .lat
            .zip(self.lon)
            .ok_or_else(|| SoftFailure::Rejected("ip-api returned no coordinates".to_string()))?;
        let country = non_empty(self.country_code)
            .ok_or_else(|| SoftFailure::Rejected("ip-api returned no country".to_string()))?;

        Ok(LocationResult {
            city,
            latitude: lat.to_string(),
            longitude: lon.to_string(),
            country,
            region: non_empty(self.region_name).unwrap_or_else(|| "Unknown".to_string()),
            source: LocationSource::IpApi,
        })
    }
}

#[async_trait]
impl LocationProvider for IpApiProvider {
    fn id(&self) -> &'static str {
        "ip-api"
    }

    fn requires_consent(&self) -> bool {
        true
    }

    async fn locate(&self, ctx: &RequestContext) -> Result<LocationResult, SoftFailure> {
        let url = self.url_for(ctx);
        tracing::debug!(%url, "looking up location by IP");

        let body = fetch_success(self.http.get(&url)).await?;
        let parsed: IpApiResponse = serde_json::from_str(&body).map_err(SoftFailure::payload)?;

        parsed.into_location()
    }
}
