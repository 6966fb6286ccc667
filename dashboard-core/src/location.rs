//! Location resolution: edge geolocation, then IP lookup with consent,
//! then a fixed fallback city.

use reqwest::Client;

use crate::{
    chain::first_success,
    config::{Config, StaticLocation},
    edge::RequestContext,
    error::SoftFailure,
    model::LocationResult,
    provider::{LocationProvider, location_providers_from_config},
};

#[derive(Debug)]
pub struct LocationResolver {
    providers: Vec<Box<dyn LocationProvider>>,
    fallback: StaticLocation,
    ip_lookup: bool,
}

impl LocationResolver {
    pub fn new(
        providers: Vec<Box<dyn LocationProvider>>,
        fallback: StaticLocation,
        ip_lookup: bool,
    ) -> Self {
        Self {
            providers,
            fallback,
            ip_lookup,
        }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        Self::new(
            location_providers_from_config(config, http),
            config.location.fallback.clone(),
            config.location.ip_lookup,
        )
    }

    /// An incomplete answer counts as a failure so the chain moves on.
    async fn complete_location(
        provider: &dyn LocationProvider,
        ctx: &RequestContext,
    ) -> Result<LocationResult, SoftFailure> {
        let location = provider.locate(ctx).await?;
        if location.is_complete() {
            Ok(location)
        } else {
            Err(SoftFailure::Rejected(format!(
                "{} returned an incomplete location",
                provider.id()
            )))
        }
    }

    /// Never fails. When no provider yields a complete location the
    /// configured fallback is returned.
    pub async fn resolve(&self, ctx: &RequestContext) -> LocationResult {
        let consent = ctx.ip_consent && self.ip_lookup;

        let attempts = self
            .providers
            .iter()
            .filter(|p| consent || !p.requires_consent())
            .map(|p| (p.id(), Self::complete_location(p.as_ref(), ctx)));

        match first_success(attempts).await {
            Ok(resolved) => {
                tracing::info!(source = %resolved.value.source, city = %resolved.value.city, "location resolved");
                resolved.value
            }
            Err(exhausted) => {
                tracing::info!(
                    tried = ?exhausted.providers(),
                    city = %self.fallback.city,
                    "using fallback location"
                );
                self.fallback.to_result()
            }
        }
    }
}
