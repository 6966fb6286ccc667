use async_trait::async_trait;

use crate::{
    edge::RequestContext,
    error::SoftFailure,
    model::{LocationResult, LocationSource},
};

use super::LocationProvider;

const UNKNOWN: &str = "Unknown";

/// Location guessed by the hosting platform. Makes no outbound call.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeGeoProvider;

#[async_trait]
impl LocationProvider for EdgeGeoProvider {
    fn id(&self) -> &'static str {
        "edge"
    }

    async fn locate(&self, ctx: &RequestContext) -> Result<LocationResult, SoftFailure> {
        let edge = &ctx.edge;

        let (Some(city), Some(latitude), Some(longitude)) =
            (&edge.city, &edge.latitude, &edge.longitude)
        else {
            return Err(SoftFailure::Rejected(
                "edge geolocation lacks city or coordinates".to_string(),
            ));
        };

        Ok(LocationResult {
            city: city.clone(),
            latitude: latitude.clone(),
            longitude: longitude.clone(),
            country: edge.country.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            region: edge.region.clone().unwrap_or_else(|| UNKNOWN.to_string()),
            source: LocationSource::Edge,
        })
    }
}
