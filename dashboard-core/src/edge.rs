//! Geolocation metadata attached to inbound requests by the hosting platform.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Names of the headers the edge platform uses for its geolocation guess.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeHeaders {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub country: String,
    pub region: String,
}

impl Default for EdgeHeaders {
    fn default() -> Self {
        Self {
            city: "x-vercel-ip-city".to_string(),
            latitude: "x-vercel-ip-latitude".to_string(),
            longitude: "x-vercel-ip-longitude".to_string(),
            country: "x-vercel-ip-country".to_string(),
            region: "x-vercel-ip-country-region".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeGeo {
    pub city: Option<String>,
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
}

impl EdgeGeo {
    /// Read edge geolocation through a header lookup function.
    ///
    /// Blank values are treated as absent. The city header is percent-encoded
    /// by the platform and is decoded here.
    pub fn from_lookup<'a>(names: &EdgeHeaders, lookup: impl Fn(&str) -> Option<&'a str>) -> Self {
        let read = |name: &str| {
            lookup(name)
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let city = read(&names.city).map(|raw| match urlencoding::decode(&raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => raw,
        });

        Self {
            city,
            latitude: read(&names.latitude),
            longitude: read(&names.longitude),
            country: read(&names.country),
            region: read(&names.region),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the location chain may consult about one request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub edge: EdgeGeo,
    pub client_ip: Option<IpAddr>,
    pub ip_consent: bool,
}

impl RequestContext {
    pub fn new(edge: EdgeGeo, client_ip: Option<IpAddr>, ip_consent: bool) -> Self {
        Self {
            edge,
            client_ip,
            ip_consent,
        }
    }
}

/// First address of an `X-Forwarded-For` header.
pub fn parse_forwarded_for(value: &str) -> Option<IpAddr> {
    value.split(',').next()?.trim().parse().ok()
}

/// Whether an address identifies a client on the public internet.
pub fn is_public_ip(ip: &IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            let octets = v4.octets();
            !(v4.is_private()
                || v4.is_loopback()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast()
                || v4.is_documentation()
                || matches!(octets, [100, 64..=127, _, _]) // carrier-grade NAT
                || matches!(octets, [224..=255, _, _, _]))
        }
        IpAddr::V6(v6) => {
            let first = v6.segments()[0];
            !(v6.is_loopback()
                || v6.is_unspecified()
                || v6.is_multicast()
                || (first & 0xfe00) == 0xfc00 // unique local
                || (first & 0xffc0) == 0xfe80) // link local
        }
    }
}
