use std::time::Duration;

/// Freshness hint attached to successful proxy responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheControl {
    pub max_age: Duration,
    pub stale_while_revalidate: Option<Duration>,
}

impl CacheControl {
    /// Location barely changes within a session.
    pub const LOCATION: CacheControl = CacheControl::shared(3600, Some(7200));
    pub const WEATHER: CacheControl = CacheControl::shared(1800, Some(3600));
    /// Only sent when the primary quote provider answered.
    pub const QUOTE: CacheControl = CacheControl::shared(3600, None);

    pub const fn shared(max_age_secs: u64, stale_secs: Option<u64>) -> Self {
        let stale_while_revalidate = match stale_secs {
            Some(secs) => Some(Duration::from_secs(secs)),
            None => None,
        };

        Self {
            max_age: Duration::from_secs(max_age_secs),
            stale_while_revalidate,
        }
    }

    /// Value for the `Cache-Control` header.
    pub fn header_value(&self) -> String {
        let mut value = format!("public, s-maxage={}", self.max_age.as_secs());
        if let Some(stale) = self.stale_while_revalidate {
            value.push_str(&format!(", stale-while-revalidate={}", stale.as_secs()));
        }
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_route_hints() {
        assert_eq!(
            CacheControl::LOCATION.header_value(),
            "public, s-maxage=3600, stale-while-revalidate=7200"
        );
        assert_eq!(
            CacheControl::WEATHER.header_value(),
            "public, s-maxage=1800, stale-while-revalidate=3600"
        );
        assert_eq!(CacheControl::QUOTE.header_value(), "public, s-maxage=3600");
    }
}
