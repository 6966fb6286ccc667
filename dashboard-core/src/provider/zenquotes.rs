use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::SoftFailure, model::QuoteResult};

use super::{QuoteProvider, fetch_success, join_url};

/// Backup quote source, zenquotes.io. Answers with a one-element array.
#[derive(Debug, Clone)]
pub struct ZenQuotesProvider {
    http: Client,
    base_url: String,
}

impl ZenQuotesProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ZenQuote {
    #[serde(default)]
    q: String,
    #[serde(default)]
    a: String,
}

#[async_trait]
impl QuoteProvider for ZenQuotesProvider {
    fn id(&self) -> &'static str {
        "zenquotes"
    }

    async fn fetch_quote(&self) -> Result<QuoteResult, SoftFailure> {
        let url = join_url(&self.base_url, "api/random");

        let body = fetch_success(self.http.get(url)).await?;
        let parsed: Vec<ZenQuote> = serde_json::from_str(&body).map_err(SoftFailure::payload)?;

        let first = parsed
            .into_iter()
            .next()
            .ok_or_else(|| SoftFailure::Rejected("zenquotes returned an empty list".to_string()))?;

        QuoteResult::new(first.q, first.a)
    }
}
