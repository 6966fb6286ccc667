use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{error::SoftFailure, model::QuoteResult};

use super::{QuoteProvider, fetch_success, join_url};

const TAGS: &str = "inspirational|motivational";

/// Primary quote source, api.quotable.io.
#[derive(Debug, Clone)]
pub struct QuotableProvider {
    http: Client,
    base_url: String,
}

impl QuotableProvider {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct QuotableResponse {
    #[serde(default)]
    content: String,
    #[serde(default)]
    author: String,
}

#[async_trait]
impl QuoteProvider for QuotableProvider {
    fn id(&self) -> &'static str {
        "quotable"
    }

    async fn fetch_quote(&self) -> Result<QuoteResult, SoftFailure> {
        let url = join_url(&self.base_url, "random");
        let request = self.http.get(url).query(&[("tags", TAGS)]);

        let body = fetch_success(request).await?;
        let parsed: QuotableResponse =
            serde_json::from_str(&body).map_err(SoftFailure::payload)?;

        QuoteResult::new(parsed.content, parsed.author)
    }
}
