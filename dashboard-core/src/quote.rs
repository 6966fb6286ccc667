use reqwest::Client;

use crate::{
    chain::{Resolved, first_success},
    config::Config,
    error::ChainExhausted,
    model::QuoteResult,
    provider::{QuoteProvider, quote_providers_from_config},
};

/// Quote of the day from the primary provider, or the backup when it fails.
///
/// There is no static fallback; exhaustion is reported to the caller.
#[derive(Debug)]
pub struct QuoteResolver {
    providers: Vec<Box<dyn QuoteProvider>>,
}

impl QuoteResolver {
    pub fn new(providers: Vec<Box<dyn QuoteProvider>>) -> Self {
        Self { providers }
    }

    pub fn from_config(config: &Config, http: &Client) -> Self {
        Self::new(quote_providers_from_config(config, http))
    }

    pub async fn resolve(&self) -> Result<Resolved<QuoteResult>, ChainExhausted> {
        let attempts = self.providers.iter().map(|p| (p.id(), p.fetch_quote()));

        let result = first_success(attempts).await;
        if let Err(exhausted) = &result {
            tracing::error!(tried = ?exhausted.providers(), "no quote provider succeeded");
        }
        result
    }
}
