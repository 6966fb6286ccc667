//! Ordered fallback over a list of providers.
//!
//! A chain is just a lazy sequence of `(provider id, attempt)` pairs. Each
//! attempt is awaited in turn; the first success wins and the remaining
//! attempts are dropped without ever being polled.

use std::future::Future;

use crate::error::{ChainExhausted, SoftFailure};

/// A value produced by one of the providers in a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub provider: &'static str,
    /// Zero-based index of the provider among the attempts that were made.
    pub position: usize,
}

impl<T> Resolved<T> {
    pub fn is_primary(&self) -> bool {
        self.position == 0
    }
}

pub async fn first_success<T, I, F>(attempts: I) -> Result<Resolved<T>, ChainExhausted>
where
    I: IntoIterator<Item = (&'static str, F)>,
    F: Future<Output = Result<T, SoftFailure>>,
{
    let mut failures = Vec::new();

    for (position, (provider, attempt)) in attempts.into_iter().enumerate() {
        match attempt.await {
            Ok(value) => {
                tracing::debug!(provider, position, "provider succeeded");
                return Ok(Resolved {
                    value,
                    provider,
                    position,
                });
            }
            Err(err) => {
                tracing::warn!(provider, error = %err, "provider failed, trying next");
                failures.push((provider, err));
            }
        }
    }

    Err(ChainExhausted { failures })
}
