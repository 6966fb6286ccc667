//! Core library for the morning dashboard.
//!
//! This crate defines:
//! - Shared domain models (location, weather, quote)
//! - Provider adapters and the fallback chains built from them
//! - Configuration & credentials handling
//! - A client for the dashboard's HTTP endpoints and local preferences
//!
//! It is used by `dashboard-cli`, which serves the endpoints and renders the
//! dashboard in a terminal.

pub mod cache;
pub mod chain;
pub mod client;
pub mod config;
pub mod edge;
pub mod error;
pub mod location;
pub mod model;
pub mod provider;
pub mod quote;
pub mod store;
pub mod weather;

pub use cache::CacheControl;
pub use chain::Resolved;
pub use client::{DashboardClient, DashboardSnapshot, RetryPolicy};
pub use config::Config;
pub use edge::{EdgeGeo, RequestContext};
pub use error::{ChainExhausted, SoftFailure, WeatherError};
pub use location::LocationResolver;
pub use model::{ErrorBody, LocationResult, LocationSource, QuoteResult, WeatherResult};
pub use provider::ProviderId;
pub use quote::QuoteResolver;
pub use store::{KeyValueStore, Preferences};
pub use weather::WeatherProxy;
