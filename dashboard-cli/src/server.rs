//! HTTP endpoints for location, weather and quote.
//!
//! With `server.trust_proxy_headers` on (the default) the client address and
//! edge geolocation are read from request headers, so the server must only be
//! reachable through the edge proxy that sets them.

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer, Responder,
    http::{StatusCode, header},
    web,
};
use anyhow::Context;
use serde::Deserialize;
use std::net::IpAddr;

use dashboard_core::{
    CacheControl, ChainExhausted, Config, EdgeGeo, ErrorBody, LocationResolver, QuoteResolver,
    RequestContext, WeatherProxy,
    edge::{EdgeHeaders, parse_forwarded_for},
    provider::http_client,
};

/// Resolvers shared by every worker, built once from config.
#[derive(Debug)]
pub struct AppState {
    location: LocationResolver,
    weather: WeatherProxy,
    quote: QuoteResolver,
    edge_headers: EdgeHeaders,
    trust_proxy_headers: bool,
}

impl AppState {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;
        let http = http_client(&config.http).context("Failed to build HTTP client")?;

        Ok(Self {
            location: LocationResolver::from_config(config, &http),
            weather: WeatherProxy::from_config(config, &http),
            quote: QuoteResolver::from_config(config, &http),
            edge_headers: config.location.edge_headers.clone(),
            trust_proxy_headers: config.server.trust_proxy_headers,
        })
    }

    fn request_context(&self, req: &HttpRequest, ip_consent: bool) -> RequestContext {
        if !self.trust_proxy_headers {
            let peer = req.peer_addr().map(|addr| addr.ip());
            return RequestContext::new(EdgeGeo::default(), peer, ip_consent);
        }

        let edge = EdgeGeo::from_lookup(&self.edge_headers, |name| {
            req.headers().get(name).and_then(|v| v.to_str().ok())
        });

        RequestContext::new(edge, forwarded_client_ip(req), ip_consent)
    }
}

/// First `X-Forwarded-For` hop, else the peer address.
fn forwarded_client_ip(req: &HttpRequest) -> Option<IpAddr> {
    req.headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(parse_forwarded_for)
        .or_else(|| req.peer_addr().map(|addr| addr.ip()))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/location", web::get().to(get_location))
            .route("/weather", web::get().to(get_weather))
            .route("/quote", web::get().to(get_quote))
            .route("/health", web::get().to(health)),
    );
}

#[derive(Debug, Deserialize)]
pub struct LocationQuery {
    #[serde(rename = "useIP")]
    use_ip: Option<String>,
}

async fn get_location(
    req: HttpRequest,
    state: web::Data<AppState>,
    query: web::Query<LocationQuery>,
) -> impl Responder {
    let consent = query.use_ip.as_deref() == Some("true");
    let ctx = state.request_context(&req, consent);

    let location = state.location.resolve(&ctx).await;

    HttpResponse::Ok()
        .insert_header((header::CACHE_CONTROL, CacheControl::LOCATION.header_value()))
        .json(location)
}

#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    lat: Option<String>,
    lon: Option<String>,
}

async fn get_weather(state: web::Data<AppState>, query: web::Query<WeatherQuery>) -> impl Responder {
    match state
        .weather
        .fetch(query.lat.as_deref(), query.lon.as_deref())
        .await
    {
        Ok(weather) => HttpResponse::Ok()
            .insert_header((header::CACHE_CONTROL, CacheControl::WEATHER.header_value()))
            .json(weather),
        Err(err) => {
            let status = StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).json(ErrorBody::new(err.to_string()))
        }
    }
}

async fn get_quote(state: web::Data<AppState>) -> impl Responder {
    match state.quote.resolve().await {
        Ok(resolved) => {
            let mut res = HttpResponse::Ok();
            if resolved.is_primary() {
                res.insert_header((header::CACHE_CONTROL, CacheControl::QUOTE.header_value()));
            }
            res.json(resolved.value)
        }
        Err(_) => HttpResponse::ServiceUnavailable()
            .json(ErrorBody::new(ChainExhausted::QUOTE_MESSAGE)),
    }
}

async fn health(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "weather_configured": state.weather.is_configured(),
    }))
}

pub async fn serve(config: Config) -> anyhow::Result<()> {
    let state = web::Data::new(AppState::from_config(&config)?);

    tracing::info!(
        bind = %config.server.bind,
        ip_lookup = config.location.ip_lookup,
        fallback = %config.location.fallback.city,
        "dashboard server starting"
    );

    HttpServer::new(move || App::new().app_data(state.clone()).configure(init_routes))
        .bind(&config.server.bind)
        .with_context(|| format!("Failed to bind {}", config.server.bind))?
        .run()
        .await
        .context("Server terminated with an error")?;

    Ok(())
}
