use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    edge::EdgeHeaders,
    model::{LocationResult, LocationSource},
    provider::ProviderId,
};

pub const WEATHER_API_KEY_ENV: &str = "WEATHER_API_KEY";
pub const BIND_ENV: &str = "DASHBOARD_BIND";

/// Configuration for a single provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Overrides [`ProviderId::default_base_url`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,

    /// Honour `X-Forwarded-For` and the edge geolocation headers. Only safe
    /// when every request arrives through the edge proxy, which overwrites
    /// them; a directly exposed server must turn this off.
    pub trust_proxy_headers: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            trust_proxy_headers: true,
        }
    }
}

/// Settings shared by every outbound provider call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 8,
            user_agent: "Morning-Dashboard/1.0".to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Terminal location of the resolution chain.
///
/// A `[location.fallback]` table must give all five fields; there is no
/// per-field default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticLocation {
    pub city: String,
    pub latitude: String,
    pub longitude: String,
    pub country: String,
    pub region: String,
}

impl Default for StaticLocation {
    fn default() -> Self {
        Self {
            city: "Tromsø".to_string(),
            latitude: "69.6492".to_string(),
            longitude: "18.9553".to_string(),
            country: "NO".to_string(),
            region: "Troms og Finnmark".to_string(),
        }
    }
}

impl StaticLocation {
    pub fn to_result(&self) -> LocationResult {
        LocationResult {
            city: self.city.clone(),
            latitude: self.latitude.clone(),
            longitude: self.longitude.clone(),
            country: self.country.clone(),
            region: self.region.clone(),
            source: LocationSource::Fallback,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    /// When false the IP lookup step is never attempted, even with consent.
    pub ip_lookup: bool,
    pub fallback: StaticLocation,
    pub edge_headers: EdgeHeaders,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            ip_lookup: true,
            fallback: StaticLocation::default(),
            edge_headers: EdgeHeaders::default(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [server]
/// bind = "0.0.0.0:3000"
///
/// [providers.weatherapi]
/// api_key = "..."
///
/// [location]
/// ip_lookup = false
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub location: LocationConfig,
    pub providers: HashMap<String, ProviderConfig>,
}

impl Config {
    /// Load config from the platform config directory, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Reject settings that would break resolution at request time.
    pub fn validate(&self) -> Result<()> {
        if !self.location.fallback.to_result().is_complete() {
            bail!("Fallback location must have a non-empty city, latitude, longitude, country and region");
        }

        for key in self.providers.keys() {
            let id = ProviderId::try_from(key.as_str())?;
            if id.as_str() != key {
                bail!("Provider section [providers.{key}] must be named [providers.{id}]");
            }
        }

        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    /// Save config to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(WEATHER_API_KEY_ENV).filter(|k| !k.trim().is_empty()) {
            self.provider_entry(ProviderId::WeatherApi).api_key = Some(key);
        }
        if let Some(bind) = lookup(BIND_ENV).filter(|b| !b.trim().is_empty()) {
            self.server.bind = bind;
        }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    fn provider_entry(&mut self, id: ProviderId) -> &mut ProviderConfig {
        self.providers.entry(id.as_str().to_string()).or_default()
    }

    pub fn upsert_provider_api_key(&mut self, id: ProviderId, api_key: String) {
        self.provider_entry(id).api_key = Some(api_key);
    }

    /// Returns the API key for a provider, if a non-blank one is present.
    pub fn provider_api_key(&self, id: ProviderId) -> Option<&str> {
        self.provider_config(id)
            .and_then(|cfg| cfg.api_key.as_deref())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_provider_configured(&self, id: ProviderId) -> bool {
        self.provider_api_key(id).is_some()
    }

    pub fn provider_base_url(&self, id: ProviderId) -> &str {
        self.provider_config(id)
            .and_then(|cfg| cfg.base_url.as_deref())
            .unwrap_or_else(|| id.default_base_url())
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "morning-dashboard", "dashboard")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_tromso() {
        let cfg = Config::default();
        let fallback = cfg.location.fallback.to_result();

        assert_eq!(fallback.city, "Tromsø");
        assert_eq!(fallback.source, LocationSource::Fallback);
        assert!(fallback.is_complete());
        assert!(cfg.location.ip_lookup);
    }

    #[test]
    fn blank_api_key_is_not_configured() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "   ".into());
        assert!(!cfg.is_provider_configured(ProviderId::WeatherApi));

        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".into());
        assert_eq!(cfg.provider_api_key(ProviderId::WeatherApi), Some("KEY"));
    }

    #[test]
    fn env_overrides_key_and_bind() {
        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "FROM_FILE".into());

        cfg.apply_env_with(|key| match key {
            WEATHER_API_KEY_ENV => Some("FROM_ENV".to_string()),
            BIND_ENV => Some("0.0.0.0:8080".to_string()),
            _ => None,
        });

        assert_eq!(cfg.provider_api_key(ProviderId::WeatherApi), Some("FROM_ENV"));
        assert_eq!(cfg.server.bind, "0.0.0.0:8080");
    }

    #[test]
    fn base_url_falls_back_to_provider_default() {
        let mut cfg = Config::default();
        assert_eq!(
            cfg.provider_base_url(ProviderId::Quotable),
            ProviderId::Quotable.default_base_url()
        );

        cfg.providers.insert(
            "quotable".into(),
            ProviderConfig {
                api_key: None,
                base_url: Some("http://localhost:9999".into()),
            },
        );
        assert_eq!(cfg.provider_base_url(ProviderId::Quotable), "http://localhost:9999");
    }

    #[test]
    fn save_and_load_roundtrip_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.location.ip_lookup = false;
        cfg.location.fallback = StaticLocation {
            city: "Bogotá".into(),
            latitude: "4.711".into(),
            longitude: "-74.0721".into(),
            country: "CO".into(),
            region: "Bogotá D.C.".into(),
        };
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".into());
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[location]\nip_lookup = false\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();
        assert!(!cfg.location.ip_lookup);
        assert_eq!(cfg.location.fallback, StaticLocation::default());
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn partial_fallback_table_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[location.fallback]\ncity = \"Medellín\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));
    }

    #[test]
    fn blank_fallback_field_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "[location.fallback]\ncity = \"\"\nlatitude = \"6.2442\"\nlongitude = \"-75.5812\"\ncountry = \"CO\"\nregion = \"Antioquia\"\n",
        )
        .unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Fallback location must have"));
    }

    #[test]
    fn complete_fallback_table_is_used_verbatim() {
        let cfg: Config = toml::from_str(
            "[location.fallback]\ncity = \"Medellín\"\nlatitude = \"6.2442\"\nlongitude = \"-75.5812\"\ncountry = \"CO\"\nregion = \"Antioquia\"\n",
        )
        .unwrap();

        cfg.validate().unwrap();
        let fallback = cfg.location.fallback.to_result();
        assert_eq!(fallback.latitude, "6.2442");
        assert_eq!(fallback.region, "Antioquia");
    }

    #[test]
    fn unknown_or_misnamed_provider_sections_are_rejected() {
        let mut cfg = Config::default();
        cfg.providers.insert("openweather".into(), ProviderConfig::default());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));

        let mut cfg = Config::default();
        cfg.providers.insert("ipapi".into(), ProviderConfig::default());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("[providers.ip-api]"));

        let mut cfg = Config::default();
        cfg.upsert_provider_api_key(ProviderId::WeatherApi, "KEY".into());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }
}
