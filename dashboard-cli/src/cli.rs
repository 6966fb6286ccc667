use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, Password};
use std::{io::IsTerminal, path::PathBuf};

use dashboard_core::{
    Config, DashboardClient, Preferences, ProviderId, RetryPolicy,
    store::{FileStore, KeyValueStore},
};

use crate::{render, server};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "dashboard", version, about = "Morning dashboard: greeting, weather and a quote")]
pub struct Cli {
    /// Path to the config file (defaults to the platform config directory).
    #[arg(long, global = true, env = "DASHBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConsentChoice {
    Yes,
    No,
    Reset,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Serve the location, weather and quote endpoints.
    Serve {
        /// Address to listen on, e.g. "0.0.0.0:3000".
        #[arg(long)]
        bind: Option<String>,
    },

    /// Show the dashboard, fetched from a running server.
    Show {
        #[arg(long, env = "DASHBOARD_URL", default_value = "http://127.0.0.1:3000")]
        server: String,

        /// Allow IP-based location for this run without storing the choice.
        #[arg(long)]
        use_ip: Option<bool>,
    },

    /// Store the WeatherAPI.com key and location settings.
    Configure,

    /// Set the name used in the greeting.
    Name { name: String },

    /// Record whether IP-based location may be used.
    Consent { choice: ConsentChoice },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Serve { bind } => {
                let mut config = load_config(self.config.as_ref())?;
                config.apply_env();
                if let Some(bind) = bind {
                    config.server.bind = bind;
                }
                server::serve(config).await
            }
            Command::Show { server, use_ip } => show(&server, use_ip).await,
            Command::Configure => configure(self.config.as_ref()),
            Command::Name { name } => {
                let mut prefs = Preferences::new(FileStore::open_default()?);
                prefs.set_user_name(&name)?;
                println!("Hello, {}!", name.trim());
                Ok(())
            }
            Command::Consent { choice } => {
                let mut prefs = Preferences::new(FileStore::open_default()?);
                match choice {
                    ConsentChoice::Yes => prefs.set_consent(true)?,
                    ConsentChoice::No => prefs.set_consent(false)?,
                    ConsentChoice::Reset => prefs.clear_consent()?,
                }
                println!("Location consent: {}", describe_consent(prefs.consent()));
                Ok(())
            }
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

fn describe_consent(consent: Option<bool>) -> &'static str {
    match consent {
        Some(true) => "IP-based location allowed",
        Some(false) => "default location only",
        None => "not chosen yet",
    }
}

/// Stored consent, asking once when nothing is stored and a terminal is attached.
fn resolve_consent<S: KeyValueStore>(prefs: &mut Preferences<S>) -> anyhow::Result<bool> {
    if let Some(consent) = prefs.consent() {
        return Ok(consent);
    }

    if !std::io::stdin().is_terminal() {
        return Ok(false);
    }

    let consent = Confirm::new("Use your IP address for an approximate location?")
        .with_default(false)
        .with_help_message("Otherwise the dashboard shows the default location (Tromsø, Norway).")
        .prompt()
        .context("Failed to read consent")?;

    prefs.set_consent(consent)?;
    Ok(consent)
}

async fn show(server: &str, use_ip: Option<bool>) -> anyhow::Result<()> {
    let mut prefs = Preferences::new(FileStore::open_default()?);

    let consent = match use_ip {
        Some(consent) => consent,
        None => resolve_consent(&mut prefs)?,
    };

    let client = DashboardClient::new(server, RetryPolicy::default())?;
    let snapshot = client.load(consent).await;

    let name = prefs.user_name();
    println!(
        "{}",
        render::render(&snapshot, name.as_deref(), &chrono::Local::now())
    );
    Ok(())
}

fn configure(path: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut config = load_config(path)?;

    let key = Password::new("WeatherAPI.com API key:")
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.upsert_provider_api_key(ProviderId::WeatherApi, key.trim().to_string());
    }

    config.location.ip_lookup = Confirm::new("Allow IP-based location lookups (with user consent)?")
        .with_default(config.location.ip_lookup)
        .prompt()
        .context("Failed to read IP lookup setting")?;

    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }

    println!(
        "Configuration saved. Weather provider configured: {}",
        config.is_provider_configured(ProviderId::WeatherApi)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::store::MemoryStore;

    #[test]
    fn parses_show_with_consent_override() {
        let cli = Cli::parse_from(["dashboard", "show", "--use-ip", "true"]);
        match cli.command {
            Command::Show { use_ip, .. } => assert_eq!(use_ip, Some(true)),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn parses_consent_choice() {
        let cli = Cli::parse_from(["dashboard", "consent", "reset"]);
        assert!(matches!(
            cli.command,
            Command::Consent {
                choice: ConsentChoice::Reset
            }
        ));
    }

    #[test]
    fn stored_consent_skips_prompt() {
        let mut prefs = Preferences::new(MemoryStore::default());
        prefs.set_consent(true).unwrap();
        assert!(resolve_consent(&mut prefs).unwrap());
    }

    #[test]
    fn consent_descriptions() {
        assert_eq!(describe_consent(None), "not chosen yet");
        assert_eq!(describe_consent(Some(false)), "default location only");
    }
}
