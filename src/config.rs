use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::window::DEFAULT_LOOKBACK_SECS;
use crate::{OPENSEA_API_BASE, RKL_CONTRACT_ADDRESS, TWITTER_API_BASE};

/// Default config file path.
pub const CONFIG_PATH: &str = "config.toml";

/// Top-level application config: tunables from `config.toml`, secrets from the environment.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub settings: SettingsConfig,
    pub credentials: Credentials,
}

/// Runtime settings. Every field has a default, so the file is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// How far back each pass looks, in seconds. Must exceed the scheduling interval.
    pub lookback_secs: u64,
    /// Page size of the events request.
    pub event_limit: u32,
    /// Interval between passes in `--watch` mode.
    pub poll_interval_secs: u64,
    /// Per-request timeout for every outbound HTTP call.
    pub http_timeout_secs: u64,
    /// How long a sale stays in the watch-mode seen set.
    pub dedup_retention_secs: u64,
    pub contract_address: String,
    pub opensea_api_base: String,
    pub twitter_api_base: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            lookback_secs: DEFAULT_LOOKBACK_SECS as u64,
            event_limit: 50,
            poll_interval_secs: 180,
            http_timeout_secs: 30,
            dedup_retention_secs: 3600,
            contract_address: RKL_CONTRACT_ADDRESS.to_string(),
            opensea_api_base: OPENSEA_API_BASE.to_string(),
            twitter_api_base: TWITTER_API_BASE.to_string(),
        }
    }
}

/// Secrets read once at startup. Missing values only fail at first use.
#[derive(Clone, Default)]
pub struct Credentials {
    pub channel_url: Option<String>,
    pub twitter_api_key: Option<String>,
    pub twitter_api_secret: Option<String>,
    pub twitter_access_token: Option<String>,
    pub twitter_access_token_secret: Option<String>,
    pub opensea_api_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &Option<String>| if v.is_some() { "<set>" } else { "<unset>" };
        f.debug_struct("Credentials")
            .field("channel_url", &set(&self.channel_url))
            .field("twitter_api_key", &set(&self.twitter_api_key))
            .field("twitter_api_secret", &set(&self.twitter_api_secret))
            .field("twitter_access_token", &set(&self.twitter_access_token))
            .field(
                "twitter_access_token_secret",
                &set(&self.twitter_access_token_secret),
            )
            .field("opensea_api_key", &set(&self.opensea_api_key))
            .finish()
    }
}

impl Credentials {
    /// Read credentials from the process environment, after loading `.env`.
    pub fn from_env() -> Self {
        // dotenvy loads .env, but doesn't override already-set env vars
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            channel_url: get("CHANNEL_URL"),
            twitter_api_key: get("API_KEY"),
            twitter_api_secret: get("API_SECRET"),
            twitter_access_token: get("ACCESS_TOKEN"),
            twitter_access_token_secret: get("ACCESS_TOKEN_SECRET"),
            opensea_api_key: get("OPENSEA_API_KEY"),
        }
    }

    pub fn channel_url(&self) -> Result<&str> {
        required(&self.channel_url, "CHANNEL_URL")
    }

    pub fn opensea_api_key(&self) -> Result<&str> {
        required(&self.opensea_api_key, "OPENSEA_API_KEY")
    }

    pub fn twitter_api_key(&self) -> Result<&str> {
        required(&self.twitter_api_key, "API_KEY")
    }

    pub fn twitter_api_secret(&self) -> Result<&str> {
        required(&self.twitter_api_secret, "API_SECRET")
    }

    pub fn twitter_access_token(&self) -> Result<&str> {
        required(&self.twitter_access_token, "ACCESS_TOKEN")
    }

    pub fn twitter_access_token_secret(&self) -> Result<&str> {
        required(&self.twitter_access_token_secret, "ACCESS_TOKEN_SECRET")
    }
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str> {
    value
        .as_deref()
        .with_context(|| format!("environment variable {name} is not set"))
}

impl SettingsConfig {
    /// Load settings from the given TOML file path.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let settings: Self = toml::from_str(&contents)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(settings)
    }

    /// Load settings if the file exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }
}

impl AppConfig {
    /// Load settings from `path` (optional) and credentials from the environment.
    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self {
            settings: SettingsConfig::load_or_default(path)?,
            credentials: Credentials::from_env(),
        })
    }
}
