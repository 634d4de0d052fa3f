use serde::Deserialize;
use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::constants::{binance, env, logging};
use crate::error::ConfigError;
use crate::exchange::types::TimeInForce;

#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BinanceConfig {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub base_url: String,
    pub recv_window_ms: u64,
    pub timeout_secs: u64,
}

impl Default for BinanceConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            secret_key: None,
            base_url: binance::TESTNET_BASE_URL.to_string(),
            recv_window_ms: binance::DEFAULT_RECV_WINDOW_MS,
            timeout_secs: binance::DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl BinanceConfig {
    /// API key and secret, both required before anything is sent.
    pub fn credentials(&self) -> Result<(&str, &str), ConfigError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(ConfigError::MissingVar(env::API_KEY))?;
        let secret = self
            .secret_key
            .as_deref()
            .ok_or(ConfigError::MissingVar(env::API_SECRET))?;
        Ok((key, secret))
    }
}

// Keep the secret out of logs.
impl fmt::Debug for BinanceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinanceConfig")
            .field("api_key", &self.api_key.as_ref().map(|k| mask(k)))
            .field("secret_key", &self.secret_key.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("recv_window_ms", &self.recv_window_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn mask(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}***", visible)
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OrderDefaults {
    /// Applied to every LIMIT order; never taken from the command line.
    pub time_in_force: TimeInForce,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: PathBuf,
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(logging::DEFAULT_DIR),
            level: logging::DEFAULT_LEVEL.to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub binance: BinanceConfig,
    pub orders: OrderDefaults,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Loads `.env`, then the optional YAML file at `path`, then applies
    /// environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let content = match fs::read_to_string(path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        Self::from_sources(content.as_deref(), |key| std::env::var(key).ok())
    }

    /// Pure resolution from file contents and an environment lookup.
    pub fn from_sources<F>(file: Option<&str>, env_lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(content) => {
                // Strip BOM if present
                let content = content.strip_prefix('\u{feff}').unwrap_or(content);
                if content.trim().is_empty() {
                    AppConfig::default()
                } else {
                    serde_yaml::from_str(content)?
                }
            }
            None => AppConfig::default(),
        };

        let lookup = |key: &str| env_lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = lookup(env::API_KEY) {
            config.binance.api_key = Some(v);
        }
        if let Some(v) = lookup(env::API_SECRET) {
            config.binance.secret_key = Some(v);
        }
        if let Some(v) = lookup(env::BASE_URL) {
            config.binance.base_url = v;
        }
        if let Some(v) = lookup(env::RECV_WINDOW_MS) {
            config.binance.recv_window_ms = parse_number(env::RECV_WINDOW_MS, &v)?;
        }
        if let Some(v) = lookup(env::TIMEOUT_SECS) {
            config.binance.timeout_secs = parse_number(env::TIMEOUT_SECS, &v)?;
        }
        if let Some(v) = lookup(env::TIME_IN_FORCE) {
            config.orders.time_in_force = v.parse().map_err(|_| ConfigError::Invalid {
                key: env::TIME_IN_FORCE,
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup(env::LOG_DIR) {
            config.logging.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup(env::LOG_LEVEL) {
            config.logging.level = v;
        }

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.binance;
        if b.api_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingVar(env::API_KEY));
        }
        if b.secret_key.as_deref().is_some_and(|k| k.trim().is_empty()) {
            return Err(ConfigError::MissingVar(env::API_SECRET));
        }
        if !(b.base_url.starts_with("http://") || b.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: env::BASE_URL,
                value: b.base_url.clone(),
            });
        }
        if b.recv_window_ms == 0 || b.recv_window_ms > binance::MAX_RECV_WINDOW_MS {
            return Err(ConfigError::Invalid {
                key: env::RECV_WINDOW_MS,
                value: b.recv_window_ms.to_string(),
            });
        }
        if b.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                key: env::TIMEOUT_SECS,
                value: b.timeout_secs.to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}
