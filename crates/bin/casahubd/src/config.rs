//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `casahub.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::net::Ipv4Addr;
use std::time::Duration;

use serde::Deserialize;

use casahub_domain::family::Family;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Hub core settings.
    pub hub: HubSettings,
    /// Background discovery settings.
    pub autofind: AutofindConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

/// Hub core configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Subnet broadcast address used for discovery. Must end in `.255`.
    pub broadcast: Ipv4Addr,
    /// Families to discover, in declaration order.
    pub families: Vec<Family>,
    /// Upper bound in seconds on each provider call.
    pub call_timeout_secs: u64,
}

/// Background discovery configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AutofindConfig {
    /// Run discovery continuously in the background.
    pub enabled: bool,
    /// Seconds between consecutive passes.
    pub interval_secs: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `casahub.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if
    /// the resulting configuration fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("casahub.toml")?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CASAHUB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CASAHUB_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }
        if let Ok(val) = std::env::var("CASAHUB_BROADCAST") {
            self.hub.broadcast = val
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid broadcast address '{val}'")))?;
        }
        if let Ok(val) = std::env::var("CASAHUB_FAMILIES") {
            self.hub.families = val
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| {
                    name.parse()
                        .map_err(|_| ConfigError::Validation(format!("unknown family '{name}'")))
                })
                .collect::<Result<_, _>>()?;
        }
        if let Ok(val) = std::env::var("CASAHUB_AUTOFIND_INTERVAL") {
            if let Ok(secs) = val.parse() {
                self.autofind.interval_secs = secs;
            }
        }
        if let Ok(val) = std::env::var("CASAHUB_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.hub.broadcast.octets()[3] != 255 {
            return Err(ConfigError::Validation(format!(
                "'{}' is not a subnet broadcast address: must end with '.255'",
                self.hub.broadcast
            )));
        }
        if self.hub.families.is_empty() {
            return Err(ConfigError::Validation(
                "at least one family must be enabled".to_string(),
            ));
        }
        if self.hub.call_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "call timeout must be non-zero".to_string(),
            ));
        }
        if self.autofind.enabled && self.autofind.interval_secs == 0 {
            return Err(ConfigError::Validation(
                "autofind interval must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Upper bound on each provider call.
    #[must_use]
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.hub.call_timeout_secs)
    }

    /// Pause between autofind passes.
    #[must_use]
    pub fn autofind_interval(&self) -> Duration {
        Duration::from_secs(self.autofind.interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 12345,
        }
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            broadcast: Ipv4Addr::new(255, 255, 255, 255),
            families: vec![Family::KasaPlug, Family::WizLight],
            call_timeout_secs: 10,
        }
    }
}

impl Default for AutofindConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 30,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "casahubd=info,casahub=info,tower_http=debug".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
