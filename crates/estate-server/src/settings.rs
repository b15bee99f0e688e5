//! Server configuration.
//!
//! Values come from an optional `estate.toml` next to the binary and are
//! overridden by `ESTATE__*` environment variables, for example
//! `ESTATE__CACHE__BACKEND=redis` or `ESTATE__SERVER__PORT=9000`.

use std::net::{AddrParseError, SocketAddr};
use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File, FileFormat};
use estate_cache::CacheSettings;
use serde::Deserialize;

const DEFAULT_CONFIG_FILE: &str = "estate";
const ENV_PREFIX: &str = "ESTATE";

/// Top-level settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub cache: CacheSettings,
    pub data: DataSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

/// Where the repository gets its initial listings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// JSON array of property records loaded at startup.
    pub seed_file: Option<PathBuf>,
}

impl Settings {
    /// Loads `estate.toml` (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder(File::with_name(DEFAULT_CONFIG_FILE).required(false))
    }

    /// Loads settings from a TOML document plus the environment.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        Self::builder(File::from_str(toml, FileFormat::Toml))
    }

    fn builder<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
