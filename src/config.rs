//! Backend server configuration.
//!
//! Built once per process and read-only afterwards. Loading is layered in the
//! usual way: an optional `memotag.toml` file, then `MEMOTAG_*` environment
//! variables.

use std::collections::BTreeMap;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::CacheError;

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 11211;
const DEFAULT_WEIGHT: u32 = 0;
const LOCAL_CONFIG_BASENAME: &str = "memotag";
const ENV_PREFIX: &str = "MEMOTAG";

/// Connection settings for the shared key-value backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend hostname.
    pub host: String,
    /// Backend port.
    pub port: u16,
    /// Relative weight within a server pool.
    pub weight: u32,
    /// Optional SASL username.
    pub username: Option<String>,
    /// Optional SASL password.
    pub password: Option<String>,
    /// Client options passed through to the backend driver.
    pub options: BTreeMap<String, String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            weight: DEFAULT_WEIGHT,
            username: None,
            password: None,
            options: BTreeMap::new(),
        }
    }
}

impl ServerConfig {
    /// Load configuration with layered precedence (file, then environment).
    pub fn load() -> Result<Self, CacheError> {
        let settings = Config::builder()
            .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .map_err(|err| CacheError::configuration(err.to_string()))?;

        settings
            .try_deserialize()
            .map_err(|err| CacheError::configuration(err.to_string()))
    }

    /// `host:port` form used when registering the server with a client.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether SASL credentials were supplied.
    pub fn has_credentials(&self) -> bool {
        self.username.is_some() && self.password.is_some()
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use super::*;

    #[test]
    fn default_values() {
        let config = ServerConfig::default();

        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 11211);
        assert_eq!(config.weight, 0);
        assert!(config.username.is_none());
        assert!(config.password.is_none());
        assert!(config.options.is_empty());
        assert!(!config.has_credentials());
    }

    #[test]
    fn address_joins_host_and_port() {
        let config = ServerConfig {
            host: "cache.internal".to_string(),
            port: 11212,
            ..Default::default()
        };

        assert_eq!(config.address(), "cache.internal:11212");
    }

    #[test]
    #[serial]
    fn load_uses_defaults_without_sources() {
        unsafe {
            std::env::remove_var("MEMOTAG_HOST");
            std::env::remove_var("MEMOTAG_PORT");
        }

        let config = ServerConfig::load().expect("load");
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 11211);
    }

    #[test]
    #[serial]
    fn load_honors_environment_overrides() {
        unsafe {
            std::env::set_var("MEMOTAG_HOST", "cache.internal");
            std::env::set_var("MEMOTAG_PORT", "11300");
        }

        let config = ServerConfig::load().expect("load");
        assert_eq!(config.host, "cache.internal");
        assert_eq!(config.port, 11300);

        unsafe {
            std::env::remove_var("MEMOTAG_HOST");
            std::env::remove_var("MEMOTAG_PORT");
        }
    }
}
