//! Server settings read from the environment.

use std::env;
use std::path::PathBuf;

use wastelog_core::backend::BackendKind;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";
/// Default listen port.
pub const DEFAULT_PORT: u16 = 8080;
/// Default directory for the JSON store.
pub const DEFAULT_DATA_DIR: &str = "data";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Invalid environment settings.
pub enum ConfigError {
    /// `PORT` is not a valid port number.
    #[error("PORT must be a number between 0 and 65535, got {0:?}")]
    InvalidPort(String),
    /// `WASTELOG_STORE` names no known backend.
    #[error("WASTELOG_STORE must be \"json\" or \"memory\", got {0:?}")]
    UnknownStore(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything needed to start the server.
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`).
    pub bind_addr: String,
    /// Port to bind (`PORT`).
    pub port: u16,
    /// Store backend (`WASTELOG_STORE`).
    pub store: BackendKind,
    /// JSON store directory (`WASTELOG_DATA_DIR`).
    pub data_dir: PathBuf,
}

impl ServerConfig {
    /// Read settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank variables fall back to defaults.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when a variable is set to an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match read("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_parse| ConfigError::InvalidPort(raw))?,
            None => DEFAULT_PORT,
        };

        let store = match read("WASTELOG_STORE") {
            Some(raw) => raw
                .trim()
                .to_lowercase()
                .parse()
                .map_err(|_parse| ConfigError::UnknownStore(raw))?,
            None => BackendKind::default(),
        };

        Ok(Self {
            bind_addr: read("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_owned()),
            port,
            store,
            data_dir: read("WASTELOG_DATA_DIR")
                .map_or_else(|| PathBuf::from(DEFAULT_DATA_DIR), PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).expect("defaults");
        assert_eq!(config.bind_addr, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.store, BackendKind::Json);
        assert_eq!(config.data_dir, PathBuf::from("data"));
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("BIND_ADDR", "0.0.0.0"),
            ("PORT", "9000"),
            ("WASTELOG_STORE", "Memory"),
            ("WASTELOG_DATA_DIR", "/var/lib/wastelog"),
        ])
        .expect("valid config");
        assert_eq!(config.bind_addr, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert_eq!(config.store, BackendKind::Memory);
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/wastelog"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            config_from(&[("PORT", "eighty")]),
            Err(ConfigError::InvalidPort("eighty".to_owned()))
        );
        assert_eq!(
            config_from(&[("WASTELOG_STORE", "postgres")]),
            Err(ConfigError::UnknownStore("postgres".to_owned()))
        );
    }
}
