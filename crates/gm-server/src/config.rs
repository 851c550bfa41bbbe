//! Server configuration read from the environment.
//!
//! - `GM_DB_PATH`: SQLite database file path (default: "genetic_method.db")
//! - `GM_PORT`: server listen port (default: 3000)
//! - `GM_SEED_PATH`: optional JSON snapshot applied at start

use std::path::PathBuf;

pub const DEFAULT_DB_PATH: &str = "genetic_method.db";
pub const DEFAULT_PORT: u16 = 3000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid GM_PORT '{value}': expected a port number")]
    InvalidPort { value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub db_path: String,
    pub port: u16,
    pub seed_path: Option<PathBuf>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let db_path = lookup("GM_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());
        let port = match lookup("GM_PORT") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort { value })?,
            None => DEFAULT_PORT,
        };
        let seed_path = lookup("GM_SEED_PATH")
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Ok(ServerConfig {
            db_path,
            port,
            seed_path,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.db_path, DEFAULT_DB_PATH);
        assert_eq!(config.port, DEFAULT_PORT);
        assert!(config.seed_path.is_none());
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn variables_override_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("GM_DB_PATH", "/tmp/ga.db"),
            ("GM_PORT", "8080"),
            ("GM_SEED_PATH", "seed.json"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, "/tmp/ga.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed_path, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn bad_port_is_rejected() {
        let err = ServerConfig::from_lookup(lookup(&[("GM_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { ref value } if value == "http"));
    }
}
