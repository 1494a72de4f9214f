//! Database connection settings.
//!
//! Built once at startup from the process environment and handed explicitly
//! to the sink. The binary loads `.env` into the environment beforehand.

use std::env;
use std::fmt;

use sqlx::postgres::PgConnectOptions;

use crate::error::{ConfigError, ConfigResult};

pub const DB_USER: &str = "DB_USER";
pub const DB_PASSWORD: &str = "DB_PASSWORD";
pub const DB_HOST: &str = "DB_HOST";
pub const DB_PORT: &str = "DB_PORT";
pub const DB_NAME: &str = "DB_NAME";

/// PostgreSQL connection parameters. All fields are mandatory.
#[derive(Clone, PartialEq)]
pub struct DbConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    pub name: String,
}

impl DbConfig {
    /// Load from process environment variables.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Empty values count as missing.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let need = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| ConfigError::Missing(key.to_string()))
        };

        let port_raw = need(DB_PORT)?;
        let port = port_raw.trim().parse().map_err(|_| ConfigError::InvalidPort {
            key: DB_PORT.to_string(),
            value: port_raw.clone(),
        })?;

        Ok(Self {
            user: need(DB_USER)?,
            password: need(DB_PASSWORD)?,
            host: need(DB_HOST)?,
            port,
            name: need(DB_NAME)?,
        })
    }

    /// Connection options for sqlx. No URL is formatted, so credentials
    /// need no escaping.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.user)
            .password(&self.password)
            .database(&self.name)
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("user", &self.user)
            .field("password", &"***")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("name", &self.name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full() -> HashMap<String, String> {
        vars(&[
            (DB_USER, "etl"),
            (DB_PASSWORD, "s3cr:t@"),
            (DB_HOST, "localhost"),
            (DB_PORT, "5432"),
            (DB_NAME, "shop"),
        ])
    }

    #[test]
    fn test_from_lookup() {
        let env = full();
        let cfg = DbConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        assert_eq!(cfg.port, 5432);
        assert_eq!(cfg.password, "s3cr:t@");
        assert_eq!(cfg.name, "shop");
    }

    #[test]
    fn test_each_key_is_mandatory() {
        for key in [DB_USER, DB_PASSWORD, DB_HOST, DB_PORT, DB_NAME] {
            let mut env = full();
            env.remove(key);
            let err = DbConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
            assert!(matches!(err, ConfigError::Missing(ref k) if k == key), "{key}");
        }
    }

    #[test]
    fn test_empty_value_is_missing() {
        let mut env = full();
        env.insert(DB_HOST.into(), String::new());
        let err = DbConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(_)));
    }

    #[test]
    fn test_invalid_port() {
        let mut env = full();
        env.insert(DB_PORT.into(), "post-gres".into());
        let err = DbConfig::from_lookup(|k| env.get(k).cloned()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
    }

    #[test]
    fn test_debug_redacts_password() {
        let env = full();
        let cfg = DbConfig::from_lookup(|k| env.get(k).cloned()).unwrap();
        let shown = format!("{:?}", cfg);
        assert!(!shown.contains("s3cr:t@"));
        assert!(shown.contains("localhost"));
    }
}
