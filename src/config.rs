//! Process configuration, read from the environment.
//!
//! A `.env` file in the working directory is loaded first when present.
//!
//! | Variable        | Default      |
//! |-----------------|--------------|
//! | `DATABASE_PATH` | `banking.db` |
//! | `APP_HOST`      | `0.0.0.0`    |
//! | `APP_PORT`      | `8000`       |
//! | `LOG_LEVEL`     | `info`       |
//! | `LOG_JSON`      | `false`      |

use std::env;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SQLite database file, or ":memory:"
    pub database_path: String,
    pub app_host: String,
    pub app_port: u16,
    /// Default tracing filter; RUST_LOG takes precedence
    pub log_level: String,
    pub log_json: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "banking.db".to_string(),
            app_host: "0.0.0.0".to_string(),
            app_port: 8000,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let app_port = match lookup("APP_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue {
                    key: "APP_PORT".to_string(),
                    message: e.to_string(),
                }
            })?,
            None => defaults.app_port,
        };

        let log_json = match lookup("LOG_JSON") {
            Some(raw) => parse_bool("LOG_JSON", &raw)?,
            None => defaults.log_json,
        };

        Ok(Self {
            database_path: lookup("DATABASE_PATH").unwrap_or(defaults.database_path),
            app_host: lookup("APP_HOST").unwrap_or(defaults.app_host),
            app_port,
            log_level: lookup("LOG_LEVEL").unwrap_or(defaults.log_level),
            log_json,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.app_host, self.app_port)
    }
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected a boolean, got '{}'", raw),
        }),
    }
}
