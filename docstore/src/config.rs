use std::env;
use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_BIND: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is not a valid socket address: '{value}'")]
    InvalidBind { name: &'static str, value: String },

    #[error("{name} must be a positive number of bytes: '{value}'")]
    InvalidUploadLimit { name: &'static str, value: String },
}

/// Runtime settings, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub bind: SocketAddr,
    pub max_upload_bytes: usize,
}

impl Config {
    /// Read `DATABASE_URL`, `DOCSTORE_BIND` and `DOCSTORE_MAX_UPLOAD_BYTES`.
    ///
    /// # Errors
    ///
    /// When a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind = lookup("DOCSTORE_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind.parse().map_err(|_| ConfigError::InvalidBind {
            name: "DOCSTORE_BIND",
            value: bind.clone(),
        })?;

        let max_upload_bytes = match lookup("DOCSTORE_MAX_UPLOAD_BYTES") {
            None => DEFAULT_MAX_UPLOAD_BYTES,
            Some(value) => match value.trim().parse::<usize>() {
                Ok(bytes) if bytes > 0 => bytes,
                _ => {
                    return Err(ConfigError::InvalidUploadLimit {
                        name: "DOCSTORE_MAX_UPLOAD_BYTES",
                        value,
                    });
                }
            },
        };

        Ok(Self {
            database_url,
            bind,
            max_upload_bytes,
        })
    }
}
