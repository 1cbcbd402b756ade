//! Configuration

use std::env;
use std::path::PathBuf;

use thiserror::Error;

/// Environment variable naming the backend base URL.
pub const API_URL_VAR: &str = "VITRINE_API_URL";

/// Environment variable naming the cart snapshot directory.
pub const STORAGE_DIR_VAR: &str = "VITRINE_STORAGE_DIR";

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required environment variable is missing or empty.
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
}

/// Storefront configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend API, without a trailing slash requirement.
    pub api_base_url: String,

    /// Directory holding the persisted cart snapshot.
    pub storage_dir: PathBuf,
}

impl Config {
    /// Builds a configuration directly from its parts.
    #[must_use]
    pub fn new(api_base_url: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            api_base_url: api_base_url.into(),
            storage_dir: storage_dir.into(),
        }
    }

    /// Reads configuration from the environment, loading a `.env` file
    /// first when one is present.
    ///
    /// The storage directory defaults to the current directory.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when [`API_URL_VAR`] is unset or empty.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _env = dotenvy::dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_base_url = lookup(API_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or(ConfigError::MissingVar(API_URL_VAR))?;

        let storage_dir = lookup(STORAGE_DIR_VAR)
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from("."), PathBuf::from);

        Ok(Self {
            api_base_url,
            storage_dir,
        })
    }
}
