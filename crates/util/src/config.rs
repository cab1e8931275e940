//! Application configuration.
//!
//! Settings live in a JSON file (`<config_dir>/flickrview/config.json`,
//! overridable with `FLICKRVIEW_CONFIG_PATH`). Environment variables take
//! precedence over the file so deployments can inject secrets without
//! writing them to disk.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dirs_next::config_dir;
use flickrview_types::{AccessToken, Credentials, Permission};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::expand_tilde;

pub const CONFIG_PATH_ENV: &str = "FLICKRVIEW_CONFIG_PATH";
pub const API_KEY_ENV: &str = "FLICKR_KEY";
pub const API_SECRET_ENV: &str = "FLICKR_SECRET";
pub const ACCESS_TOKEN_ENV: &str = "FLICKR_ACCESS_TOKEN";
pub const ACCESS_SECRET_ENV: &str = "FLICKR_ACCESS_SECRET";
pub const API_BASE_ENV: &str = "FLICKR_API_BASE";
pub const BIND_ADDRESS_ENV: &str = "FLICKRVIEW_BIND";
pub const PEOPLE_PATH_ENV: &str = "FLICKRVIEW_PEOPLE_PATH";

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:8000";

/// Errors surfaced while loading or persisting configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config file {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("missing {0}; set it in the config file or the environment")]
    MissingCredential(&'static str),
}

/// Persisted application settings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<AccessToken>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bind_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_path: Option<PathBuf>,
}

impl AppConfig {
    /// Load from the default path and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from_path(&default_config_path())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from a specific file; a missing file yields the defaults.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(&default_config_path())
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, content).map_err(io_error)
    }

    /// Overlay non-empty environment variables onto the loaded values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = non_empty_env(API_KEY_ENV) {
            self.api_key = Some(value);
        }
        if let Some(value) = non_empty_env(API_SECRET_ENV) {
            self.api_secret = Some(value);
        }
        if let (Some(token), Some(secret)) = (non_empty_env(ACCESS_TOKEN_ENV), non_empty_env(ACCESS_SECRET_ENV)) {
            self.access_token = Some(AccessToken {
                token,
                secret,
                perms: Permission::Read,
                user_nsid: None,
                username: None,
            });
        }
        if let Some(value) = non_empty_env(API_BASE_ENV) {
            self.api_base = Some(value);
        }
        if let Some(value) = non_empty_env(BIND_ADDRESS_ENV) {
            self.bind_address = Some(value);
        }
        if let Some(value) = non_empty_env(PEOPLE_PATH_ENV) {
            self.people_path = Some(expand_tilde(&value));
        }
    }

    /// Consumer credentials plus the stored access token, if any.
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(API_KEY_ENV))?;
        let api_secret = self
            .api_secret
            .clone()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(ConfigError::MissingCredential(API_SECRET_ENV))?;
        Ok(Credentials {
            api_key,
            api_secret,
            access_token: self.access_token.clone(),
        })
    }

    pub fn bind_address(&self) -> &str {
        self.bind_address.as_deref().unwrap_or(DEFAULT_BIND_ADDRESS)
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Get the default path for the configuration file.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV)
        && !path.trim().is_empty()
    {
        return expand_tilde(&path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flickrview")
        .join("config.json")
}
