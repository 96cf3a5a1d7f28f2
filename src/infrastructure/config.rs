//! Configuration management
//!
//! Configuration is read from an optional YAML file and then overlaid with
//! environment variables:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `GOCD_SERVER_URL` | `server.base_url` |
//! | `GOCD_USERNAME` | `server.username` |
//! | `GOCD_PASSWORD` | `server.password` |
//! | `GOCD_TOKEN` | `server.bearer_token` |
//! | `GOCD_PLUGIN_CACHE` | `cache_dir` |
//! | `GOCD_JAVA` | `java` |

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    Read {
        /// Config file path.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// Config file is not valid YAML for [`Config`]
    #[error("failed to parse config file '{path}': {source}")]
    Parse {
        /// Config file path.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },

    /// A field has an unusable value
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Plugin cache directory; `~/.gocd/plugins` if unset
    pub cache_dir: Option<PathBuf>,
    /// Java executable used to run plugins
    pub java: String,
    /// Log level
    pub log_level: String,
    /// Overall validation timeout in seconds
    pub timeout_secs: Option<u64>,
    /// GoCD server used for plugin version lookup
    pub server: Option<ServerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_dir: None,
            java: "java".to_string(),
            log_level: "info".to_string(),
            timeout_secs: None,
            server: None,
        }
    }
}

impl Config {
    /// Loads configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides read through `lookup`
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("GOCD_PLUGIN_CACHE") {
            self.cache_dir = Some(PathBuf::from(dir));
        }
        if let Some(java) = lookup("GOCD_JAVA") {
            self.java = java;
        }

        let url = lookup("GOCD_SERVER_URL");
        if url.is_some() || self.server.is_some() {
            let server = self.server.get_or_insert_with(ServerConfig::default);
            if let Some(url) = url {
                server.base_url = url;
            }
            if let Some(username) = lookup("GOCD_USERNAME") {
                server.username = Some(username);
            }
            if let Some(password) = lookup("GOCD_PASSWORD") {
                server.password = Some(password);
            }
            if let Some(token) = lookup("GOCD_TOKEN") {
                server.bearer_token = Some(token);
            }
        }

        self.validate()?;
        Ok(self)
    }

    /// Overall timeout, if configured
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Checks field combinations
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.java.trim().is_empty() {
            return Err(ConfigError::Invalid("java must not be empty".to_string()));
        }
        if self.timeout_secs == Some(0) {
            return Err(ConfigError::Invalid(
                "timeout_secs must be positive".to_string(),
            ));
        }
        if let Some(server) = &self.server {
            server.validate()?;
        }
        Ok(())
    }
}

/// GoCD server connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server base URL including any context path, e.g. `https://ci.example.com/go`
    pub base_url: String,
    /// Basic auth user
    pub username: Option<String>,
    /// Basic auth password
    pub password: Option<String>,
    /// Access token, preferred over basic auth
    pub bearer_token: Option<String>,
    /// Extra PEM CA certificate to trust
    pub ca_cert: Option<PathBuf>,
    /// Skip TLS verification
    pub insecure_skip_verify: bool,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            username: None,
            password: None,
            bearer_token: None,
            ca_cert: None,
            insecure_skip_verify: false,
            timeout_secs: 30,
        }
    }
}

/// Credentials attached to server requests
#[derive(Clone, PartialEq, Eq)]
pub enum ServerAuth {
    /// Anonymous
    None,
    /// HTTP basic auth
    Basic {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// Bearer token
    Bearer(String),
}

impl std::fmt::Debug for ServerAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Basic { username, .. } => write!(f, "Basic({username}, ***)"),
            Self::Bearer(_) => write!(f, "Bearer(***)"),
        }
    }
}

impl ServerConfig {
    /// Credentials in effect; a token wins over basic auth
    #[must_use]
    pub fn auth(&self) -> ServerAuth {
        if let Some(token) = &self.bearer_token {
            return ServerAuth::Bearer(token.clone());
        }
        match &self.username {
            Some(username) => ServerAuth::Basic {
                username: username.clone(),
                password: self.password.clone().unwrap_or_default(),
            },
            None => ServerAuth::None,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "server.base_url must be set when a server is configured".to_string(),
            ));
        }
        if self.password.is_some() && self.username.is_none() {
            return Err(ConfigError::Invalid(
                "server.password requires server.username".to_string(),
            ));
        }
        Ok(())
    }
}
