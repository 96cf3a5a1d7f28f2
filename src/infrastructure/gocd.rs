//! Minimal GoCD API client for plugin metadata
//!
//! Only the plugin-info listing is implemented; it is all the syntax
//! validator needs to pin a plugin version to what a server runs.

use super::config::{ServerAuth, ServerConfig};
use crate::plugin::{PluginInfo, PluginInfoSource};
use reqwest::header::ACCEPT;
use serde::Deserialize;
use std::fs;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const PLUGIN_INFO_PATH: &str = "api/admin/plugin_info";
const PLUGIN_INFO_ACCEPT: &str = "application/vnd.go.cd.v7+json";

/// Errors returned by the GoCD client
#[derive(Error, Debug)]
pub enum GocdError {
    /// No server is configured
    #[error("GoCD server is not configured; set server.base_url or GOCD_SERVER_URL")]
    NotConfigured,

    /// Base URL could not be parsed
    #[error("invalid GoCD server url '{url}': {source}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Parse failure.
        source: url::ParseError,
    },

    /// CA certificate could not be loaded
    #[error("failed to load CA certificate '{path}': {reason}")]
    Certificate {
        /// Certificate path.
        path: String,
        /// Failure reason.
        reason: String,
    },

    /// Transport failure
    #[error("GoCD request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Server responded with a non-success status
    #[error("GoCD server returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
}

impl GocdError {
    /// Returns true for connection-level failures
    #[must_use]
    pub fn is_transport(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PluginInfoListing {
    #[serde(rename = "_embedded", default)]
    embedded: PluginInfoEmbedded,
}

#[derive(Debug, Default, Deserialize)]
struct PluginInfoEmbedded {
    #[serde(default)]
    plugin_info: Vec<PluginInfo>,
}

/// Blocking GoCD API client
#[derive(Debug, Clone)]
pub struct GocdClient {
    base_url: Url,
    auth: ServerAuth,
    client: reqwest::blocking::Client,
}

impl GocdClient {
    /// Builds a client from server configuration
    pub fn new(config: &ServerConfig) -> Result<Self, GocdError> {
        Self::from_builder(config, reqwest::blocking::Client::builder())
    }

    /// Builds a client on top of a preconfigured `builder`
    ///
    /// Timeout, TLS and user agent settings from `config` are applied on top.
    pub fn from_builder(
        config: &ServerConfig,
        builder: reqwest::blocking::ClientBuilder,
    ) -> Result<Self, GocdError> {
        let mut raw = config.base_url.trim_end_matches('/').to_string();
        raw.push('/');
        let base_url = Url::parse(&raw).map_err(|source| GocdError::InvalidUrl {
            url: config.base_url.clone(),
            source,
        })?;

        let mut builder = builder
            .user_agent(concat!("gocd-syntax/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.insecure_skip_verify);

        if let Some(path) = &config.ca_cert {
            let pem = fs::read(path).map_err(|e| GocdError::Certificate {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            let cert =
                reqwest::Certificate::from_pem(&pem).map_err(|e| GocdError::Certificate {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            builder = builder.add_root_certificate(cert);
        }

        Ok(Self {
            base_url,
            auth: config.auth(),
            client: builder.build()?,
        })
    }

    /// Endpoint listing installed plugins
    pub fn plugin_info_url(&self) -> Result<Url, GocdError> {
        self.base_url
            .join(PLUGIN_INFO_PATH)
            .map_err(|source| GocdError::InvalidUrl {
                url: self.base_url.to_string(),
                source,
            })
    }

    /// Fetches `GET /api/admin/plugin_info`
    pub fn plugin_info(&self) -> Result<Vec<PluginInfo>, GocdError> {
        let url = self.plugin_info_url()?;
        tracing::debug!(url = %url, "Querying installed plugins");

        let mut request = self.client.get(url).header(ACCEPT, PLUGIN_INFO_ACCEPT);
        request = match &self.auth {
            ServerAuth::None => request,
            ServerAuth::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            ServerAuth::Bearer(token) => request.bearer_auth(token),
        };

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(GocdError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let listing: PluginInfoListing = response.json()?;
        tracing::debug!(count = listing.embedded.plugin_info.len(), "Installed plugins");
        Ok(listing.embedded.plugin_info)
    }
}

impl PluginInfoSource for GocdClient {
    fn plugins(&self) -> Result<Vec<PluginInfo>, GocdError> {
        self.plugin_info()
    }
}
