//! Plugin artifact download

use crate::executor::Deadline;
use crate::pipeline::SyntaxError;
use std::io::Write;
use std::time::Duration;
use url::Url;

/// Retrieves a remote plugin artifact
#[allow(clippy::missing_errors_doc)]
pub trait ArtifactFetcher: Send + Sync {
    /// Streams the artifact at `url` into `sink`, returning bytes written
    fn fetch(&self, url: &Url, sink: &mut dyn Write, deadline: &Deadline)
    -> Result<u64, SyntaxError>;
}

/// Downloads artifacts over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    /// Creates a fetcher with a default client
    pub fn new() -> Result<Self, SyntaxError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("gocd-syntax/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }

    /// Wraps an existing client
    #[must_use]
    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl ArtifactFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &Url,
        sink: &mut dyn Write,
        deadline: &Deadline,
    ) -> Result<u64, SyntaxError> {
        deadline.check()?;

        let mut request = self.client.get(url.clone());
        if let Some(remaining) = deadline.remaining() {
            request = request.timeout(remaining);
        }

        tracing::info!(url = %url, "Downloading plugin");

        let mut response = request.send().map_err(|e| map_timeout(e, deadline))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::debug!(status = status.as_u16(), body = %body, "Plugin download failed");
            return Err(SyntaxError::PluginDownload {
                status: status.as_u16(),
                body,
            });
        }

        let written = response
            .copy_to(sink)
            .map_err(|e| map_timeout(e, deadline))?;
        tracing::debug!(url = %url, bytes = written, "Plugin downloaded");
        Ok(written)
    }
}

fn map_timeout(err: reqwest::Error, deadline: &Deadline) -> SyntaxError {
    if err.is_timeout() && deadline.remaining().is_some() {
        deadline.timeout_error()
    } else {
        SyntaxError::Http(err)
    }
}
