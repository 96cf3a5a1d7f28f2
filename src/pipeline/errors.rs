//! Error types for pipeline syntax validation

use crate::infrastructure::GocdError;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while validating pipeline definition files
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// No pipeline files were supplied
    #[error("no pipeline files were supplied for validation")]
    NoPipelineFiles,

    /// Files of more than one format were passed in a single request
    #[error(
        "pipeline files should all be of the same type, one of [yaml, json, groovy]; found: {}",
        found.join(", ")
    )]
    MixedFileType {
        /// Distinct extensions found in the request, in first-seen order.
        found: Vec<String>,
    },

    /// One or more pipeline files do not exist on disk
    #[error("pipeline files not found: {}", join_paths(paths))]
    PipelineFilesNotFound {
        /// Every missing path.
        paths: Vec<PathBuf>,
    },

    /// File format has no known config-repo plugin
    #[error("unsupported plugin type '{extension}', supported types are [yaml, json, groovy]")]
    UnsupportedPluginType {
        /// The extension that could not be mapped to a plugin.
        extension: String,
    },

    /// Plugin download returned a non-success status
    #[error("downloading plugin errored with status code {status}: {body}")]
    PluginDownload {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The plugin could not be started or reported invalid syntax
    #[error("pipeline syntax validation failed:\n{output}")]
    PipelineValidation {
        /// Combined standard output and standard error of the plugin.
        output: String,
    },

    /// The caller's deadline elapsed
    #[error("timed out after {duration:?}")]
    Timeout {
        /// Time budget that was exceeded.
        duration: Duration,
    },

    /// The caller cancelled the validation
    #[error("validation was cancelled")]
    Cancelled,

    /// Home directory could not be resolved for the default plugin cache
    #[error("could not resolve the user home directory")]
    HomeDirUnavailable,

    /// Plugin URL could not be parsed
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),

    /// IO error occurred
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// HTTP transport error while fetching a plugin
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// GoCD server query failed
    #[error(transparent)]
    Server(#[from] GocdError),
}

impl SyntaxError {
    /// Returns true for failures that may succeed when retried unchanged
    ///
    /// Nothing in this crate retries; the classification is for callers.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::PluginDownload { status, .. } => *status >= 500,
            Self::Http(_) | Self::Timeout { .. } => true,
            Self::Server(err) => err.is_transport(),
            _ => false,
        }
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
