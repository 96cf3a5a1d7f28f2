//! Config-repo plugin artifacts
//!
//! Resolving where a plugin jar comes from, caching it on disk and looking
//! up the version a GoCD server has installed.

mod cache;
mod fetcher;
mod resolver;
mod version;

pub use cache::PluginCache;
pub use fetcher::{ArtifactFetcher, HttpFetcher};
pub use resolver::{artifact_file_name, download_url, release_url};
pub use version::{PluginInfo, PluginInfoSource, resolve_version};
