//! On-disk plugin artifact cache
//!
//! Jars live directly under the cache root, named after the last segment of
//! their download URL:
//!
//! ```text
//! ~/.gocd/plugins/yaml-config-plugin-0.13.0.jar
//! ```
//!
//! A file at the expected path is trusted as-is; there is no checksum or
//! freshness check. Downloads land in a temp file in the same directory and
//! are renamed into place, so readers never observe a partially written jar.
//! Concurrent downloads of the same jar may both run; the last rename wins
//! and both write the same bytes.

use super::fetcher::ArtifactFetcher;
use super::resolver::artifact_file_name;
use crate::executor::Deadline;
use crate::pipeline::{CachedArtifact, PluginFamily, SyntaxError};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Plugin jar cache rooted at a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginCache {
    root: PathBuf,
}

impl PluginCache {
    /// Creates a cache rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<home>/.gocd/plugins`
    pub fn default_location() -> Result<Self, SyntaxError> {
        let home = dirs::home_dir().ok_or(SyntaxError::HomeDirUnavailable)?;
        Ok(Self::new(home.join(".gocd").join("plugins")))
    }

    /// Cache root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path the jar downloaded from `url` is stored at
    #[must_use]
    pub fn path_for(&self, url: &Url) -> PathBuf {
        self.root.join(artifact_file_name(url))
    }

    /// Returns true if the jar for `url` is already cached
    #[must_use]
    pub fn contains(&self, url: &Url) -> bool {
        self.path_for(url).is_file()
    }

    /// Returns the cached jar for `url`, downloading it first if absent
    pub fn ensure(
        &self,
        url: &Url,
        family: Option<PluginFamily>,
        version: &str,
        fetcher: &dyn ArtifactFetcher,
        deadline: &Deadline,
    ) -> Result<CachedArtifact, SyntaxError> {
        let local_path = self.path_for(url);

        if local_path.is_file() {
            tracing::info!(path = %local_path.display(), "Plugin found in cache");
            return Ok(CachedArtifact {
                local_path,
                family,
                version: version.to_string(),
                downloaded: false,
            });
        }

        fs::create_dir_all(&self.root)?;
        let staging = tempfile::Builder::new()
            .prefix(".download-")
            .suffix(".part")
            .tempfile_in(&self.root)?;

        {
            let mut writer = BufWriter::new(staging.as_file());
            fetcher.fetch(url, &mut writer, deadline)?;
            writer.flush()?;
        }
        staging.as_file().sync_all()?;
        staging
            .persist(&local_path)
            .map_err(|e| SyntaxError::Io(e.error))?;

        tracing::info!(path = %local_path.display(), "Plugin cached");
        Ok(CachedArtifact {
            local_path,
            family,
            version: version.to_string(),
            downloaded: true,
        })
    }

    /// Cached jars, sorted by file name
    pub fn list(&self) -> Result<Vec<PathBuf>, SyntaxError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut jars: Vec<PathBuf> = fs::read_dir(&self.root)?
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "jar"))
            .collect();
        jars.sort();
        Ok(jars)
    }

    /// Removes every cached jar, returning how many were deleted
    pub fn purge(&self) -> Result<usize, SyntaxError> {
        let jars = self.list()?;
        for jar in &jars {
            fs::remove_file(jar)?;
        }
        tracing::info!(root = %self.root.display(), removed = jars.len(), "Plugin cache purged");
        Ok(jars.len())
    }
}
