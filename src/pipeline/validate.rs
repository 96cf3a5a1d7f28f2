//! Pipeline syntax validation
//!
//! [`SyntaxValidator`] runs one request through a fixed sequence of steps:
//!
//! ```text
//! classify -> [server version] -> resolve artifact -> cache hit | fetch
//!          -> check files exist -> run plugin -> outcome
//! ```
//!
//! The first failing step ends the run. There is no fallback to another
//! plugin family, no download retry and no partial validation of a subset of
//! files.

use super::classify::{classify, ensure_exist};
use super::errors::SyntaxError;
use super::types::{
    CachedArtifact, PluginConfig, PluginDescriptor, PluginSource, ValidationOutcome,
    ValidationRequest, ValidationResult, VersionSource,
};
use crate::executor::{Deadline, PluginRunner};
use crate::infrastructure::{Config, GocdClient, GocdError};
use crate::plugin::{
    ArtifactFetcher, HttpFetcher, PluginCache, PluginInfoSource, download_url, resolve_version,
};

/// Validates pipeline definition files with config-repo plugins
pub struct SyntaxValidator {
    cache: PluginCache,
    fetcher: Box<dyn ArtifactFetcher>,
    runner: PluginRunner,
    plugin_info: Option<Box<dyn PluginInfoSource>>,
}

impl std::fmt::Debug for SyntaxValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxValidator")
            .field("cache", &self.cache)
            .field("runner", &self.runner)
            .field("plugin_info", &self.plugin_info.is_some())
            .finish_non_exhaustive()
    }
}

impl SyntaxValidator {
    /// Creates a validator with the default Java runtime and no server
    #[must_use]
    pub fn new(cache: PluginCache, fetcher: Box<dyn ArtifactFetcher>) -> Self {
        Self {
            cache,
            fetcher,
            runner: PluginRunner::default(),
            plugin_info: None,
        }
    }

    /// Builds a validator from application configuration
    pub fn from_config(config: &Config) -> Result<Self, SyntaxError> {
        let cache = match &config.cache_dir {
            Some(dir) => PluginCache::new(dir),
            None => PluginCache::default_location()?,
        };

        let mut validator = Self::new(cache, Box::new(HttpFetcher::new()?))
            .with_runner(PluginRunner::new(config.java.clone()));

        if let Some(server) = &config.server {
            validator = validator.with_plugin_info(Box::new(GocdClient::new(server)?));
        }

        Ok(validator)
    }

    /// Sets the runner used to execute plugins
    #[must_use]
    pub fn with_runner(mut self, runner: PluginRunner) -> Self {
        self.runner = runner;
        self
    }

    /// Sets the source queried when a request pins its version to the server
    #[must_use]
    pub fn with_plugin_info(mut self, source: Box<dyn PluginInfoSource>) -> Self {
        self.plugin_info = Some(source);
        self
    }

    /// Plugin cache in use
    #[must_use]
    pub fn cache(&self) -> &PluginCache {
        &self.cache
    }

    /// Validates every file in `request` with one plugin run
    ///
    /// `Ok` always carries `success = true`; every failure is an `Err`.
    pub fn validate_pipeline_syntax(
        &self,
        request: &ValidationRequest,
        deadline: &Deadline,
    ) -> ValidationResult {
        let extension = classify(&request.file_paths)?;
        let mut descriptor = PluginDescriptor::new(extension, &request.plugin);
        tracing::debug!(
            extension = %descriptor.extension,
            version = %descriptor.version,
            files = request.file_paths.len(),
            "Classified pipeline files"
        );

        if descriptor.family.is_none() && descriptor.source == PluginSource::Release {
            return Err(SyntaxError::UnsupportedPluginType {
                extension: descriptor.extension,
            });
        }

        let version_source = self.resolve_plugin_version(&request.plugin, &mut descriptor)?;
        let mut warnings = Vec::new();
        if version_source == VersionSource::NoServerMatch {
            warnings.push(format!(
                "no plugin matching '{}' is installed on the GoCD server; using configured version '{}'",
                descriptor.plugin_id_fragment(),
                descriptor.version
            ));
        }

        let artifact = self.obtain_artifact(&descriptor, deadline)?;

        ensure_exist(&request.file_paths)?;

        let run = self
            .runner
            .run_syntax(&artifact.local_path, &request.file_paths, deadline)?;

        tracing::info!(
            extension = %descriptor.extension,
            version = %descriptor.version,
            artifact = %artifact.local_path.display(),
            duration_ms = run.duration.as_millis(),
            "Pipeline syntax is valid"
        );

        Ok(ValidationOutcome {
            success: true,
            diagnostic: run.output,
            plugin: descriptor,
            artifact: artifact.local_path,
            version_source,
            warnings,
        })
    }

    fn resolve_plugin_version(
        &self,
        config: &PluginConfig,
        descriptor: &mut PluginDescriptor,
    ) -> Result<VersionSource, SyntaxError> {
        if !config.fetch_version_from_server {
            return Ok(VersionSource::Configured);
        }
        if let PluginSource::LocalPath(_) = descriptor.source {
            tracing::debug!("Local plugin jar configured, skipping server version lookup");
            return Ok(VersionSource::Configured);
        }

        let source = self
            .plugin_info
            .as_deref()
            .ok_or(SyntaxError::Server(GocdError::NotConfigured))?;
        resolve_version(source, descriptor)
    }

    fn obtain_artifact(
        &self,
        descriptor: &PluginDescriptor,
        deadline: &Deadline,
    ) -> Result<CachedArtifact, SyntaxError> {
        if let PluginSource::LocalPath(path) = &descriptor.source {
            tracing::debug!(path = %path.display(), "Using local plugin jar");
            return Ok(CachedArtifact {
                local_path: path.clone(),
                family: descriptor.family,
                version: descriptor.version.clone(),
                downloaded: false,
            });
        }

        let url = download_url(
            &descriptor.extension,
            descriptor.family,
            &descriptor.version,
            &descriptor.source,
        )?;
        tracing::debug!(url = %url, "Resolved plugin location");

        self.cache.ensure(
            &url,
            descriptor.family,
            &descriptor.version,
            self.fetcher.as_ref(),
            deadline,
        )
    }
}
