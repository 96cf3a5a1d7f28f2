//! `gocd-syntax validate` - Check pipeline files with a config-repo plugin
//!
//! All files in one invocation must share a format. The matching plugin is
//! downloaded to the cache on first use and run as
//! `java -jar <plugin> syntax <files...>`.
//!
//! ## Example
//!
//! ```bash
//! gocd-syntax validate --plugin-version 0.13.0 ci/*.gocd.yaml
//! # Exit code 0: plugin accepted every file
//! # Exit code 1: invalid syntax, missing files or plugin unavailable
//! ```

use anyhow::{Context, Result};
use clap::Args;
use gocd_syntax::{
    Config, Deadline, PluginConfig, ServerConfig, SyntaxValidator, ValidationRequest,
};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Pipeline files to validate (one format per run)
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Plugin version, e.g. 0.13.0
    #[arg(long, required_unless_present_any = ["plugin_path", "server_version"])]
    pub plugin_version: Option<String>,

    /// Use a plugin jar already on disk
    #[arg(long, conflicts_with = "plugin_url")]
    pub plugin_path: Option<PathBuf>,

    /// Download the plugin jar from this URL
    #[arg(long)]
    pub plugin_url: Option<String>,

    /// Use the plugin version installed on the GoCD server
    #[arg(long)]
    pub server_version: bool,

    /// GoCD server base URL (overrides config and GOCD_SERVER_URL)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Java executable
    #[arg(long)]
    pub java: Option<String>,

    /// Plugin cache directory
    #[arg(long)]
    pub cache_dir: Option<PathBuf>,

    /// Give up after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl ValidateArgs {
    fn apply(&self, mut config: Config) -> Config {
        if let Some(java) = &self.java {
            config.java.clone_from(java);
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = Some(dir.clone());
        }
        if let Some(secs) = self.timeout {
            config.timeout_secs = Some(secs);
        }
        if let Some(url) = &self.server_url {
            config
                .server
                .get_or_insert_with(ServerConfig::default)
                .base_url
                .clone_from(url);
        }
        config
    }

    fn plugin_config(&self) -> PluginConfig {
        let mut plugin = PluginConfig::new(self.plugin_version.clone().unwrap_or_default())
            .with_server_version(self.server_version);
        if let Some(path) = &self.plugin_path {
            plugin = plugin.with_local_path(path);
        } else if let Some(url) = &self.plugin_url {
            plugin = plugin.with_url(url);
        }
        plugin
    }
}

pub fn run(config: Config, args: &ValidateArgs) -> Result<()> {
    let config = args.apply(config);
    config.validate().context("Invalid configuration")?;

    let validator =
        SyntaxValidator::from_config(&config).context("Failed to set up the validator")?;
    let request = ValidationRequest::new(args.files.iter().cloned(), args.plugin_config());
    let deadline = Deadline::from_timeout(config.timeout());

    tracing::debug!(files = request.file_paths.len(), "Validating pipeline files");

    let outcome = validator
        .validate_pipeline_syntax(&request, &deadline)
        .context("Pipeline validation failed")?;

    for warning in &outcome.warnings {
        eprintln!("warning: {warning}");
    }
    let diagnostic = outcome.diagnostic.trim_end();
    if !diagnostic.is_empty() {
        println!("{diagnostic}");
    }
    println!(
        "OK: {} file(s) valid ({} plugin {}, version {})",
        request.file_paths.len(),
        outcome.plugin.extension,
        outcome.plugin.version,
        outcome.version_source
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gocd_syntax::PluginSource;

    fn args() -> ValidateArgs {
        ValidateArgs {
            files: vec![PathBuf::from("a.gocd.yaml")],
            plugin_version: Some("0.13.0".to_string()),
            plugin_path: None,
            plugin_url: None,
            server_version: false,
            server_url: None,
            java: None,
            cache_dir: None,
            timeout: None,
        }
    }

    #[test]
    fn test_plugin_config_from_args() {
        let plugin = ValidateArgs {
            plugin_url: Some("https://mirror.example.com/yaml.jar".to_string()),
            server_version: true,
            ..args()
        }
        .plugin_config();

        assert_eq!(plugin.version, "0.13.0");
        assert!(plugin.fetch_version_from_server);
        assert_eq!(
            plugin.source,
            PluginSource::Url("https://mirror.example.com/yaml.jar".to_string())
        );
    }

    #[test]
    fn test_args_override_config() {
        let config = ValidateArgs {
            java: Some("/opt/jdk/bin/java".to_string()),
            timeout: Some(90),
            server_url: Some("https://ci.example.com/go".to_string()),
            ..args()
        }
        .apply(Config::default());

        assert_eq!(config.java, "/opt/jdk/bin/java");
        assert_eq!(config.timeout_secs, Some(90));
        assert_eq!(config.server.unwrap().base_url, "https://ci.example.com/go");
    }
}
