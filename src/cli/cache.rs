//! `gocd-syntax cache` - Inspect the plugin cache

use anyhow::{Context, Result};
use gocd_syntax::{Config, PluginCache};
use std::path::PathBuf;

fn open(config: &Config) -> Result<PluginCache> {
    match &config.cache_dir {
        Some(dir) => Ok(PluginCache::new(dir)),
        None => PluginCache::default_location().context("Failed to locate the plugin cache"),
    }
}

pub fn list(config: &Config) -> Result<Vec<PathBuf>> {
    let cache = open(config)?;
    cache
        .list()
        .with_context(|| format!("Failed to read plugin cache: {}", cache.root().display()))
}

pub fn purge(config: &Config) -> Result<usize> {
    let cache = open(config)?;
    cache
        .purge()
        .with_context(|| format!("Failed to purge plugin cache: {}", cache.root().display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_list_and_purge_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("yaml-config-plugin-0.13.0.jar"), b"jar").unwrap();
        let config = Config {
            cache_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };

        assert_eq!(list(&config).unwrap().len(), 1);
        assert_eq!(purge(&config).unwrap(), 1);
        assert!(list(&config).unwrap().is_empty());
    }
}
