//! Plugin version lookup against a live GoCD server

use crate::infrastructure::GocdError;
use crate::pipeline::{PluginDescriptor, SyntaxError, VersionSource};
use serde::{Deserialize, Serialize};

/// An installed plugin as reported by GoCD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Plugin id, e.g. `yaml.config.plugin`
    pub id: String,

    /// Free-form plugin metadata
    #[serde(default)]
    pub about: serde_json::Map<String, serde_json::Value>,
}

impl PluginInfo {
    /// Self-reported plugin version
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.about.get("version").and_then(serde_json::Value::as_str)
    }
}

/// Lists the plugins installed on a GoCD server
#[allow(clippy::missing_errors_doc)]
pub trait PluginInfoSource: Send + Sync {
    /// Returns every installed plugin
    fn plugins(&self) -> Result<Vec<PluginInfo>, GocdError>;
}

/// Overwrites `descriptor.version` with the installed plugin's version
///
/// The first plugin whose id contains the family fragment wins. When no
/// plugin matches, the descriptor keeps its configured version and
/// [`VersionSource::NoServerMatch`] is returned. Query failures propagate.
pub fn resolve_version(
    source: &dyn PluginInfoSource,
    descriptor: &mut PluginDescriptor,
) -> Result<VersionSource, SyntaxError> {
    let plugins = source.plugins()?;
    let matched = plugins
        .iter()
        .filter(|plugin| descriptor.matches_plugin_id(&plugin.id))
        .find_map(|plugin| plugin.version().map(|version| (plugin, version)));

    match matched {
        Some((plugin, version)) => {
            tracing::info!(
                plugin_id = %plugin.id,
                configured = %descriptor.version,
                installed = %version,
                "Using plugin version installed on server"
            );
            descriptor.version = version.to_string();
            Ok(VersionSource::Server {
                plugin_id: plugin.id.clone(),
            })
        }
        None => {
            tracing::warn!(
                fragment = %descriptor.plugin_id_fragment(),
                version = %descriptor.version,
                "No installed plugin matches, keeping configured version"
            );
            Ok(VersionSource::NoServerMatch)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::PluginConfig;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct StaticPlugins(Result<Vec<PluginInfo>, u16>);

    impl PluginInfoSource for StaticPlugins {
        fn plugins(&self) -> Result<Vec<PluginInfo>, GocdError> {
            self.0.clone().map_err(|status| GocdError::Status {
                status,
                body: "boom".to_string(),
            })
        }
    }

    fn plugin(id: &str, about: serde_json::Value) -> PluginInfo {
        PluginInfo {
            id: id.to_string(),
            about: about.as_object().cloned().unwrap_or_default(),
        }
    }

    fn installed() -> StaticPlugins {
        StaticPlugins(Ok(vec![
            plugin("cd.go.authorization.ldap", json!({"version": "2.2.0"})),
            plugin("json.config.plugin", json!({"version": "0.6.0"})),
            plugin("yaml.config.plugin", json!({"name": "YAML", "version": "0.14.2"})),
        ]))
    }

    #[test]
    fn test_matching_plugin_overrides_version() {
        let mut descriptor = PluginDescriptor::new("yaml", &PluginConfig::new("0.13.0"));
        let source = resolve_version(&installed(), &mut descriptor).unwrap();

        assert_eq!(descriptor.version, "0.14.2");
        assert_eq!(
            source,
            VersionSource::Server {
                plugin_id: "yaml.config.plugin".to_string()
            }
        );
    }

    #[test]
    fn test_no_match_keeps_configured_version() {
        let mut descriptor = PluginDescriptor::new("groovy", &PluginConfig::new("2.1.3-512"));
        let source = resolve_version(&installed(), &mut descriptor).unwrap();

        assert_eq!(descriptor.version, "2.1.3-512");
        assert_eq!(source, VersionSource::NoServerMatch);
    }

    #[test]
    fn test_missing_version_field_is_not_a_match() {
        let source = StaticPlugins(Ok(vec![plugin("yaml.config.plugin", json!({}))]));
        let mut descriptor = PluginDescriptor::new("yaml", &PluginConfig::new("0.13.0"));

        assert_eq!(
            resolve_version(&source, &mut descriptor).unwrap(),
            VersionSource::NoServerMatch
        );
        assert_eq!(descriptor.version, "0.13.0");
    }

    #[test]
    fn test_unknown_extension_matches_by_substring() {
        let source = StaticPlugins(Ok(vec![plugin(
            "toml.config.plugin",
            json!({"version": "1.2.0"}),
        )]));
        let mut descriptor = PluginDescriptor::new("toml", &PluginConfig::new("1.0.0"));

        resolve_version(&source, &mut descriptor).unwrap();
        assert_eq!(descriptor.version, "1.2.0");
    }

    #[test]
    fn test_empty_extension_never_matches() {
        let source = StaticPlugins(Ok(vec![plugin(
            "yaml.config.plugin",
            json!({"version": "0.14.2"}),
        )]));
        let mut descriptor = PluginDescriptor::new("", &PluginConfig::new("1.0.0"));

        assert_eq!(
            resolve_version(&source, &mut descriptor).unwrap(),
            VersionSource::NoServerMatch
        );
    }

    #[test]
    fn test_query_failure_propagates() {
        let mut descriptor = PluginDescriptor::new("yaml", &PluginConfig::new("0.13.0"));
        let err = resolve_version(&StaticPlugins(Err(500)), &mut descriptor).unwrap_err();
        assert!(matches!(err, SyntaxError::Server(GocdError::Status { status: 500, .. })));
    }

    #[test]
    fn test_plugin_info_deserializes_about() {
        let info: PluginInfo = serde_json::from_value(json!({
            "id": "yaml.config.plugin",
            "status": {"state": "active"},
            "about": {"name": "YAML Configuration Plugin", "version": "0.14.2"}
        }))
        .unwrap();
        assert_eq!(info.version(), Some("0.14.2"));
    }
}
