//! Core types for pipeline syntax validation
//!
//! A validation run starts from a [`ValidationRequest`], derives a
//! [`PluginDescriptor`] for the file format it contains and ends with a
//! [`ValidationOutcome`].

#![allow(clippy::must_use_candidate)]

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Result type for syntax validation
pub type ValidationResult = std::result::Result<ValidationOutcome, super::errors::SyntaxError>;

/// Config-repo plugin families known to GoCD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginFamily {
    /// `gocd-yaml-config-plugin`
    Yaml,
    /// `gocd-json-config-plugin`
    Json,
    /// `gocd-groovy-dsl-config-plugin`
    Groovy,
}

struct FamilySpec {
    family: PluginFamily,
    extension: &'static str,
    url_template: &'static str,
    plugin_id_fragment: &'static str,
}

static FAMILIES: [FamilySpec; 3] = [
    FamilySpec {
        family: PluginFamily::Yaml,
        extension: "yaml",
        url_template: "https://github.com/tomzo/gocd-yaml-config-plugin/releases/download/{version}/yaml-config-plugin-{version}.jar",
        plugin_id_fragment: "yaml",
    },
    FamilySpec {
        family: PluginFamily::Json,
        extension: "json",
        url_template: "https://github.com/tomzo/gocd-json-config-plugin/releases/download/{version}/json-config-plugin-{version}.jar",
        plugin_id_fragment: "json",
    },
    FamilySpec {
        family: PluginFamily::Groovy,
        extension: "groovy",
        url_template: "https://github.com/gocd/gocd-groovy-dsl-config-plugin/releases/download/{version}/gocd-groovy-dsl-config-plugin-{version}.jar",
        plugin_id_fragment: "groovy",
    },
];

impl PluginFamily {
    /// All known families
    pub const ALL: [Self; 3] = [Self::Yaml, Self::Json, Self::Groovy];

    fn spec(self) -> &'static FamilySpec {
        match self {
            Self::Yaml => &FAMILIES[0],
            Self::Json => &FAMILIES[1],
            Self::Groovy => &FAMILIES[2],
        }
    }

    /// Maps a lower-cased file extension to its plugin family
    pub fn from_extension(extension: &str) -> Option<Self> {
        FAMILIES
            .iter()
            .find(|spec| spec.extension == extension)
            .map(|spec| spec.family)
    }

    /// File extension handled by this family
    pub fn extension(self) -> &'static str {
        self.spec().extension
    }

    /// Release download URL template; `{version}` appears twice
    pub fn url_template(self) -> &'static str {
        self.spec().url_template
    }

    /// Substring expected in the plugin id reported by a GoCD server
    pub fn plugin_id_fragment(self) -> &'static str {
        self.spec().plugin_id_fragment
    }

    /// Returns true if `plugin_id` belongs to this family
    pub fn matches_plugin_id(self, plugin_id: &str) -> bool {
        plugin_id.contains(self.plugin_id_fragment())
    }
}

impl fmt::Display for PluginFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where the plugin jar comes from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginSource {
    /// Official release, URL built from the family template
    #[default]
    Release,
    /// Explicit download URL, used verbatim
    Url(String),
    /// Jar already on disk; resolution and download are skipped
    LocalPath(PathBuf),
}

/// Caller-supplied plugin configuration for one validation request
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin version, e.g. `0.13.0`
    pub version: String,

    /// Plugin source override
    #[serde(default)]
    pub source: PluginSource,

    /// Replace `version` with the one installed on the GoCD server
    #[serde(default)]
    pub fetch_version_from_server: bool,
}

impl PluginConfig {
    /// Creates a config for a released plugin version
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Downloads the jar from `url` instead of the release template
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.source = PluginSource::Url(url.into());
        self
    }

    /// Uses a jar already present at `path`
    #[must_use]
    pub fn with_local_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = PluginSource::LocalPath(path.into());
        self
    }

    /// Pins the version to the plugin installed on the server
    #[must_use]
    pub fn with_server_version(mut self, enabled: bool) -> Self {
        self.fetch_version_from_server = enabled;
        self
    }
}

/// A set of pipeline files to validate together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationRequest {
    /// Files to validate, in the order they are passed to the plugin
    pub file_paths: Vec<PathBuf>,

    /// Plugin configuration
    pub plugin: PluginConfig,
}

impl ValidationRequest {
    /// Creates a new request
    pub fn new<I, P>(file_paths: I, plugin: PluginConfig) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            file_paths: file_paths.into_iter().map(Into::into).collect(),
            plugin,
        }
    }
}

/// Plugin resolved for a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Extension shared by every file in the request
    pub extension: String,

    /// Family derived from `extension`, if known
    pub family: Option<PluginFamily>,

    /// Plugin version in effect
    pub version: String,

    /// Where the jar comes from
    pub source: PluginSource,
}

impl PluginDescriptor {
    /// Builds a descriptor from the classified extension and caller config
    pub fn new(extension: impl Into<String>, config: &PluginConfig) -> Self {
        let extension = extension.into();
        Self {
            family: PluginFamily::from_extension(&extension),
            extension,
            version: config.version.clone(),
            source: config.source.clone(),
        }
    }

    /// Key used to match installed plugin ids
    pub fn plugin_id_fragment(&self) -> &str {
        match self.family {
            Some(family) => family.plugin_id_fragment(),
            None => &self.extension,
        }
    }

    /// Returns true if an installed plugin with `plugin_id` serves these files
    ///
    /// Known families match through the family table. An unknown extension
    /// matches ids containing it; an empty extension matches nothing.
    pub fn matches_plugin_id(&self, plugin_id: &str) -> bool {
        match self.family {
            Some(family) => family.matches_plugin_id(plugin_id),
            None => !self.extension.is_empty() && plugin_id.contains(&self.extension),
        }
    }
}

/// A plugin jar present in the local cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedArtifact {
    /// Path of the jar on disk
    pub local_path: PathBuf,

    /// Family the jar was resolved for
    pub family: Option<PluginFamily>,

    /// Version the jar was resolved for
    pub version: String,

    /// True if the jar was downloaded during this call
    pub downloaded: bool,
}

/// How the plugin version in effect was chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum VersionSource {
    /// Version supplied by the caller
    Configured,
    /// Version reported by the GoCD server
    Server {
        /// Id of the matching installed plugin
        plugin_id: String,
    },
    /// Server lookup found no matching plugin; configured version kept
    NoServerMatch,
}

impl fmt::Display for VersionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Server { plugin_id } => write!(f, "server ({plugin_id})"),
            Self::NoServerMatch => write!(f, "configured (no server match)"),
        }
    }
}

/// Result of a successful validation run
///
/// `diagnostic` holds whatever the plugin printed. It is informational only:
/// the pass/fail signal is the plugin's exit status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    /// Always true; failures are reported as errors
    pub success: bool,

    /// Combined plugin output
    pub diagnostic: String,

    /// Plugin as finally used
    pub plugin: PluginDescriptor,

    /// Jar that was executed
    pub artifact: PathBuf,

    /// How `plugin.version` was chosen
    pub version_source: VersionSource,

    /// Non-fatal findings, e.g. a failed server version match
    pub warnings: Vec<String>,
}
