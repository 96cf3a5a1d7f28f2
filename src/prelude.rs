//! Prelude module for common imports

pub use crate::executor::{CancelToken, Deadline, PluginRunner};
pub use crate::infrastructure::{Config, GocdClient, ServerConfig};
pub use crate::pipeline::{
    PluginConfig, PluginFamily, PluginSource, SyntaxError, SyntaxValidator, ValidationOutcome,
    ValidationRequest, VersionSource,
};
pub use crate::plugin::{ArtifactFetcher, HttpFetcher, PluginCache, PluginInfoSource};
