//! # gocd-syntax - Validate GoCD pipelines as code
//!
//! GoCD reads pipeline definitions from config repositories through
//! config-repo plugins: YAML, JSON and Groovy DSL. Each plugin jar also
//! ships an offline syntax checker. This crate finds the plugin matching a
//! set of files, caches the jar under `~/.gocd/plugins` and runs it:
//!
//! ```text
//! java -jar yaml-config-plugin-0.13.0.jar syntax a.gocd.yaml b.gocd.yaml
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gocd_syntax::prelude::*;
//!
//! let validator = SyntaxValidator::from_config(&Config::default())?;
//! let request = ValidationRequest::new(["app.gocd.yaml"], PluginConfig::new("0.13.0"));
//! let outcome = validator.validate_pipeline_syntax(&request, &Deadline::none())?;
//! println!("{}", outcome.diagnostic);
//! # Ok::<(), SyntaxError>(())
//! ```
//!
//! ## Features
//!
//! - **One format per run**: mixed YAML/JSON/Groovy requests are rejected
//! - **Version pinning**: optionally use the plugin version a GoCD server has installed
//! - **Atomic cache**: downloads are renamed into place once complete
//! - **Bounded runs**: a [`Deadline`] covers both the download and the plugin process
//!
//! ## License
//!
//! Licensed under either of
//! - Apache License, Version 2.0 ([LICENSE-APACHE](LICENSE-APACHE) or <https://www.apache.org/licenses/LICENSE-2.0>)
//! - MIT license ([LICENSE-MIT](LICENSE-MIT) or <https://opensource.org/licenses/MIT>)
//!
//! at your option.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod executor;
pub mod infrastructure;
pub mod pipeline;
pub mod plugin;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{CancelToken, Deadline, PluginRun, PluginRunner};
pub use infrastructure::{Config, ConfigError, GocdClient, GocdError, ServerConfig, init_logging};
pub use pipeline::{
    PluginConfig, PluginDescriptor, PluginFamily, PluginSource, SyntaxError, SyntaxValidator,
    ValidationOutcome, ValidationRequest, VersionSource,
};
pub use plugin::{ArtifactFetcher, HttpFetcher, PluginCache, PluginInfo, PluginInfoSource};

/// Version of the gocd-syntax crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
