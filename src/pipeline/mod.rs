//! Pipeline definition files and their syntax validation

pub mod classify;
pub mod errors;
pub mod types;
mod validate;


pub use classify::{classify, ensure_exist, file_extension, missing_files};
pub use errors::SyntaxError;
pub use types::{
    CachedArtifact, PluginConfig, PluginDescriptor, PluginFamily, PluginSource,
    ValidationOutcome, ValidationRequest, ValidationResult, VersionSource,
};
pub use validate::SyntaxValidator;
