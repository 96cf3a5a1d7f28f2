//! Infrastructure layer
//!
//! This module contains configuration, logging and the GoCD API adapter.

mod config;
mod gocd;
mod logging;

pub use config::{Config, ConfigError, ServerAuth, ServerConfig};
pub use gocd::{GocdClient, GocdError};
pub use logging::init_logging;
