//! Plugin execution layer
//!
//! This module runs plugin jars out-of-process under a caller deadline.

mod deadline;
mod invoker;

pub use deadline::{CancelToken, Deadline};
pub use invoker::{PluginRun, PluginRunner};
