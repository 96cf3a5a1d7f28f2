//! gocd-syntax - validate GoCD pipeline-as-code files
//!
//! ## Commands
//!
//! - `gocd-syntax validate` - Check pipeline files with the matching config-repo plugin
//! - `gocd-syntax cache` - List or purge downloaded plugin jars
//! - `gocd-syntax completions` - Generate shell completions
//!
//! ## Quick Start
//!
//! ```bash
//! # Validate YAML pipelines with a released plugin
//! gocd-syntax validate --plugin-version 0.13.0 pipelines/*.gocd.yaml
//!
//! # Use whatever version the server runs
//! GOCD_SERVER_URL=https://ci.example.com/go GOCD_TOKEN=... \
//!     gocd-syntax validate --server-version --plugin-version 0.13.0 app.gocd.yaml
//!
//! # Generate shell completions
//! gocd-syntax completions bash > /etc/bash_completion.d/gocd-syntax
//! ```

use std::process::ExitCode;

mod cli;

fn main() -> ExitCode {
    if std::env::var("GOCD_SYNTAX_DEBUG").is_ok() {
        gocd_syntax::init_logging("debug");
    }

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            if std::env::var("GOCD_SYNTAX_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
