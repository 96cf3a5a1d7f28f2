//! CLI for gocd-syntax
//!
//! - `validate`: Check pipeline files with the matching config-repo plugin
//! - `cache`: List or purge cached plugin jars
//! - `completions`: Generate shell completions

pub mod cache;
pub mod completions;
pub mod validate;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use gocd_syntax::{Config, init_logging};
use std::path::PathBuf;

/// CLI arguments for gocd-syntax
#[derive(Parser, Debug)]
#[command(name = "gocd-syntax")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate pipeline files with the matching config-repo plugin
    Validate(validate::ValidateArgs),

    /// Manage the plugin cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell type
        #[arg(value_enum)]
        shell: ShellArg,
        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum CacheAction {
    /// List cached plugin jars
    List,
    /// Delete every cached plugin jar
    Purge,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ShellArg {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

/// Build the CLI command for completion generation
pub fn build_cli() -> clap::Command {
    Args::command()
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };
    config
        .with_env_overrides(|key| std::env::var(key).ok())
        .context("Invalid configuration")
}

/// `--log-level` if given, otherwise the configured level
fn log_level<'a>(flag: Option<&'a str>, config: &'a Config) -> &'a str {
    flag.unwrap_or(&config.log_level)
}

/// Parse and execute CLI arguments
pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    init_logging(log_level(args.log_level.as_deref(), &config));

    match args.command {
        Command::Validate(validate_args) => validate::run(config, &validate_args)?,
        Command::Cache { action } => match action {
            CacheAction::List => {
                for jar in cache::list(&config)? {
                    println!("{}", jar.display());
                }
            }
            CacheAction::Purge => {
                let removed = cache::purge(&config)?;
                println!("Removed {removed} cached plugin(s)");
            }
        },
        Command::Completions { shell, output } => {
            use clap_complete::Shell;

            let shell_enum = match shell {
                ShellArg::Bash => Shell::Bash,
                ShellArg::Zsh => Shell::Zsh,
                ShellArg::Fish => Shell::Fish,
                ShellArg::PowerShell => Shell::PowerShell,
            };

            let completions = completions::generate_completions(shell_enum)?;

            if let Some(output_path) = output {
                completions::save_completions(&completions, &output_path)?;
            } else {
                println!("{completions}");
            }
        }
    }

    Ok(())
}
