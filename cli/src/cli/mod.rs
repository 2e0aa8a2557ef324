//! CLI for restry.

mod call;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use restry_core::Config;

pub use call::CallArgs;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "restry")]
#[command(about = "Blocking REST calls with echo detection and retries", long_about = None)]
pub struct Cli {
    /// TOML config file with [transport] and [retry] sections.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Perform one REST call, retrying until the status is acceptable.
    Call(CallArgs),
}

impl Cli {
    /// Parse arguments, run the command, and return the process exit code.
    pub fn run_from_args() -> Result<i32> {
        Cli::parse().run()
    }

    pub fn run(self) -> Result<i32> {
        let cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        tracing::debug!("using config: {:?}", cfg);

        match self.command {
            CliCommand::Call(args) => call::run_call(&cfg, &args),
        }
    }
}
