use crate::utils::error::Result;
use crate::utils::validation::{validate_path, Validate};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "relcheck")]
#[command(about = "Build components through their release scripts and verify the version moved")]
pub struct CliConfig {
    /// Path to the TOML file describing environments and components
    #[arg(short, long, global = true, default_value = "release.toml")]
    pub config: String,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum LogFormat {
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, Subcommand)]
pub enum Commands {
    /// Build components and check that each VERSION marker changed
    Build(BuildArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct BuildArgs {
    /// Environment to build for
    #[arg(short, long, default_value = "testing")]
    pub environment: String,

    /// Components to build: app, web, or all (comma separated)
    #[arg(short, long, default_value = "all")]
    pub apps: String,

    /// Show the release scripts' output
    #[arg(long)]
    pub details: bool,

    /// Ask for confirmation before building
    #[arg(long)]
    pub interactive: bool,

    /// Kill a release command after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Write a JSON build report to this file
    #[arg(long)]
    pub report: Option<String>,
}

impl BuildArgs {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_path("config", &self.config)?;
        match &self.command {
            Commands::Build(args) => {
                if let Some(report) = &args.report {
                    validate_path("report", report)?;
                }
                if args.timeout == Some(0) {
                    return Err(crate::utils::error::ReleaseError::InvalidConfigValueError {
                        field: "timeout".to_string(),
                        value: "0".to_string(),
                        reason: "Value must be at least 1".to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
