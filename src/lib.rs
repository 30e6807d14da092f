pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::ReleaseConfig;
pub use crate::core::{
    orchestrator::{BuildOrchestrator, BuildRequest},
    runner::ShellRunner,
    verifier::{run_build, BuildVerifier},
};
pub use utils::error::{BuildError, ReleaseError, Result};
