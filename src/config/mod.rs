#[cfg(feature = "cli")]
pub mod cli;
pub mod release;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
pub use release::ReleaseConfig;
