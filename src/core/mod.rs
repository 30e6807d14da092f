pub mod manifest;
pub mod marker;
pub mod orchestrator;
pub mod runner;
pub mod verifier;

pub use crate::domain::model::{BuildReport, ComponentId, Selection};
pub use crate::domain::ports::{CommandOutput, CommandRunner, Prompt, Reporter};
pub use crate::utils::error::{BuildError, Result};
