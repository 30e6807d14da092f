use crate::domain::model::{ComponentId, ComponentOutcome};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Result of running a release command to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed, timed out or never started.
    pub exit_code: Option<i32>,
    /// stdout followed by stderr.
    pub output: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(
        &self,
        command: &str,
        dir: &Path,
        env: &BTreeMap<String, String>,
    ) -> CommandOutput;
}

/// Asks the operator whether to go ahead.
pub trait Prompt: Send + Sync {
    fn confirm(&self, question: &str) -> bool;
}

/// Receives progress notifications from the orchestrator.
pub trait Reporter: Send + Sync {
    fn warn(&self, message: &str);
    fn build_started(&self, component: ComponentId);
    fn command_output(&self, component: ComponentId, output: &str);
    fn build_finished(&self, outcome: &ComponentOutcome);
}
