use crate::domain::model::{BuildReport, BuildStatus, ComponentId, ComponentOutcome};
use crate::domain::ports::{Prompt, Reporter};
use colored::Colorize;
use std::io::{stdin, stdout, BufRead, Write};

/// Prints build progress to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn warn(&self, message: &str) {
        println!("{}", message.yellow());
    }

    fn build_started(&self, component: ComponentId) {
        println!("{}", format!("Building '{}'", component).bold());
    }

    fn command_output(&self, _component: ComponentId, output: &str) {
        println!("{}", output.magenta());
    }

    fn build_finished(&self, outcome: &ComponentOutcome) {
        println!("{}", outcome_line(outcome));
    }
}

fn outcome_line(outcome: &ComponentOutcome) -> String {
    let name = outcome.component.display_name();
    match &outcome.status {
        BuildStatus::Built { version, .. } => {
            format!("Successfully built {} version {}", name, version)
                .green()
                .to_string()
        }
        BuildStatus::Failed { reason, .. } => {
            format!("{} build failed: {}", name, reason).red().to_string()
        }
        BuildStatus::Skipped => format!("Skipped {}", name).dimmed().to_string(),
    }
}

/// One line per component, for the end of a run.
pub fn print_summary(report: &BuildReport) {
    println!();
    println!("{}", format!("Summary ({})", report.environment).bold());
    for outcome in &report.outcomes {
        println!("  {}", outcome_line(outcome));
    }
}

/// Asks on stdin; anything but `y`/`yes` is a no.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn confirm(&self, question: &str) -> bool {
        print!("{} [y/N]: ", question);
        if stdout().flush().is_err() {
            return false;
        }

        let mut response = String::new();
        match stdin().lock().read_line(&mut response) {
            Ok(_) => is_yes(&response),
            Err(e) => {
                tracing::warn!("Could not read confirmation: {}", e);
                false
            }
        }
    }
}

/// Used when prompts are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Prompt for AssumeYes {
    fn confirm(&self, _question: &str) -> bool {
        true
    }
}

fn is_yes(response: &str) -> bool {
    matches!(response.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
