use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single component build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Version marker {path} is unreadable: {source}")]
    MarkerUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Release command failed ({}): {}", exit_label(.exit_code), last_line(.output))]
    BuildCommandFailed {
        exit_code: Option<i32>,
        output: String,
    },

    #[error("Build produced no new version, staying at version {0}")]
    VersionUnchanged(String),
}

impl BuildError {
    /// Captured output of the release command, when there is one.
    pub fn output(&self) -> Option<&str> {
        match self {
            BuildError::BuildCommandFailed { output, .. } => Some(output),
            _ => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            BuildError::MarkerUnreadable { .. } => "marker_unreadable",
            BuildError::BuildCommandFailed { .. } => "build_command_failed",
            BuildError::VersionUnchanged(_) => "version_unchanged",
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code".to_string(),
    }
}

fn last_line(output: &str) -> &str {
    output
        .lines()
        .rev()
        .find(|line| !line.trim().is_empty())
        .unwrap_or("<no output>")
}

#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Unknown environment '{name}' (configured: {available})")]
    UnknownEnvironment { name: String, available: String },

    #[error("Invalid component {name}")]
    UnknownComponent { name: String },

    #[error("{} component build(s) failed: {}", .failed.len(), .failed.join(", "))]
    BuildsFailed { failed: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Build,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReleaseError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ReleaseError::ConfigValidationError { .. }
            | ReleaseError::InvalidConfigValueError { .. }
            | ReleaseError::MissingConfigError { .. }
            | ReleaseError::UnknownEnvironment { .. }
            | ReleaseError::UnknownComponent { .. } => ErrorCategory::Configuration,
            ReleaseError::Build(_) | ReleaseError::BuildsFailed { .. } => ErrorCategory::Build,
            ReleaseError::IoError(_) | ReleaseError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Build => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 根據錯誤類型提供修復建議
    pub fn recovery_suggestion(&self) -> String {
        match self {
            ReleaseError::Build(BuildError::MarkerUnreadable { path, .. }) => format!(
                "Make sure {} exists and the component directory is correct",
                path.display()
            ),
            ReleaseError::Build(BuildError::BuildCommandFailed { .. }) => {
                "Re-run with --details to see the release script output".to_string()
            }
            ReleaseError::Build(BuildError::VersionUnchanged(_)) => {
                "Check that the release script bumps the VERSION file".to_string()
            }
            ReleaseError::BuildsFailed { .. } => {
                "Inspect the failures above and re-run the failed components with --apps".to_string()
            }
            ReleaseError::UnknownEnvironment { available, .. } => {
                format!("Use one of the configured environments: {}", available)
            }
            ReleaseError::UnknownComponent { .. } => {
                "Valid components are: app, web (or all)".to_string()
            }
            ReleaseError::ConfigValidationError { .. }
            | ReleaseError::InvalidConfigValueError { .. }
            | ReleaseError::MissingConfigError { .. } => {
                "Fix the configuration file and try again".to_string()
            }
            ReleaseError::IoError(_) => "Check file permissions and available disk space".to_string(),
            ReleaseError::SerializationError(_) => "Report this as a bug".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ReleaseError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            ReleaseError::BuildsFailed { failed } => {
                format!("Build failed for: {}", failed.join(", "))
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ReleaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failure_message_uses_last_output_line() {
        let err = BuildError::BuildCommandFailed {
            exit_code: Some(2),
            output: "step 1\nboom\n\n".to_string(),
        };
        assert_eq!(err.to_string(), "Release command failed (exit code 2): boom");
        assert_eq!(err.output(), Some("step 1\nboom\n\n"));
    }

    #[test]
    fn test_version_unchanged_mentions_stale_version() {
        let err = BuildError::VersionUnchanged("1.0.0".to_string());
        assert!(err.to_string().contains("staying at version 1.0.0"));
        assert_eq!(err.kind(), "version_unchanged");
    }

    #[test]
    fn test_severity_follows_category() {
        let config = ReleaseError::MissingConfigError {
            field: "environments.testing.api_base".to_string(),
        };
        assert_eq!(config.category(), ErrorCategory::Configuration);
        assert_eq!(config.severity(), ErrorSeverity::Medium);

        let failed = ReleaseError::BuildsFailed {
            failed: vec!["web".to_string()],
        };
        assert_eq!(failed.severity(), ErrorSeverity::High);
        assert_eq!(failed.user_friendly_message(), "Build failed for: web");
    }
}
