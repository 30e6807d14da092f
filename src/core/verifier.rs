//! Build-and-verify: a release only counts as built when its VERSION marker moves.

use crate::core::marker::read_version;
use crate::domain::ports::CommandRunner;
use crate::utils::error::BuildError;
use std::collections::BTreeMap;
use std::path::Path;

/// A successful build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedBuild {
    pub previous: String,
    pub version: String,
}

/// Outcome of one release attempt.
#[derive(Debug)]
pub struct BuildAttempt {
    /// Captured release output; `None` only when the command never ran.
    pub output: Option<String>,
    pub result: Result<VerifiedBuild, BuildError>,
}

impl BuildAttempt {
    fn not_run(error: BuildError) -> Self {
        Self {
            output: None,
            result: Err(error),
        }
    }
}

pub struct BuildVerifier<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> BuildVerifier<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    /// Runs `release_command` in `component_dir` and returns the new version.
    ///
    /// The marker is read before and after the command. A non-zero exit is reported as
    /// `BuildCommandFailed` without looking at the marker again; a zero exit that leaves
    /// the marker untouched is `VersionUnchanged`.
    pub async fn run_build(
        &self,
        component_dir: &Path,
        release_command: &str,
        env: &BTreeMap<String, String>,
    ) -> Result<VerifiedBuild, BuildError> {
        self.attempt(component_dir, release_command, env).await.result
    }

    /// Same as [`run_build`](Self::run_build), but keeps the command output for every
    /// failure that happens after the command ran.
    pub async fn attempt(
        &self,
        component_dir: &Path,
        release_command: &str,
        env: &BTreeMap<String, String>,
    ) -> BuildAttempt {
        let before = match read_version(component_dir).await {
            Ok(version) => version,
            Err(e) => return BuildAttempt::not_run(e),
        };
        tracing::debug!("📌 {} is at version {}", component_dir.display(), before);

        let run = self.runner.run(release_command, component_dir, env).await;
        if !run.success() {
            return BuildAttempt {
                output: Some(run.output.clone()),
                result: Err(BuildError::BuildCommandFailed {
                    exit_code: run.exit_code,
                    output: run.output,
                }),
            };
        }

        let result = match read_version(component_dir).await {
            Ok(after) if after == before => Err(BuildError::VersionUnchanged(before)),
            Ok(after) => {
                tracing::debug!("📦 {} moved {} -> {}", component_dir.display(), before, after);
                Ok(VerifiedBuild {
                    previous: before,
                    version: after,
                })
            }
            Err(e) => Err(e),
        };

        BuildAttempt {
            output: Some(run.output),
            result,
        }
    }
}

/// Convenience wrapper returning only the new version.
pub async fn run_build<R: CommandRunner>(
    runner: R,
    component_dir: &Path,
    release_command: &str,
    env: &BTreeMap<String, String>,
) -> Result<String, BuildError> {
    BuildVerifier::new(runner)
        .run_build(component_dir, release_command, env)
        .await
        .map(|build| build.version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::CommandOutput;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Writes a fixed marker (or nothing) and exits with a fixed code.
    struct FakeRunner {
        new_version: Option<&'static str>,
        exit_code: Option<i32>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(
            &self,
            _command: &str,
            dir: &Path,
            _env: &BTreeMap<String, String>,
        ) -> CommandOutput {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(version) = self.new_version {
                std::fs::write(dir.join("VERSION"), format!("{version}\n")).unwrap();
            }
            CommandOutput {
                exit_code: self.exit_code,
                output: "fake output\n".to_string(),
            }
        }
    }

    fn fake(new_version: Option<&'static str>, exit_code: Option<i32>) -> (FakeRunner, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            FakeRunner {
                new_version,
                exit_code,
                calls: calls.clone(),
            },
            calls,
        )
    }

    fn component_at(version: &str) -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("VERSION"), format!("{version}\n")).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_changed_version_is_success() {
        let dir = component_at("1.0.0");
        let (runner, calls) = fake(Some("1.0.1"), Some(0));

        let build = BuildVerifier::new(runner)
            .run_build(dir.path(), "release", &BTreeMap::new())
            .await
            .unwrap();

        assert_eq!(build.previous, "1.0.0");
        assert_eq!(build.version, "1.0.1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unchanged_attempt_keeps_output() {
        let dir = component_at("1.0.0");
        let (runner, _) = fake(None, Some(0));

        let attempt = BuildVerifier::new(runner)
            .attempt(dir.path(), "release", &BTreeMap::new())
            .await;

        assert_eq!(attempt.output.as_deref(), Some("fake output\n"));
        assert!(matches!(attempt.result, Err(BuildError::VersionUnchanged(_))));
    }

    /// Deletes the marker while "releasing".
    struct RemovingRunner;

    #[async_trait]
    impl CommandRunner for RemovingRunner {
        async fn run(
            &self,
            _command: &str,
            dir: &Path,
            _env: &BTreeMap<String, String>,
        ) -> CommandOutput {
            std::fs::remove_file(dir.join("VERSION")).unwrap();
            CommandOutput {
                exit_code: Some(0),
                output: "cleaned workspace\n".to_string(),
            }
        }
    }

    #[tokio::test]
    async fn test_marker_removed_by_release_keeps_output() {
        let dir = component_at("1.0.0");

        let attempt = BuildVerifier::new(RemovingRunner)
            .attempt(dir.path(), "release", &BTreeMap::new())
            .await;

        assert_eq!(attempt.output.as_deref(), Some("cleaned workspace\n"));
        assert!(matches!(attempt.result, Err(BuildError::MarkerUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_missing_marker_attempt_has_no_output() {
        let dir = TempDir::new().unwrap();
        let (runner, _) = fake(Some("1.0.1"), Some(0));

        let attempt = BuildVerifier::new(runner)
            .attempt(dir.path(), "release", &BTreeMap::new())
            .await;

        assert_eq!(attempt.output, None);
        assert!(matches!(attempt.result, Err(BuildError::MarkerUnreadable { .. })));
    }

    #[tokio::test]
    async fn test_unchanged_version_fails() {
        let dir = component_at("1.0.0");
        let (runner, _) = fake(None, Some(0));

        let err = run_build(runner, dir.path(), "release", &BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::VersionUnchanged(v) if v == "1.0.0"));
    }

    #[tokio::test]
    async fn test_nonzero_exit_wins_over_changed_marker() {
        let dir = component_at("1.0.0");
        let (runner, _) = fake(Some("1.0.1"), Some(1));

        let err = run_build(runner, dir.path(), "release", &BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            BuildError::BuildCommandFailed { exit_code: Some(1), .. }
        ));
    }

    #[tokio::test]
    async fn test_killed_command_has_no_exit_code() {
        let dir = component_at("1.0.0");
        let (runner, _) = fake(None, None);

        let err = run_build(runner, dir.path(), "release", &BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::BuildCommandFailed { exit_code: None, .. }));
    }

    #[tokio::test]
    async fn test_missing_marker_never_runs_command() {
        let dir = TempDir::new().unwrap();
        let (runner, calls) = fake(Some("1.0.1"), Some(0));

        let err = run_build(runner, dir.path(), "release", &BTreeMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, BuildError::MarkerUnreadable { .. }));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
