use crate::domain::ports::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Runs release commands through `sh -c` in the component directory.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    fn command(command: &str, dir: &Path, env: &BTreeMap<String, String>) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(command)
            .current_dir(dir)
            .envs(env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // 自成一個 process group，逾時時才能連同 release script 的子程序一起終止
        #[cfg(unix)]
        cmd.process_group(0);
        cmd
    }
}

/// Kills every process in the group led by `pid`.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        tracing::debug!("process group {} already gone: {}", pid, e);
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pid: u32) {}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(
        &self,
        command: &str,
        dir: &Path,
        env: &BTreeMap<String, String>,
    ) -> CommandOutput {
        tracing::debug!("🔧 Running `{}` in {}", command, dir.display());

        let child = match Self::command(command, dir, env).spawn() {
            Ok(child) => child,
            Err(e) => {
                return CommandOutput {
                    exit_code: None,
                    output: format!("failed to spawn `{}`: {}", command, e),
                }
            }
        };

        let pid = child.id();
        let waited = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result,
                Err(_) => {
                    // kill_on_drop 只會終止 sh 本身
                    if let Some(pid) = pid {
                        kill_process_group(pid);
                    }
                    tracing::warn!("⏱️ `{}` exceeded {:?}, killed", command, limit);
                    return CommandOutput {
                        exit_code: None,
                        output: format!("[process killed after {:?} timeout]", limit),
                    };
                }
            },
            None => child.wait_with_output().await,
        };

        match waited {
            Ok(output) => {
                let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
                combined.push_str(&String::from_utf8_lossy(&output.stderr));
                CommandOutput {
                    exit_code: output.status.code(),
                    output: combined,
                }
            }
            Err(e) => CommandOutput {
                exit_code: None,
                output: format!("failed to wait for `{}`: {}", command, e),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_captures_stdout_then_stderr() {
        let dir = TempDir::new().unwrap();
        let out = ShellRunner::new()
            .run("echo out; echo err >&2", dir.path(), &BTreeMap::new())
            .await;

        assert!(out.success());
        assert_eq!(out.output, "out\nerr\n");
    }

    #[tokio::test]
    async fn test_runs_in_dir_with_env() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();
        let env = BTreeMap::from([("GREETING".to_string(), "hello world".to_string())]);

        let out = ShellRunner::new()
            .run("cat marker.txt; echo \" $GREETING\"", dir.path(), &env)
            .await;

        assert_eq!(out.output, "here hello world\n");
    }

    #[test]
    fn test_reports_exit_code() {
        let dir = TempDir::new().unwrap();
        let out = tokio_test::block_on(ShellRunner::new().run(
            "exit 3",
            dir.path(),
            &BTreeMap::new(),
        ));

        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn test_timeout_has_no_exit_code() {
        let dir = TempDir::new().unwrap();
        let out = ShellRunner::with_timeout(Duration::from_millis(200))
            .run("sleep 5", dir.path(), &BTreeMap::new())
            .await;

        assert_eq!(out.exit_code, None);
        assert_eq!(out.output, "[process killed after 200ms timeout]");
    }

    #[tokio::test]
    async fn test_timeout_kills_background_children() {
        let dir = TempDir::new().unwrap();
        let out = ShellRunner::with_timeout(Duration::from_millis(200))
            .run(
                "(sleep 1; touch late.txt) & wait",
                dir.path(),
                &BTreeMap::new(),
            )
            .await;
        assert_eq!(out.exit_code, None);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!dir.path().join("late.txt").exists());
    }

    #[tokio::test]
    async fn test_missing_dir_fails_to_spawn() {
        let dir = TempDir::new().unwrap();
        let out = ShellRunner::new()
            .run("true", &dir.path().join("nope"), &BTreeMap::new())
            .await;

        assert_eq!(out.exit_code, None);
        assert!(out.output.contains("failed to spawn"));
    }
}
