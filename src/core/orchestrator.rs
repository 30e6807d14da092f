use crate::config::ReleaseConfig;
use crate::core::manifest::write_build_version;
use crate::core::verifier::{BuildVerifier, VerifiedBuild};
use crate::domain::model::{
    BuildReport, BuildStatus, ComponentId, ComponentOutcome, ComponentSpec, Environment, Selection,
};
use crate::domain::ports::{CommandRunner, Prompt, Reporter};
use crate::utils::error::{ReleaseError, Result};
use chrono::Utc;

pub const ALL_COMPONENTS_WARNING: &str = "Building all components may take a few minutes.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub environment: String,
    pub selection: Selection,
    pub details: bool,
    pub interactive: bool,
}

/// Builds the requested components one after another.
///
/// A failing component never stops the ones after it; the report records every outcome.
pub struct BuildOrchestrator<'a, R: CommandRunner, P: Prompt, O: Reporter> {
    config: &'a ReleaseConfig,
    verifier: BuildVerifier<R>,
    prompt: P,
    reporter: O,
}

impl<'a, R: CommandRunner, P: Prompt, O: Reporter> BuildOrchestrator<'a, R, P, O> {
    pub fn new(config: &'a ReleaseConfig, runner: R, prompt: P, reporter: O) -> Self {
        Self {
            config,
            verifier: BuildVerifier::new(runner),
            prompt,
            reporter,
        }
    }

    pub async fn run(&self, request: &BuildRequest) -> Result<BuildReport> {
        let environment = self.config.environment(&request.environment)?;
        let components = request.selection.components();
        let mut report = BuildReport::new(&environment.name);

        tracing::info!(
            "🚀 Building [{}] for environment '{}'",
            components.iter().map(|c| c.name()).collect::<Vec<_>>().join(", "),
            environment.name
        );

        // "all" 只詢問一次；逐一列出的元件則個別確認
        let mut confirmed_all = true;
        if request.selection == Selection::All {
            self.reporter.warn(ALL_COMPONENTS_WARNING);
            if request.interactive {
                confirmed_all = self.prompt.confirm("Do you want to continue?");
            }
        }

        for component in components {
            let proceed = match request.selection {
                Selection::All => confirmed_all,
                Selection::Only(_) if request.interactive => self.prompt.confirm(&format!(
                    "Do you want to continue building {}?",
                    component
                )),
                Selection::Only(_) => true,
            };

            let outcome = if proceed {
                self.build_component(component, environment, request.details).await
            } else {
                tracing::info!("⏭️ Skipping {}", component);
                let now = Utc::now();
                ComponentOutcome {
                    component,
                    status: BuildStatus::Skipped,
                    started_at: now,
                    finished_at: now,
                }
            };

            self.reporter.build_finished(&outcome);
            report.outcomes.push(outcome);
        }

        let failed = report.failed();
        if failed.is_empty() {
            tracing::info!("✅ All requested components handled");
        } else {
            tracing::error!("❌ {} component(s) failed", failed.len());
        }

        Ok(report)
    }

    async fn build_component(
        &self,
        component: ComponentId,
        environment: &Environment,
        details: bool,
    ) -> ComponentOutcome {
        let spec = self.config.component(component);
        let started_at = Utc::now();
        self.reporter.build_started(component);

        let status = match self.build_and_record(spec, environment, details).await {
            Ok(build) => {
                tracing::info!("📦 {} built: {} -> {}", component, build.previous, build.version);
                BuildStatus::Built {
                    previous: build.previous,
                    version: build.version,
                }
            }
            Err(e) => {
                tracing::error!("❌ {} build failed: {}", component, e);
                let kind = match &e {
                    ReleaseError::Build(build) => build.kind().to_string(),
                    _ => "manifest_update".to_string(),
                };
                BuildStatus::Failed {
                    kind,
                    reason: e.to_string(),
                }
            }
        };

        ComponentOutcome {
            component,
            status,
            started_at,
            finished_at: Utc::now(),
        }
    }

    async fn build_and_record(
        &self,
        spec: &ComponentSpec,
        environment: &Environment,
        details: bool,
    ) -> Result<VerifiedBuild> {
        let env = spec.build_env(environment);
        let attempt = self
            .verifier
            .attempt(&spec.dir, &spec.release_command, &env)
            .await;

        // 只要指令有執行過，就回報輸出（包含 VersionUnchanged 的情況）
        if details {
            if let Some(output) = &attempt.output {
                self.reporter.command_output(spec.id, output);
            }
        }

        let build = attempt.result?;
        if let Some(manifest) = &spec.manifest {
            write_build_version(&manifest.path, &manifest.identifier, &build.version).await?;
        }
        Ok(build)
    }
}
