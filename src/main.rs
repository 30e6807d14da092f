use anyhow::Context;
use clap::Parser;
use relcheck::app::console::{print_summary, AssumeYes, ConsoleReporter, StdinPrompt};
use relcheck::config::cli::{BuildArgs, Commands, LogFormat};
use relcheck::domain::model::{BuildReport, Selection};
use relcheck::domain::ports::Prompt;
use relcheck::utils::error::{ErrorSeverity, ReleaseError};
use relcheck::utils::{logger, validation::Validate};
use relcheck::{BuildOrchestrator, BuildRequest, CliConfig, ReleaseConfig, ShellRunner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    match cli.log_format {
        LogFormat::Compact => logger::init_cli_logger(cli.verbose),
        LogFormat::Json => logger::init_json_logger(cli.verbose),
    }

    tracing::info!("Starting relcheck");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let report = match &cli.command {
        Commands::Build(args) => build(&cli, args).await,
    }
    .unwrap_or_else(|e| exit_with(e));

    if let Some(path) = build_report_path(&cli) {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write build report to {}", path))?;
        tracing::info!("📁 Build report saved to: {}", path);
    }

    let failed = report.failed();
    if !failed.is_empty() {
        exit_with(ReleaseError::BuildsFailed {
            failed: failed.iter().map(|c| c.name().to_string()).collect(),
        });
    }

    Ok(())
}

fn exit_with(e: ReleaseError) -> ! {
    tracing::error!(
        "❌ relcheck failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn build_report_path(cli: &CliConfig) -> Option<&str> {
    match &cli.command {
        Commands::Build(args) => args.report.as_deref(),
    }
}

async fn build(cli: &CliConfig, args: &BuildArgs) -> Result<BuildReport, ReleaseError> {
    cli.validate()?;

    // 啟動時即驗證所有環境設定
    tracing::info!("📁 Loading configuration from: {}", cli.config);
    let config = ReleaseConfig::load(&cli.config)?;
    tracing::info!("✅ Configuration loaded and validated successfully");

    let request = BuildRequest {
        environment: args.environment.clone(),
        selection: Selection::parse(&args.apps)?,
        details: args.details,
        interactive: args.interactive,
    };

    let runner = match args.timeout() {
        Some(limit) => ShellRunner::with_timeout(limit),
        None => ShellRunner::new(),
    };

    let report = if args.interactive {
        run_with(&config, runner, StdinPrompt, &request).await?
    } else {
        run_with(&config, runner, AssumeYes, &request).await?
    };

    print_summary(&report);
    Ok(report)
}

async fn run_with<P: Prompt>(
    config: &ReleaseConfig,
    runner: ShellRunner,
    prompt: P,
    request: &BuildRequest,
) -> Result<BuildReport, ReleaseError> {
    BuildOrchestrator::new(config, runner, prompt, ConsoleReporter)
        .run(request)
        .await
}
