//! CLI entrypoint for synod
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, bail};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use synod_application::{NoProgress, PanelEngine, ProgressNotifier};
use synod_domain::{BudgetCeiling, Mode, PanelRequest, Question, RequesterId, Severity};
use synod_infrastructure::{ConfigLoader, FileConfig, RoutingProvider};
use synod_presentation::{Cli, ConsoleFormatter, ProgressReporter};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Stderr logging, plus a daily-rotated file when `log_dir` is set.
///
/// `RUST_LOG` wins over the verbosity flag. The returned guard flushes the
/// file writer on drop and must live until exit.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "synod.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .try_init()
        .ok();
    guard
}

fn print_config_sources(cli: &Cli) {
    println!("Configuration sources (highest priority first):");
    println!("  Env:      SYNOD_* variables, sections split by __");
    for source in ConfigLoader::sources(cli.config.as_deref()) {
        let status = if source.found { "found" } else { "not found" };
        println!(
            "  {:<9} {} ({})",
            format!("{}:", source.label),
            source.path.display(),
            status
        );
    }
}

fn load_config(cli: &Cli) -> Result<FileConfig> {
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref())?
    };

    let issues = config.validate();
    for issue in issues.iter().filter(|i| i.severity == Severity::Warning) {
        warn!(code = ?issue.code, "{}", issue.message);
    }
    let errors: Vec<_> = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .collect();
    if let Some(first) = errors.first() {
        for error in &errors {
            eprintln!("config error: {}", error);
        }
        bail!("invalid configuration: {}", first);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref());

    if cli.show_config {
        print_config_sources(&cli);
        return Ok(());
    }

    let Some(question) = cli.question.clone() else {
        bail!("A question is required. Run `synod --help` for usage.");
    };

    let config = load_config(&cli)?;
    ConsoleFormatter::set_color(config.output.color);
    info!("Starting synod");

    // === Dependency Injection ===
    let registry = Arc::new(config.registry().context("building the model registry")?);
    let provider = Arc::new(if cli.offline {
        RoutingProvider::offline()
    } else {
        RoutingProvider::from_config(&config.providers)
    });
    let guard = Arc::new(config.budget_guard());
    let engine = PanelEngine::new(provider, registry, config.engine_config(), guard);

    let defaults = config.budget.request_ceiling();
    let ceiling = BudgetCeiling::new(
        cli.max_cost.unwrap_or(defaults.max_cost),
        cli.max_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.max_duration),
    );
    let mode = Mode::from(cli.mode);
    let mut request = PanelRequest::new(
        Question::try_new(question.clone())?,
        mode,
        RequesterId::new(cli.requester.clone()),
    )
    .with_ceiling(ceiling);
    if let Some(context) = &cli.context {
        request = request.with_context(context.clone());
    }

    let show_progress = !cli.quiet && config.output.show_progress;
    let reporter = ProgressReporter::new();
    let progress: &dyn ProgressNotifier = if show_progress {
        &reporter
    } else {
        &NoProgress
    };
    let response = engine.ask_with_progress(&request, progress).await?;

    let format = cli
        .output
        .map(Into::into)
        .or(config.output.format)
        .unwrap_or_default();
    println!("{}", ConsoleFormatter::render(format, &question, &response));

    Ok(())
}
