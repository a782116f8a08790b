//! CLI command definitions, routing, and tracing setup.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use counterclaim_core::{Orchestrator, RunProgress, RunReport};
use counterclaim_publish::{FilePublisher, MemoryPublisher, Publisher};
use counterclaim_render::HtmlRenderer;
use counterclaim_shared::{
    AppConfig, PublisherKind, config_file_path, init_config, load_config, load_config_from,
    validate_config,
};
use counterclaim_source::HttpFactSource;
use counterclaim_spoof::spoofer_from_config;
use counterclaim_storage::LibsqlStore;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// counterclaim — invert fact checks and publish the results.
#[derive(Parser)]
#[command(
    name = "counterclaim",
    version,
    about = "Scrape fact checks, generate counter-articles, publish them as pages.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to a config file (defaults to ~/.counterclaim/counterclaim.toml).
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Execute one pipeline run and exit.
    Run,

    /// Run the pipeline on a timer, with a health endpoint.
    Serve {
        /// Seconds between runs (overrides config).
        #[arg(long)]
        interval: Option<u64>,

        /// Port for the health endpoint (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Probe a running serve instance's health endpoint.
    Healthcheck {
        /// Port the serve instance listens on (overrides config).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "counterclaim=info",
        1 => "counterclaim=debug",
        _ => "counterclaim=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(cli.config.as_deref())?;

    match cli.command {
        Command::Run => cmd_run(config).await,
        Command::Serve { interval, port } => cmd_serve(config, interval, port).await,
        Command::Healthcheck { port } => cmd_healthcheck(&config, port).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(&config),
        },
    }
}

fn resolve_config(path: Option<&str>) -> Result<AppConfig> {
    match path {
        Some(p) => Ok(load_config_from(Path::new(p))?),
        None => Ok(load_config()?),
    }
}

/// Wire the pipeline collaborators from config.
async fn build_orchestrator(config: &AppConfig) -> Result<Orchestrator> {
    let store = LibsqlStore::open(Path::new(&config.storage.db_path)).await?;
    let source = HttpFactSource::new(&config.source)?;
    let spoofer = spoofer_from_config(&config.spoofer)?;

    let publisher: Arc<dyn Publisher> = match config.publish.kind {
        PublisherKind::File => Arc::new(FilePublisher::new(&config.publish.output_dir)),
        PublisherKind::Memory => Arc::new(MemoryPublisher::new()),
    };

    Ok(Orchestrator::new(
        Arc::new(source),
        Arc::new(store),
        Arc::from(spoofer),
        Arc::new(HtmlRenderer),
        publisher,
        config.run.recent_limit,
    ))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_run(config: AppConfig) -> Result<()> {
    validate_config(&config)?;
    let orchestrator = build_orchestrator(&config).await?;

    let reporter = CliProgress::new();
    let report = orchestrator.run_once(&reporter).await?;

    println!();
    println!("  Run complete.");
    println!("  Discovered: {}", report.ingest.discovered);
    println!("  New items:  {}", report.ingest.new_items);
    println!("  Published:  {}", report.ingest.published);
    println!("  Repaired:   {}", report.reconcile.repaired);
    println!(
        "  Failures:   {}",
        report.ingest.failures() + report.reconcile.failures
    );
    println!("  Time:       {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

async fn cmd_serve(config: AppConfig, interval: Option<u64>, port: Option<u16>) -> Result<()> {
    validate_config(&config)?;
    let interval_secs = interval.unwrap_or(config.run.interval_secs);
    if interval_secs == 0 {
        return Err(eyre!("interval must be greater than zero"));
    }
    let port = port.unwrap_or(config.run.health_port);

    let orchestrator = build_orchestrator(&config).await?;

    // Health endpoint for container orchestration.
    let app = Router::new().route("/healthz", get(|| async { "ok" }));
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "health endpoint listening");
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "health endpoint stopped");
        }
    });

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("received interrupt");
            let _ = shutdown_tx.send(true);
        }
    });

    info!(interval_secs, "starting scheduled runs");
    orchestrator
        .run_scheduled(
            Duration::from_secs(interval_secs),
            shutdown_rx,
            &counterclaim_core::SilentProgress,
        )
        .await?;
    Ok(())
}

async fn cmd_healthcheck(config: &AppConfig, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.run.health_port);
    let url = format!("http://127.0.0.1:{port}/healthz");

    let response = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?
        .get(&url)
        .send()
        .await
        .map_err(|e| eyre!("health probe failed: {e}"))?;

    if !response.status().is_success() {
        return Err(eyre!("health probe returned HTTP {}", response.status()));
    }
    println!("ok");
    Ok(())
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Created config file at {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig) -> Result<()> {
    let path = config_file_path()?;
    println!("# {}", path.display());
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(Duration::from_millis(80));
        Self { spinner }
    }
}

impl RunProgress for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn item(&self, slug: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] {slug}"));
    }

    fn done(&self, report: &RunReport) {
        self.spinner.finish_with_message(report.summary());
    }
}
