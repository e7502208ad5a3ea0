//! Command-line interface for db-workload
//!
//! # Usage Examples
//!
//! ```bash
//! # Run the workload described in config.json until Ctrl-C
//! db-workload
//!
//! # Override the file's settings
//! db-workload --config workload.yaml \
//!   --concurrency 16 \
//!   --rate-per-thread 20 \
//!   --connection-type short \
//!   --use-transaction \
//!   --duration 10m
//!
//! # Check the templates without touching the database
//! db-workload --config workload.yaml --dry-run
//! ```
//!
//! Set `RUST_LOG=info` (or `debug` for per-session logs) to see progress.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use db_workload::duration::parse_run_duration;
use db_workload::logging::mask_connection_password;
use db_workload::{preview_statements, run_workers, shutdown_signal, RunOptions};
use tracing::info;
use workload_core::{ConnectionMode, WorkloadConfig};
use workload_generator::GeneratorFactory;
use workload_mysql::{MySqlArgs, MySqlProvider};

#[derive(Parser)]
#[command(name = "db-workload")]
#[command(about = "Generate synthetic SQL workload against MySQL")]
#[command(version)]
struct Cli {
    /// Path to the workload configuration file (JSON or YAML)
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Number of workers (overrides `concurrency`)
    #[arg(long)]
    concurrency: Option<usize>,

    /// Sessions per second per worker, 0 for unlimited (overrides `rate_per_thread`)
    #[arg(long)]
    rate_per_thread: Option<u32>,

    #[command(flatten)]
    mysql: MySqlArgs,

    /// Connection lifecycle (overrides `connection_type`)
    #[arg(long, value_enum)]
    connection_type: Option<ConnectionTypeArg>,

    /// Run every session inside one transaction (overrides `use_transaction`)
    #[arg(long)]
    use_transaction: bool,

    /// Stop after this long (e.g. "300", "30s", "5m", "1h"); runs until
    /// interrupted when omitted
    #[arg(long, value_parser = parse_run_duration)]
    duration: Option<Duration>,

    /// Seed for reproducible values; worker N uses seed + N
    #[arg(long)]
    seed: Option<u64>,

    /// Print one bound statement per template and exit
    #[arg(long)]
    dry_run: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ConnectionTypeArg {
    /// One pooled connection per worker, reused across sessions
    Long,
    /// A new connection for every session
    Short,
}

impl From<ConnectionTypeArg> for ConnectionMode {
    fn from(arg: ConnectionTypeArg) -> Self {
        match arg {
            ConnectionTypeArg::Long => ConnectionMode::Long,
            ConnectionTypeArg::Short => ConnectionMode::Short,
        }
    }
}

impl Cli {
    /// Load the config file and apply command-line overrides.
    fn load_config(&self) -> anyhow::Result<WorkloadConfig> {
        let mut config = WorkloadConfig::from_file(&self.config)
            .with_context(|| format!("Failed to load configuration from {}", self.config.display()))?;

        if let Some(concurrency) = self.concurrency {
            anyhow::ensure!(concurrency > 0, "--concurrency must be greater than zero");
            config.concurrency = concurrency;
        }
        if let Some(rate) = self.rate_per_thread {
            config.rate_per_thread = rate;
        }
        config.db_conn_str = self.mysql.resolve(&config.db_conn_str).to_string();
        if let Some(connection_type) = self.connection_type {
            config.connection_type = connection_type.into();
        }
        if self.use_transaction {
            config.use_transaction = true;
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = cli.load_config()?;
    let factory = GeneratorFactory::default();

    if cli.dry_run {
        let statements = preview_statements(&config, &factory, cli.seed)
            .context("Failed to build generators")?;
        for (index, statement) in statements.iter().enumerate() {
            println!("[{index}] {statement}");
        }
        return Ok(());
    }

    info!(
        "Starting workload with concurrency {} against {}",
        config.concurrency,
        mask_connection_password(&config.db_conn_str)
    );

    let conn_str = config.db_conn_str.clone();
    let mode = config.connection_type;
    let summary = run_workers(
        &config,
        RunOptions { seed: cli.seed },
        &factory,
        |_worker| MySqlProvider::new(&conn_str, mode),
        shutdown_signal(cli.duration),
    )
    .await
    .context("Failed to start workers")?;

    info!(
        "Workload finished: {} workers ran {} sessions",
        summary.workers, summary.sessions
    );
    Ok(())
}
