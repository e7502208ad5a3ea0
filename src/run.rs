//! Runner: builds every worker, runs them, and stops them together.

use std::future::Future;
use std::time::Duration;

use rand::SeedableRng;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use workload_core::{BoxError, ConnectionProvider, WorkloadConfig};
use workload_generator::{GeneratorFactory, WorkloadRng};

use crate::binding::BoundStatement;
use crate::session::{compile_templates, SessionExecutor, TemplateError};
use crate::worker::WorkerLoop;

/// Startup failures. Nothing has executed when one of these is returned.
#[derive(Debug, thiserror::Error)]
pub enum WorkloadError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("worker {worker}: failed to create connection provider: {source}")]
    Provider {
        worker: usize,
        #[source]
        source: BoxError,
    },
}

/// Runner settings that do not come from the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Seed worker `n` with `seed + n` instead of OS entropy
    pub seed: Option<u64>,
}

/// Totals after every worker has stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub workers: usize,
    pub sessions: u64,
}

/// Randomness source for worker `worker_id`.
pub fn worker_rng(seed: Option<u64>, worker_id: usize) -> WorkloadRng {
    match seed {
        Some(seed) => WorkloadRng::seed_from_u64(seed.wrapping_add(worker_id as u64)),
        None => WorkloadRng::from_os_rng(),
    }
}

/// Build `config.concurrency` workers, run them until `shutdown` resolves,
/// then cancel and wait for all of them.
///
/// Workers are numbered from 1. Every worker is built before any starts, so
/// a bad parameter spec or connection string fails the run up front.
pub async fn run_workers<P, E, F, S>(
    config: &WorkloadConfig,
    options: RunOptions,
    factory: &GeneratorFactory,
    mut make_provider: F,
    shutdown: S,
) -> Result<RunSummary, WorkloadError>
where
    P: ConnectionProvider + 'static,
    E: Into<BoxError>,
    F: FnMut(usize) -> Result<P, E>,
    S: Future<Output = ()>,
{
    let mut workers = Vec::with_capacity(config.concurrency);
    for id in 1..=config.concurrency {
        let templates = compile_templates(&config.templates, factory)?;
        let provider = make_provider(id).map_err(|e| WorkloadError::Provider {
            worker: id,
            source: e.into(),
        })?;
        let executor = SessionExecutor::new(templates, config.use_transaction);
        workers.push(WorkerLoop::new(
            id,
            executor,
            provider,
            worker_rng(options.seed, id),
            config.rate_per_thread,
        ));
    }

    info!(
        "Starting {} workers ({} connections, transactions: {})",
        workers.len(),
        config.connection_type,
        config.use_transaction
    );

    let cancel = CancellationToken::new();
    let mut tasks = JoinSet::new();
    for worker in workers {
        tasks.spawn(worker.run(cancel.clone()));
    }

    shutdown.await;
    info!("Shutdown requested, waiting for in-flight sessions to finish");
    cancel.cancel();

    let mut summary = RunSummary::default();
    while let Some(result) = tasks.join_next().await {
        match result {
            Ok(sessions) => {
                summary.workers += 1;
                summary.sessions += sessions;
            }
            Err(e) => error!("Worker task failed: {e}"),
        }
    }

    info!(
        "All workers have stopped after {} sessions",
        summary.sessions
    );
    Ok(summary)
}

/// Resolves on Ctrl-C, SIGTERM, or after `duration` if set.
pub async fn shutdown_signal(duration: Option<Duration>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let deadline = async {
        match duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        _ = ctrl_c => info!("Received interrupt signal (Ctrl+C)"),
        _ = terminate => info!("Received SIGTERM"),
        _ = deadline => info!("Run duration elapsed"),
    }
}

/// Build every template once and bind one sample statement for each.
pub fn preview_statements(
    config: &WorkloadConfig,
    factory: &GeneratorFactory,
    seed: Option<u64>,
) -> Result<Vec<BoundStatement>, WorkloadError> {
    let templates = compile_templates(&config.templates, factory)?;
    let mut rng = worker_rng(seed, 0);
    Ok(templates.iter().map(|t| t.bind(&mut rng)).collect())
}
