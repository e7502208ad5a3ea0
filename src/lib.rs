//! db-workload library
//!
//! Drives synthetic SQL workload against MySQL: parameterized templates are
//! filled with randomly generated values and executed by independent workers
//! at a configured rate, optionally inside one transaction per session.
//!
//! # Architecture
//!
//! ```text
//! WorkloadConfig ──▶ GeneratorFactory ──▶ CompiledTemplate (per worker)
//!                                               │
//!                                               ▼
//!  Runner ──spawns──▶ WorkerLoop ──pace──▶ SessionExecutor ──bind──▶ ConnectionProvider
//!    │                    ▲
//!    └─ CancellationToken ┘
//! ```
//!
//! - [`binding`] - placeholder scanning and array expansion
//! - [`session`] - one pass over every template on one connection
//! - [`worker`] - session pacing and cancellation
//! - [`run`] - worker construction, signals and shutdown
//! - [`testing`] - in-memory connection provider
//!
//! # CLI Usage
//!
//! ```bash
//! # Run config.json until Ctrl-C
//! db-workload --config config.json
//!
//! # Ten workers at 50 sessions/s each for five minutes
//! db-workload --config workload.yaml --concurrency 10 --rate-per-thread 50 --duration 5m
//!
//! # Print one bound statement per template and exit
//! db-workload --config workload.yaml --dry-run --seed 42
//! ```

pub mod binding;
pub mod duration;
pub mod logging;
pub mod run;
pub mod session;
pub mod testing;
pub mod worker;

pub use binding::{bind, count_placeholders, BindingMismatchError, BoundStatement, StatementKind};
pub use run::{preview_statements, run_workers, shutdown_signal, RunOptions, RunSummary, WorkloadError};
pub use session::{
    compile_templates, CompiledTemplate, SessionError, SessionExecutor, SessionReport, TemplateError,
};
pub use worker::{Pacer, WorkerLoop};
