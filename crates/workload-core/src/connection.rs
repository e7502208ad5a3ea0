//! Connection provider traits.
//!
//! The session executor never talks to a database driver directly. It asks a
//! [`ConnectionProvider`] for one scoped [`SessionConnection`] per session and
//! drives statements and the optional transaction through it.
//!
//! Implementations:
//! - `workload_mysql::MySqlProvider` - MySQL via `mysql_async`
//! - `db_workload::testing::MemoryProvider` - in-memory provider for tests

use async_trait::async_trait;

use crate::config::ConnectionMode;
use crate::values::BindValue;

/// Boxed driver error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A database operation failed during a session.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    /// No connection could be obtained
    #[error("failed to acquire connection: {0}")]
    Acquire(#[source] BoxError),

    /// The transaction could not be started
    #[error("failed to begin transaction: {0}")]
    Begin(#[source] BoxError),

    /// The statement was rejected or failed
    #[error("statement failed: {0}")]
    Statement(#[source] BoxError),

    /// Reading the result rows of a query failed
    #[error("failed to read result rows: {0}")]
    Rows(#[source] BoxError),

    /// Commit failed after all statements succeeded
    #[error("failed to commit transaction: {0}")]
    Commit(#[source] BoxError),

    /// Rollback failed
    #[error("failed to roll back transaction: {0}")]
    Rollback(#[source] BoxError),
}

/// Supplies scoped connections to a worker.
///
/// One provider belongs to exactly one worker. In [`ConnectionMode::Short`]
/// a provider must hold at most one physical connection at a time and retain
/// none between sessions.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Connection handle type.
    type Connection: SessionConnection;

    /// Open a connection for one session.
    async fn acquire(&self) -> Result<Self::Connection, ExecutionError>;

    /// Connection lifecycle this provider implements.
    fn mode(&self) -> ConnectionMode;

    /// Close anything the provider keeps open between sessions.
    async fn close(&self) {}
}

/// One connection, valid for the duration of a session.
///
/// Dropping the handle releases it; [`SessionConnection::release`] lets the
/// implementation close it gracefully first.
#[async_trait]
pub trait SessionConnection: Send {
    /// Start a transaction spanning the following statements.
    async fn begin(&mut self) -> Result<(), ExecutionError>;

    /// Run a query and read every result row. Returns the row count.
    async fn query_drain(&mut self, sql: &str, args: Vec<BindValue>)
        -> Result<u64, ExecutionError>;

    /// Run a statement and discard its result. Returns affected rows.
    async fn execute(&mut self, sql: &str, args: Vec<BindValue>) -> Result<u64, ExecutionError>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> Result<(), ExecutionError>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> Result<(), ExecutionError>;

    /// Give the connection back (pooled) or close it (short-lived).
    async fn release(&mut self);
}
