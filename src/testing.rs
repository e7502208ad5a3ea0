//! In-memory connection provider for tests.
//!
//! [`MemoryProvider`] records every statement, keeps transactional writes
//! staged until commit, and counts connection acquisitions and releases.
//! Failures and delays can be injected by SQL substring or by session number.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use workload_core::{
    BindValue, BoxError, ConnectionMode, ConnectionProvider, ExecutionError, SessionConnection,
};

use crate::binding::BoundStatement;

/// Connection counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    pub acquired: usize,
    pub released: usize,
    /// Highest number of connections open at once
    pub max_open: usize,
    pub begins: usize,
    pub commits: usize,
    pub rollbacks: usize,
}

#[derive(Debug, Default)]
struct State {
    stats: MemoryStats,
    open: usize,
    session_starts: Vec<Instant>,
    executed: Vec<BoundStatement>,
    /// Writes that are visible (committed, or run outside a transaction)
    applied: Vec<String>,

    fail_acquire: bool,
    fail_commit: bool,
    fail_on: Vec<String>,
    delay_on: Vec<(String, Duration)>,
    slow_sessions: Vec<(usize, Duration)>,
    rows_per_query: u64,
}

/// Shared-state provider; clones observe the same connections.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider {
    mode: ConnectionMode,
    state: Arc<Mutex<State>>,
}

impl MemoryProvider {
    pub fn new(mode: ConnectionMode) -> Self {
        Self {
            mode,
            state: Arc::default(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        lock(&self.state)
    }

    /// Fail every statement whose SQL contains `pattern`.
    pub fn fail_on(self, pattern: &str) -> Self {
        self.lock().fail_on.push(pattern.to_string());
        self
    }

    /// Sleep before running statements whose SQL contains `pattern`.
    pub fn delay_on(self, pattern: &str, delay: Duration) -> Self {
        self.lock().delay_on.push((pattern.to_string(), delay));
        self
    }

    /// Sleep at the start of the `session`-th acquisition (1-based).
    pub fn slow_session(self, session: usize, delay: Duration) -> Self {
        self.lock().slow_sessions.push((session, delay));
        self
    }

    /// Make every acquisition fail.
    pub fn fail_acquire(self) -> Self {
        self.lock().fail_acquire = true;
        self
    }

    /// Make every commit fail.
    pub fn fail_commit(self) -> Self {
        self.lock().fail_commit = true;
        self
    }

    /// Number of rows each read returns.
    pub fn rows_per_query(self, rows: u64) -> Self {
        self.lock().rows_per_query = rows;
        self
    }

    pub fn stats(&self) -> MemoryStats {
        self.lock().stats
    }

    /// Connections currently held.
    pub fn open(&self) -> usize {
        self.lock().open
    }

    /// When each acquisition happened, in order.
    pub fn session_starts(&self) -> Vec<Instant> {
        self.lock().session_starts.clone()
    }

    /// Every statement attempted, in order.
    pub fn executed(&self) -> Vec<BoundStatement> {
        self.lock().executed.clone()
    }

    /// SQL of every write that took effect, in order.
    pub fn applied(&self) -> Vec<String> {
        self.lock().applied.clone()
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ConnectionProvider for MemoryProvider {
    type Connection = MemoryConnection;

    async fn acquire(&self) -> Result<MemoryConnection, ExecutionError> {
        let delay = {
            let mut state = self.lock();
            state.session_starts.push(Instant::now());
            if state.fail_acquire {
                return Err(ExecutionError::Acquire("connection refused".into()));
            }
            state.stats.acquired += 1;
            state.open += 1;
            state.stats.max_open = state.stats.max_open.max(state.open);

            let session = state.stats.acquired;
            state
                .slow_sessions
                .iter()
                .find(|(n, _)| *n == session)
                .map(|(_, delay)| *delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        Ok(MemoryConnection {
            state: Arc::clone(&self.state),
            staged: None,
            released: false,
        })
    }

    fn mode(&self) -> ConnectionMode {
        self.mode
    }
}

/// Connection handed out by [`MemoryProvider`].
#[derive(Debug)]
pub struct MemoryConnection {
    state: Arc<Mutex<State>>,
    /// Writes of the open transaction
    staged: Option<Vec<String>>,
    released: bool,
}

impl MemoryConnection {
    async fn run(&mut self, sql: &str, args: Vec<BindValue>) -> Result<(), BoxError> {
        let (delay, fail) = {
            let mut state = lock(&self.state);
            state.executed.push(BoundStatement {
                sql: sql.to_string(),
                args,
            });
            let delay: Duration = state
                .delay_on
                .iter()
                .filter(|(pattern, _)| sql.contains(pattern.as_str()))
                .map(|(_, delay)| *delay)
                .sum();
            let fail = state.fail_on.iter().any(|pattern| sql.contains(pattern.as_str()));
            (delay, fail)
        };

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if fail {
            return Err(format!("injected failure: {sql}").into());
        }
        Ok(())
    }

    fn mark_released(&mut self) {
        if !self.released {
            self.released = true;
            let mut state = lock(&self.state);
            state.stats.released += 1;
            state.open -= 1;
        }
    }
}

#[async_trait]
impl SessionConnection for MemoryConnection {
    async fn begin(&mut self) -> Result<(), ExecutionError> {
        lock(&self.state).stats.begins += 1;
        self.staged = Some(Vec::new());
        Ok(())
    }

    async fn query_drain(
        &mut self,
        sql: &str,
        args: Vec<BindValue>,
    ) -> Result<u64, ExecutionError> {
        self.run(sql, args).await.map_err(ExecutionError::Rows)?;
        Ok(lock(&self.state).rows_per_query)
    }

    async fn execute(&mut self, sql: &str, args: Vec<BindValue>) -> Result<u64, ExecutionError> {
        self.run(sql, args).await.map_err(ExecutionError::Statement)?;
        match &mut self.staged {
            Some(staged) => staged.push(sql.to_string()),
            None => lock(&self.state).applied.push(sql.to_string()),
        }
        Ok(1)
    }

    async fn commit(&mut self) -> Result<(), ExecutionError> {
        let staged = self.staged.take().unwrap_or_default();
        let mut state = lock(&self.state);
        if state.fail_commit {
            return Err(ExecutionError::Commit("injected commit failure".into()));
        }
        state.stats.commits += 1;
        state.applied.extend(staged);
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), ExecutionError> {
        self.staged = None;
        lock(&self.state).stats.rollbacks += 1;
        Ok(())
    }

    async fn release(&mut self) {
        self.mark_released();
    }
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.mark_released();
    }
}
