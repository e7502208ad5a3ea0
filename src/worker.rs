//! Worker loop: repeated sessions at a fixed pace until cancelled.

use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};
use workload_core::ConnectionProvider;
use workload_generator::WorkloadRng;

use crate::session::SessionExecutor;

/// Session start pacing.
#[derive(Debug)]
pub struct Pacer {
    interval: Option<Interval>,
}

impl Pacer {
    /// `rate` sessions per second; 0 means unrestricted.
    pub fn new(rate: u32) -> Self {
        let interval = (rate > 0).then(|| {
            let mut interval = interval(Self::period(rate));
            // An overrunning session pushes the schedule back instead of
            // being followed by catch-up sessions.
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { interval }
    }

    /// Time between session starts at `rate` sessions per second, never
    /// shorter than one nanosecond.
    pub fn period(rate: u32) -> Duration {
        Duration::from_nanos((1_000_000_000 / u64::from(rate.max(1))).max(1))
    }

    /// Wait until the next session may start. Returns `false` if cancelled
    /// first.
    pub async fn ready(&mut self, cancel: &CancellationToken) -> bool {
        match &mut self.interval {
            Some(interval) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => false,
                    _ = interval.tick() => true,
                }
            }
            None => {
                // Let other tasks (including whoever cancels us) run.
                tokio::task::yield_now().await;
                !cancel.is_cancelled()
            }
        }
    }
}

/// One independent worker: its own generators, randomness and connections.
pub struct WorkerLoop<P> {
    id: usize,
    executor: SessionExecutor,
    provider: P,
    rng: WorkloadRng,
    rate: u32,
}

impl<P: ConnectionProvider> WorkerLoop<P> {
    pub fn new(id: usize, executor: SessionExecutor, provider: P, rng: WorkloadRng, rate: u32) -> Self {
        Self {
            id,
            executor,
            provider,
            rng,
            rate,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    /// Run sessions until `cancel` fires. An in-flight session always
    /// completes. Returns the number of sessions started.
    pub async fn run(mut self, cancel: CancellationToken) -> u64 {
        let rate = if self.rate > 0 {
            format!("{} sessions/s", self.rate)
        } else {
            "no limit".to_string()
        };
        info!(
            worker_id = self.id,
            connection = %self.provider.mode(),
            transaction = self.executor.use_transaction(),
            "Worker started, rate: {rate}"
        );

        let mut pacer = Pacer::new(self.rate);
        let mut sessions = 0u64;

        while pacer.ready(&cancel).await {
            if cancel.is_cancelled() {
                break;
            }
            sessions += 1;

            match self.executor.run_session(&self.provider, &mut self.rng).await {
                Ok(report) => debug!(
                    worker_id = self.id,
                    session = sessions,
                    statements = report.statements,
                    committed = report.committed,
                    "Session succeeded"
                ),
                Err(e) => error!(worker_id = self.id, session = sessions, "Session failed: {e}"),
            }
        }

        self.provider.close().await;
        info!(worker_id = self.id, sessions, "Worker stopped");
        sessions
    }
}
