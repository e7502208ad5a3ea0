//! Worker pacing and cancellation tests (paused clock).

use std::time::Duration;

use db_workload::testing::MemoryProvider;
use db_workload::WorkerLoop;
use rand::SeedableRng;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;
use workload_core::ConnectionMode;
use workload_generator::WorkloadRng;

use crate::common::{executor, single_statement, three_inserts};

fn worker(provider: &MemoryProvider, sql: &str, rate: u32) -> WorkerLoop<MemoryProvider> {
    let config = single_statement(sql, rate);
    WorkerLoop::new(
        1,
        executor(&config),
        provider.clone(),
        WorkloadRng::seed_from_u64(1),
        config.rate_per_thread,
    )
}

fn gaps(starts: &[Instant]) -> Vec<Duration> {
    starts.windows(2).map(|w| w[1] - w[0]).collect()
}

#[tokio::test(start_paused = true)]
async fn test_rate_limited_sessions_are_evenly_spaced() {
    let provider = MemoryProvider::new(ConnectionMode::Long);
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(worker(&provider, "UPDATE t SET x = 1", 10).run(cancel.clone()));

    sleep(Duration::from_millis(1950)).await;
    cancel.cancel();
    let sessions = handle.await.unwrap();

    assert_eq!(sessions, 20);
    let starts = provider.session_starts();
    assert_eq!(starts.len(), 20);
    for gap in gaps(&starts) {
        assert_eq!(gap, Duration::from_millis(100));
    }
}

#[tokio::test(start_paused = true)]
async fn test_slow_session_is_not_followed_by_a_burst() {
    let provider =
        MemoryProvider::new(ConnectionMode::Long).slow_session(5, Duration::from_millis(350));
    let cancel = CancellationToken::new();
    let handle = tokio::spawn(worker(&provider, "UPDATE t SET x = 1", 10).run(cancel.clone()));

    sleep(Duration::from_millis(1920)).await;
    cancel.cancel();
    handle.await.unwrap();

    let gaps = gaps(&provider.session_starts());
    assert!(gaps.len() > 8);
    for gap in &gaps {
        assert!(*gap >= Duration::from_millis(100), "burst detected: {gap:?}");
    }
    // Session 5 overran its slot; the schedule moves back instead of catching up.
    assert_eq!(gaps[4], Duration::from_millis(350));
    assert_eq!(gaps[5], Duration::from_millis(100));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_lets_in_flight_session_finish() {
    let provider =
        MemoryProvider::new(ConnectionMode::Short).delay_on("note = 'slow'", Duration::from_millis(500));
    let cancel = CancellationToken::new();
    let start = Instant::now();
    let handle = tokio::spawn(
        worker(&provider, "UPDATE t SET x = 1 WHERE note = 'slow'", 0).run(cancel.clone()),
    );

    sleep(Duration::from_millis(100)).await;
    cancel.cancel();
    let sessions = handle.await.unwrap();

    assert_eq!(sessions, 1);
    assert!(start.elapsed() >= Duration::from_millis(500));
    // The in-flight statement completed and no further session started
    assert_eq!(provider.applied().len(), 1);
    assert_eq!(provider.session_starts().len(), 1);

    let stats = provider.stats();
    assert_eq!((stats.acquired, stats.released), (1, 1));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_while_waiting_for_tick() {
    let provider = MemoryProvider::new(ConnectionMode::Long);
    let cancel = CancellationToken::new();
    let start = Instant::now();
    let handle = tokio::spawn(worker(&provider, "UPDATE t SET x = 1", 1).run(cancel.clone()));

    sleep(Duration::from_millis(10)).await;
    cancel.cancel();
    let sessions = handle.await.unwrap();

    assert_eq!(sessions, 1);
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn test_failed_sessions_do_not_stop_the_worker() {
    let provider = MemoryProvider::new(ConnectionMode::Long).fail_on("INSERT INTO a");
    let cancel = CancellationToken::new();
    let config = three_inserts(true);
    let worker = WorkerLoop::new(
        7,
        executor(&config),
        provider.clone(),
        WorkloadRng::seed_from_u64(7),
        100,
    );
    assert_eq!(worker.id(), 7);
    let handle = tokio::spawn(worker.run(cancel.clone()));

    sleep(Duration::from_millis(95)).await;
    cancel.cancel();
    let sessions = handle.await.unwrap();

    assert_eq!(sessions, 10);
    let stats = provider.stats();
    assert_eq!(stats.rollbacks, 10);
    assert_eq!(stats.commits, 0);
    assert_eq!((stats.acquired, stats.released), (10, 10));
    assert!(provider.applied().is_empty());
}

#[tokio::test]
async fn test_already_cancelled_worker_runs_nothing() {
    let provider = MemoryProvider::new(ConnectionMode::Long);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let sessions = worker(&provider, "UPDATE t SET x = 1", 0).run(cancel).await;
    assert_eq!(sessions, 0);
    assert!(provider.session_starts().is_empty());
}
