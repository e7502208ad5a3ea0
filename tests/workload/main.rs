//! Workload integration tests.
//!
//! These tests drive sessions, workers and the runner against the in-memory
//! connection provider. Worker and runner tests use tokio's paused clock, so
//! pacing assertions are exact.

mod common;
mod runner_test;
mod session_test;
mod worker_test;
