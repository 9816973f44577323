//! Bounded polling: wait until a condition holds or a budget runs out

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{E2eError, E2eResult};

/// Budget and cadence for a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Total wall-clock budget. Zero means "evaluate once, never sleep".
    pub timeout: Duration,

    /// Sleep between evaluations
    pub interval: Duration,
}

impl PollSettings {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }

    /// One-second cadence
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, Duration::from_secs(1))
    }
}

/// How a successful wait went
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Waited {
    pub attempts: u32,
    pub elapsed: Duration,
}

/// Evaluate `predicate` until it returns `true` or `settings.timeout` elapses.
///
/// The predicate runs immediately; no sleep happens if it already holds.
/// An error from the predicate aborts the wait and is returned unchanged.
/// On expiry the returned [`E2eError::Timeout`] carries the elapsed time and
/// the configured budget.
pub async fn wait_for<F, Fut>(
    condition: &str,
    settings: PollSettings,
    mut predicate: F,
) -> E2eResult<Waited>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<bool>>,
{
    let start = Instant::now();
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        if predicate().await? {
            let elapsed = start.elapsed();
            debug!(condition, attempts, ?elapsed, "condition met");
            return Ok(Waited { attempts, elapsed });
        }

        let elapsed = start.elapsed();
        if elapsed >= settings.timeout {
            return Err(E2eError::Timeout {
                condition: condition.to_string(),
                elapsed,
                budget: settings.timeout,
            });
        }

        debug!(condition, attempts, ?elapsed, "condition not met yet");
        // The last evaluation lands on the deadline, not past it.
        sleep(settings.interval.min(settings.timeout - elapsed)).await;
    }
}
