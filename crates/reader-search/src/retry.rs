//! The exact retry/backoff policy §4.1 specifies: up to 5 attempts,
//! retry only on HTTP 429, `500 + uniform(0,1000)` ms between attempts.
//!
//! Shaped after `riptide_utils::retry::RetryPolicy`'s `execute` loop, with
//! a fixed jitter window in place of that loop's exponential backoff.

use std::time::Duration;

use rand::Rng;
use tracing::{debug, warn};

pub const MAX_ATTEMPTS: usize = 5;

/// `500 + uniform(0,1000)` ms, per §4.1.
pub fn rate_limit_backoff() -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(0..=1000u64);
    Duration::from_millis(500 + jitter_ms)
}

/// Outcome of one attempt, used to decide whether `execute_with_429_retry`
/// should retry.
pub enum AttemptOutcome<T> {
    /// Success.
    Done(T),
    /// HTTP 429: sleep and retry if attempts remain.
    RateLimited,
    /// Any other failure: fail immediately (§4.1: "On any other failure
    /// ... fail immediately").
    Fatal(anyhow::Error),
}

/// Runs `attempt` up to [`MAX_ATTEMPTS`] times, retrying only on
/// [`AttemptOutcome::RateLimited`], sleeping [`rate_limit_backoff`]
/// between attempts.
pub async fn execute_with_429_retry<F, Fut, T>(mut attempt: F) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = AttemptOutcome<T>>,
{
    for attempt_number in 1..=MAX_ATTEMPTS {
        match attempt().await {
            AttemptOutcome::Done(value) => return Ok(value),
            AttemptOutcome::Fatal(err) => return Err(err),
            AttemptOutcome::RateLimited => {
                if attempt_number == MAX_ATTEMPTS {
                    warn!(attempt_number, "exhausted retries after 429s");
                    return Err(anyhow::anyhow!(
                        "upstream search rate-limited after {} attempts",
                        MAX_ATTEMPTS
                    ));
                }
                let backoff = rate_limit_backoff();
                debug!(attempt_number, backoff_ms = %backoff.as_millis(), "429 from upstream, backing off");
                tokio::time::sleep(backoff).await;
            }
        }
    }
    unreachable!("loop always returns by the last iteration")
}
