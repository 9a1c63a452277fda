// * Retry Policy
// * One explicit policy object (max attempts, backoff function, retryable
// * predicate) shared by the sitemap reader and the health checker, instead
// * of per-call-site retry loops.

use crate::network::errors::ProbeError;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

// * Backoff shape: delay grows with the attempt number (linear) or stays flat.
#[derive(Debug, Clone, Copy)]
pub enum Backoff {
    // * delay = base * attempt (attempt is 1-based)
    Linear(Duration),
    Fixed(Duration),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn linear(max_attempts: u32, base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Linear(base),
        }
    }

    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff: Backoff::Fixed(delay),
        }
    }

    // * Delay to sleep after a failed attempt (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Linear(base) => base * attempt,
            Backoff::Fixed(delay) => delay,
        }
    }

    // * Runs `op` until it succeeds, returns a terminal error, or the attempt
    // * ceiling is hit. Unreachable hosts and invalid input short-circuit.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, ProbeError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ProbeError>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < self.max_attempts && err.is_retryable() => {
                    let delay = self.delay_for(attempt);
                    warn!(
                        "Attempt {}/{} failed ({}), retrying in {}ms",
                        attempt,
                        self.max_attempts,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
