//! Bounded retry on timeout
//!
//! Each attempt runs under a fixed timeout. Only a timeout consumes an attempt
//! and triggers a retry; an attempt that completes with an error ends the loop.

use std::future::Future;
use std::time::Duration;

/// Retry budget of one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub timeout: Duration,
}

/// Why [`with_retries`] gave up
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt timed out
    Exhausted { attempts: u32 },
    /// An attempt finished with an error
    Failed(E),
}

/// Run `op` until it completes or the attempts run out.
///
/// `op` receives the 1-based attempt number.
pub async fn with_retries<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut remaining = policy.max_attempts;

    while remaining > 0 {
        let attempt = policy.max_attempts - remaining + 1;

        match tokio::time::timeout(policy.timeout, op(attempt)).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(e)) => return Err(RetryError::Failed(e)),
            Err(_) => {
                remaining -= 1;
                tracing::warn!(
                    "Attempt {}/{} timed out after {:?}, {} left",
                    attempt,
                    policy.max_attempts,
                    policy.timeout,
                    remaining
                );
            }
        }
    }

    Err(RetryError::Exhausted {
        attempts: policy.max_attempts,
    })
}
