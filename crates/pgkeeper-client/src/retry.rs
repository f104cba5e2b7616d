//! Bounded retry with exponential backoff for monitor RPCs (§4.4: "transient
//! transport failures are retried internally with bounded backoff").
//!
//! Same shape as [`pgkeeper_supervisor`]'s restart budget: `min(initial *
//! 2^attempt, cap)`, just applied to one RPC call instead of a child
//! process's whole lifetime.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub cap_backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_backoff: Duration, cap_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            cap_backoff,
        }
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
            .min(self.cap_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(200), Duration::from_secs(5))
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping with exponential
/// backoff between failures. Only [`ClientError::Transport`] is retried —
/// every other variant is a definitive answer from the monitor and is
/// returned immediately.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, ClientError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(ClientError::Transport(msg)) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(ClientError::RetriesExhausted {
                        attempts: attempt,
                        last_error: msg,
                    });
                }
                tokio::time::sleep(policy.backoff_for(attempt)).await;
            }
            Err(other) => return Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn retries_transport_errors_until_success() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::new(5, Duration::from_millis(10), Duration::from_millis(100));

        let result = with_retry(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(ClientError::Transport("connection reset".to_string()))
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_after_max_attempts() {
        let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(100));
        let result: Result<(), ClientError> =
            with_retry(policy, || async { Err(ClientError::Transport("down".to_string())) }).await;
        assert!(matches!(result, Err(ClientError::RetriesExhausted { attempts: 2, .. })));
    }

    #[tokio::test]
    async fn non_transport_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();
        let result: Result<(), ClientError> = with_retry(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(ClientError::NotFound) }
        })
        .await;
        assert!(matches!(result, Err(ClientError::NotFound)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
