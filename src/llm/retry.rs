//! Retry policy for completion calls: timeouts are retried once, then
//! surfaced to the caller.

use std::future::Future;

use crate::error::LlmError;

/// Run `op`, retrying exactly once if the first attempt times out. Any
/// other error (and a second timeout) is returned as-is.
pub(crate) async fn retry_once_on_timeout<T, F, Fut>(op: F) -> Result<T, LlmError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    match op().await {
        Err(LlmError::Timeout { timeout }) => {
            tracing::warn!(?timeout, "Completion request timed out, retrying once");
            op().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn timeout_err() -> LlmError {
        LlmError::Timeout {
            timeout: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn first_timeout_then_success() {
        let attempts = AtomicUsize::new(0);
        let result = retry_once_on_timeout(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(timeout_err())
                } else {
                    Ok("ok")
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn two_timeouts_surface_the_error() {
        let attempts = AtomicUsize::new(0);
        let result: Result<&str, _> = retry_once_on_timeout(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(timeout_err()) }
        })
        .await;
        assert!(matches!(result, Err(LlmError::Timeout { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_timeout_errors_are_not_retried() {
        let attempts = AtomicUsize::new(0);
        let result: Result<&str, _> = retry_once_on_timeout(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::RequestFailed {
                    reason: "boom".to_string(),
                })
            }
        })
        .await;
        assert!(matches!(result, Err(LlmError::RequestFailed { .. })));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
