//! Cooperative cancellation for store-crossing operations.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::result::AppResult;

/// Run `fut` until it completes or `cancel` fires.
///
/// On cancellation the in-flight future is dropped, which aborts the
/// underlying driver call, and a [`ErrorKind::Cancelled`](crate::error::ErrorKind::Cancelled)
/// error naming `operation` is returned.
pub async fn run_cancellable<F, T>(
    cancel: &CancellationToken,
    operation: &str,
    fut: F,
) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(AppError::cancelled(format!("{operation} was cancelled")));
    }

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::cancelled(format!("{operation} was cancelled"))),
        result = fut => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[tokio::test]
    async fn test_completes_when_not_cancelled() {
        let token = CancellationToken::new();
        let value = run_cancellable(&token, "count", async { Ok(7) }).await;
        assert_eq!(value.ok(), Some(7));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_polls() {
        let token = CancellationToken::new();
        token.cancel();
        let result: AppResult<()> = run_cancellable(&token, "fetch", async {
            panic!("future must not be polled");
        })
        .await;
        let err = result.expect_err("should be cancelled");
        assert_eq!(err.kind, ErrorKind::Cancelled);
        assert_eq!(err.message, "fetch was cancelled");
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let token = CancellationToken::new();
        let child = token.clone();
        tokio::spawn(async move {
            child.cancel();
        });
        let result: AppResult<()> = run_cancellable(&token, "commit", std::future::pending()).await;
        assert_eq!(result.expect_err("cancelled").kind, ErrorKind::Cancelled);
    }
}
