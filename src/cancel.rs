//! Request-scoped cancellation.
//!
//! Every core operation takes a [`CancellationToken`]. The HTTP layer derives
//! one per request from the server's shutdown token and arms a deadline on it.

use crate::errors::AppError;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Runs `fut` until it completes or `token` is cancelled, whichever is first.
///
/// A cancelled token drops `fut`, aborting whatever it had in flight.
pub async fn cancellable<T, F>(token: &CancellationToken, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    if token.is_cancelled() {
        return Err(AppError::Cancelled("cancelled before start".to_string()));
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => Err(AppError::Cancelled("operation cancelled".to_string())),
        result = fut => result,
    }
}

/// Cancels a token after a deadline unless dropped first.
pub struct DeadlineGuard {
    timer: JoinHandle<()>,
}

impl Drop for DeadlineGuard {
    fn drop(&mut self) {
        self.timer.abort();
    }
}

/// Cancels `token` once `deadline` has elapsed. Keep the guard alive for the
/// duration of the request.
pub fn arm_deadline(token: &CancellationToken, deadline: Duration) -> DeadlineGuard {
    let token = token.clone();
    let timer = tokio::spawn(async move {
        tokio::time::sleep(deadline).await;
        tracing::warn!("request deadline of {:?} exceeded, cancelling", deadline);
        token.cancel();
    });
    DeadlineGuard { timer }
}
