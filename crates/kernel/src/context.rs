//! Per-request deadline and cancellation.
//!
//! A [`RequestContext`] is created for every inbound request and handed down
//! through handler, service and repository. Any future awaited through
//! [`RequestContext::run`] is dropped as soon as the deadline passes or the
//! context is cancelled, so a stuck database call surfaces as an error.

use std::convert::Infallible;
use std::future::Future;
use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Fallback when no [`RequestTimeout`] extension is installed on the router.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(15000);

/// Request extension carrying the configured per-request timeout.
#[derive(Debug, Clone, Copy)]
pub struct RequestTimeout(pub Duration);

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextError {
    #[error("request deadline exceeded")]
    DeadlineExceeded,
    #[error("request cancelled")]
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    deadline: Instant,
    cancelled: Option<watch::Receiver<bool>>,
}

/// Cancels every clone of the [`RequestContext`] it was created with.
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }
}

impl RequestContext {
    pub fn new(deadline: Instant) -> Self {
        Self {
            deadline,
            cancelled: None,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(Instant::now() + timeout)
    }

    /// Attach a cancellation channel to this context.
    pub fn cancellable(mut self) -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        self.cancelled = Some(rx);
        (self, CancelHandle(tx))
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Drive `fut` to completion unless the deadline or cancellation fires first.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, ContextError>
    where
        F: Future,
    {
        if self.is_cancelled() {
            return Err(ContextError::Cancelled);
        }

        let cancelled = wait_cancelled(self.cancelled.clone());

        tokio::select! {
            biased;
            _ = cancelled => Err(ContextError::Cancelled),
            _ = tokio::time::sleep_until(self.deadline) => Err(ContextError::DeadlineExceeded),
            output = fut => Ok(output),
        }
    }
}

async fn wait_cancelled(rx: Option<watch::Receiver<bool>>) {
    match rx {
        Some(mut rx) => {
            // A dropped handle can no longer cancel, so keep waiting forever.
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                std::future::pending::<()>().await;
            }
        }
        None => std::future::pending::<()>().await,
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let timeout = parts
            .extensions
            .get::<RequestTimeout>()
            .map(|timeout| timeout.0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        Ok(Self::with_timeout(timeout))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_returns_output_before_deadline() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));
        let value = ctx.run(async { 42 }).await;
        assert_eq!(value, Ok(42));
    }

    #[tokio::test]
    async fn run_fails_once_deadline_passes() {
        let ctx = RequestContext::with_timeout(Duration::from_millis(50));
        let result = ctx.run(tokio::time::sleep(Duration::from_secs(60))).await;
        assert_eq!(result, Err(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn cancel_aborts_pending_work() {
        let (ctx, handle) = RequestContext::with_timeout(Duration::from_secs(60)).cancellable();
        let worker = ctx.clone();
        let task = tokio::spawn(async move { worker.run(std::future::pending::<()>()).await });

        handle.cancel();

        assert_eq!(task.await.unwrap(), Err(ContextError::Cancelled));
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_context_short_circuits() {
        let (ctx, handle) = RequestContext::with_timeout(Duration::from_secs(60)).cancellable();
        handle.cancel();
        drop(handle);

        assert_eq!(ctx.run(async { 1 }).await, Err(ContextError::Cancelled));
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = RequestContext::with_timeout(Duration::from_secs(5)).cancellable();
        drop(handle);

        assert_eq!(ctx.run(async { "done" }).await, Ok("done"));
    }

    #[tokio::test]
    async fn extractor_uses_timeout_extension() {
        let mut request = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap();
        request
            .extensions_mut()
            .insert(RequestTimeout(Duration::from_secs(2)));
        let (mut parts, _) = request.into_parts();

        let before = Instant::now();
        let ctx = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();

        assert!(ctx.deadline() >= before + Duration::from_secs(2));
        assert!(ctx.deadline() <= Instant::now() + Duration::from_secs(2));
    }
}
