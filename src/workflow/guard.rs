//! Timeout and cancellation for gateway calls
//!
//! Every remote call made by the workflow runs under a deadline and a
//! cancellation token owned by the action that triggered it. Both outcomes
//! come back as ordinary gateway errors, so the caller's failure path runs
//! and no control is left disabled.

use crate::gateway::{GatewayError, GatewayResult};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;

/// Cancellation signal observed by in-flight calls
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: Option<watch::Receiver<bool>>,
}

/// Owner side of a [`CancelToken`]
///
/// Dropping the handle cancels the token: an action abandoned together with
/// its view stops waiting on the backend.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

/// Create a linked handle/token pair
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx: Some(rx) })
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl CancelToken {
    /// A token that is never cancelled
    pub fn never() -> Self {
        Self { rx: None }
    }

    pub fn is_cancelled(&self) -> bool {
        match &self.rx {
            Some(rx) => *rx.borrow() || rx.has_changed().is_err(),
            None => false,
        }
    }

    /// Resolves once the token is cancelled or its handle is dropped
    pub async fn cancelled(&self) {
        let Some(rx) = &self.rx else {
            return std::future::pending().await;
        };

        let mut rx = rx.clone();
        loop {
            if *rx.borrow_and_update() {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Run `call` with a deadline, giving up early if `token` is cancelled
pub(crate) async fn guarded<T, F>(call: F, limit: Duration, token: &CancelToken) -> GatewayResult<T>
where
    F: Future<Output = GatewayResult<T>>,
{
    if token.is_cancelled() {
        return Err(GatewayError::Cancelled);
    }

    tokio::select! {
        biased;
        _ = token.cancelled() => {
            tracing::debug!("Gateway call cancelled");
            Err(GatewayError::Cancelled)
        }
        result = tokio::time::timeout(limit, call) => {
            result.unwrap_or_else(|_| {
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "Gateway call timed out");
                Err(GatewayError::Timeout)
            })
        }
    }
}
