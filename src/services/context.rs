//! Cancellable context bound to a single upstream fetch

use std::time::Duration;

use tokio::{sync::watch, time::Instant};

use crate::error::TransportError;

/// Carries the caller's cancellation signal and optional deadline into a fetch.
///
/// Cloning is cheap; every clone observes the same cancellation.
#[derive(Clone, Debug)]
pub struct FetchContext {
    cancelled: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every [`FetchContext`] created alongside it. Dropping the handle
/// does not cancel.
#[derive(Debug)]
pub struct CancelHandle {
    sender: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }
}

impl FetchContext {
    /// Context that is never cancelled and has no deadline
    pub fn background() -> Self {
        Self { cancelled: None, deadline: None }
    }

    /// Context together with the handle that cancels it
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (sender, receiver) = watch::channel(false);
        (
            Self { cancelled: Some(receiver), deadline: None },
            CancelHandle { sender },
        )
    }

    /// Derive a context that also expires after `timeout`. An earlier deadline
    /// already set on `self` is kept.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Resolves once the context is cancelled or its deadline has passed,
    /// yielding the matching transport error. Pending forever otherwise.
    pub async fn done(&self) -> TransportError {
        let cancelled = async {
            match self.cancelled.clone() {
                Some(mut rx) => {
                    let closed = rx.wait_for(|cancelled| *cancelled).await.is_err();
                    // A dropped handle can no longer cancel.
                    if closed {
                        std::future::pending::<()>().await;
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = cancelled => TransportError::Cancelled,
            _ = expired => TransportError::Timeout,
        }
    }
}

impl Default for FetchContext {
    fn default() -> Self {
        Self::background()
    }
}
