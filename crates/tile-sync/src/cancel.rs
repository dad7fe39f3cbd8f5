// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Cooperative cancellation.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::TileError;

/// Cloneable cancellation signal; every clone observes the same state.
///
/// The tile operations never start timers of their own. A caller that wants
/// a deadline cancels the token from a timer task.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    /// A token that has not fired.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Fire the token. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// True once [`cancel`](Self::cancel) has been called on any clone.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// `Err(Cancelled)` if the token already fired.
    pub fn check(&self) -> Result<(), TileError> {
        if self.is_cancelled() {
            return Err(TileError::Cancelled);
        }
        Ok(())
    }

    /// Resolve once the token fires.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        let closed = rx.wait_for(|fired| *fired).await.is_err();
        if closed {
            // The sender lives as long as `self`, so this cannot happen.
            std::future::pending::<()>().await;
        }
    }

    /// Race `fut` against the token.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, TileError>
    where
        F: Future<Output = Result<T, TileError>>,
    {
        tokio::select! {
            biased;
            () = self.cancelled() => Err(TileError::Cancelled),
            res = fut => res,
        }
    }
}
