//! Cancellable, deadline-aware execution context.
//!
//! Every cache operation runs inside a [`Context`]. The backend future is raced
//! against the context's cancellation token and deadline, so a cancelled or
//! expired context returns promptly instead of waiting on the network.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::cache::CacheError;

/// Execution context threaded through cache and session operations.
///
/// Cloning a context shares its cancellation token: cancelling any clone
/// cancels them all. Use [`Context::child`] for a scope that can be
/// cancelled without affecting the parent.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// Derive a context that expires after `timeout`.
    ///
    /// The earlier of the existing deadline and the new one wins.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };
        Self {
            token: self.token.clone(),
            deadline: Some(deadline),
        }
    }

    /// Derive a child context. Cancelling the parent cancels the child, not
    /// the other way around.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
        }
    }

    /// Cancel this context and every clone and child of it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Run `fut` under this context.
    ///
    /// Returns [`CacheError::Cancelled`] if the context is cancelled first and
    /// [`CacheError::Timeout`] if the deadline passes first. `operation` names
    /// the call in the error.
    pub async fn run<T, F>(&self, operation: &'static str, fut: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        if self.token.is_cancelled() {
            return Err(CacheError::Cancelled { operation });
        }

        match self.deadline {
            Some(deadline) => {
                if Instant::now() >= deadline {
                    return Err(CacheError::Timeout { operation });
                }
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(CacheError::Cancelled { operation }),
                    _ = tokio::time::sleep_until(deadline) => Err(CacheError::Timeout { operation }),
                    result = fut => result,
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = self.token.cancelled() => Err(CacheError::Cancelled { operation }),
                    result = fut => result,
                }
            }
        }
    }
}
