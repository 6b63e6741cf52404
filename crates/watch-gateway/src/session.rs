//! Session time budget shared by the read and write sides of a relay.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a bounded operation was cut short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// The session's fixed time budget ran out.
    Deadline,
    /// The session was cancelled before its budget ran out.
    Cancelled,
}

/// Shared deadline for one relay session.
///
/// Cloned into the reader and the writer so every blocking boundary observes
/// the same budget. Dropping a clone does not end the session; call
/// [`Deadline::cancel`] to abort it early.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    cancel: CancellationToken,
}

impl Deadline {
    /// Starts a new budget of `budget` from now.
    pub fn new(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            cancel: CancellationToken::new(),
        }
    }

    /// Remaining budget, or the reason there is none.
    pub fn check(&self) -> Result<Duration, Expiry> {
        if self.cancel.is_cancelled() {
            return Err(Expiry::Cancelled);
        }
        let now = Instant::now();
        if now >= self.at {
            Err(Expiry::Deadline)
        } else {
            Ok(self.at - now)
        }
    }

    /// Aborts the session before its budget runs out.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Runs `fut` unless the budget runs out or the session is cancelled
    /// first. Expiry wins ties, so an already-exhausted budget never lets
    /// `fut` make progress.
    pub async fn bound<F>(&self, fut: F) -> Result<F::Output, Expiry>
    where
        F: std::future::Future,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Expiry::Cancelled),
            _ = tokio::time::sleep_until(self.at) => Err(Expiry::Deadline),
            out = fut => Ok(out),
        }
    }
}
