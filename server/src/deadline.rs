//! Per-request deadline for storage calls.
//!
//! A request that makes several storage calls (update reads then writes)
//! shares one deadline across all of them. When it expires the pending
//! future is dropped, which cancels the in-flight driver call.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::error::AppError;

// Stand-in for "no deadline" when `now + budget` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        let now = Instant::now();
        let at = now
            .checked_add(budget)
            .unwrap_or_else(|| now + FAR_FUTURE);
        Self { at, budget }
    }

    /// Await `fut`, failing with `AppError::Timeout` once the deadline
    /// passes.
    pub async fn run<T, E, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AppError>,
    {
        match tokio::time::timeout_at(self.at, fut).await {
            Ok(result) => result.map_err(Into::into),
            Err(_) => Err(AppError::Timeout(self.budget)),
        }
    }
}
