//! Driving port for the periodic email job.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Error;

/// Outcome of one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    /// Subscriptions selected as due.
    pub due: usize,
    pub sent: usize,
    /// Attempts that failed; these were still rescheduled.
    pub failed: usize,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ForecastDispatch: Send + Sync {
    /// Email every due subscription and move each to its next slot.
    async fn dispatch_due(&self) -> Result<DispatchSummary, Error>;
}
