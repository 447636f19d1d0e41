//! In-process refresh queue backed by a Tokio channel.
//!
//! The sending half implements the `RefreshQueue` port; the receiving half is
//! drained by the refresh worker started alongside the HTTP server. Jobs are
//! not persisted, so refreshes pending at shutdown are dropped and picked up
//! again by the next stale-row scan.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::CityId;
use crate::domain::ports::{RefreshQueue, RefreshQueueError};

/// Sending half of the refresh queue.
#[derive(Debug, Clone)]
pub struct TokioRefreshQueue {
    sender: mpsc::UnboundedSender<CityId>,
}

/// Receiving half handed to the refresh worker.
#[derive(Debug)]
pub struct RefreshJobs {
    receiver: mpsc::UnboundedReceiver<CityId>,
}

impl RefreshJobs {
    /// Wait for the next city to refresh; `None` once every sender is gone.
    pub async fn next(&mut self) -> Option<CityId> {
        self.receiver.recv().await
    }
}

/// Create a connected queue and job stream.
pub fn refresh_channel() -> (TokioRefreshQueue, RefreshJobs) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (TokioRefreshQueue { sender }, RefreshJobs { receiver })
}

#[async_trait]
impl RefreshQueue for TokioRefreshQueue {
    async fn enqueue(&self, city_id: CityId) -> Result<(), RefreshQueueError> {
        self.sender
            .send(city_id)
            .map_err(|_| RefreshQueueError::closed())?;
        debug!(%city_id, "weather refresh enqueued");
        Ok(())
    }
}
