//! Port for handing city refreshes to a background worker.
use async_trait::async_trait;

use crate::domain::CityId;

use super::define_port_error;

define_port_error! {
    /// Errors surfaced by the refresh queue adapter.
    pub enum RefreshQueueError {
        /// Worker side of the queue has shut down.
        Closed => "weather refresh queue is closed",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RefreshQueue: Send + Sync {
    /// Schedule a refresh of `city_id`; returns once the job is accepted.
    async fn enqueue(&self, city_id: CityId) -> Result<(), RefreshQueueError>;
}
