//! Background jobs driven by timers and the refresh queue.
//!
//! ```text
//! every refresh interval  -> refresh_stale() then backfill_missing()
//! every dispatch interval -> dispatch_due()
//! refresh queue           -> refresh_city(city_id), one at a time
//! ```
//!
//! Each run executes under a fresh [`TraceId`](crate::TraceId) so its log
//! lines and errors correlate the same way a request does.

mod periodic;
mod refresh_worker;
mod tasks;

pub use periodic::{JobHandle, PeriodicJob, spawn_periodic};
pub use refresh_worker::spawn_refresh_worker;
pub use tasks::{DispatchJob, RefreshJob};
