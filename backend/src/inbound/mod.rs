//! Inbound adapters: the HTTP surface and the background jobs.
//!
//! Both translate outside triggers (requests, timer ticks, queued refreshes)
//! into calls on the driving ports and keep framework details at the edge.

pub mod http;
pub mod jobs;
