//! Interval loop with a start/stop flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info};

use crate::domain::{Error, TraceId};

/// One unit of recurring work.
#[async_trait]
pub trait PeriodicJob: Send + Sync {
    /// Name used in log lines.
    fn name(&self) -> &'static str;

    /// Perform a single run. Failures are logged by the loop, which keeps going.
    async fn run_once(&self) -> Result<(), Error>;
}

/// Handle to a running periodic loop.
#[derive(Debug)]
pub struct JobHandle {
    name: &'static str,
    running: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl JobHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.task.is_finished()
    }

    /// Stop scheduling new runs. A run already in progress completes.
    pub fn stop(&self) {
        info!(job = self.name, "stopping job loop");
        self.running.store(false, Ordering::Release);
    }

    /// Stop and wait for the loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        self.task.abort();
        match self.task.await {
            Err(err) if err.is_panic() => error!(job = self.name, "job loop panicked"),
            _ => {}
        }
    }
}

/// Run `job` immediately and then once per `period` until stopped.
///
/// Ticks missed while a slow run is in progress are skipped, so runs never
/// pile up.
pub fn spawn_periodic(job: Arc<dyn PeriodicJob>, period: Duration) -> JobHandle {
    let name = job.name();
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    info!(job = name, period_secs = period.as_secs(), "starting job loop");

    let task = tokio::spawn(async move {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if !flag.load(Ordering::Acquire) {
                info!(job = name, "job loop stopped");
                break;
            }
            if let Err(err) = TraceId::in_fresh_scope(job.run_once()).await {
                error!(
                    job = name,
                    code = ?err.code(),
                    trace_id = err.trace_id().unwrap_or_default(),
                    error = err.message(),
                    "job run failed"
                );
            }
        }
    });

    JobHandle {
        name,
        running,
        task,
    }
}
