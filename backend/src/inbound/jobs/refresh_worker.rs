//! Single consumer of the refresh queue.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::TraceId;
use crate::domain::ports::WeatherRefresh;
use crate::outbound::queue::RefreshJobs;

/// Drain `jobs` one city at a time until every queue sender is dropped.
///
/// A failed refresh is logged and skipped; the next stale-row scan queues
/// the city again.
pub fn spawn_refresh_worker(
    mut jobs: RefreshJobs,
    refresh: Arc<dyn WeatherRefresh>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("weather refresh worker started");
        while let Some(city_id) = jobs.next().await {
            let outcome = TraceId::in_fresh_scope(refresh.refresh_city(&city_id)).await;
            match outcome {
                Ok(snapshot) => {
                    debug!(%city_id, updated_at = %snapshot.updated_at, "city weather refreshed");
                }
                Err(err) => warn!(
                    %city_id,
                    code = ?err.code(),
                    error = err.message(),
                    "queued weather refresh failed"
                ),
            }
        }
        info!("weather refresh worker stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockWeatherRefresh, RefreshQueue};
    use crate::domain::{CityId, Error, WeatherSnapshot};
    use crate::outbound::queue::refresh_channel;
    use chrono::Utc;
    use rstest::rstest;
    use serde_json::json;
    use std::time::Duration;

    #[rstest]
    #[tokio::test]
    async fn worker_refreshes_each_queued_city_and_survives_failures() {
        let failing = CityId::random();
        let healthy = CityId::random();
        let mut refresh = MockWeatherRefresh::new();
        refresh
            .expect_refresh_city()
            .withf(move |id| *id == failing)
            .times(1)
            .return_once(|_| Err(Error::service_unavailable("provider down")));
        refresh
            .expect_refresh_city()
            .withf(move |id| *id == healthy)
            .times(1)
            .return_once(move |id| {
                Ok(WeatherSnapshot {
                    city_id: *id,
                    updated_at: Utc::now(),
                    payload: json!({}),
                })
            });

        let (queue, jobs) = refresh_channel();
        let worker = spawn_refresh_worker(jobs, Arc::new(refresh));
        queue.enqueue(failing).await.expect("queued");
        queue.enqueue(healthy).await.expect("queued");
        drop(queue);

        tokio::time::timeout(Duration::from_secs(2), worker)
            .await
            .expect("worker exits once the queue closes")
            .expect("worker did not panic");
    }
}
