//! The two timer-driven jobs.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use super::periodic::PeriodicJob;
use crate::domain::Error;
use crate::domain::ports::{ForecastDispatch, WeatherRefresh};

/// Queue refreshes for stale cache rows, then fill cities that have none.
#[derive(Clone)]
pub struct RefreshJob {
    refresh: Arc<dyn WeatherRefresh>,
}

impl RefreshJob {
    pub fn new(refresh: Arc<dyn WeatherRefresh>) -> Self {
        Self { refresh }
    }
}

#[async_trait]
impl PeriodicJob for RefreshJob {
    fn name(&self) -> &'static str {
        "weather_refresh"
    }

    async fn run_once(&self) -> Result<(), Error> {
        let queued = self.refresh.refresh_stale().await?;
        let backfill = self.refresh.backfill_missing().await?;
        if queued > 0 || backfill.attempted > 0 {
            info!(
                queued,
                backfilled = backfill.refreshed,
                backfill_failed = backfill.failed,
                "weather refresh run finished"
            );
        }
        Ok(())
    }
}

/// Email due forecasts.
#[derive(Clone)]
pub struct DispatchJob {
    dispatch: Arc<dyn ForecastDispatch>,
}

impl DispatchJob {
    pub fn new(dispatch: Arc<dyn ForecastDispatch>) -> Self {
        Self { dispatch }
    }
}

#[async_trait]
impl PeriodicJob for DispatchJob {
    fn name(&self) -> &'static str {
        "forecast_dispatch"
    }

    async fn run_once(&self) -> Result<(), Error> {
        self.dispatch.dispatch_due().await.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{
        BackfillSummary, DispatchSummary, MockForecastDispatch, MockWeatherRefresh,
    };
    use mockall::Sequence;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn refresh_enqueues_stale_rows_before_backfilling() {
        let mut seq = Sequence::new();
        let mut refresh = MockWeatherRefresh::new();
        refresh
            .expect_refresh_stale()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|| Ok(2));
        refresh
            .expect_backfill_missing()
            .times(1)
            .in_sequence(&mut seq)
            .return_once(|| {
                Ok(BackfillSummary {
                    attempted: 1,
                    refreshed: 1,
                    failed: 0,
                })
            });

        RefreshJob::new(Arc::new(refresh))
            .run_once()
            .await
            .expect("run succeeded");
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_stops_when_the_stale_scan_fails() {
        let mut refresh = MockWeatherRefresh::new();
        refresh
            .expect_refresh_stale()
            .return_once(|| Err(Error::service_unavailable("database down")));
        refresh.expect_backfill_missing().never();

        let err = RefreshJob::new(Arc::new(refresh))
            .run_once()
            .await
            .expect_err("scan failed");
        assert_eq!(err.message(), "database down");
    }

    #[rstest]
    #[tokio::test]
    async fn dispatch_delegates_to_the_service() {
        let mut dispatch = MockForecastDispatch::new();
        dispatch
            .expect_dispatch_due()
            .times(1)
            .return_once(|| Ok(DispatchSummary::default()));

        DispatchJob::new(Arc::new(dispatch))
            .run_once()
            .await
            .expect("run succeeded");
    }
}
