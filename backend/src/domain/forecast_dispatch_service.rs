//! Forecast dispatch service.
//!
//! Selects due subscriptions, emails each owner the sections they asked for
//! and moves every selected subscription one period forward. Weather comes
//! from the per-city cache only; keeping it warm is the refresh job's work.
//! A failed send or a missing cache row is logged and the subscription is
//! still rescheduled.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    DispatchSummary, ForecastDispatch, Mailer, ScheduledSubscription,
    SubscriptionPersistenceError, SubscriptionRepository, WeatherCacheRepository,
};
use crate::domain::{DueSelection, Error, WeatherReport, compose_forecast};

/// Service implementing [`ForecastDispatch`].
#[derive(Clone)]
pub struct ForecastDispatchService<S, M> {
    subscriptions: Arc<S>,
    mailer: Arc<M>,
    cache: Arc<dyn WeatherCacheRepository>,
    clock: Arc<dyn Clock>,
    selection: DueSelection,
}

impl<S, M> ForecastDispatchService<S, M> {
    /// Create a new dispatcher using [`DueSelection::CurrentHour`].
    pub fn new(
        subscriptions: Arc<S>,
        mailer: Arc<M>,
        cache: Arc<dyn WeatherCacheRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            subscriptions,
            mailer,
            cache,
            clock,
            selection: DueSelection::default(),
        }
    }

    /// Override how due subscriptions are selected.
    pub fn with_selection(mut self, selection: DueSelection) -> Self {
        self.selection = selection;
        self
    }
}

fn map_subscription_error(error: SubscriptionPersistenceError) -> Error {
    match error {
        SubscriptionPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("subscription repository unavailable: {message}"))
        }
        other => Error::internal(format!("subscription repository error: {other}")),
    }
}

impl<S, M> ForecastDispatchService<S, M>
where
    S: SubscriptionRepository,
    M: Mailer,
{
    async fn send_one(&self, scheduled: &ScheduledSubscription) -> Result<(), String> {
        let subscription = &scheduled.subscription;
        let snapshot = self
            .cache
            .find(&subscription.city.id)
            .await
            .map_err(|err| err.to_string())?
            .ok_or_else(|| "no cached weather for city".to_owned())?;
        let report =
            WeatherReport::from_payload(&snapshot.payload).map_err(|err| err.to_string())?;
        let email = compose_forecast(
            &scheduled.recipient,
            &subscription.city.name,
            &subscription.flags,
            &report,
        );
        self.mailer
            .send(&email)
            .await
            .map_err(|err| err.to_string())
    }
}

#[async_trait]
impl<S, M> ForecastDispatch for ForecastDispatchService<S, M>
where
    S: SubscriptionRepository,
    M: Mailer,
{
    async fn dispatch_due(&self) -> Result<DispatchSummary, Error> {
        let now = self.clock.utc();
        let candidates = self
            .subscriptions
            .list_active(self.selection.due_before(now))
            .await
            .map_err(map_subscription_error)?;

        let mut summary = DispatchSummary::default();
        for mut scheduled in candidates {
            let subscription = &scheduled.subscription;
            if !subscription.is_active || !self.selection.is_due(subscription.next_message, now) {
                continue;
            }
            summary.due += 1;

            match self.send_one(&scheduled).await {
                Ok(()) => summary.sent += 1,
                Err(reason) => {
                    summary.failed += 1;
                    warn!(
                        subscription_id = %scheduled.subscription.id,
                        city = %scheduled.subscription.city.name,
                        %reason,
                        "forecast email failed"
                    );
                }
            }

            scheduled.subscription.advance(now);
            if let Err(err) = self.subscriptions.update(&scheduled.subscription).await {
                error!(
                    subscription_id = %scheduled.subscription.id,
                    error = %err,
                    "could not reschedule subscription"
                );
            }
        }

        if summary.due > 0 {
            info!(
                due = summary.due,
                sent = summary.sent,
                failed = summary.failed,
                "forecast dispatch finished"
            );
        }
        Ok(summary)
    }
}

#[cfg(test)]
#[path = "forecast_dispatch_service_tests.rs"]
mod tests;
