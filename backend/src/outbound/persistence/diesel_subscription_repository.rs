//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel ORM.
//!
//! Subscriptions are always loaded joined with their city. The dispatch query
//! additionally joins the owning user to build the email recipient.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};

use crate::domain::ports::{
    ScheduledSubscription, SubscriptionPersistenceError, SubscriptionRepository,
};
use crate::domain::{City, Recipient, Subscription, SubscriptionId, UserId};

use super::error_mapping::{DbFailure, diesel_failure, pool_failure};
use super::models::{CityRow, NewSubscriptionRow, SubscriptionRow, SubscriptionUpdate, UserRow};
use super::pool::DbPool;
use super::schema::{cities, subscriptions, users};

const USER_CITY_CONSTRAINT: &str = "subscriptions_user_city_unique";

/// Diesel-backed implementation of the [`SubscriptionRepository`] port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_failure(failure: DbFailure, city: Option<&str>) -> SubscriptionPersistenceError {
    match failure {
        DbFailure::Connection(message) => SubscriptionPersistenceError::connection(message),
        DbFailure::UniqueViolation(constraint)
            if constraint.as_deref().is_none_or(|name| name == USER_CITY_CONSTRAINT) =>
        {
            SubscriptionPersistenceError::duplicate(city.unwrap_or("this city"))
        }
        DbFailure::UniqueViolation(constraint) => SubscriptionPersistenceError::query(format!(
            "unique violation on {}",
            constraint.unwrap_or_default()
        )),
        DbFailure::Query(message) => SubscriptionPersistenceError::query(message),
    }
}

fn map_diesel_error(error: diesel::result::Error) -> SubscriptionPersistenceError {
    map_failure(diesel_failure(error), None)
}

fn map_pool_error(error: super::pool::PoolError) -> SubscriptionPersistenceError {
    map_failure(pool_failure(error), None)
}

fn to_subscription(
    (row, city): (SubscriptionRow, CityRow),
) -> Result<Subscription, SubscriptionPersistenceError> {
    let city = City::try_from(city).map_err(SubscriptionPersistenceError::query)?;
    row.into_subscription(city)
        .map_err(SubscriptionPersistenceError::query)
}

fn to_scheduled(
    (row, city, user): (SubscriptionRow, CityRow, UserRow),
) -> Result<ScheduledSubscription, SubscriptionPersistenceError> {
    let subscription = to_subscription((row, city))?;
    let account = user
        .into_account()
        .map_err(SubscriptionPersistenceError::query)?;
    Ok(ScheduledSubscription {
        subscription,
        recipient: Recipient {
            username: account.user.username,
            email: account.user.email,
        },
    })
}

/// Failure inside the limit-checked insert transaction.
enum InsertError {
    Diesel(diesel::result::Error),
    LimitReached,
}

impl From<diesel::result::Error> for InsertError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn insert_within_limit(
        &self,
        subscription: &Subscription,
        limit: usize,
    ) -> Result<(), SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewSubscriptionRow::from(subscription);
        let user_id = *subscription.user_id.as_uuid();
        let max = i64::try_from(limit).unwrap_or(i64::MAX);

        let outcome = conn
            .transaction::<_, InsertError, _>(|conn| {
                async move {
                    // Lock the owner so concurrent inserts for the same user
                    // serialise on the count below.
                    users::table
                        .find(user_id)
                        .select(users::id)
                        .for_update()
                        .first::<uuid::Uuid>(conn)
                        .await?;

                    let held: i64 = subscriptions::table
                        .filter(subscriptions::user_id.eq(user_id))
                        .count()
                        .get_result(conn)
                        .await?;
                    if held >= max {
                        return Err(InsertError::LimitReached);
                    }

                    diesel::insert_into(subscriptions::table)
                        .values(&row)
                        .execute(conn)
                        .await?;
                    Ok(())
                }
                .scope_boxed()
            })
            .await;

        match outcome {
            Ok(()) => Ok(()),
            Err(InsertError::LimitReached) => Err(SubscriptionPersistenceError::limit_reached(limit)),
            Err(InsertError::Diesel(err)) => Err(map_failure(
                diesel_failure(err),
                Some(subscription.city.name.as_ref()),
            )),
        }
    }

    async fn find_by_id(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<(SubscriptionRow, CityRow)> = subscriptions::table
            .inner_join(cities::table)
            .filter(subscriptions::id.eq(id.as_uuid()))
            .select((SubscriptionRow::as_select(), CityRow::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(to_subscription).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Subscription>, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<(SubscriptionRow, CityRow)> = subscriptions::table
            .inner_join(cities::table)
            .filter(subscriptions::user_id.eq(user_id.as_uuid()))
            .order(cities::name.asc())
            .select((SubscriptionRow::as_select(), CityRow::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(to_subscription).collect()
    }

    async fn update(&self, subscription: &Subscription) -> Result<(), SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::update(subscriptions::table.find(subscription.id.as_uuid()))
            .set(SubscriptionUpdate::from(subscription))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(SubscriptionPersistenceError::query(format!(
                "subscription {} no longer exists",
                subscription.id
            )));
        }
        Ok(())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let affected = diesel::delete(subscriptions::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(affected > 0)
    }

    async fn list_active(
        &self,
        due_before: Option<DateTime<Utc>>,
    ) -> Result<Vec<ScheduledSubscription>, SubscriptionPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = subscriptions::table
            .inner_join(cities::table)
            .inner_join(users::table)
            .filter(subscriptions::is_active.eq(true))
            .select((
                SubscriptionRow::as_select(),
                CityRow::as_select(),
                UserRow::as_select(),
            ))
            .order(subscriptions::next_message.asc())
            .into_boxed();
        if let Some(before) = due_before {
            query = query.filter(subscriptions::next_message.lt(before));
        }
        let rows: Vec<(SubscriptionRow, CityRow, UserRow)> =
            query.load(&mut conn).await.map_err(map_diesel_error)?;
        rows.into_iter().map(to_scheduled).collect()
    }
}
