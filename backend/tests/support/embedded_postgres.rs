//! Embedded PostgreSQL for repository integration tests.
//!
//! One cluster is shared per test binary. Each test gets its own database
//! cloned from a template that already carries the migrations. The template
//! name includes a hash of `migrations/`, so editing a migration builds a
//! fresh template instead of reusing a stale one.
//!
//! Set `SKIP_TEST_CLUSTER=1` where the cluster cannot start; the suites then
//! skip instead of failing.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock, PoisonError};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::{hash_directory, shared_cluster_handle};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

const TEMPLATE_NAME_PREFIX: &str = "weather_reminder_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Run `op` until it succeeds or the retry budget is spent.
fn with_retries<T>(what: &str, mut op: impl FnMut() -> Result<T, String>) -> Result<T, String> {
    let mut last_error = String::new();
    for attempt in 1..=PROVISION_RETRIES {
        match op() {
            Ok(value) => return Ok(value),
            Err(error) => last_error = format!("{what}: attempt {attempt}/{PROVISION_RETRIES}: {error}"),
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

fn template_database_name() -> Result<String, String> {
    let migrations_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations_dir).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Create the migrated template database unless it already exists.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(PoisonError::into_inner);

    let exists = cluster
        .database_exists(template_name.as_str())
        .map_err(|err| format!("template check: {err:?}"))?;
    if !exists {
        cluster
            .create_database(template_name.as_str())
            .map_err(|err| format!("create template: {err:?}"))?;
        migrate_schema(&cluster.connection().database_url(&template_name))?;
    }
    Ok(template_name)
}

fn provision() -> Result<TemporaryDatabase, String> {
    let cluster = with_retries("start cluster", || {
        shared_cluster_handle().map_err(|err| format!("{err:?}"))
    })?;
    with_retries("clone template", || {
        let template_name = ensure_template_database(cluster)?;
        let db_name = format!("test_{}", Uuid::new_v4().simple());
        cluster
            .temporary_database_from_template(db_name.as_str(), template_name.as_str())
            .map_err(|err| format!("{err:?}"))
    })
}

/// A freshly migrated database, dropped when the handle is.
///
/// Returns `None` only when the cluster cannot start and
/// `SKIP_TEST_CLUSTER` is set; otherwise setup failures panic so CI breakage
/// is not masked.
pub fn test_database() -> Option<TemporaryDatabase> {
    match provision() {
        Ok(database) => Some(database),
        Err(reason) if should_skip_test_cluster() => {
            eprintln!("SKIP-TEST-CLUSTER: {reason}");
            None
        }
        Err(reason) => {
            panic!("embedded PostgreSQL unavailable: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.")
        }
    }
}
