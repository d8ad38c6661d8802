//! Per-test databases cloned from a migrated template.
//!
//! The template is named after a hash of `migrations/`, so editing a
//! migration provisions a fresh template instead of reusing a stale schema.
//! Raw SQL checks go through the synchronous `postgres` client.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::Duration;

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::test_support::hash_directory;
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use postgres::{Client, NoTls};
use uuid::Uuid;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static TEMPLATE_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const TEMPLATE_NAME_PREFIX: &str = "blog_template";
const PROVISION_RETRIES: usize = 5;
const PROVISION_RETRY_DELAY: Duration = Duration::from_millis(500);

fn template_database_name() -> Result<String, String> {
    let migrations = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("migrations");
    let hash = hash_directory(migrations).map_err(|err| format!("hash migrations: {err}"))?;
    let short_hash = hash.get(..8).unwrap_or(&hash);
    Ok(format!("{TEMPLATE_NAME_PREFIX}_{short_hash}"))
}

/// Create the template on first use and return its name.
fn ensure_template_database(cluster: &ClusterHandle) -> Result<String, String> {
    let template_name = template_database_name()?;
    let _lock = TEMPLATE_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|err| err.into_inner());

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

fn provision_attempt(cluster: &ClusterHandle, attempt: usize) -> Result<TemporaryDatabase, String> {
    let template_name = ensure_template_database(cluster)
        .map_err(|err| format!("attempt {attempt}/{PROVISION_RETRIES}: {err}"))?;
    let db_name = format!("test_{}", Uuid::new_v4().simple());
    cluster
        .temporary_database_from_template(db_name.as_str(), template_name.as_str())
        .map_err(|err| {
            format!("create database from template: attempt {attempt}/{PROVISION_RETRIES}: {err:?}")
        })
}

/// A fresh database with every migration applied, dropped when the returned
/// guard goes out of scope.
pub fn provision_template_database(cluster: &ClusterHandle) -> Result<TemporaryDatabase, String> {
    let mut last_error = String::from("create database from template: no attempt made");
    for attempt in 1..=PROVISION_RETRIES {
        match provision_attempt(cluster, attempt) {
            Ok(database) => return Ok(database),
            Err(error) => last_error = error,
        }
        if attempt < PROVISION_RETRIES {
            std::thread::sleep(PROVISION_RETRY_DELAY);
        }
    }
    Err(last_error)
}

/// Apply every pending migration to the database at `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("connect: {err}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err}"))?;
    Ok(())
}

/// Render a `postgres` error with its SQLSTATE and detail, which the plain
/// `Display` output collapses to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };
    let mut summary = format!("postgres error {:?}: {}", db_error.code(), db_error.message());
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Run `query` and return the single `bigint` it selects.
pub fn scalar_count(url: &str, query: &str) -> Result<i64, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let row = client
        .query_one(query, &[])
        .map_err(|err| format_postgres_error(&err))?;
    row.try_get(0).map_err(|err| format_postgres_error(&err))
}

/// Names of the table constraints defined by the migrations.
pub fn constraint_names(url: &str) -> Result<Vec<String>, String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    let rows = client
        .query(
            "SELECT conname::text FROM pg_constraint \
             JOIN pg_namespace ON pg_namespace.oid = pg_constraint.connamespace \
             WHERE nspname = 'public'",
            &[],
        )
        .map_err(|err| format_postgres_error(&err))?;
    rows.iter()
        .map(|row| row.try_get::<_, String>(0).map_err(|err| format_postgres_error(&err)))
        .collect()
}
