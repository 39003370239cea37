//! Throwaway PostgreSQL schemas for tests that exercise the Diesel adapters.
//!
//! Set `COMMUNALERT_TEST_DATABASE_URL` to a database the test user may create
//! schemas in. Each [`TestDatabase`] migrates a fresh schema, points every
//! pooled connection at it through `search_path`, and drops it on `Drop`.
//! Without the variable the suites print a `SKIP-TEST-DATABASE` marker and
//! return early.

use diesel::pg::PgConnection;
use diesel::{Connection, RunQueryDsl};
use uuid::Uuid;

use communalert::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};

/// Environment variable naming the server used by database-backed tests.
pub const TEST_DATABASE_URL_ENV: &str = "COMMUNALERT_TEST_DATABASE_URL";

/// A migrated, isolated schema plus a pool bound to it.
pub struct TestDatabase {
    admin_url: String,
    schema: String,
    pool: DbPool,
}

fn execute(database_url: &str, statement: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| err.to_string())?;
    diesel::sql_query(statement)
        .execute(&mut conn)
        .map_err(|err| err.to_string())?;
    Ok(())
}

/// Append a libpq `options` parameter that pins `search_path` to `schema`.
fn scoped_url(database_url: &str, schema: &str) -> String {
    let separator = if database_url.contains('?') { '&' } else { '?' };
    format!("{database_url}{separator}options=-csearch_path%3D{schema}")
}

impl TestDatabase {
    /// Provision a schema, or `None` when no test database is configured.
    ///
    /// # Panics
    /// Panics when a database is configured but cannot be prepared.
    pub async fn provision() -> Option<Self> {
        let Ok(admin_url) = std::env::var(TEST_DATABASE_URL_ENV) else {
            eprintln!("SKIP-TEST-DATABASE: {TEST_DATABASE_URL_ENV} is not set");
            return None;
        };
        let schema = format!("test_{}", Uuid::new_v4().simple());
        if let Err(err) = execute(&admin_url, &format!("CREATE SCHEMA {schema}")) {
            panic!("failed to create schema {schema}: {err}");
        }

        let url = scoped_url(&admin_url, &schema);
        let database = async {
            run_pending_migrations(&url)
                .await
                .map_err(|err| err.to_string())?;
            DbPool::new(PoolConfig::new(url).with_max_size(2))
                .await
                .map_err(|err| err.to_string())
        }
        .await;
        match database {
            Ok(pool) => Some(Self {
                admin_url,
                schema,
                pool,
            }),
            Err(err) => {
                let _ = execute(&admin_url, &format!("DROP SCHEMA {schema} CASCADE"));
                panic!("failed to prepare schema {schema}: {err}");
            }
        }
    }

    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDatabase {
    fn drop(&mut self) {
        let statement = format!("DROP SCHEMA IF EXISTS {} CASCADE", self.schema);
        if let Err(err) = execute(&self.admin_url, &statement) {
            eprintln!("failed to drop schema {}: {err}", self.schema);
        }
    }
}

#[test]
fn scoped_url_respects_existing_query_parameters() {
    assert_eq!(
        scoped_url("postgres://localhost/app", "test_a"),
        "postgres://localhost/app?options=-csearch_path%3Dtest_a"
    );
    assert_eq!(
        scoped_url("postgres://localhost/app?sslmode=disable", "test_a"),
        "postgres://localhost/app?sslmode=disable&options=-csearch_path%3Dtest_a"
    );
}
