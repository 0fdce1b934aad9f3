use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Type alias for the SQLite connection pool
pub type DbPool = SqlitePool;

/// Parse a storage location into connection options
///
/// Accepts either a `sqlite:` URL or a bare file path such as `dev.db`.
/// Foreign keys are always enforced so appointment cascades work.
pub fn connect_options(database_url: &str) -> Result<SqliteConnectOptions, sqlx::Error> {
    let options = if database_url.starts_with("sqlite:") {
        SqliteConnectOptions::from_str(database_url)?
    } else {
        SqliteConnectOptions::new().filename(database_url)
    };

    Ok(options.create_if_missing(true).foreign_keys(true))
}

/// Creates and configures a SQLite connection pool
///
/// # Arguments
/// * `database_url` - SQLite file path or URL
///
/// # Example
/// ```no_run
/// # async fn run() -> Result<(), sqlx::Error> {
/// let pool = hospital_api::db::create_pool("dev.db").await?;
/// # Ok(()) }
/// ```
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    tracing::debug!("Creating database connection pool for {}", database_url);

    let options = connect_options(database_url)?.journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    tracing::info!("Database connection pool created successfully");
    Ok(pool)
}

/// Apply the embedded schema migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Isolated in-memory database with the schema applied
///
/// A single connection that never idles out, since every new in-memory
/// connection would start from an empty database.
#[cfg(test)]
pub async fn test_pool() -> DbPool {
    let options = connect_options("sqlite::memory:").expect("valid in-memory url");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_create_schema() {
        let pool = test_pool().await;

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'patients', 'appointments') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["appointments", "patients", "users"]);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let pool = test_pool().await;

        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);

        let result = sqlx::query(
            "INSERT INTO appointments (patient_id, doctor_id, date, created_at) VALUES (999, 999, '2030-01-01T10:00:00Z', '2030-01-01T00:00:00Z')",
        )
        .execute(&pool)
        .await;
        assert!(result.is_err());
    }
}
