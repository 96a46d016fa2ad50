//! Opening the checkout database and bringing its schema up to date.

use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

/// Bumped whenever `schema.sql` changes shape.
pub const SCHEMA_VERSION: i64 = 1;

/// Concurrent settlements queue on the write lock for at most this long.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Open (creating if needed) the database at `db_path` and apply the schema.
///
/// Every pooled connection enforces foreign keys, which `purchase_items`
/// needs for its cascade, and waits on `BUSY_TIMEOUT` instead of failing a
/// debit or a purchase insert that races another writer.
pub async fn init_db(db_path: &str) -> Result<SqlitePool, sqlx::Error> {
    if let Some(parent) = Path::new(db_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).ok();
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(BUSY_TIMEOUT);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    info!(path = %db_path, schema_version = SCHEMA_VERSION, "Checkout database ready");
    Ok(pool)
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (current,): (i64,) = sqlx::query_as("PRAGMA user_version")
        .fetch_one(pool)
        .await?;
    if current > SCHEMA_VERSION {
        warn!(
            found = current,
            supported = SCHEMA_VERSION,
            "Database schema is newer than this build"
        );
        return Err(sqlx::Error::Protocol(format!(
            "database schema version {} is newer than supported version {}",
            current, SCHEMA_VERSION
        )));
    }

    let mut tx = pool.begin().await?;
    for statement in include_str!("schema.sql").split(';') {
        let trimmed = statement.trim();
        if !trimmed.is_empty() {
            sqlx::query(trimmed).execute(&mut *tx).await?;
        }
    }
    // PRAGMA does not take bind parameters.
    sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION))
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    if current < SCHEMA_VERSION {
        info!(from = current, to = SCHEMA_VERSION, "Applied checkout schema");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn setup() -> (SqlitePool, TempDir, String) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("nested")
            .join("checkout.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        (pool, temp_dir, db_path)
    }

    #[tokio::test]
    async fn test_init_db_creates_file_and_tables() {
        let (pool, _temp, db_path) = setup().await;
        assert!(Path::new(&db_path).exists());

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|(n,)| n.as_str()).collect();
        assert_eq!(names, vec!["balances", "purchase_items", "purchases"]);
    }

    #[tokio::test]
    async fn test_rerun_keeps_version_and_data() {
        let (pool, _temp, _) = setup().await;
        sqlx::query("INSERT INTO balances (user_id, balance_cents, updated_at) VALUES ('u', 100, 0)")
            .execute(&pool)
            .await
            .unwrap();

        run_migrations(&pool).await.expect("second run failed");

        let (version,): (i64,) = sqlx::query_as("PRAGMA user_version")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM balances")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_newer_schema_is_refused() {
        let (pool, _temp, _) = setup().await;
        sqlx::query(&format!("PRAGMA user_version = {}", SCHEMA_VERSION + 1))
            .execute(&pool)
            .await
            .unwrap();

        assert!(run_migrations(&pool).await.is_err());
    }

    #[tokio::test]
    async fn test_deleting_purchase_cascades_to_lines() {
        let (pool, _temp, _) = setup().await;
        let (fk,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(fk, 1);

        sqlx::query(
            "INSERT INTO purchases (id, user_id, subtotal_cents, sales_tax_cents, \
             luxury_tax_cents, shipping_cents, total_cents, shipping_details, created_at) \
             VALUES ('p1', 'u', 100, 8, 0, 0, 108, '{}', 0)",
        )
        .execute(&pool)
        .await
        .unwrap();
        sqlx::query(
            "INSERT INTO purchase_items (purchase_id, line_no, item_id, title, category, \
             unit_price_cents, quantity) VALUES ('p1', 0, 'i', 'Item', 'Art', 100, 1)",
        )
        .execute(&pool)
        .await
        .unwrap();

        sqlx::query("DELETE FROM purchases WHERE id = 'p1'")
            .execute(&pool)
            .await
            .unwrap();

        let (lines,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM purchase_items")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(lines, 0);
    }

    #[tokio::test]
    async fn test_line_for_missing_purchase_is_rejected() {
        let (pool, _temp, _) = setup().await;

        let result = sqlx::query(
            "INSERT INTO purchase_items (purchase_id, line_no, item_id, title, category, \
             unit_price_cents, quantity) VALUES ('nope', 0, 'i', 'Item', 'Art', 100, 1)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_negative_balance_violates_check() {
        let (pool, _temp, _) = setup().await;

        let result = sqlx::query(
            "INSERT INTO balances (user_id, balance_cents, updated_at) VALUES ('u', -1, 0)",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_wal_journal() {
        let (pool, _temp, _) = setup().await;
        let (mode,): (String,) = sqlx::query_as("PRAGMA journal_mode")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(mode.to_lowercase(), "wal");
    }
}
