//! Schema migrations for the rooms table: creation, uniqueId backfill for
//! pre-identifier deployments, and the one-time duplicate reconciliation that
//! precedes the uniqueness constraint.

use sqlx::{Row, SqlitePool};

use crate::error::AppError;

const CREATE_ROOMS: &str = r#"
CREATE TABLE IF NOT EXISTS rooms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    uniqueId TEXT DEFAULT NULL,
    name TEXT NOT NULL,
    appliedImagesData TEXT NOT NULL DEFAULT '[]',
    createdAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updatedAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
)
"#;

/// Bring the schema up to date. Idempotent; safe to run on every startup.
pub async fn apply_migrations(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(CREATE_ROOMS).execute(pool).await?;

    // Tables from before the identifier scheme lack the uniqueId column.
    if !has_column(pool, "rooms", "uniqueId").await? {
        sqlx::query("ALTER TABLE rooms ADD COLUMN uniqueId TEXT DEFAULT NULL")
            .execute(pool)
            .await?;
    }

    sqlx::query("CREATE INDEX IF NOT EXISTS rooms_uniqueId_idx ON rooms(uniqueId)")
        .execute(pool)
        .await?;

    // Reconcile duplicates (lowest id wins) before enforcing uniqueness.
    // Rows without an identifier are left alone; the unique index still holds
    // because SQLite treats NULLs as distinct.
    let removed = sqlx::query(
        "DELETE FROM rooms WHERE uniqueId IS NOT NULL AND id NOT IN \
         (SELECT MIN(id) FROM rooms WHERE uniqueId IS NOT NULL GROUP BY uniqueId)",
    )
    .execute(pool)
    .await?
    .rows_affected();
    if removed > 0 {
        tracing::warn!(removed, "removed rows with duplicate uniqueId");
    }

    sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS rooms_uniqueId_unique ON rooms(uniqueId)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn has_column(pool: &SqlitePool, table: &str, column: &str) -> Result<bool, AppError> {
    let rows = sqlx::query(&format!("PRAGMA table_info({table})"))
        .fetch_all(pool)
        .await?;
    Ok(rows.iter().any(|r| {
        r.try_get::<String, _>("name")
            .map(|n| n == column)
            .unwrap_or(false)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::connect_in_memory;

    #[tokio::test]
    async fn creates_table_and_is_idempotent() {
        let pool = connect_in_memory().await.unwrap();
        apply_migrations(&pool).await.unwrap();
        apply_migrations(&pool).await.unwrap();

        sqlx::query("INSERT INTO rooms (name, appliedImagesData) VALUES ('a', '[]')")
            .execute(&pool)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn adds_unique_id_column_to_legacy_table() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                appliedImagesData TEXT NOT NULL DEFAULT '[]',
                createdAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updatedAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await
        .unwrap();

        apply_migrations(&pool).await.unwrap();

        assert!(has_column(&pool, "rooms", "uniqueId").await.unwrap());
    }

    #[tokio::test]
    async fn reconciliation_keeps_lowest_id_and_spares_null_rows() {
        let pool = connect_in_memory().await.unwrap();
        sqlx::query(
            "CREATE TABLE rooms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                uniqueId TEXT DEFAULT NULL,
                name TEXT NOT NULL,
                appliedImagesData TEXT NOT NULL DEFAULT '[]',
                createdAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updatedAt TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )",
        )
        .execute(&pool)
        .await
        .unwrap();
        for (uid, name) in [
            (Some("dup"), "first"),
            (Some("dup"), "second"),
            (Some("solo"), "third"),
            (None, "untitled-1"),
            (None, "untitled-2"),
        ] {
            sqlx::query("INSERT INTO rooms (uniqueId, name, appliedImagesData) VALUES (?, ?, '[]')")
                .bind(uid)
                .bind(name)
                .execute(&pool)
                .await
                .unwrap();
        }

        apply_migrations(&pool).await.unwrap();

        let names: Vec<String> = sqlx::query_scalar("SELECT name FROM rooms ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
        // "second" lost the dup race; both identifier-less rows survive
        assert_eq!(names, vec!["first", "third", "untitled-1", "untitled-2"]);

        let dup_insert =
            sqlx::query("INSERT INTO rooms (uniqueId, name, appliedImagesData) VALUES ('dup', 'again', '[]')")
                .execute(&pool)
                .await;
        assert!(dup_insert.is_err(), "unique index should reject duplicate uniqueId");
    }
}
