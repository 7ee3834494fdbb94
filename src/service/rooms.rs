//! Room CRUD execution against SQLite.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::error::AppError;
use crate::model::{NewRoom, RoomKey, RoomPatch, RoomRecord, Stage};

const COLUMNS: &str = "id, uniqueId, name, appliedImagesData, createdAt, updatedAt";

pub struct RoomService;

impl RoomService {
    /// All records, ascending id — the collection's stable order.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<RoomRecord>, AppError> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM rooms ORDER BY id ASC"))
            .fetch_all(pool)
            .await?;
        rows.iter().map(row_to_room).collect()
    }

    /// Fetch one record by key. Returns None when nothing matches.
    pub async fn find(pool: &SqlitePool, key: &RoomKey) -> Result<Option<RoomRecord>, AppError> {
        let row = match key {
            RoomKey::Id(id) => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM rooms WHERE id = ?"))
                    .bind(id)
                    .fetch_optional(pool)
                    .await?
            }
            RoomKey::Uid(uid) => {
                sqlx::query(&format!("SELECT {COLUMNS} FROM rooms WHERE uniqueId = ?"))
                    .bind(uid)
                    .fetch_optional(pool)
                    .await?
            }
        };
        row.as_ref().map(row_to_room).transpose()
    }

    /// Insert one record and return it with its assigned id and timestamps.
    /// A uniqueId collision surfaces as Conflict.
    pub async fn create(pool: &SqlitePool, room: &NewRoom) -> Result<RoomRecord, AppError> {
        let now = Utc::now();
        let stages = serde_json::to_string(&room.stages)?;
        let result = sqlx::query(
            "INSERT INTO rooms (uniqueId, name, appliedImagesData, createdAt, updatedAt) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&room.unique_id)
        .bind(&room.name)
        .bind(&stages)
        .bind(now)
        .bind(now)
        .execute(pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("uniqueId already in use".into())
            }
            _ => AppError::Db(e),
        })?;

        let id = result.last_insert_rowid();
        Self::find(pool, &RoomKey::Id(id))
            .await?
            .ok_or(AppError::Db(sqlx::Error::RowNotFound))
    }

    /// Apply a partial update: fields absent from the patch keep their stored
    /// value, updatedAt is refreshed either way. Returns None when no record
    /// matches the key.
    pub async fn update(
        pool: &SqlitePool,
        key: &RoomKey,
        patch: &RoomPatch,
    ) -> Result<Option<RoomRecord>, AppError> {
        let Some(current) = Self::find(pool, key).await? else {
            return Ok(None);
        };
        let name = patch.name.as_ref().unwrap_or(&current.name);
        let stages: &[Stage] = patch
            .stages
            .as_deref()
            .unwrap_or(&current.applied_images_data);
        let stages_json = serde_json::to_string(stages)?;

        sqlx::query("UPDATE rooms SET name = ?, appliedImagesData = ?, updatedAt = ? WHERE id = ?")
            .bind(name)
            .bind(&stages_json)
            .bind(Utc::now())
            .bind(current.id)
            .execute(pool)
            .await?;

        Self::find(pool, &RoomKey::Id(current.id)).await
    }

    /// Remove one record permanently. Returns false when nothing matched.
    pub async fn delete(pool: &SqlitePool, key: &RoomKey) -> Result<bool, AppError> {
        let result = match key {
            RoomKey::Id(id) => {
                sqlx::query("DELETE FROM rooms WHERE id = ?")
                    .bind(id)
                    .execute(pool)
                    .await?
            }
            RoomKey::Uid(uid) => {
                sqlx::query("DELETE FROM rooms WHERE uniqueId = ?")
                    .bind(uid)
                    .execute(pool)
                    .await?
            }
        };
        Ok(result.rows_affected() > 0)
    }
}

fn row_to_room(row: &SqliteRow) -> Result<RoomRecord, AppError> {
    let raw: String = row.try_get("appliedImagesData")?;
    let stages: Vec<Stage> = serde_json::from_str(&raw)?;
    Ok(RoomRecord {
        id: row.try_get("id")?,
        unique_id: row.try_get("uniqueId")?,
        name: row.try_get("name")?,
        applied_images_data: stages,
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}
