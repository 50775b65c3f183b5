use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::surveillance::models::{
    Attachment, AttachmentMeta, HistoryEntry, ItemStatus, ItemUpdate, NewAttachment,
    NewHistoryEntry, NewSurveillanceItem, RecordedCompletion, SurveillanceItem,
};

/// Storage for inspection items, their history and attachments
#[async_trait]
pub trait SurveillanceRepository: Send + Sync {
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<SurveillanceItem>>;

    async fn get_item(&self, id: Uuid) -> Result<Option<SurveillanceItem>>;

    async fn create_item(&self, item: NewSurveillanceItem) -> Result<SurveillanceItem>;

    /// Overwrite the editable fields of an item; `None` when it does not exist
    async fn update_item(&self, id: Uuid, update: ItemUpdate) -> Result<Option<SurveillanceItem>>;

    /// Delete an item with its history and attachments; `false` when it does not exist
    async fn delete_item(&self, id: Uuid) -> Result<bool>;

    /// Append a history entry with its attachments and mark the item done,
    /// scheduling its next control. Either everything is written or nothing is.
    async fn record_completion(
        &self,
        entry: NewHistoryEntry,
        attachments: Vec<NewAttachment>,
        next_due_date: NaiveDate,
    ) -> Result<RecordedCompletion>;

    /// History of an item, newest first
    async fn list_history(&self, item_id: Uuid, limit: Option<i64>) -> Result<Vec<HistoryEntry>>;

    async fn list_attachments(&self, history_ids: &[Uuid]) -> Result<Vec<AttachmentMeta>>;

    async fn get_attachment(&self, id: Uuid) -> Result<Option<Attachment>>;

    /// Distinct categories across all items
    async fn list_categories(&self) -> Result<BTreeSet<String>>;
}

const ITEM_COLUMNS: &str = "id, category, label, building, periodicity, status, \
     last_completion_date, next_due_date, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, item_id, completion_date, comments, result, \
     duration_label, validated_by, created_at";

/// Postgres-backed surveillance repository
pub struct PgSurveillanceRepository {
    pool: PgPool,
}

impl PgSurveillanceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SurveillanceRepository for PgSurveillanceRepository {
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<SurveillanceItem>> {
        let sql = format!(
            "SELECT {} FROM surveillance_items \
             WHERE ($1::text IS NULL OR category = $1) \
             ORDER BY category, next_due_date NULLS LAST, label",
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, SurveillanceItem>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list surveillance items: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<SurveillanceItem>> {
        let sql = format!("SELECT {} FROM surveillance_items WHERE id = $1", ITEM_COLUMNS);

        sqlx::query_as::<_, SurveillanceItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get surveillance item {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn create_item(&self, item: NewSurveillanceItem) -> Result<SurveillanceItem> {
        let sql = format!(
            "INSERT INTO surveillance_items (category, label, building, periodicity, status, next_due_date) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, SurveillanceItem>(&sql)
            .bind(&item.category)
            .bind(&item.label)
            .bind(&item.building)
            .bind(&item.periodicity)
            .bind(ItemStatus::Planifie)
            .bind(item.next_due_date)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create surveillance item: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn update_item(&self, id: Uuid, update: ItemUpdate) -> Result<Option<SurveillanceItem>> {
        let sql = format!(
            "UPDATE surveillance_items \
             SET category = $2, label = $3, building = $4, periodicity = $5, status = $6, \
                 next_due_date = $7, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            ITEM_COLUMNS
        );

        sqlx::query_as::<_, SurveillanceItem>(&sql)
            .bind(id)
            .bind(&update.category)
            .bind(&update.label)
            .bind(&update.building)
            .bind(&update.periodicity)
            .bind(update.status)
            .bind(update.next_due_date)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update surveillance item {}: {:?}", id, e);
                AppError::Database(e)
            })
    }

    async fn delete_item(&self, id: Uuid) -> Result<bool> {
        // history and attachments go with it (ON DELETE CASCADE)
        let result = sqlx::query("DELETE FROM surveillance_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to delete surveillance item {}: {:?}", id, e);
                AppError::Database(e)
            })?;

        Ok(result.rows_affected() > 0)
    }

    async fn record_completion(
        &self,
        entry: NewHistoryEntry,
        attachments: Vec<NewAttachment>,
        next_due_date: NaiveDate,
    ) -> Result<RecordedCompletion> {
        let item_id = entry.item_id;
        let mut tx = self.pool.begin().await?;

        // Updating the item first locks its row until commit
        let sql = format!(
            "UPDATE surveillance_items \
             SET status = $2, last_completion_date = $3, next_due_date = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {}",
            ITEM_COLUMNS
        );
        let item = sqlx::query_as::<_, SurveillanceItem>(&sql)
            .bind(item_id)
            .bind(ItemStatus::Realise)
            .bind(entry.completion_date)
            .bind(next_due_date)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update surveillance item {}: {:?}", item_id, e);
                AppError::Database(e)
            })?
            .ok_or_else(|| AppError::NotFound(format!("Surveillance item {} not found", item_id)))?;

        let sql = format!(
            "INSERT INTO surveillance_history \
             (item_id, completion_date, comments, result, duration_label, validated_by) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {}",
            HISTORY_COLUMNS
        );
        let history = sqlx::query_as::<_, HistoryEntry>(&sql)
            .bind(item_id)
            .bind(entry.completion_date)
            .bind(&entry.comments)
            .bind(entry.result)
            .bind(&entry.duration_label)
            .bind(&entry.validated_by)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to append history for item {}: {:?}", item_id, e);
                AppError::Database(e)
            })?;

        let mut stored = Vec::with_capacity(attachments.len());
        for (position, file) in attachments.into_iter().enumerate() {
            let meta = sqlx::query_as::<_, AttachmentMeta>(
                r#"
                INSERT INTO surveillance_attachments
                    (history_id, position, file_name, content_type, file_size, data)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, history_id, position, file_name, content_type, file_size
                "#,
            )
            .bind(history.id)
            .bind(position as i32)
            .bind(&file.file_name)
            .bind(&file.content_type)
            .bind(file.data.len() as i64)
            .bind(&file.data)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to store attachment '{}': {:?}", file.file_name, e);
                AppError::Database(e)
            })?;
            stored.push(meta);
        }

        tx.commit().await?;
        Ok(RecordedCompletion {
            item,
            entry: history,
            attachments: stored,
        })
    }

    async fn list_history(&self, item_id: Uuid, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let sql = format!(
            "SELECT {} FROM surveillance_history \
             WHERE item_id = $1 \
             ORDER BY completion_date DESC, created_at DESC \
             LIMIT $2",
            HISTORY_COLUMNS
        );

        // LIMIT NULL means no limit
        sqlx::query_as::<_, HistoryEntry>(&sql)
            .bind(item_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list history for item {}: {:?}", item_id, e);
                AppError::Database(e)
            })
    }

    async fn list_attachments(&self, history_ids: &[Uuid]) -> Result<Vec<AttachmentMeta>> {
        sqlx::query_as::<_, AttachmentMeta>(
            r#"
            SELECT id, history_id, position, file_name, content_type, file_size
            FROM surveillance_attachments
            WHERE history_id = ANY($1)
            ORDER BY history_id, position
            "#,
        )
        .bind(history_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list attachments: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get_attachment(&self, id: Uuid) -> Result<Option<Attachment>> {
        sqlx::query_as::<_, Attachment>(
            r#"
            SELECT id, history_id, position, file_name, content_type, file_size, data
            FROM surveillance_attachments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get attachment {}: {:?}", id, e);
            AppError::Database(e)
        })
    }

    async fn list_categories(&self) -> Result<BTreeSet<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT DISTINCT category FROM surveillance_items")
                .fetch_all(&self.pool)
                .await
                .map_err(|e| {
                    tracing::error!("Failed to list surveillance categories: {:?}", e);
                    AppError::Database(e)
                })?;

        Ok(rows.into_iter().map(|(c,)| c).collect())
    }
}
