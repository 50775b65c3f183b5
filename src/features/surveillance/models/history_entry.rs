use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::surveillance::models::{AttachmentMeta, SurveillanceItem};

/// Outcome of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "conformity_result", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConformityResult {
    Conforme,
    NonConforme,
}

/// Database model for one completed control. Rows are never updated.
#[derive(Debug, Clone, FromRow)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub item_id: Uuid,
    pub completion_date: NaiveDate,
    pub comments: Option<String>,
    pub result: ConformityResult,
    pub duration_label: Option<String>,
    pub validated_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewHistoryEntry {
    pub item_id: Uuid,
    pub completion_date: NaiveDate,
    pub comments: Option<String>,
    pub result: ConformityResult,
    pub duration_label: Option<String>,
    pub validated_by: Option<String>,
}

/// Control data submitted when an item is completed
#[derive(Debug, Clone)]
pub struct CompletionRecord {
    pub completion_date: NaiveDate,
    pub comments: Option<String>,
    pub result: ConformityResult,
    pub duration_label: Option<String>,
}

/// What a completion wrote: the realised item, its new history entry and the
/// stored attachments, in upload order
#[derive(Debug, Clone)]
pub struct RecordedCompletion {
    pub item: SurveillanceItem,
    pub entry: HistoryEntry,
    pub attachments: Vec<AttachmentMeta>,
}
