use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::surveillance::models::{AttachmentMeta, ConformityResult, HistoryEntry};

/// Attachment metadata; content is served by the download endpoint
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttachmentDto {
    pub id: Uuid,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
}

impl From<AttachmentMeta> for AttachmentDto {
    fn from(a: AttachmentMeta) -> Self {
        Self {
            id: a.id,
            file_name: a.file_name,
            content_type: a.content_type,
            file_size: a.file_size,
        }
    }
}

/// Response DTO for one completed control
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HistoryEntryDto {
    pub id: Uuid,
    pub item_id: Uuid,
    pub completion_date: NaiveDate,
    pub comments: Option<String>,
    pub result: ConformityResult,
    pub duration_label: Option<String>,
    pub validated_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub attachments: Vec<AttachmentDto>,
}

impl HistoryEntryDto {
    pub fn new(entry: HistoryEntry, attachments: Vec<AttachmentMeta>) -> Self {
        Self {
            id: entry.id,
            item_id: entry.item_id,
            completion_date: entry.completion_date,
            comments: entry.comments,
            result: entry.result,
            duration_label: entry.duration_label,
            validated_by: entry.validated_by,
            created_at: entry.created_at,
            attachments: attachments.into_iter().map(AttachmentDto::from).collect(),
        }
    }
}
