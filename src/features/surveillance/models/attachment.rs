use sqlx::FromRow;
use uuid::Uuid;

/// Attachment with its content, used for downloads
#[derive(Debug, Clone, FromRow)]
pub struct Attachment {
    pub id: Uuid,
    pub history_id: Uuid,
    pub position: i32,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
    pub data: Vec<u8>,
}

/// Attachment metadata without the content, used in history listings
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentMeta {
    pub id: Uuid,
    pub history_id: Uuid,
    pub position: i32,
    pub file_name: String,
    pub content_type: String,
    pub file_size: i64,
}

impl From<&Attachment> for AttachmentMeta {
    fn from(a: &Attachment) -> Self {
        Self {
            id: a.id,
            history_id: a.history_id,
            position: a.position,
            file_name: a.file_name.clone(),
            content_type: a.content_type.clone(),
            file_size: a.file_size,
        }
    }
}

/// Uploaded file waiting to be stored with a history entry
#[derive(Debug, Clone)]
pub struct NewAttachment {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
