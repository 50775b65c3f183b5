use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a user preference entry, scoped to the requesting user
#[derive(Debug, Clone, FromRow)]
pub struct UserPreference {
    pub key: String,
    pub value: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}
