use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle status of an inspection item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "surveillance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Scheduled
    Planifie,
    /// To be scheduled
    Planifier,
    /// Last control performed
    Realise,
}

/// Database model for surveillance items
#[derive(Debug, Clone, FromRow)]
pub struct SurveillanceItem {
    pub id: Uuid,
    pub category: String,
    pub label: String,
    pub building: Option<String>,
    pub periodicity: String,
    pub status: ItemStatus,
    pub last_completion_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a new item
#[derive(Debug, Clone)]
pub struct NewSurveillanceItem {
    pub category: String,
    pub label: String,
    pub building: Option<String>,
    pub periodicity: String,
    pub next_due_date: Option<NaiveDate>,
}

/// Editable fields of an existing item, written as a whole
#[derive(Debug, Clone)]
pub struct ItemUpdate {
    pub category: String,
    pub label: String,
    pub building: Option<String>,
    pub periodicity: String,
    pub status: ItemStatus,
    pub next_due_date: Option<NaiveDate>,
}
