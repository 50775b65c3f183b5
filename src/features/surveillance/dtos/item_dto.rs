use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::surveillance::category_order::{category_icon, category_label};
use crate::features::surveillance::dtos::HistoryEntryDto;
use crate::features::surveillance::models::{ItemStatus, SurveillanceItem};
use crate::features::surveillance::periodicity::{Cadence, FALLBACK_CADENCE};
use crate::shared::validation::CATEGORY_KEY_REGEX;

/// Response DTO for an inspection item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SurveillanceItemResponseDto {
    pub id: Uuid,
    pub category: String,
    pub category_icon: String,
    pub category_label: String,
    pub label: String,
    pub building: Option<String>,
    /// Periodicity as typed by the user
    pub periodicity: String,
    /// Cadence the periodicity resolves to
    pub cadence: Cadence,
    pub status: ItemStatus,
    pub last_completion_date: Option<NaiveDate>,
    pub next_due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SurveillanceItem> for SurveillanceItemResponseDto {
    fn from(item: SurveillanceItem) -> Self {
        Self {
            id: item.id,
            category_icon: category_icon(&item.category).to_string(),
            category_label: category_label(&item.category).to_string(),
            cadence: Cadence::classify(&item.periodicity).unwrap_or(FALLBACK_CADENCE),
            category: item.category,
            label: item.label,
            building: item.building,
            periodicity: item.periodicity,
            status: item.status,
            last_completion_date: item.last_completion_date,
            next_due_date: item.next_due_date,
            created_at: item.created_at,
            updated_at: item.updated_at,
        }
    }
}

/// Query params for listing items
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ItemQueryParams {
    /// Only items of this category
    pub category: Option<String>,
}

/// Request DTO for creating an item
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateItemDto {
    #[validate(length(min = 1, max = 64, message = "category must be 1-64 characters"))]
    #[validate(regex(
        path = *CATEGORY_KEY_REGEX,
        message = "category must be an uppercase key such as INCENDIE"
    ))]
    #[schema(example = "INCENDIE")]
    pub category: String,
    #[validate(length(min = 1, max = 255, message = "label must be 1-255 characters"))]
    #[schema(example = "Extincteurs")]
    pub label: String,
    #[validate(length(max = 255))]
    pub building: Option<String>,
    #[validate(length(min = 1, max = 100, message = "periodicity must be 1-100 characters"))]
    #[schema(example = "Annuel")]
    pub periodicity: String,
    pub next_due_date: Option<NaiveDate>,
}

/// Request DTO for a partial item update; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateItemDto {
    #[validate(length(min = 1, max = 64, message = "category must be 1-64 characters"))]
    #[validate(regex(
        path = *CATEGORY_KEY_REGEX,
        message = "category must be an uppercase key such as INCENDIE"
    ))]
    pub category: Option<String>,
    #[validate(length(min = 1, max = 255, message = "label must be 1-255 characters"))]
    pub label: Option<String>,
    /// Empty string clears the building
    #[validate(length(max = 255))]
    pub building: Option<String>,
    #[validate(length(min = 1, max = 100, message = "periodicity must be 1-100 characters"))]
    pub periodicity: Option<String>,
    pub status: Option<ItemStatus>,
    pub next_due_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeleteItemResponseDto {
    pub deleted: bool,
}

/// Completion form for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CompleteItemForm {
    /// Date of the control (YYYY-MM-DD)
    #[schema(example = "2025-01-15")]
    pub completion_date: String,
    /// CONFORME or NON_CONFORME
    #[schema(example = "CONFORME")]
    pub result: String,
    pub comments: Option<String>,
    /// Free text duration, e.g. "2h"
    pub duration_label: Option<String>,
    /// Attachments, repeatable
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub files: Option<Vec<String>>,
}

/// Result of completing an item
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletionResponseDto {
    pub item: SurveillanceItemResponseDto,
    pub history: HistoryEntryDto,
    pub next_due_date: NaiveDate,
}

/// Query params for previewing a next due date
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct NextDueDateQuery {
    /// Completion date (YYYY-MM-DD)
    pub date: NaiveDate,
    /// Periodicity label
    pub periodicity: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NextDueDateResponseDto {
    pub date: NaiveDate,
    pub periodicity: String,
    pub cadence: Cadence,
    pub next_due_date: NaiveDate,
}

/// Allowed MIME types for completion attachments
pub const ALLOWED_MIME_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Maximum attachment size in bytes (10MB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

pub fn is_mime_type_allowed(content_type: &str) -> bool {
    ALLOWED_MIME_TYPES.contains(&content_type)
}
