use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireEditor;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::surveillance::dtos::{
    is_mime_type_allowed, CompleteItemForm, CompletionResponseDto, CreateItemDto,
    DeleteItemResponseDto, ItemQueryParams, NextDueDateQuery, NextDueDateResponseDto,
    SurveillanceItemResponseDto, UpdateItemDto, ALLOWED_MIME_TYPES, MAX_FILE_SIZE,
};
use crate::features::surveillance::models::{CompletionRecord, ConformityResult, NewAttachment};
use crate::features::surveillance::services::SurveillanceService;
use crate::shared::types::{ApiResponse, Meta};

/// List inspection items
#[utoipa::path(
    get,
    path = "/api/surveillance/items",
    params(ItemQueryParams),
    responses(
        (status = 200, description = "Inspection items", body = ApiResponse<Vec<SurveillanceItemResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_items(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Query(params): Query<ItemQueryParams>,
) -> Result<Json<ApiResponse<Vec<SurveillanceItemResponseDto>>>> {
    let items = service.list_items(params.category.as_deref()).await?;
    let total = items.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(items),
        None,
        Some(Meta { total }),
    )))
}

/// Get an inspection item
#[utoipa::path(
    get,
    path = "/api/surveillance/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Inspection item", body = ApiResponse<SurveillanceItemResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_item(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SurveillanceItemResponseDto>>> {
    let item = service.get_item(id).await?;
    Ok(Json(ApiResponse::success(Some(item), None, None)))
}

/// Create an inspection item
#[utoipa::path(
    post,
    path = "/api/surveillance/items",
    request_body = CreateItemDto,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<SurveillanceItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewers cannot create items")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_item(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<SurveillanceService>>,
    AppJson(dto): AppJson<CreateItemDto>,
) -> Result<(StatusCode, Json<ApiResponse<SurveillanceItemResponseDto>>)> {
    let item = service.create_item(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(item),
            Some("Surveillance item created".to_string()),
            None,
        )),
    ))
}

/// Update an inspection item
///
/// Only the fields present in the body change. Setting `status` to PLANIFIER
/// flags the item as needing a new schedule.
#[utoipa::path(
    put,
    path = "/api/surveillance/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body = UpdateItemDto,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<SurveillanceItemResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewers cannot edit items"),
        (status = 404, description = "Item not found")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_item(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<SurveillanceService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdateItemDto>,
) -> Result<Json<ApiResponse<SurveillanceItemResponseDto>>> {
    let item = service.update_item(id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(item),
        Some("Surveillance item updated".to_string()),
        None,
    )))
}

/// Delete an inspection item with its history and attachments
#[utoipa::path(
    delete,
    path = "/api/surveillance/items/{id}",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted", body = ApiResponse<DeleteItemResponseDto>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewers cannot delete items"),
        (status = 404, description = "Item not found")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_item(
    RequireEditor(_user): RequireEditor,
    State(service): State<Arc<SurveillanceService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteItemResponseDto>>> {
    service.delete_item(id).await?;
    Ok(Json(ApiResponse::success(
        Some(DeleteItemResponseDto { deleted: true }),
        Some("Surveillance item deleted".to_string()),
        None,
    )))
}

/// Record a completed control
///
/// Accepts multipart/form-data with:
/// - `completion_date`: YYYY-MM-DD (required)
/// - `result`: CONFORME (default) or NON_CONFORME
/// - `comments`, `duration_label`: optional text
/// - `files`: attachments, repeatable, kept in upload order
#[utoipa::path(
    post,
    path = "/api/surveillance/items/{id}/complete",
    params(
        ("id" = Uuid, Path, description = "Item ID")
    ),
    request_body(
        content = CompleteItemForm,
        content_type = "multipart/form-data",
        description = "Control data and optional attachments",
    ),
    responses(
        (status = 201, description = "Control recorded", body = ApiResponse<CompletionResponseDto>),
        (status = 400, description = "Invalid form or periodicity"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Viewers cannot record controls"),
        (status = 404, description = "Item not found"),
        (status = 413, description = "File too large")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn complete_item(
    RequireEditor(user): RequireEditor,
    State(service): State<Arc<SurveillanceService>>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<CompletionResponseDto>>)> {
    let mut completion_date: Option<NaiveDate> = None;
    let mut result = ConformityResult::Conforme;
    let mut comments: Option<String> = None;
    let mut duration_label: Option<String> = None;
    let mut attachments: Vec<NewAttachment> = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "files" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let file_name = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "unnamed".to_string());

                if !is_mime_type_allowed(&content_type) {
                    return Err(AppError::BadRequest(format!(
                        "File type '{}' is not allowed. Allowed types: {}",
                        content_type,
                        ALLOWED_MIME_TYPES.join(", ")
                    )));
                }

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read file bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read file data: {}", e))
                })?;

                if data.len() > MAX_FILE_SIZE {
                    return Err(AppError::BadRequest(format!(
                        "File '{}' too large. Maximum size is {} MB",
                        file_name,
                        MAX_FILE_SIZE / 1024 / 1024
                    )));
                }

                attachments.push(NewAttachment {
                    file_name,
                    content_type,
                    data: data.to_vec(),
                });
            }
            "completion_date" => {
                let text = read_text(field, "completion_date").await?;
                let date = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| {
                    AppError::Validation(format!(
                        "completion_date must be YYYY-MM-DD, got '{}'",
                        text
                    ))
                })?;
                completion_date = Some(date);
            }
            "result" => {
                let text = read_text(field, "result").await?;
                result = match text.trim() {
                    "CONFORME" => ConformityResult::Conforme,
                    "NON_CONFORME" => ConformityResult::NonConforme,
                    other => {
                        return Err(AppError::Validation(format!(
                            "result must be CONFORME or NON_CONFORME, got '{}'",
                            other
                        )))
                    }
                };
            }
            "comments" => comments = non_empty(read_text(field, "comments").await?),
            "duration_label" => {
                duration_label = non_empty(read_text(field, "duration_label").await?)
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let completion_date = completion_date
        .ok_or_else(|| AppError::Validation("completion_date is required".to_string()))?;

    let response = service
        .complete_item(
            id,
            CompletionRecord {
                completion_date,
                comments,
                result,
                duration_label,
            },
            attachments,
            &user,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(response),
            Some("Control recorded".to_string()),
            None,
        )),
    ))
}

/// Preview the next due date for a control
#[utoipa::path(
    get,
    path = "/api/surveillance/next-due-date",
    params(NextDueDateQuery),
    responses(
        (status = 200, description = "Next due date", body = ApiResponse<NextDueDateResponseDto>),
        (status = 400, description = "Empty periodicity or date out of range"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "surveillance",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn preview_next_due_date(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Query(query): Query<NextDueDateQuery>,
) -> Result<Json<ApiResponse<NextDueDateResponseDto>>> {
    let preview = service.preview_next_due_date(query.date, &query.periodicity)?;
    Ok(Json(ApiResponse::success(Some(preview), None, None)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read {} field: {}", name, e)))
}

fn non_empty(text: String) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
