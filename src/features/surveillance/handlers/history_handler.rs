use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::surveillance::dtos::HistoryEntryDto;
use crate::features::surveillance::history_stats::HistoryStats;
use crate::features::surveillance::services::SurveillanceService;
use crate::shared::types::{ApiResponse, Meta};

/// Latest completed controls of an item, newest first
#[utoipa::path(
    get,
    path = "/api/surveillance-history/{item_id}",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Up to 18 history entries", body = ApiResponse<Vec<HistoryEntryDto>>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found")
    ),
    tag = "surveillance-history",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_history(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<HistoryEntryDto>>>> {
    let history = service.list_history(item_id).await?;
    let total = history.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(history),
        None,
        Some(Meta { total }),
    )))
}

/// Conformity statistics and alerts for an item
#[utoipa::path(
    get,
    path = "/api/surveillance-history/{item_id}/stats",
    params(
        ("item_id" = Uuid, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "History statistics", body = ApiResponse<HistoryStats>),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Item not found")
    ),
    tag = "surveillance-history",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn history_stats(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<ApiResponse<HistoryStats>>> {
    let stats = service.history_stats(item_id).await?;
    Ok(Json(ApiResponse::success(Some(stats), None, None)))
}

/// Download an attachment
#[utoipa::path(
    get,
    path = "/api/surveillance-history/files/{file_id}",
    params(
        ("file_id" = Uuid, Path, description = "Attachment ID")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Attachment not found")
    ),
    tag = "surveillance-history",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn download_attachment(
    _user: AuthenticatedUser,
    State(service): State<Arc<SurveillanceService>>,
    Path(file_id): Path<Uuid>,
) -> Result<Response> {
    let attachment = service.get_attachment(file_id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, attachment.content_type),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&attachment.file_name),
            ),
        ],
        attachment.data,
    )
        .into_response())
}

/// `attachment` disposition header value. Quotes, backslashes and control
/// characters in the stored name become `_` so the value stays a valid header.
fn content_disposition(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    format!("attachment; filename=\"{}\"", safe)
}
