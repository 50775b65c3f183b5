use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::preferences::dtos::{PreferenceResponseDto, UpsertPreferenceDto};
use crate::features::preferences::services::PreferenceService;
use crate::shared::types::{ApiResponse, Meta};

/// List the caller's preferences
#[utoipa::path(
    get,
    path = "/api/user-preferences",
    responses(
        (status = 200, description = "Preferences of the current user", body = ApiResponse<Vec<PreferenceResponseDto>>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "preferences",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_preferences(
    user: AuthenticatedUser,
    State(service): State<Arc<PreferenceService>>,
) -> Result<Json<ApiResponse<Vec<PreferenceResponseDto>>>> {
    let preferences = service.list(&user.user_id).await?;
    let total = preferences.len() as i64;
    Ok(Json(ApiResponse::success(
        Some(preferences),
        None,
        Some(Meta { total }),
    )))
}

/// Get one preference by key
#[utoipa::path(
    get,
    path = "/api/user-preferences/{key}",
    params(
        ("key" = String, Path, description = "Preference key")
    ),
    responses(
        (status = 200, description = "Preference (value is null when unset)", body = ApiResponse<PreferenceResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "preferences",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_preference(
    user: AuthenticatedUser,
    State(service): State<Arc<PreferenceService>>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<PreferenceResponseDto>>> {
    let preference = service.get(&user.user_id, &key).await?;
    Ok(Json(ApiResponse::success(Some(preference), None, None)))
}

/// Create or replace a preference
#[utoipa::path(
    post,
    path = "/api/user-preferences",
    request_body = UpsertPreferenceDto,
    responses(
        (status = 200, description = "Preference saved", body = ApiResponse<PreferenceResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "preferences",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn upsert_preference(
    user: AuthenticatedUser,
    State(service): State<Arc<PreferenceService>>,
    AppJson(dto): AppJson<UpsertPreferenceDto>,
) -> Result<Json<ApiResponse<PreferenceResponseDto>>> {
    let preference = service.upsert(&user.user_id, dto).await?;
    Ok(Json(ApiResponse::success(
        Some(preference),
        Some("Preference saved".to_string()),
        None,
    )))
}
