use axum::{extract::State, Json};
use std::sync::Arc;

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::surveillance::dtos::{
    CategoryOrderResponseDto, EditCategoryOrderDto, SaveCategoryOrderDto,
};
use crate::features::surveillance::services::CategoryOrderService;
use crate::shared::types::ApiResponse;

/// Category display order of the caller
///
/// The saved order is merged with the current categories: removed categories
/// are dropped and new ones appended alphabetically.
#[utoipa::path(
    get,
    path = "/api/surveillance/category-order",
    responses(
        (status = 200, description = "Reconciled category order", body = ApiResponse<CategoryOrderResponseDto>),
        (status = 401, description = "Unauthorized")
    ),
    tag = "category-order",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_category_order(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryOrderService>>,
) -> Result<Json<ApiResponse<CategoryOrderResponseDto>>> {
    let order = service.get(&user.user_id).await?;
    Ok(Json(ApiResponse::success(Some(order), None, None)))
}

/// Save an explicit category order
#[utoipa::path(
    put,
    path = "/api/surveillance/category-order",
    request_body = SaveCategoryOrderDto,
    responses(
        (status = 200, description = "Order saved", body = ApiResponse<CategoryOrderResponseDto>),
        (status = 400, description = "Order is not a permutation of the current categories"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Another save is in progress")
    ),
    tag = "category-order",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn save_category_order(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryOrderService>>,
    AppJson(dto): AppJson<SaveCategoryOrderDto>,
) -> Result<Json<ApiResponse<CategoryOrderResponseDto>>> {
    let order = service.save(&user.user_id, dto.order).await?;
    Ok(Json(ApiResponse::success(
        Some(order),
        Some("Category order saved".to_string()),
        None,
    )))
}

/// Apply move/reset operations to the category order
#[utoipa::path(
    post,
    path = "/api/surveillance/category-order/edit",
    request_body = EditCategoryOrderDto,
    responses(
        (status = 200, description = "Resulting order", body = ApiResponse<CategoryOrderResponseDto>),
        (status = 400, description = "Index out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Another save is in progress")
    ),
    tag = "category-order",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn edit_category_order(
    user: AuthenticatedUser,
    State(service): State<Arc<CategoryOrderService>>,
    AppJson(dto): AppJson<EditCategoryOrderDto>,
) -> Result<Json<ApiResponse<CategoryOrderResponseDto>>> {
    let order = service
        .edit(&user.user_id, &dto.operations, dto.save)
        .await?;
    Ok(Json(ApiResponse::success(Some(order), None, None)))
}
