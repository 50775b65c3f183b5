use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::preferences::{dtos as preferences_dtos, handlers as preferences_handlers};
use crate::features::surveillance::{
    category_order, dtos as surveillance_dtos, handlers as surveillance_handlers, history_stats,
    models as surveillance_models, periodicity,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Preferences
        preferences_handlers::list_preferences,
        preferences_handlers::get_preference,
        preferences_handlers::upsert_preference,
        // Surveillance items
        surveillance_handlers::list_items,
        surveillance_handlers::get_item,
        surveillance_handlers::create_item,
        surveillance_handlers::update_item,
        surveillance_handlers::delete_item,
        surveillance_handlers::complete_item,
        surveillance_handlers::preview_next_due_date,
        // Surveillance history
        surveillance_handlers::list_history,
        surveillance_handlers::history_stats,
        surveillance_handlers::download_attachment,
        // Category order
        surveillance_handlers::get_category_order,
        surveillance_handlers::save_category_order,
        surveillance_handlers::edit_category_order,
    ),
    components(
        schemas(
            // Shared
            Meta,
            auth::model::AuthenticatedUser,
            // Preferences
            preferences_dtos::PreferenceResponseDto,
            preferences_dtos::UpsertPreferenceDto,
            ApiResponse<preferences_dtos::PreferenceResponseDto>,
            ApiResponse<Vec<preferences_dtos::PreferenceResponseDto>>,
            // Surveillance
            periodicity::Cadence,
            surveillance_models::ItemStatus,
            surveillance_models::ConformityResult,
            surveillance_dtos::SurveillanceItemResponseDto,
            surveillance_dtos::CreateItemDto,
            surveillance_dtos::UpdateItemDto,
            surveillance_dtos::DeleteItemResponseDto,
            surveillance_dtos::CompleteItemForm,
            surveillance_dtos::CompletionResponseDto,
            surveillance_dtos::NextDueDateResponseDto,
            surveillance_dtos::HistoryEntryDto,
            surveillance_dtos::AttachmentDto,
            history_stats::HistoryStats,
            history_stats::HistoryAlert,
            ApiResponse<surveillance_dtos::SurveillanceItemResponseDto>,
            ApiResponse<Vec<surveillance_dtos::SurveillanceItemResponseDto>>,
            ApiResponse<surveillance_dtos::CompletionResponseDto>,
            ApiResponse<surveillance_dtos::DeleteItemResponseDto>,
            ApiResponse<surveillance_dtos::NextDueDateResponseDto>,
            ApiResponse<Vec<surveillance_dtos::HistoryEntryDto>>,
            ApiResponse<history_stats::HistoryStats>,
            // Category order
            category_order::OrderOperation,
            surveillance_dtos::CategoryEntryDto,
            surveillance_dtos::CategoryOrderResponseDto,
            surveillance_dtos::SaveCategoryOrderDto,
            surveillance_dtos::EditCategoryOrderDto,
            ApiResponse<surveillance_dtos::CategoryOrderResponseDto>,
        )
    ),
    tags(
        (name = "preferences", description = "Per-user preferences"),
        (name = "surveillance", description = "Recurring inspection items and completions"),
        (name = "surveillance-history", description = "Completion history, statistics and attachments"),
        (name = "category-order", description = "Per-user display order of surveillance categories"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Surveillance API",
        version = "0.1.0",
        description = "API documentation for the surveillance plan",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_surveillance_paths() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/surveillance/items/{id}/complete"));
        assert!(doc.paths.paths.contains_key("/api/surveillance/category-order/edit"));
        assert!(doc.paths.paths.contains_key("/api/user-preferences/{key}"));

        let item = &doc.paths.paths["/api/surveillance/items/{id}"];
        assert!(item.get.is_some() && item.put.is_some() && item.delete.is_some());
    }
}
