use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::preferences::handlers;
use crate::features::preferences::services::PreferenceService;

/// Create routes for the preferences feature
pub fn routes(service: Arc<PreferenceService>) -> Router {
    Router::new()
        .route(
            "/api/user-preferences",
            get(handlers::list_preferences).post(handlers::upsert_preference),
        )
        .route("/api/user-preferences/{key}", get(handlers::get_preference))
        .with_state(service)
}
