use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::features::surveillance::dtos::MAX_FILE_SIZE;
use crate::features::surveillance::handlers;
use crate::features::surveillance::services::{CategoryOrderService, SurveillanceService};

/// Attachments per completion accepted in one request body
const MAX_FILES_PER_COMPLETION: usize = 5;

/// Create routes for the surveillance feature
pub fn routes(
    surveillance_service: Arc<SurveillanceService>,
    category_order_service: Arc<CategoryOrderService>,
) -> Router {
    let items = Router::new()
        .route(
            "/api/surveillance/items",
            get(handlers::list_items).post(handlers::create_item),
        )
        .route(
            "/api/surveillance/items/{id}",
            get(handlers::get_item)
                .put(handlers::update_item)
                .delete(handlers::delete_item),
        )
        .route(
            "/api/surveillance/items/{id}/complete",
            // several files plus multipart overhead
            post(handlers::complete_item).layer(DefaultBodyLimit::max(
                MAX_FILE_SIZE * MAX_FILES_PER_COMPLETION + 1024 * 1024,
            )),
        )
        .route(
            "/api/surveillance/next-due-date",
            get(handlers::preview_next_due_date),
        )
        .route(
            "/api/surveillance-history/{item_id}",
            get(handlers::list_history),
        )
        .route(
            "/api/surveillance-history/{item_id}/stats",
            get(handlers::history_stats),
        )
        .route(
            "/api/surveillance-history/files/{file_id}",
            get(handlers::download_attachment),
        )
        .with_state(surveillance_service);

    let category_order = Router::new()
        .route(
            "/api/surveillance/category-order",
            get(handlers::get_category_order).put(handlers::save_category_order),
        )
        .route(
            "/api/surveillance/category-order/edit",
            post(handlers::edit_category_order),
        )
        .with_state(category_order_service);

    items.merge(category_order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::auth::model::AuthenticatedUser;
    use crate::shared::test_helpers::{
        create_editor_user, create_viewer_user, with_user_auth, InMemoryPreferenceStore,
        InMemorySurveillanceRepository,
    };
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use serde_json::{json, Value};

    fn server(repo: Arc<InMemorySurveillanceRepository>, user: AuthenticatedUser) -> TestServer {
        let app = routes(
            Arc::new(SurveillanceService::new(repo.clone())),
            Arc::new(CategoryOrderService::new(
                repo,
                Arc::new(InMemoryPreferenceStore::default()),
            )),
        );
        TestServer::new(with_user_auth(app, user)).unwrap()
    }

    #[tokio::test]
    async fn test_complete_with_attachment_then_download() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        let item = repo.seed_item("INCENDIE", "Extincteurs", "Trimestriel");
        let server = server(repo, create_editor_user());

        let form = MultipartForm::new()
            .add_text("completion_date", "2025-01-15")
            .add_text("result", "NON_CONFORME")
            .add_text("comments", "Pression faible")
            .add_part(
                "files",
                Part::bytes(b"%PDF-1.4".to_vec())
                    .file_name("rapport.pdf")
                    .mime_type("application/pdf"),
            );

        let response = server
            .post(&format!("/api/surveillance/items/{}/complete", item.id))
            .multipart(form)
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        assert_eq!(body["data"]["next_due_date"], "2025-04-15");
        assert_eq!(body["data"]["item"]["status"], "REALISE");
        assert_eq!(body["data"]["history"]["result"], "NON_CONFORME");

        let file_id = body["data"]["history"]["attachments"][0]["id"]
            .as_str()
            .unwrap()
            .to_string();
        let download = server
            .get(&format!("/api/surveillance-history/files/{}", file_id))
            .await;
        download.assert_status_ok();
        assert_eq!(download.as_bytes().to_vec(), b"%PDF-1.4".to_vec());
        assert_eq!(download.header("content-type"), "application/pdf");

        let history: Value = server
            .get(&format!("/api/surveillance-history/{}", item.id))
            .await
            .json();
        assert_eq!(history["meta"]["total"], 1);

        let stats: Value = server
            .get(&format!("/api/surveillance-history/{}/stats", item.id))
            .await
            .json();
        assert_eq!(stats["data"]["total"], 1);
        assert_eq!(stats["data"]["trend"], json!(["NON_CONFORME"]));
    }

    #[tokio::test]
    async fn test_complete_rejects_disallowed_file_type() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        let item = repo.seed_item("INCENDIE", "Extincteurs", "Annuel");
        let server = server(repo, create_editor_user());

        let form = MultipartForm::new()
            .add_text("completion_date", "2025-01-15")
            .add_part(
                "files",
                Part::bytes(b"<html>".to_vec())
                    .file_name("page.html")
                    .mime_type("text/html"),
            );

        server
            .post(&format!("/api/surveillance/items/{}/complete", item.id))
            .multipart(form)
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_viewer_cannot_complete() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        let item = repo.seed_item("GAZ", "Détecteurs", "Mensuel");
        let server = server(repo, create_viewer_user());

        let form = MultipartForm::new().add_text("completion_date", "2025-01-15");
        server
            .post(&format!("/api/surveillance/items/{}/complete", item.id))
            .multipart(form)
            .await
            .assert_status(StatusCode::FORBIDDEN);

        // reads stay open to viewers
        server
            .get(&format!("/api/surveillance/items/{}", item.id))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_create_and_list_items() {
        let server = server(
            Arc::new(InMemorySurveillanceRepository::default()),
            create_editor_user(),
        );

        server
            .post("/api/surveillance/items")
            .json(&json!({
                "category": "ELECTRIQUE",
                "label": "Tableau général",
                "periodicity": "Annuel"
            }))
            .await
            .assert_status(StatusCode::CREATED);

        server
            .post("/api/surveillance/items")
            .json(&json!({
                "category": "electrique",
                "label": "Tableau",
                "periodicity": "Annuel"
            }))
            .await
            .assert_status_bad_request();

        let body: Value = server
            .get("/api/surveillance/items")
            .add_query_param("category", "ELECTRIQUE")
            .await
            .json();
        assert_eq!(body["meta"]["total"], 1);
        assert_eq!(body["data"][0]["category_icon"], "⚡");
        assert_eq!(body["data"][0]["cadence"], "annual");
    }

    #[tokio::test]
    async fn test_preview_next_due_date() {
        let server = server(
            Arc::new(InMemorySurveillanceRepository::default()),
            create_viewer_user(),
        );

        let body: Value = server
            .get("/api/surveillance/next-due-date")
            .add_query_param("date", "2025-01-31")
            .add_query_param("periodicity", "Mensuel")
            .await
            .json();
        assert_eq!(body["data"]["next_due_date"], "2025-02-28");

        server
            .get("/api/surveillance/next-due-date")
            .add_query_param("date", "2025-01-31")
            .add_query_param("periodicity", "")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_category_order_endpoints() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        for category in ["MMRI", "INCENDIE", "ELECTRIQUE"] {
            repo.seed_item(category, "Contrôle", "Annuel");
        }
        let server = server(repo, create_viewer_user());

        let body: Value = server.get("/api/surveillance/category-order").await.json();
        assert_eq!(body["data"]["categories"][0]["key"], "ELECTRIQUE");
        assert_eq!(body["data"]["dirty"], false);

        let body: Value = server
            .post("/api/surveillance/category-order/edit")
            .json(&json!({
                "operations": [{"op": "move_down", "index": 0}],
                "save": true
            }))
            .await
            .json();
        assert_eq!(body["data"]["saved"], true);
        assert_eq!(body["data"]["categories"][0]["key"], "INCENDIE");
        assert_eq!(body["data"]["categories"][0]["icon"], "🔥");

        server
            .put("/api/surveillance/category-order")
            .json(&json!({"order": ["MMRI", "INCENDIE"]}))
            .await
            .assert_status_bad_request();

        server
            .post("/api/surveillance/category-order/edit")
            .json(&json!({"operations": [{"op": "move_up", "index": 7}]}))
            .await
            .assert_status_bad_request();

        let body: Value = server.get("/api/surveillance/category-order").await.json();
        let keys: Vec<&str> = body["data"]["categories"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["key"].as_str().unwrap())
            .collect();
        assert_eq!(keys, vec!["INCENDIE", "ELECTRIQUE", "MMRI"]);
    }

    #[tokio::test]
    async fn test_update_item() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        let item = repo.seed_item("INCENDIE", "Extincteurs", "Annuel");
        let server = server(repo, create_editor_user());

        let body: Value = server
            .put(&format!("/api/surveillance/items/{}", item.id))
            .json(&json!({
                "status": "PLANIFIER",
                "periodicity": "Trimestriel",
                "category": "SECURITE_ENVIRONNEMENT"
            }))
            .await
            .json();
        assert_eq!(body["data"]["status"], "PLANIFIER");
        assert_eq!(body["data"]["cadence"], "quarterly");
        assert_eq!(body["data"]["label"], "Extincteurs");
        assert_eq!(body["data"]["category_label"], "Sécurité/Env.");

        server
            .put(&format!("/api/surveillance/items/{}", item.id))
            .json(&json!({"periodicity": ""}))
            .await
            .assert_status_bad_request();

        server
            .put(&format!("/api/surveillance/items/{}", item.id))
            .content_type("application/json")
            .bytes("{\"status\":".into())
            .await
            .assert_status_bad_request();

        server
            .put(&format!("/api/surveillance/items/{}", uuid::Uuid::new_v4()))
            .json(&json!({"label": "Autre"}))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_viewer_cannot_edit_or_delete() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        let item = repo.seed_item("GAZ", "Détecteurs", "Mensuel");
        let server = server(repo, create_viewer_user());

        server
            .put(&format!("/api/surveillance/items/{}", item.id))
            .json(&json!({"label": "Détecteurs CO"}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        server
            .delete(&format!("/api/surveillance/items/{}", item.id))
            .await
            .assert_status(StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_deleting_last_item_drops_its_category() {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        repo.seed_item("INCENDIE", "Extincteurs", "Annuel");
        let gaz = repo.seed_item("GAZ", "Détecteurs", "Mensuel");
        let server = server(repo, create_editor_user());

        server
            .put("/api/surveillance/category-order")
            .json(&json!({"order": ["GAZ", "INCENDIE"]}))
            .await
            .assert_status_ok();

        let body: Value = server
            .delete(&format!("/api/surveillance/items/{}", gaz.id))
            .await
            .json();
        assert_eq!(body["data"]["deleted"], true);

        let body: Value = server.get("/api/surveillance/category-order").await.json();
        assert_eq!(body["data"]["categories"], json!([
            {"key": "INCENDIE", "icon": "🔥", "label": "Incendie"}
        ]));

        server
            .delete(&format!("/api/surveillance/items/{}", gaz.id))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_unknown_item_is_not_found() {
        let server = server(
            Arc::new(InMemorySurveillanceRepository::default()),
            create_editor_user(),
        );
        server
            .get(&format!("/api/surveillance-history/{}", uuid::Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}
