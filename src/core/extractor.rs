use axum::{
    body::Body,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;

/// JSON body extractor that also enforces the DTO's `validator` rules.
///
/// Unreadable bodies are rejected as `BadRequest`, rule violations as
/// `Validation`; both answer 400 with the usual error envelope.
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection_message(rejection)))?;

        value
            .validate()
            .map_err(|e| AppError::Validation(format!("Invalid request: {}", e)))?;

        Ok(Self(value))
    }
}

fn rejection_message(rejection: JsonRejection) -> String {
    match rejection {
        JsonRejection::JsonDataError(err) => format!("Invalid JSON data: {}", err),
        JsonRejection::JsonSyntaxError(err) => format!("Invalid JSON syntax: {}", err),
        JsonRejection::MissingJsonContentType(err) => {
            format!("Missing JSON content type: {}", err)
        }
        _ => "Failed to parse JSON body".to_string(),
    }
}

/// The user is put in the request extensions by the auth middleware
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{routing::post, Router};
    use axum_test::TestServer;
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Deserialize, Validate)]
    struct RenameDto {
        #[validate(length(min = 1, max = 8))]
        name: String,
    }

    async fn rename(AppJson(dto): AppJson<RenameDto>) -> String {
        dto.name
    }

    fn server() -> TestServer {
        TestServer::new(Router::new().route("/rename", post(rename))).unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_reaches_handler() {
        let response = server().post("/rename").json(&json!({"name": "GAZ"})).await;
        response.assert_status_ok();
        response.assert_text("GAZ");
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = server()
            .post("/rename")
            .content_type("application/json")
            .bytes("{\"name\":".into())
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid JSON syntax"));
        assert!(body["errors"].is_null());
    }

    #[tokio::test]
    async fn test_rule_violation_is_validation_error() {
        let response = server()
            .post("/rename")
            .json(&json!({"name": "much too long"}))
            .await;
        response.assert_status_bad_request();

        let body: Value = response.json();
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request"));
        assert_eq!(body["errors"].as_array().map(|e| e.len()), Some(1));
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthorized() {
        async fn whoami(user: AuthenticatedUser) -> String {
            user.user_id
        }

        let server =
            TestServer::new(Router::new().route("/whoami", axum::routing::get(whoami))).unwrap();
        server.get("/whoami").await.assert_status_unauthorized();
    }
}
