//! Role-based authorization guards.
//!
//! The authenticated user is placed in the request extensions by the auth
//! middleware; guards read it back and check the role required by the handler.

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for handlers that record or create surveillance controls.
///
/// Rejects read-only viewers.
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireEditor(user): RequireEditor) { ... }
/// ```
pub struct RequireEditor(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireEditor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.can_edit_surveillance() {
            return Err(AppError::Forbidden(
                "Surveillance edit permission required".to_string(),
            ));
        }

        Ok(RequireEditor(user.clone()))
    }
}
