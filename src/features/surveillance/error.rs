use thiserror::Error;

use crate::core::error::AppError;

/// Errors raised by the scheduling and category-order logic.
///
/// The logic never logs or retries; callers decide how to surface these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurveillanceError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("A category order commit is already in progress")]
    CommitInProgress,
}

impl From<SurveillanceError> for AppError {
    fn from(err: SurveillanceError) -> Self {
        match err {
            SurveillanceError::InvalidArgument(msg) => AppError::Validation(msg),
            SurveillanceError::Persistence(msg) => AppError::Internal(msg),
            SurveillanceError::CommitInProgress => AppError::Conflict(
                "A category order commit is already in progress".to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_maps_to_http_errors() {
        let invalid: AppError = SurveillanceError::InvalidArgument("empty".into()).into();
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);

        let persistence: AppError = SurveillanceError::Persistence("down".into()).into();
        assert_eq!(persistence.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

        let busy: AppError = SurveillanceError::CommitInProgress.into();
        assert_eq!(busy.status_code(), StatusCode::CONFLICT);
    }
}
