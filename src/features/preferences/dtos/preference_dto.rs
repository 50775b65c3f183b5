use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::preferences::models::UserPreference;
use crate::shared::validation::PREFERENCE_KEY_REGEX;

/// Response DTO for a single preference
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PreferenceResponseDto {
    pub key: String,
    /// Stored JSON value, null when the preference was never set
    pub value: Option<serde_json::Value>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PreferenceResponseDto {
    pub fn unset(key: &str) -> Self {
        Self {
            key: key.to_string(),
            value: None,
            updated_at: None,
        }
    }
}

impl From<UserPreference> for PreferenceResponseDto {
    fn from(p: UserPreference) -> Self {
        Self {
            key: p.key,
            value: Some(p.value),
            updated_at: Some(p.updated_at),
        }
    }
}

/// Request DTO for creating or replacing a preference
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpsertPreferenceDto {
    #[validate(length(min = 1, max = 64, message = "key must be 1-64 characters"))]
    #[validate(regex(
        path = *PREFERENCE_KEY_REGEX,
        message = "key must contain only lowercase letters, digits and underscores"
    ))]
    pub key: String,
    pub value: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_dto_validation() {
        let valid = UpsertPreferenceDto {
            key: "surveillance_category_order".to_string(),
            value: serde_json::json!(["INCENDIE"]),
        };
        assert!(valid.validate().is_ok());

        let invalid = UpsertPreferenceDto {
            key: "Theme-Mode".to_string(),
            value: serde_json::json!("dark"),
        };
        assert!(invalid.validate().is_err());

        let too_long = UpsertPreferenceDto {
            key: "k".repeat(65),
            value: serde_json::Value::Null,
        };
        assert!(too_long.validate().is_err());
    }
}
