use std::sync::Arc;

use crate::core::error::Result;
use crate::features::preferences::dtos::{PreferenceResponseDto, UpsertPreferenceDto};
use crate::features::preferences::store::PreferenceStore;

/// Service for reading and writing user preferences
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    /// List every preference of a user, ordered by key
    pub async fn list(&self, user_id: &str) -> Result<Vec<PreferenceResponseDto>> {
        let preferences = self.store.list(user_id).await?;
        Ok(preferences.into_iter().map(|p| p.into()).collect())
    }

    /// Get one preference; an unset key is not an error
    pub async fn get(&self, user_id: &str, key: &str) -> Result<PreferenceResponseDto> {
        let preference = self.store.get(user_id, key).await?;
        Ok(preference
            .map(PreferenceResponseDto::from)
            .unwrap_or_else(|| PreferenceResponseDto::unset(key)))
    }

    /// Create or replace a preference
    pub async fn upsert(
        &self,
        user_id: &str,
        dto: UpsertPreferenceDto,
    ) -> Result<PreferenceResponseDto> {
        let saved = self.store.put(user_id, &dto.key, dto.value).await?;
        tracing::info!("Preference '{}' saved for user {}", saved.key, user_id);
        Ok(saved.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::InMemoryPreferenceStore;
    use serde_json::json;

    fn service() -> PreferenceService {
        PreferenceService::new(Arc::new(InMemoryPreferenceStore::default()))
    }

    #[tokio::test]
    async fn test_get_unset_preference_returns_null_value() {
        let dto = service().get("u1", "theme_mode").await.unwrap();
        assert_eq!(dto.key, "theme_mode");
        assert!(dto.value.is_none());
        assert!(dto.updated_at.is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_value() {
        let service = service();
        service
            .upsert(
                "u1",
                UpsertPreferenceDto {
                    key: "theme_mode".to_string(),
                    value: json!("light"),
                },
            )
            .await
            .unwrap();
        service
            .upsert(
                "u1",
                UpsertPreferenceDto {
                    key: "theme_mode".to_string(),
                    value: json!("dark"),
                },
            )
            .await
            .unwrap();

        let dto = service.get("u1", "theme_mode").await.unwrap();
        assert_eq!(dto.value, Some(json!("dark")));
        assert_eq!(service.list("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_preferences_are_scoped_per_user() {
        let service = service();
        service
            .upsert(
                "u1",
                UpsertPreferenceDto {
                    key: "font_size".to_string(),
                    value: json!("large"),
                },
            )
            .await
            .unwrap();

        assert!(service.get("u2", "font_size").await.unwrap().value.is_none());
        assert!(service.list("u2").await.unwrap().is_empty());
    }
}
