use async_trait::async_trait;
use sqlx::PgPool;

use crate::core::error::{AppError, Result};
use crate::features::preferences::models::UserPreference;

/// Key/value storage for per-user preferences.
///
/// Values are opaque JSON; callers own their shape.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<UserPreference>>;

    async fn put(
        &self,
        user_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<UserPreference>;

    async fn list(&self, user_id: &str) -> Result<Vec<UserPreference>>;
}

/// Postgres-backed preference store
pub struct PgPreferenceStore {
    pool: PgPool,
}

impl PgPreferenceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<UserPreference>> {
        sqlx::query_as::<_, UserPreference>(
            r#"
            SELECT key, value, updated_at
            FROM user_preferences
            WHERE user_id = $1 AND key = $2
            "#,
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get preference '{}': {:?}", key, e);
            AppError::Database(e)
        })
    }

    async fn put(
        &self,
        user_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<UserPreference> {
        sqlx::query_as::<_, UserPreference>(
            r#"
            INSERT INTO user_preferences (user_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, key)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING key, value, updated_at
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save preference '{}': {:?}", key, e);
            AppError::Database(e)
        })
    }

    async fn list(&self, user_id: &str) -> Result<Vec<UserPreference>> {
        sqlx::query_as::<_, UserPreference>(
            r#"
            SELECT key, value, updated_at
            FROM user_preferences
            WHERE user_id = $1
            ORDER BY key
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list preferences: {:?}", e);
            AppError::Database(e)
        })
    }
}
