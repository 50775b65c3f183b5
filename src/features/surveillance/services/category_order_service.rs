use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::core::error::{AppError, Result};
use crate::features::preferences::store::PreferenceStore;
use crate::features::surveillance::category_order::{CategoryOrder, OrderOperation};
use crate::features::surveillance::dtos::CategoryOrderResponseDto;
use crate::features::surveillance::error::SurveillanceError;
use crate::features::surveillance::repository::SurveillanceRepository;
use crate::shared::constants::CATEGORY_ORDER_PREFERENCE_KEY;

/// Per-user category display order.
///
/// Commits are serialised per user: while one is in flight, another commit for
/// the same user fails with [`SurveillanceError::CommitInProgress`].
pub struct CategoryOrderService {
    repo: Arc<dyn SurveillanceRepository>,
    store: Arc<dyn PreferenceStore>,
    in_flight: Mutex<HashSet<String>>,
}

/// Releases the user's commit slot on drop
struct CommitSlot<'a> {
    in_flight: &'a Mutex<HashSet<String>>,
    user_id: String,
}

impl Drop for CommitSlot<'_> {
    fn drop(&mut self) {
        if let Ok(mut users) = self.in_flight.lock() {
            users.remove(&self.user_id);
        }
    }
}

impl CategoryOrderService {
    pub fn new(repo: Arc<dyn SurveillanceRepository>, store: Arc<dyn PreferenceStore>) -> Self {
        Self {
            repo,
            store,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// Saved order reconciled with the current categories
    pub async fn get(&self, user_id: &str) -> Result<CategoryOrderResponseDto> {
        let order = self.load(user_id).await?;
        Ok(CategoryOrderResponseDto::new(
            order.categories(),
            order.is_dirty(),
            false,
        ))
    }

    /// Apply `operations` in sequence to the saved order, then commit if asked
    pub async fn edit(
        &self,
        user_id: &str,
        operations: &[OrderOperation],
        save: bool,
    ) -> Result<CategoryOrderResponseDto> {
        let mut order = self.load(user_id).await?;
        for operation in operations {
            order.apply(*operation)?;
        }

        if save {
            self.commit(&mut order, user_id).await?;
        }

        Ok(CategoryOrderResponseDto::new(
            order.categories(),
            order.is_dirty(),
            save,
        ))
    }

    /// Replace the saved order; `order` must list every current category once
    pub async fn save(&self, user_id: &str, order: Vec<String>) -> Result<CategoryOrderResponseDto> {
        let live = self.repo.list_categories().await?;
        let mut order = CategoryOrder::from_order(order, live)?;

        self.commit(&mut order, user_id).await?;

        Ok(CategoryOrderResponseDto::new(
            order.categories(),
            order.is_dirty(),
            true,
        ))
    }

    async fn load(&self, user_id: &str) -> Result<CategoryOrder> {
        let live = self.repo.list_categories().await?;
        let saved = self
            .store
            .get(user_id, CATEGORY_ORDER_PREFERENCE_KEY)
            .await?;

        Ok(CategoryOrder::load(saved.as_ref().map(|p| &p.value), live))
    }

    async fn commit(&self, order: &mut CategoryOrder, user_id: &str) -> Result<Vec<String>> {
        let _slot = self.acquire(user_id)?;

        let committed = order.commit(self.store.as_ref(), user_id).await?;
        tracing::info!(
            "Category order saved for user {} ({} categories)",
            user_id,
            committed.len()
        );
        Ok(committed)
    }

    fn acquire(&self, user_id: &str) -> Result<CommitSlot<'_>> {
        let mut users = self
            .in_flight
            .lock()
            .map_err(|_| AppError::Internal("Commit registry poisoned".to_string()))?;

        if !users.insert(user_id.to_string()) {
            tracing::warn!("Rejected concurrent category order commit for {}", user_id);
            return Err(SurveillanceError::CommitInProgress.into());
        }

        Ok(CommitSlot {
            in_flight: &self.in_flight,
            user_id: user_id.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::{
        GatedPreferenceStore, InMemoryPreferenceStore, InMemorySurveillanceRepository,
    };
    use serde_json::json;

    fn keys(dto: &CategoryOrderResponseDto) -> Vec<String> {
        dto.categories.iter().map(|c| c.key.clone()).collect()
    }

    fn repo_with(categories: &[&str]) -> Arc<InMemorySurveillanceRepository> {
        let repo = Arc::new(InMemorySurveillanceRepository::default());
        for category in categories {
            repo.seed_item(category, "Contrôle", "Annuel");
        }
        repo
    }

    #[tokio::test]
    async fn test_get_reconciles_saved_order() {
        let store = Arc::new(InMemoryPreferenceStore::default());
        store
            .put("u1", CATEGORY_ORDER_PREFERENCE_KEY, json!(["MMRI", "OLD", "INCENDIE"]))
            .await
            .unwrap();
        let service = CategoryOrderService::new(repo_with(&["INCENDIE", "MMRI", "ELECTRIQUE"]), store);

        let dto = service.get("u1").await.unwrap();
        assert_eq!(keys(&dto), vec!["MMRI", "INCENDIE", "ELECTRIQUE"]);
        assert_eq!(dto.categories[1].icon, "🔥");
        assert!(!dto.dirty);
    }

    #[tokio::test]
    async fn test_edit_and_save() {
        let store = Arc::new(InMemoryPreferenceStore::default());
        let service = CategoryOrderService::new(repo_with(&["A", "B", "C"]), store.clone());

        let preview = service
            .edit("u1", &[OrderOperation::MoveUp { index: 2 }], false)
            .await
            .unwrap();
        assert_eq!(keys(&preview), vec!["A", "C", "B"]);
        assert!(preview.dirty);
        assert!(!preview.saved);
        assert!(store.get("u1", CATEGORY_ORDER_PREFERENCE_KEY).await.unwrap().is_none());

        let saved = service
            .edit("u1", &[OrderOperation::MoveUp { index: 2 }], true)
            .await
            .unwrap();
        assert!(saved.saved);
        assert!(!saved.dirty);
        assert_eq!(keys(&service.get("u1").await.unwrap()), vec!["A", "C", "B"]);
    }

    #[tokio::test]
    async fn test_edit_with_bad_index_is_rejected() {
        let service = CategoryOrderService::new(
            repo_with(&["A", "B"]),
            Arc::new(InMemoryPreferenceStore::default()),
        );
        let result = service
            .edit("u1", &[OrderOperation::MoveDown { index: 9 }], true)
            .await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_save_requires_permutation() {
        let service = CategoryOrderService::new(
            repo_with(&["A", "B"]),
            Arc::new(InMemoryPreferenceStore::default()),
        );

        let result = service.save("u1", vec!["A".to_string()]).await;
        assert!(matches!(result, Err(AppError::Validation(_))));

        let dto = service
            .save("u1", vec!["B".to_string(), "A".to_string()])
            .await
            .unwrap();
        assert_eq!(keys(&dto), vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_store_failure_is_internal_error() {
        let service = CategoryOrderService::new(
            repo_with(&["A", "B"]),
            Arc::new(InMemoryPreferenceStore::failing()),
        );
        let result = service.save("u1", vec!["B".to_string(), "A".to_string()]).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_concurrent_commit_is_rejected() {
        let store = Arc::new(GatedPreferenceStore::default());
        let service = Arc::new(CategoryOrderService::new(repo_with(&["A", "B"]), store.clone()));

        let first = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .save("u1", vec!["B".to_string(), "A".to_string()])
                    .await
            })
        };
        store.wait_until_entered().await;

        let second = service.save("u1", vec!["A".to_string(), "B".to_string()]).await;
        assert!(matches!(second, Err(AppError::Conflict(_))));

        // other users are not blocked by u1's commit
        let other = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .save("u2", vec!["A".to_string(), "B".to_string()])
                    .await
            })
        };
        store.wait_until_entered().await;

        store.release();
        store.release();
        assert!(first.await.unwrap().is_ok());
        assert!(other.await.unwrap().is_ok());

        // the slot is free again once the first commit finished
        store.release();
        assert!(service
            .save("u1", vec!["A".to_string(), "B".to_string()])
            .await
            .is_ok());
    }
}
