#![cfg(test)]

use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use axum::{extract::Request, middleware::Next, Router};
use chrono::{NaiveDate, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::AuthenticatedUser;
use crate::features::preferences::models::UserPreference;
use crate::features::preferences::store::PreferenceStore;
use crate::features::surveillance::models::{
    Attachment, AttachmentMeta, HistoryEntry, ItemStatus, ItemUpdate, NewAttachment,
    NewHistoryEntry, NewSurveillanceItem, RecordedCompletion, SurveillanceItem,
};
use crate::features::surveillance::repository::SurveillanceRepository;
use crate::shared::constants::ROLE_VIEWER;

pub fn create_editor_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "test-editor".to_string(),
        roles: vec!["TECHNICIEN".to_string()],
    }
}

pub fn create_viewer_user() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: "test-viewer".to_string(),
        roles: vec![ROLE_VIEWER.to_string()],
    }
}

/// Wrap `router` so every request carries `user`, bypassing JWT validation
pub fn with_user_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}

// =============================================================================
// PREFERENCE STORES
// =============================================================================

#[derive(Default)]
pub struct InMemoryPreferenceStore {
    values: Mutex<HashMap<(String, String), UserPreference>>,
    fail: bool,
}

impl InMemoryPreferenceStore {
    /// A store whose writes always fail
    pub fn failing() -> Self {
        Self {
            values: Mutex::default(),
            fail: true,
        }
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<UserPreference>> {
        let values = self.values.lock().unwrap();
        Ok(values
            .get(&(user_id.to_string(), key.to_string()))
            .cloned())
    }

    async fn put(
        &self,
        user_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<UserPreference> {
        if self.fail {
            return Err(AppError::Internal("preference store unavailable".to_string()));
        }

        let preference = UserPreference {
            key: key.to_string(),
            value,
            updated_at: Utc::now(),
        };
        self.values
            .lock()
            .unwrap()
            .insert((user_id.to_string(), key.to_string()), preference.clone());
        Ok(preference)
    }

    async fn list(&self, user_id: &str) -> Result<Vec<UserPreference>> {
        let values = self.values.lock().unwrap();
        let mut preferences: Vec<UserPreference> = values
            .iter()
            .filter(|((owner, _), _)| owner == user_id)
            .map(|(_, p)| p.clone())
            .collect();
        preferences.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(preferences)
    }
}

/// Store whose writes block until [`GatedPreferenceStore::release`] is called
pub struct GatedPreferenceStore {
    inner: InMemoryPreferenceStore,
    entered: Semaphore,
    gate: Semaphore,
}

impl Default for GatedPreferenceStore {
    fn default() -> Self {
        Self {
            inner: InMemoryPreferenceStore::default(),
            entered: Semaphore::new(0),
            gate: Semaphore::new(0),
        }
    }
}

impl GatedPreferenceStore {
    /// Wait until one write has started
    pub async fn wait_until_entered(&self) {
        self.entered.acquire().await.unwrap().forget();
    }

    /// Let one write complete
    pub fn release(&self) {
        self.gate.add_permits(1);
    }
}

#[async_trait]
impl PreferenceStore for GatedPreferenceStore {
    async fn get(&self, user_id: &str, key: &str) -> Result<Option<UserPreference>> {
        self.inner.get(user_id, key).await
    }

    async fn put(
        &self,
        user_id: &str,
        key: &str,
        value: serde_json::Value,
    ) -> Result<UserPreference> {
        self.entered.add_permits(1);
        self.gate.acquire().await.unwrap().forget();
        self.inner.put(user_id, key, value).await
    }

    async fn list(&self, user_id: &str) -> Result<Vec<UserPreference>> {
        self.inner.list(user_id).await
    }
}

// =============================================================================
// SURVEILLANCE REPOSITORY
// =============================================================================

#[derive(Default)]
struct SurveillanceState {
    items: Vec<SurveillanceItem>,
    history: Vec<HistoryEntry>,
    attachments: Vec<Attachment>,
}

#[derive(Default)]
pub struct InMemorySurveillanceRepository {
    state: Mutex<SurveillanceState>,
}

impl InMemorySurveillanceRepository {
    /// Insert an item directly, skipping validation
    pub fn seed_item(&self, category: &str, label: &str, periodicity: &str) -> SurveillanceItem {
        let now = Utc::now();
        let item = SurveillanceItem {
            id: Uuid::new_v4(),
            category: category.to_string(),
            label: label.to_string(),
            building: None,
            periodicity: periodicity.to_string(),
            status: ItemStatus::Planifie,
            last_completion_date: None,
            next_due_date: None,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().items.push(item.clone());
        item
    }

    /// Stored attachments across all items
    pub fn attachment_count(&self) -> usize {
        self.state.lock().unwrap().attachments.len()
    }
}

#[async_trait]
impl SurveillanceRepository for InMemorySurveillanceRepository {
    async fn list_items(&self, category: Option<&str>) -> Result<Vec<SurveillanceItem>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .items
            .iter()
            .filter(|i| category.map_or(true, |c| i.category == c))
            .cloned()
            .collect())
    }

    async fn get_item(&self, id: Uuid) -> Result<Option<SurveillanceItem>> {
        let state = self.state.lock().unwrap();
        Ok(state.items.iter().find(|i| i.id == id).cloned())
    }

    async fn create_item(&self, item: NewSurveillanceItem) -> Result<SurveillanceItem> {
        let now = Utc::now();
        let item = SurveillanceItem {
            id: Uuid::new_v4(),
            category: item.category,
            label: item.label,
            building: item.building,
            periodicity: item.periodicity,
            status: ItemStatus::Planifie,
            last_completion_date: None,
            next_due_date: item.next_due_date,
            created_at: now,
            updated_at: now,
        };
        self.state.lock().unwrap().items.push(item.clone());
        Ok(item)
    }

    async fn update_item(&self, id: Uuid, update: ItemUpdate) -> Result<Option<SurveillanceItem>> {
        let mut state = self.state.lock().unwrap();
        let Some(item) = state.items.iter_mut().find(|i| i.id == id) else {
            return Ok(None);
        };

        item.category = update.category;
        item.label = update.label;
        item.building = update.building;
        item.periodicity = update.periodicity;
        item.status = update.status;
        item.next_due_date = update.next_due_date;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }

    async fn delete_item(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        let before = state.items.len();
        state.items.retain(|i| i.id != id);
        if state.items.len() == before {
            return Ok(false);
        }

        let removed: Vec<Uuid> = state
            .history
            .iter()
            .filter(|h| h.item_id == id)
            .map(|h| h.id)
            .collect();
        state.history.retain(|h| h.item_id != id);
        state.attachments.retain(|a| !removed.contains(&a.history_id));
        Ok(true)
    }

    async fn record_completion(
        &self,
        entry: NewHistoryEntry,
        attachments: Vec<NewAttachment>,
        next_due_date: NaiveDate,
    ) -> Result<RecordedCompletion> {
        let mut state = self.state.lock().unwrap();
        let index = state
            .items
            .iter()
            .position(|i| i.id == entry.item_id)
            .ok_or_else(|| {
                AppError::NotFound(format!("Surveillance item {} not found", entry.item_id))
            })?;

        let now = Utc::now();
        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            item_id: entry.item_id,
            completion_date: entry.completion_date,
            comments: entry.comments,
            result: entry.result,
            duration_label: entry.duration_label,
            validated_by: entry.validated_by,
            created_at: now,
        };

        let stored: Vec<Attachment> = attachments
            .into_iter()
            .enumerate()
            .map(|(position, file)| Attachment {
                id: Uuid::new_v4(),
                history_id: entry.id,
                position: position as i32,
                file_size: file.data.len() as i64,
                file_name: file.file_name,
                content_type: file.content_type,
                data: file.data,
            })
            .collect();
        let metas = stored.iter().map(AttachmentMeta::from).collect();

        let item = &mut state.items[index];
        item.status = ItemStatus::Realise;
        item.last_completion_date = Some(entry.completion_date);
        item.next_due_date = Some(next_due_date);
        item.updated_at = now;
        let item = item.clone();

        state.history.push(entry.clone());
        state.attachments.extend(stored);
        Ok(RecordedCompletion {
            item,
            entry,
            attachments: metas,
        })
    }

    async fn list_history(&self, item_id: Uuid, limit: Option<i64>) -> Result<Vec<HistoryEntry>> {
        let state = self.state.lock().unwrap();
        let mut history: Vec<HistoryEntry> = state
            .history
            .iter()
            .filter(|h| h.item_id == item_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| {
            b.completion_date
                .cmp(&a.completion_date)
                .then(b.created_at.cmp(&a.created_at))
        });
        if let Some(limit) = limit {
            history.truncate(limit as usize);
        }
        Ok(history)
    }

    async fn list_attachments(&self, history_ids: &[Uuid]) -> Result<Vec<AttachmentMeta>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .attachments
            .iter()
            .filter(|a| history_ids.contains(&a.history_id))
            .map(AttachmentMeta::from)
            .collect())
    }

    async fn get_attachment(&self, id: Uuid) -> Result<Option<Attachment>> {
        let state = self.state.lock().unwrap();
        Ok(state.attachments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<BTreeSet<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.items.iter().map(|i| i.category.clone()).collect())
    }
}
