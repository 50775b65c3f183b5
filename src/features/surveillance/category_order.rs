//! User-chosen display order of surveillance categories.
//!
//! The saved order is a JSON array stored as a user preference. Categories come
//! and go as items are created, so the saved order is reconciled against the
//! live category set every time it is loaded: stale keys are dropped and new
//! keys are appended in code point order.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::SurveillanceError;
use crate::features::preferences::store::PreferenceStore;
use crate::shared::constants::CATEGORY_ORDER_PREFERENCE_KEY;

/// Merge a saved order with the live category set.
///
/// `saved` is whatever was persisted. Anything other than a JSON array yields
/// the live set in code point order. Non-string elements, stale keys and repeated
/// keys of an array are skipped.
pub fn reconcile(saved: Option<&serde_json::Value>, live: &BTreeSet<String>) -> Vec<String> {
    let Some(saved) = saved.and_then(|v| v.as_array()) else {
        return live.iter().cloned().collect();
    };

    let mut seen: HashSet<&str> = HashSet::with_capacity(live.len());
    let mut ordered: Vec<String> = Vec::with_capacity(live.len());

    for key in saved.iter().filter_map(|v| v.as_str()) {
        if live.contains(key) && seen.insert(key) {
            ordered.push(key.to_string());
        }
    }

    // BTreeSet iterates in code point order
    ordered.extend(live.iter().filter(|c| !seen.contains(c.as_str())).cloned());
    ordered
}

/// One reorder step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum OrderOperation {
    MoveUp { index: usize },
    MoveDown { index: usize },
    Reset,
}

/// Editable category order with dirty tracking
#[derive(Debug, Clone)]
pub struct CategoryOrder {
    ordered: Vec<String>,
    live: BTreeSet<String>,
    dirty: bool,
}

impl CategoryOrder {
    /// Start editing from a saved preference value
    pub fn load(saved: Option<&serde_json::Value>, live: BTreeSet<String>) -> Self {
        Self {
            ordered: reconcile(saved, &live),
            live,
            dirty: false,
        }
    }

    /// Start from an explicit order, which must be a permutation of `live`.
    ///
    /// The result is dirty: it differs from what is stored until committed.
    pub fn from_order(order: Vec<String>, live: BTreeSet<String>) -> Result<Self, SurveillanceError> {
        let mut seen = HashSet::with_capacity(order.len());
        for key in &order {
            if !live.contains(key) {
                return Err(SurveillanceError::InvalidArgument(format!(
                    "unknown category '{}'",
                    key
                )));
            }
            if !seen.insert(key.as_str()) {
                return Err(SurveillanceError::InvalidArgument(format!(
                    "category '{}' appears more than once",
                    key
                )));
            }
        }
        if order.len() != live.len() {
            let missing: Vec<&str> = live
                .iter()
                .filter(|c| !seen.contains(c.as_str()))
                .map(String::as_str)
                .collect();
            return Err(SurveillanceError::InvalidArgument(format!(
                "missing categories: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            ordered: order,
            live,
            dirty: true,
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.ordered
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Swap the category at `index` with the one above it
    pub fn move_up(&mut self, index: usize) -> Result<&[String], SurveillanceError> {
        if index == 0 {
            return Ok(&self.ordered);
        }
        self.check_index(index)?;

        self.ordered.swap(index, index - 1);
        self.dirty = true;
        Ok(&self.ordered)
    }

    /// Swap the category at `index` with the one below it
    pub fn move_down(&mut self, index: usize) -> Result<&[String], SurveillanceError> {
        self.check_index(index)?;
        if index == self.ordered.len() - 1 {
            return Ok(&self.ordered);
        }

        self.ordered.swap(index, index + 1);
        self.dirty = true;
        Ok(&self.ordered)
    }

    /// Back to code point order of the live categories
    pub fn reset_to_default(&mut self) -> &[String] {
        self.ordered = self.live.iter().cloned().collect();
        self.dirty = true;
        &self.ordered
    }

    pub fn apply(&mut self, operation: OrderOperation) -> Result<&[String], SurveillanceError> {
        match operation {
            OrderOperation::MoveUp { index } => self.move_up(index),
            OrderOperation::MoveDown { index } => self.move_down(index),
            OrderOperation::Reset => Ok(self.reset_to_default()),
        }
    }

    /// Persist the current order for `user_id`.
    ///
    /// On failure neither the order nor the dirty flag changes, so the call can
    /// be retried.
    pub async fn commit(
        &mut self,
        store: &dyn PreferenceStore,
        user_id: &str,
    ) -> Result<Vec<String>, SurveillanceError> {
        let value = serde_json::Value::from(self.ordered.clone());

        store
            .put(user_id, CATEGORY_ORDER_PREFERENCE_KEY, value)
            .await
            .map_err(|e| SurveillanceError::Persistence(e.to_string()))?;

        self.dirty = false;
        Ok(self.ordered.clone())
    }

    fn check_index(&self, index: usize) -> Result<(), SurveillanceError> {
        if index >= self.ordered.len() {
            return Err(SurveillanceError::InvalidArgument(format!(
                "index {} out of range for {} categories",
                index,
                self.ordered.len()
            )));
        }
        Ok(())
    }
}

/// Display icon of a category
pub fn category_icon(category: &str) -> &'static str {
    match category {
        "INCENDIE" => "🔥",
        "ELECTRIQUE" => "⚡",
        "MMRI" => "⚙️",
        "HVAC" => "🌡️",
        "SECURITE" => "🛡️",
        "ASCENSEUR" => "🛗",
        "PLOMBERIE" => "🚰",
        "STRUCTURE" => "🏗️",
        "GAZ" => "💨",
        "EAU" => "💧",
        _ => "📋",
    }
}

/// Display name of a category, falling back to the key itself
pub fn category_label(category: &str) -> &str {
    match category {
        "MMRI" => "MMRI",
        "INCENDIE" => "Incendie",
        "SECURITE_ENVIRONNEMENT" => "Sécurité/Env.",
        "ELECTRIQUE" => "Électrique",
        "MANUTENTION" => "Manutention",
        "EXTRACTION" => "Extraction",
        "AUTRE" => "Autre",
        other => other,
    }
}
