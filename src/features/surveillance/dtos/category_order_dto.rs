use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::surveillance::category_order::{category_icon, category_label, OrderOperation};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CategoryEntryDto {
    pub key: String,
    pub icon: String,
    /// Display name, the key itself when none is known
    pub label: String,
}

impl CategoryEntryDto {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            icon: category_icon(key).to_string(),
            label: category_label(key).to_string(),
        }
    }
}

/// Category display order of the current user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategoryOrderResponseDto {
    pub categories: Vec<CategoryEntryDto>,
    /// The order differs from the saved one
    pub dirty: bool,
    /// The order was saved by this request
    pub saved: bool,
}

impl CategoryOrderResponseDto {
    pub fn new(categories: &[String], dirty: bool, saved: bool) -> Self {
        Self {
            categories: categories.iter().map(|c| CategoryEntryDto::new(c)).collect(),
            dirty,
            saved,
        }
    }
}

/// Save an explicit order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SaveCategoryOrderDto {
    #[validate(length(max = 500))]
    pub order: Vec<String>,
}

/// Apply reorder operations to the saved order
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EditCategoryOrderDto {
    #[validate(length(max = 500, message = "too many operations"))]
    pub operations: Vec<OrderOperation>,
    /// Persist the result
    #[serde(default)]
    pub save: bool,
}
