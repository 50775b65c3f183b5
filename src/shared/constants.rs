/// Maximum number of history entries returned for one surveillance item
pub const HISTORY_PAGE_SIZE: i64 = 18;

/// Number of most recent controls shown in the conformity trend
pub const TREND_LENGTH: usize = 6;

/// Preference key holding the user's surveillance category display order
pub const CATEGORY_ORDER_PREFERENCE_KEY: &str = "surveillance_category_order";

// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Administrator role - full access
pub const ROLE_ADMIN: &str = "ADMIN";

/// Viewer role - read-only access to surveillance data
pub const ROLE_VIEWER: &str = "VISUALISEUR";
