//! Per-user key/value preferences.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/user-preferences` | All preferences of the caller |
//! | GET | `/api/user-preferences/{key}` | One preference (`value` is null when unset) |
//! | POST | `/api/user-preferences` | Create or replace a preference |

pub mod dtos;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

pub use routes::routes;
pub use services::PreferenceService;
pub use store::{PgPreferenceStore, PreferenceStore};
