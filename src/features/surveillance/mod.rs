//! Recurring inspections: items, completion history, and the per-user
//! category display order.
//!
//! ## Endpoints
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/surveillance/items` | List items, optionally by category |
//! | POST | `/api/surveillance/items` | Create an item |
//! | GET | `/api/surveillance/items/{id}` | Item detail |
//! | PUT | `/api/surveillance/items/{id}` | Partial update |
//! | DELETE | `/api/surveillance/items/{id}` | Delete with its history |
//! | POST | `/api/surveillance/items/{id}/complete` | Record a control (multipart) |
//! | GET | `/api/surveillance/next-due-date` | Preview the next due date |
//! | GET | `/api/surveillance-history/{item_id}` | 18 latest controls |
//! | GET | `/api/surveillance-history/{item_id}/stats` | Statistics and alerts |
//! | GET | `/api/surveillance-history/files/{file_id}` | Download an attachment |
//! | GET | `/api/surveillance/category-order` | Reconciled category order |
//! | PUT | `/api/surveillance/category-order` | Save an explicit order |
//! | POST | `/api/surveillance/category-order/edit` | Apply moves, optionally save |

pub mod category_order;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod history_stats;
pub mod models;
pub mod periodicity;
pub mod repository;
pub mod routes;
pub mod services;

pub use repository::{PgSurveillanceRepository, SurveillanceRepository};
pub use routes::routes;
pub use services::{CategoryOrderService, SurveillanceService};
