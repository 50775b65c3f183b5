pub mod auth;
pub mod preferences;
pub mod surveillance;
