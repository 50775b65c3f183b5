pub mod preference_handler;

pub use preference_handler::{
    __path_get_preference, __path_list_preferences, __path_upsert_preference, get_preference,
    list_preferences, upsert_preference,
};
