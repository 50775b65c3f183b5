mod user_preference;

pub use user_preference::UserPreference;
