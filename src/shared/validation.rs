use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Regex for validating preference keys
    /// Must be lowercase alphanumeric with underscores
    /// - Valid: "surveillance_category_order", "theme_mode", "page2_columns"
    /// - Invalid: "Theme", "theme-mode", "theme mode", ""
    pub static ref PREFERENCE_KEY_REGEX: Regex = Regex::new(r"^[a-z0-9_]+$").unwrap();

    /// Regex for validating surveillance category keys
    /// Uppercase letters, digits and underscores, starting with a letter
    /// - Valid: "INCENDIE", "MMRI", "ELECTRIQUE_HT"
    /// - Invalid: "incendie", "_GAZ", "EAU FROIDE"
    pub static ref CATEGORY_KEY_REGEX: Regex = Regex::new(r"^[A-Z][A-Z0-9_]*$").unwrap();
}
