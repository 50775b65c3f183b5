use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::shared::constants::{ROLE_ADMIN, ROLE_VIEWER};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject of the access token, used as owner of preferences and history entries
    pub user_id: String,
    pub roles: Vec<String>,
}

impl AuthenticatedUser {
    /// Check if user has a specific role
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ROLE_ADMIN)
    }

    /// Viewers may read surveillance data but not record controls.
    /// A user without any role is treated as a viewer.
    pub fn can_edit_surveillance(&self) -> bool {
        self.is_admin() || self.roles.iter().any(|r| !r.eq_ignore_ascii_case(ROLE_VIEWER))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: "u1".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_roles_are_case_insensitive() {
        assert!(user(&["admin"]).is_admin());
        assert!(user(&["ADMIN"]).has_role("Admin"));
    }

    #[test]
    fn test_viewer_cannot_edit() {
        assert!(!user(&["VISUALISEUR"]).can_edit_surveillance());
        assert!(!user(&[]).can_edit_surveillance());
        assert!(user(&["TECHNICIEN"]).can_edit_surveillance());
        assert!(user(&["VISUALISEUR", "ADMIN"]).can_edit_surveillance());
    }
}
