//! Well-known role names embedded in access tokens.
//!
//! Users carry an `is_admin` flag in the database; the role name is derived
//! from it when a token is issued.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Role name for a user row.
pub fn role_name(is_admin: bool) -> &'static str {
    if is_admin {
        ROLE_ADMIN
    } else {
        ROLE_USER
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_flag_maps_to_role() {
        assert_eq!(role_name(true), "admin");
        assert_eq!(role_name(false), "user");
    }
}
