// adminx-acl/src/models/role.rs
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Role of the signed-in staff member.
///
/// Only `"admin"` (compared case-insensitively) is special; every other
/// discriminator is treated as a staff member whose access comes from the
/// permission document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Role {
    Admin,
    #[default]
    StaffWithPermissions,
}

impl Role {
    pub fn from_discriminator(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("admin") {
            Role::Admin
        } else {
            Role::StaffWithPermissions
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::StaffWithPermissions => "staff",
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Role::from_discriminator(value)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from_discriminator(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_test::{assert_de_tokens, assert_tokens, Token};

    #[test]
    fn test_admin_discriminator_is_case_insensitive() {
        assert_eq!(Role::from_discriminator("admin"), Role::Admin);
        assert_eq!(Role::from_discriminator("ADMIN"), Role::Admin);
        assert_eq!(Role::from_discriminator(" Admin "), Role::Admin);
    }

    #[test]
    fn test_other_discriminators_are_staff() {
        for raw in ["staff", "cashier", "administrator", "", "superadmin"] {
            assert_eq!(Role::from_discriminator(raw), Role::StaffWithPermissions, "{}", raw);
        }
    }

    #[test]
    fn test_role_tokens() {
        assert_tokens(&Role::Admin, &[Token::Str("admin")]);
        assert_tokens(&Role::StaffWithPermissions, &[Token::Str("staff")]);
        assert_de_tokens(&Role::Admin, &[Token::Str("AdMiN")]);
        assert_de_tokens(&Role::StaffWithPermissions, &[Token::Str("manager")]);
    }
}
