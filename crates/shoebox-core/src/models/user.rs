use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// Privilege bitset stored in the `users.priv` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Privileges(i32);

impl Privileges {
    /// Unbanned; may use the service at all.
    pub const ACTIVE: Privileges = Privileges(1 << 0);
    /// Moderation / administrative access.
    pub const MANAGEMENT: Privileges = Privileges(1 << 1);
    /// Full access to all features, including trust-elevated uploads.
    pub const DEVELOPMENT: Privileges = Privileges(1 << 2);

    pub const fn empty() -> Self {
        Privileges(0)
    }

    /// Build from the raw column value. Unknown bits are kept so that a
    /// round trip through the database never loses information.
    pub const fn from_bits(bits: i32) -> Self {
        Privileges(bits)
    }

    pub const fn bits(self) -> i32 {
        self.0
    }

    pub const fn contains(self, other: Privileges) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_active(self) -> bool {
        self.contains(Privileges::ACTIVE)
    }
}

impl BitOr for Privileges {
    type Output = Privileges;

    fn bitor(self, rhs: Self) -> Self::Output {
        Privileges(self.0 | rhs.0)
    }
}

impl BitAnd for Privileges {
    type Output = Privileges;

    fn bitand(self, rhs: Self) -> Self::Output {
        Privileges(self.0 & rhs.0)
    }
}

impl fmt::Display for Privileges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::new();
        if self.contains(Privileges::ACTIVE) {
            names.push("ACTIVE");
        }
        if self.contains(Privileges::MANAGEMENT) {
            names.push("MANAGEMENT");
        }
        if self.contains(Privileges::DEVELOPMENT) {
            names.push("DEVELOPMENT");
        }
        if names.is_empty() {
            write!(f, "NONE")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// Uploader account, owned by the auth store and read-only here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub display_name: String,
    pub privileges: Privileges,
}

impl User {
    pub fn can_upload(&self) -> bool {
        self.privileges.is_active()
    }
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} ({})>", self.display_name, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_requires_all_bits() {
        let privs = Privileges::ACTIVE | Privileges::DEVELOPMENT;
        assert!(privs.contains(Privileges::ACTIVE));
        assert!(privs.contains(Privileges::DEVELOPMENT));
        assert!(!privs.contains(Privileges::MANAGEMENT));
        assert!(!privs.contains(Privileges::ACTIVE | Privileges::MANAGEMENT));
    }

    #[test]
    fn test_bits_round_trip_keeps_unknown_bits() {
        let privs = Privileges::from_bits(0b1000_0101);
        assert_eq!(privs.bits(), 0b1000_0101);
        assert!(privs.is_active());
    }

    #[test]
    fn test_only_active_users_can_upload() {
        let banned = User {
            id: 3,
            display_name: "mallory".to_string(),
            privileges: Privileges::MANAGEMENT,
        };
        assert!(!banned.can_upload());
        assert_eq!(banned.to_string(), "<mallory (3)>");
    }

    #[test]
    fn test_display_lists_flags() {
        assert_eq!(Privileges::empty().to_string(), "NONE");
        assert_eq!(
            (Privileges::ACTIVE | Privileges::MANAGEMENT).to_string(),
            "ACTIVE|MANAGEMENT"
        );
    }
}
