//! Role identifiers: role names and permission scope markers.

use serde::{Deserialize, Serialize};
use std::borrow::{Borrow, Cow};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════════════
// Role Name
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed role name.
///
/// Role names are opaque and compared by exact, case-sensitive equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleName(Cow<'static, str>);

impl RoleName {
    /// Wildcard role. Matches every actor when it appears on either side of a check.
    pub const ANYONE: RoleName = RoleName(Cow::Borrowed("*"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Build a role name from a static string without allocating.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this is the wildcard role.
    pub fn is_anyone(&self) -> bool {
        self.as_str() == Self::ANYONE.as_str()
    }
}

impl fmt::Display for RoleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoleName {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

impl From<&str> for RoleName {
    fn from(s: &str) -> Self {
        Self(Cow::Owned(s.to_string()))
    }
}

impl From<&RoleName> for RoleName {
    fn from(r: &RoleName) -> Self {
        r.clone()
    }
}

impl Borrow<str> for RoleName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for RoleName {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for RoleName {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Scope
// ═══════════════════════════════════════════════════════════════════════════════

/// The scope a permission is attributed to.
///
/// Only merging changes a permission's scope; `allow` and `deny` never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Scope(Cow<'static, str>);

impl Scope {
    /// Default root scope, used when no more specific scope is known.
    pub const GLOBAL: Scope = Scope(Cow::Borrowed("global"));

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_global(&self) -> bool {
        *self == Self::GLOBAL
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::GLOBAL
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Scope {
    fn from(s: &str) -> Self {
        Self(Cow::Owned(s.to_string()))
    }
}

impl From<String> for Scope {
    fn from(s: String) -> Self {
        Self(Cow::Owned(s))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_names_are_case_sensitive() {
        assert_ne!(RoleName::new("Admin"), RoleName::new("admin"));
        assert_eq!(RoleName::new("admin"), RoleName::from("admin"));
    }

    #[test]
    fn test_anyone_sentinel() {
        assert!(RoleName::ANYONE.is_anyone());
        assert!(RoleName::new("*").is_anyone());
        assert!(!RoleName::new("anyone").is_anyone());
        assert_eq!(RoleName::ANYONE, "*");
    }

    #[test]
    fn test_global_scope_is_default() {
        assert_eq!(Scope::default(), Scope::GLOBAL);
        assert!(Scope::new("global").is_global());
        assert!(!Scope::new("order").is_global());
    }

    #[test]
    fn test_role_name_serializes_as_string() {
        let json = serde_json::to_string(&RoleName::new("editor")).unwrap();
        assert_eq!(json, "\"editor\"");

        let parsed: RoleName = serde_json::from_str("\"*\"").unwrap();
        assert!(parsed.is_anyone());
    }
}
