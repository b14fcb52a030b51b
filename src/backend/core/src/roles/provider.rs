//! The role-provider capability.

use serde::{Deserialize, Serialize};

use super::models::RoleName;

/// Anything that can report the role names it holds.
///
/// Role membership is resolved by the implementor; the permission
/// evaluator only consumes the resulting names.
pub trait RoleProvider {
    fn roles(&self) -> Vec<RoleName>;
}

/// A plain list of role names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSet {
    pub roles: Vec<RoleName>,
}

impl RoleSet {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl RoleProvider for RoleSet {
    fn roles(&self) -> Vec<RoleName> {
        self.roles.clone()
    }
}

impl RoleProvider for Vec<RoleName> {
    fn roles(&self) -> Vec<RoleName> {
        self.clone()
    }
}

impl<T: RoleProvider + ?Sized> RoleProvider for &T {
    fn roles(&self) -> Vec<RoleName> {
        (**self).roles()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Staff {
        manager: bool,
    }

    impl RoleProvider for Staff {
        fn roles(&self) -> Vec<RoleName> {
            let mut roles = vec![RoleName::from_static("staff")];
            if self.manager {
                roles.push(RoleName::from_static("manager"));
            }
            roles
        }
    }

    #[test]
    fn test_custom_provider() {
        assert_eq!(Staff { manager: false }.roles(), vec![RoleName::new("staff")]);
        assert_eq!(Staff { manager: true }.roles().len(), 2);
    }

    #[test]
    fn test_role_set() {
        let set = RoleSet::new(["viewer", "editor"]);
        assert_eq!(set.roles(), vec![RoleName::new("viewer"), RoleName::new("editor")]);
        assert!(RoleSet::default().is_empty());
    }
}
