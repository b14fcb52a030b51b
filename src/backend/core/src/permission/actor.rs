//! Actors: the runtime values whose roles are checked against a permission.

use serde_json::Value;
use std::fmt;

use super::policy::PermissionError;
use crate::roles::{RoleName, RoleProvider, RoleSet};

/// An actor taking part in a permission check.
///
/// Either a bare role name or anything implementing [`RoleProvider`].
#[derive(Clone)]
pub enum Actor<'a> {
    Role(RoleName),
    Provider(&'a dyn RoleProvider),
}

impl<'a> Actor<'a> {
    pub fn role(name: impl Into<RoleName>) -> Self {
        Self::Role(name.into())
    }

    pub fn provider(provider: &'a dyn RoleProvider) -> Self {
        Self::Provider(provider)
    }

    /// The role names this actor contributes to a check.
    pub fn role_names(&self) -> Vec<RoleName> {
        match self {
            Self::Role(name) => vec![name.clone()],
            Self::Provider(provider) => provider.roles(),
        }
    }
}

impl fmt::Debug for Actor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Role(name) => f.debug_tuple("Role").field(name).finish(),
            Self::Provider(provider) => f.debug_tuple("Provider").field(&provider.roles()).finish(),
        }
    }
}

impl From<RoleName> for Actor<'_> {
    fn from(name: RoleName) -> Self {
        Self::Role(name)
    }
}

impl From<&str> for Actor<'_> {
    fn from(name: &str) -> Self {
        Self::Role(RoleName::from(name))
    }
}

impl From<String> for Actor<'_> {
    fn from(name: String) -> Self {
        Self::Role(RoleName::from(name))
    }
}

/// Flatten a list of actors into the role names they hold.
pub fn resolve_roles(actors: &[Actor<'_>]) -> Vec<RoleName> {
    actors.iter().flat_map(Actor::role_names).collect()
}

/// Owned actor decoded from untyped input such as a JSON request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnedActor {
    Role(RoleName),
    Provider(RoleSet),
}

impl OwnedActor {
    /// Decode an actor from JSON.
    ///
    /// A string is a role name. An object carrying a `roles` array of
    /// strings is a role provider. Every other shape is rejected.
    pub fn from_json(value: &Value) -> Result<Self, PermissionError> {
        match value {
            Value::String(name) => Ok(Self::Role(RoleName::new(name.as_str()))),
            Value::Object(map) => match map.get("roles") {
                Some(Value::Array(items)) => {
                    let mut roles = Vec::with_capacity(items.len());
                    for item in items {
                        match item {
                            Value::String(name) => roles.push(RoleName::new(name.as_str())),
                            other => return Err(PermissionError::InvalidActor(other.to_string())),
                        }
                    }
                    Ok(Self::Provider(RoleSet { roles }))
                }
                _ => Err(PermissionError::InvalidActor(value.to_string())),
            },
            other => Err(PermissionError::InvalidActor(other.to_string())),
        }
    }

    /// Decode an actor from a JSON string, falling back to treating the
    /// input as a bare role name when it is not valid JSON.
    pub fn parse(input: &str) -> Result<Self, PermissionError> {
        match serde_json::from_str::<Value>(input) {
            Ok(value) => Self::from_json(&value),
            Err(_) => Ok(Self::Role(RoleName::new(input))),
        }
    }

    pub fn as_actor(&self) -> Actor<'_> {
        match self {
            Self::Role(name) => Actor::Role(name.clone()),
            Self::Provider(set) => Actor::Provider(set),
        }
    }
}
