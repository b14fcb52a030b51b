//! Protected resources and the acting context.
//!
//! A [`Resource`] owns an optional [`Permission`] plus per-field permissions.
//! Callers check a mode against the resource before running the matching
//! create/read/update/delete operation and treat a denial as
//! [`ErrorCode::Forbidden`](crate::error::ErrorCode::Forbidden).

use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

use crate::error::{GatehouseError, Result};
use crate::permission::{Actor, FrozenPermission, Permission, PermissionMode};
use crate::roles::{RoleName, RoleProvider};

// ═══════════════════════════════════════════════════════════════════════════════
// Context
// ═══════════════════════════════════════════════════════════════════════════════

/// The acting context of a request: the roles its caller holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Context {
    roles: Vec<RoleName>,
}

impl Context {
    pub fn new<I, R>(roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// A context with no roles.
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_role(mut self, role: impl Into<RoleName>) -> Self {
        self.roles.push(role.into());
        self
    }

    pub fn role_names(&self) -> &[RoleName] {
        &self.roles
    }

    /// One actor per role held.
    pub fn actors(&self) -> Vec<Actor<'static>> {
        self.roles.iter().cloned().map(Actor::Role).collect()
    }
}

impl RoleProvider for Context {
    fn roles(&self) -> Vec<RoleName> {
        self.roles.clone()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Resource
// ═══════════════════════════════════════════════════════════════════════════════

/// A named, permission-protected resource.
#[derive(Debug, Clone, Default)]
pub struct Resource {
    name: String,
    permission: Option<FrozenPermission>,
    fields: BTreeMap<String, Option<FrozenPermission>>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Attach the resource-level permission.
    pub fn with_permission(mut self, permission: Permission) -> Self {
        self.permission = Some(permission.freeze());
        self
    }

    /// Declare a field. A field permission is layered over the resource's:
    /// the field's rules are the more specific side of the merge.
    pub fn with_field(mut self, name: impl Into<String>, permission: Option<Permission>) -> Self {
        self.fields.insert(name.into(), permission.map(Permission::freeze));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn permission(&self) -> Option<&Permission> {
        self.permission.as_deref()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// The permission that governs `field`: the field's own rules merged over
    /// the resource's. `None` when neither declares a permission.
    pub fn field_permission(&self, field: &str) -> Result<Option<Permission>> {
        let own = self
            .fields
            .get(field)
            .ok_or_else(|| GatehouseError::not_found("field", format!("{}.{}", self.name, field)))?;

        Ok(match (own.as_deref(), self.permission()) {
            (None, None) => None,
            (None, Some(inherited)) => Some(inherited.clone()),
            (Some(own), inherited) => Some(own.concat(inherited)),
        })
    }

    /// Whether `context` may perform `mode` on this resource.
    ///
    /// A resource without a permission allows everything.
    pub fn has_permission(&self, mode: PermissionMode, context: &Context) -> bool {
        match self.permission() {
            Some(permission) => permission.has_permission(mode, &[Actor::provider(context)]),
            None => true,
        }
    }

    /// Whether `context` may perform `mode` on `field`.
    pub fn field_has_permission(&self, field: &str, mode: PermissionMode, context: &Context) -> Result<bool> {
        Ok(match self.field_permission(field)? {
            Some(permission) => permission.has_permission(mode, &[Actor::provider(context)]),
            None => true,
        })
    }

    /// Fail with a forbidden error unless `context` may perform `mode`.
    pub fn authorize(&self, mode: PermissionMode, context: &Context) -> Result<()> {
        match self.permission() {
            Some(permission) => check(permission, &self.name, mode, context),
            None => Ok(()),
        }
    }

    /// Fail with a forbidden error unless `context` may perform `mode` on `field`.
    pub fn authorize_field(&self, field: &str, mode: PermissionMode, context: &Context) -> Result<()> {
        match self.field_permission(field)? {
            Some(permission) => check(&permission, &format!("{}.{}", self.name, field), mode, context),
            None => Ok(()),
        }
    }
}

fn check(permission: &Permission, target: &str, mode: PermissionMode, context: &Context) -> Result<()> {
    let decision = permission.evaluate(mode, &[Actor::provider(context)])?;
    if decision.is_allowed() {
        return Ok(());
    }
    debug!(target_name = target, mode = %mode, ?decision, "Authorization failed");
    Err(GatehouseError::forbidden(target, mode)
        .with_context("roles", context.role_names()))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Resources by name.
#[derive(Debug, Clone, Default)]
pub struct ResourceRegistry {
    resources: BTreeMap<String, Resource>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resource, replacing any resource with the same name.
    pub fn register(&mut self, resource: Resource) {
        debug!(resource = resource.name(), "Registering resource");
        self.resources.insert(resource.name.clone(), resource);
    }

    pub fn get(&self, name: &str) -> Result<&Resource> {
        self.resources
            .get(name)
            .ok_or_else(|| GatehouseError::not_found("resource", name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Authorize `mode` on a resource, or on one of its fields when `field` is set.
    pub fn authorize(
        &self,
        resource: &str,
        field: Option<&str>,
        mode: PermissionMode,
        context: &Context,
    ) -> Result<()> {
        let resource = self.get(resource)?;
        match field {
            Some(field) => resource.authorize_field(field, mode, context),
            None => resource.authorize(mode, context),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
