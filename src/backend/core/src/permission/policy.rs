//! Permission policy: allow/deny rules per mode, merging, and the decision algorithm.
//!
//! The decision for a mode and a set of actors is made in three steps:
//!
//! 1. **Deny overrides allow.** If the mode has a deny entry and any actor
//!    matches it, the check fails before allow rules are consulted.
//! 2. **Unconfigured allows everything.** While no allow rule has been recorded
//!    for *any* mode, every mode that was not denied is permitted.
//! 3. **Allow-list mode.** Once an allow rule exists anywhere, a mode is
//!    permitted only if it has its own allow entry and an actor matches it.
//!
//! Matching is membership, not counting: an actor matches a rule list when
//! either side holds [`RoleName::ANYONE`] or a role name appears on both sides.

use metrics::counter;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::ops::Deref;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

use super::actor::{resolve_roles, Actor, OwnedActor};
use super::mode::PermissionMode;
use crate::roles::{RoleName, Scope};

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors from permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PermissionError {
    #[error("permission denied: {mode} not granted to [{}]", join_roles(.roles))]
    PermissionDenied {
        mode: PermissionMode,
        roles: Vec<RoleName>,
    },

    #[error("invalid actor: {0}")]
    InvalidActor(String),

    #[error("invalid permission mode: {0}")]
    InvalidMode(String),

    #[error("crud is a build-time shorthand and cannot be evaluated")]
    AggregateMode,
}

fn join_roles(roles: &[RoleName]) -> String {
    roles
        .iter()
        .map(RoleName::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a permission evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// The action is allowed.
    Allow,
    /// The action is denied, with a reason.
    Deny(String),
}

impl PolicyDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Deny(_))
    }
}

/// Whether `actors` match the rule list `rules`.
///
/// An actor holding [`RoleName::ANYONE`] matches any entry, including one
/// recorded with no roles.
fn include_roles(rules: &[RoleName], actors: &[RoleName]) -> bool {
    actors.iter().any(RoleName::is_anyone)
        || rules.iter().any(|rule| rule.is_anyone() || actors.contains(rule))
}

// ═══════════════════════════════════════════════════════════════════════════════
// Permission
// ═══════════════════════════════════════════════════════════════════════════════

/// Allow and deny rules for the four concrete modes.
///
/// A mode key exists in `allowed` / `denied` only after `allow` / `deny` was
/// called for it, even with no roles. An absent key means "no rule recorded",
/// which differs from an empty list: any allow key switches the permission
/// into allow-list mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    scope: Scope,
    #[serde(default)]
    allowed: BTreeMap<PermissionMode, Vec<RoleName>>,
    #[serde(default)]
    denied: BTreeMap<PermissionMode, Vec<RoleName>>,
}

impl Permission {
    /// Create an empty permission in the global scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty permission attributed to `scope`.
    pub fn scoped(scope: impl Into<Scope>) -> Self {
        Self {
            scope: scope.into(),
            ..Self::default()
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn allowed(&self) -> &BTreeMap<PermissionMode, Vec<RoleName>> {
        &self.allowed
    }

    pub fn denied(&self) -> &BTreeMap<PermissionMode, Vec<RoleName>> {
        &self.denied
    }

    /// Roles allowed for `mode`, or `None` if no allow rule was recorded for it.
    pub fn allowed_roles(&self, mode: PermissionMode) -> Option<&[RoleName]> {
        self.allowed.get(&mode).map(Vec::as_slice)
    }

    /// Roles denied for `mode`, or `None` if no deny rule was recorded for it.
    pub fn denied_roles(&self, mode: PermissionMode) -> Option<&[RoleName]> {
        self.denied.get(&mode).map(Vec::as_slice)
    }

    /// Whether neither allow nor deny was ever called.
    pub fn is_unconfigured(&self) -> bool {
        self.allowed.is_empty() && self.denied.is_empty()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Builder
    // ─────────────────────────────────────────────────────────────────────────

    /// Allow `roles` for `mode`. `Crud` applies to all four concrete modes.
    pub fn allow<I, R>(&mut self, mode: PermissionMode, roles: I) -> &mut Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        let roles: Vec<RoleName> = roles.into_iter().map(Into::into).collect();
        for mode in mode.expand() {
            self.allowed.entry(mode).or_default().extend(roles.iter().cloned());
        }
        self
    }

    /// Deny `roles` for `mode`. `Crud` applies to all four concrete modes.
    pub fn deny<I, R>(&mut self, mode: PermissionMode, roles: I) -> &mut Self
    where
        I: IntoIterator<Item = R>,
        R: Into<RoleName>,
    {
        let roles: Vec<RoleName> = roles.into_iter().map(Into::into).collect();
        for mode in mode.expand() {
            self.denied.entry(mode).or_default().extend(roles.iter().cloned());
        }
        self
    }

    /// Combine with `other` into a new permission.
    ///
    /// `self` is the more specific side: it keeps scope attribution and its
    /// rules are appended after `other`'s. Neither operand is modified.
    pub fn concat(&self, other: Option<&Permission>) -> Permission {
        merge(Some(self), other)
    }

    /// Freeze into an immutable snapshot that can be shared across threads.
    pub fn freeze(self) -> FrozenPermission {
        FrozenPermission(Arc::new(self))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Evaluation
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `actors` may perform `mode`.
    ///
    /// Never fails: `Crud` is treated as no match.
    pub fn has_permission(&self, mode: PermissionMode, actors: &[Actor<'_>]) -> bool {
        match self.evaluate(mode, actors) {
            Ok(decision) => decision.is_allowed(),
            Err(err) => {
                warn!(mode = %mode, error = %err, "Permission check rejected");
                false
            }
        }
    }

    /// Evaluate `mode` for `actors`, rejecting the `Crud` shorthand.
    pub fn evaluate(
        &self,
        mode: PermissionMode,
        actors: &[Actor<'_>],
    ) -> Result<PolicyDecision, PermissionError> {
        if mode.is_aggregate() {
            return Err(PermissionError::AggregateMode);
        }
        let roles = resolve_roles(actors);
        Ok(self.decide(mode, &roles))
    }

    /// Evaluate `mode` for actors supplied as untyped JSON values.
    ///
    /// Any value that is neither a role name nor a role provider fails the
    /// whole check with [`PermissionError::InvalidActor`].
    pub fn evaluate_json(
        &self,
        mode: PermissionMode,
        actors: &[Value],
    ) -> Result<PolicyDecision, PermissionError> {
        let owned = actors
            .iter()
            .map(OwnedActor::from_json)
            .collect::<Result<Vec<_>, _>>()
            .inspect_err(|err| warn!(mode = %mode, error = %err, "Invalid actor"))?;
        let actors: Vec<Actor<'_>> = owned.iter().map(OwnedActor::as_actor).collect();
        self.evaluate(mode, &actors)
    }

    /// Returns `Ok(())` if allowed, `Err(PermissionError::PermissionDenied)` if denied.
    pub fn enforce(&self, mode: PermissionMode, actors: &[Actor<'_>]) -> Result<(), PermissionError> {
        match self.evaluate(mode, actors)? {
            PolicyDecision::Allow => Ok(()),
            PolicyDecision::Deny(_) => Err(PermissionError::PermissionDenied {
                mode,
                roles: resolve_roles(actors),
            }),
        }
    }

    /// Decide a concrete `mode` for already-resolved role names.
    pub fn decide(&self, mode: PermissionMode, roles: &[RoleName]) -> PolicyDecision {
        let decision = self.decide_inner(mode, roles);
        let outcome = if decision.is_allowed() { "allow" } else { "deny" };
        counter!(
            "gatehouse_decisions_total",
            "mode" => mode.as_str(),
            "outcome" => outcome,
        )
        .increment(1);
        debug!(
            scope = %self.scope,
            mode = %mode,
            roles = %join_roles(roles),
            outcome,
            "Permission evaluated"
        );
        decision
    }

    fn decide_inner(&self, mode: PermissionMode, roles: &[RoleName]) -> PolicyDecision {
        if !self.denied.is_empty() {
            if let Some(denied) = self.denied.get(&mode) {
                if include_roles(denied, roles) {
                    return PolicyDecision::Deny(format!("{mode} is denied for [{}]", join_roles(roles)));
                }
            }
        }

        if self.allowed.is_empty() {
            return PolicyDecision::Allow;
        }

        match self.allowed.get(&mode) {
            Some(allowed) if include_roles(allowed, roles) => PolicyDecision::Allow,
            Some(_) => PolicyDecision::Deny(format!(
                "{mode} is not allowed for [{}]",
                join_roles(roles)
            )),
            None => PolicyDecision::Deny(format!("no allow rule for {mode}")),
        }
    }
}

/// Merge two optional permissions into a new one.
///
/// Scope comes from `receiver` when present, else from `other`, else
/// [`Scope::GLOBAL`]. For every mode, the result holds `other`'s roles
/// followed by `receiver`'s. An absent operand contributes nothing.
pub fn merge(receiver: Option<&Permission>, other: Option<&Permission>) -> Permission {
    let mut result = Permission::new();

    for permission in [other, receiver].into_iter().flatten() {
        result.scope = permission.scope.clone();

        for (mode, roles) in &permission.denied {
            result.denied.entry(*mode).or_default().extend(roles.iter().cloned());
        }
        for (mode, roles) in &permission.allowed {
            result.allowed.entry(*mode).or_default().extend(roles.iter().cloned());
        }
    }

    result
}

// ═══════════════════════════════════════════════════════════════════════════════
// Frozen Permission
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable, cheaply clonable snapshot of a [`Permission`].
///
/// Exposes the evaluation API only; build a new permission to change rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrozenPermission(Arc<Permission>);

impl FrozenPermission {
    /// A mutable copy of the frozen rules.
    pub fn thaw(&self) -> Permission {
        (*self.0).clone()
    }
}

impl Deref for FrozenPermission {
    type Target = Permission;

    fn deref(&self) -> &Permission {
        &self.0
    }
}

impl From<Permission> for FrozenPermission {
    fn from(permission: Permission) -> Self {
        permission.freeze()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
