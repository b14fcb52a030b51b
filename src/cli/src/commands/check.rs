//! Evaluate a single permission check against a policy document.

use anyhow::Result;
use clap::Args;
use gatehouse_core::config::Config;
use gatehouse_core::permission::{Actor, OwnedActor, PermissionMode, PolicyDecision};
use gatehouse_core::roles::RoleName;
use serde::Serialize;
use std::path::PathBuf;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// Policy document (TOML, JSON or YAML); defaults to the configured policy_path
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// Resource name
    #[arg(short, long)]
    resource: String,

    /// Mode to check (create, read, update, delete)
    #[arg(short, long)]
    mode: String,

    /// Check a field of the resource instead of the resource itself
    #[arg(short, long)]
    field: Option<String>,

    /// Role held by the caller (repeatable)
    #[arg(long = "role")]
    roles: Vec<String>,

    /// Actor as JSON: a role name string or {"roles": [...]} (repeatable)
    #[arg(long = "actor")]
    actors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckReport {
    resource: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    mode: PermissionMode,
    roles: Vec<RoleName>,
    allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

/// Run the check and report whether it was allowed.
pub fn execute(args: CheckArgs, config: &Config, format: OutputFormat) -> Result<bool> {
    let mode: PermissionMode = args.mode.parse()?;

    let registry = super::load_registry(args.policy.as_deref(), config)?;
    let resource = registry.get(&args.resource)?;
    let permission = match &args.field {
        Some(field) => resource.field_permission(field)?,
        None => resource.permission().cloned(),
    };

    let mut owned: Vec<OwnedActor> = args
        .roles
        .iter()
        .map(|role| OwnedActor::Role(RoleName::new(role.as_str())))
        .collect();
    for actor in &args.actors {
        owned.push(OwnedActor::parse(actor)?);
    }
    let actors: Vec<Actor<'_>> = owned.iter().map(OwnedActor::as_actor).collect();

    let decision = match &permission {
        Some(permission) => permission.evaluate(mode, &actors)?,
        None => PolicyDecision::Allow,
    };
    tracing::debug!(resource = %args.resource, mode = %mode, ?decision, "Check complete");

    let report = CheckReport {
        resource: args.resource,
        field: args.field,
        mode,
        roles: gatehouse_core::permission::resolve_roles(&actors),
        allowed: decision.is_allowed(),
        reason: match decision {
            PolicyDecision::Allow => None,
            PolicyDecision::Deny(reason) => Some(reason),
        },
    };

    match format {
        OutputFormat::Table => {
            let target = match &report.field {
                Some(field) => format!("{}.{}", report.resource, field),
                None => report.resource.clone(),
            };
            output::print_verdict(report.allowed, &format!("{} on {}", report.mode, target));
            let roles: Vec<&str> = report.roles.iter().map(RoleName::as_str).collect();
            output::print_detail("roles", &format!("[{}]", roles.join(", ")));
            if let Some(reason) = &report.reason {
                output::print_detail("reason", reason);
            }
        }
        _ => output::print_item(&report, format)?,
    }

    Ok(report.allowed)
}
