//! Show the effective allow/deny lists of a policy document.

use anyhow::Result;
use clap::Args;
use gatehouse_core::config::Config;
use gatehouse_core::permission::{Permission, PermissionMode};
use gatehouse_core::resource::Resource;
use gatehouse_core::roles::RoleName;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct ShowArgs {
    /// Policy document (TOML, JSON or YAML); defaults to the configured policy_path
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// Only show this resource
    #[arg(short, long)]
    resource: Option<String>,
}

#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Scope")]
    scope: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Allowed")]
    allowed: String,
    #[tabled(rename = "Denied")]
    denied: String,
}

/// `-` when no rule was recorded for the mode, otherwise the role list.
fn describe(roles: Option<&[RoleName]>) -> String {
    match roles {
        None => "-".to_string(),
        Some(roles) => {
            let names: Vec<&str> = roles.iter().map(RoleName::as_str).collect();
            format!("[{}]", names.join(", "))
        }
    }
}

fn rows_for(target: &str, permission: Option<&Permission>, rows: &mut Vec<RuleRow>) {
    let Some(permission) = permission else {
        rows.push(RuleRow {
            target: target.to_string(),
            scope: "-".to_string(),
            mode: "*".to_string(),
            allowed: "(unrestricted)".to_string(),
            denied: "-".to_string(),
        });
        return;
    };

    for mode in PermissionMode::CONCRETE {
        rows.push(RuleRow {
            target: target.to_string(),
            scope: permission.scope().to_string(),
            mode: mode.to_string(),
            allowed: if permission.allowed().is_empty() {
                "(any)".to_string()
            } else {
                describe(permission.allowed_roles(mode))
            },
            denied: describe(permission.denied_roles(mode)),
        });
    }
}

fn resource_rows(resource: &Resource, rows: &mut Vec<RuleRow>) -> Result<()> {
    rows_for(resource.name(), resource.permission(), rows);
    for field in resource.field_names() {
        let permission = resource.field_permission(field)?;
        rows_for(&format!("{}.{}", resource.name(), field), permission.as_ref(), rows);
    }
    Ok(())
}

pub fn execute(args: ShowArgs, config: &Config, format: OutputFormat) -> Result<()> {
    let registry = super::load_registry(args.policy.as_deref(), config)?;

    let mut rows = Vec::new();
    match &args.resource {
        Some(name) => resource_rows(registry.get(name)?, &mut rows)?,
        None => {
            if registry.is_empty() {
                output::print_info("Policy declares no resources.");
                return Ok(());
            }
            for resource in registry.iter() {
                resource_rows(resource, &mut rows)?;
            }
        }
    }

    output::print_list(&rows, format)
}
