pub mod check;
pub mod show;

use anyhow::{Context, Result};
use gatehouse_core::config::{Config, PolicyDocument};
use gatehouse_core::resource::ResourceRegistry;
use gatehouse_core::{ErrorCode, GatehouseError};
use std::path::Path;

/// Build the registry from `--policy`, falling back to the configured
/// `policy_path`.
pub fn load_registry(policy: Option<&Path>, config: &Config) -> Result<ResourceRegistry> {
    if let Some(path) = policy {
        return PolicyDocument::from_path(path)
            .and_then(|document| document.build())
            .with_context(|| format!("Failed to load policy {}", path.display()));
    }

    let registry = config.load_policy().with_context(|| {
        let path = config.policy_path.as_deref().unwrap_or(Path::new(""));
        format!("Failed to load policy {}", path.display())
    })?;
    registry.ok_or_else(|| {
        GatehouseError::new(
            ErrorCode::MissingConfiguration,
            "no policy document: pass --policy or set policy_path",
        )
        .into()
    })
}
