//! Configuration management and declarative policy documents.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{ErrorCode, ErrorContext, GatehouseError, Result};
use crate::permission::{merge, Permission, PermissionMode};
use crate::resource::{Resource, ResourceRegistry};
use crate::roles::Scope;
use crate::telemetry::LoggingConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Path of the policy document to load
    #[serde(default)]
    pub policy_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservabilityConfig {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the environment.
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load from a specific file path, with environment overrides.
    /// The file format follows the extension.
    pub fn from_file(path: &Path) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(config::Environment::with_prefix("GATEHOUSE").separator("__"))
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Load and build the configured policy document, if one is set.
    pub fn load_policy(&self) -> Result<Option<ResourceRegistry>> {
        self.policy_path
            .as_deref()
            .map(|path| PolicyDocument::from_path(path)?.build())
            .transpose()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Policy Documents
// ═══════════════════════════════════════════════════════════════════════════════

/// Allow and deny rules keyed by mode, as written in a policy document.
///
/// ```toml
/// [allow]
/// crud = ["admin"]
/// read = ["viewer"]
///
/// [deny]
/// delete = ["intern"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionSpec {
    #[serde(default)]
    pub allow: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub deny: BTreeMap<String, Vec<String>>,
}

impl PermissionSpec {
    /// Build the permission these rules describe, attributed to `scope`.
    pub fn to_permission(&self, scope: impl Into<Scope>) -> Result<Permission> {
        let mut permission = Permission::scoped(scope);
        for (mode, roles) in &self.allow {
            permission.allow(mode.parse::<PermissionMode>()?, roles.iter().map(String::as_str));
        }
        for (mode, roles) in &self.deny {
            permission.deny(mode.parse::<PermissionMode>()?, roles.iter().map(String::as_str));
        }
        Ok(permission)
    }
}

/// A resource entry in a policy document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    #[serde(flatten)]
    pub permission: PermissionSpec,

    /// Field-level rules, layered over the resource's rules
    #[serde(default)]
    pub fields: BTreeMap<String, PermissionSpec>,
}

/// A set of resources with their permissions.
///
/// Each resource's rules are merged over `defaults`: the resource is the more
/// specific side and keeps its own scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(default)]
    pub defaults: Option<PermissionSpec>,

    #[serde(default)]
    pub resources: BTreeMap<String, ResourceSpec>,
}

impl PolicyDocument {
    pub fn from_toml(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_json(input: &str) -> Result<Self> {
        serde_json::from_str(input).with_error_code(ErrorCode::InvalidConfiguration)
    }

    pub fn from_yaml(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    /// Read a policy document, choosing the format by file extension.
    /// Files without a recognised extension are read as TOML.
    pub fn from_path(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)?;
        let document = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&input),
            Some("yaml") | Some("yml") => Self::from_yaml(&input),
            _ => Self::from_toml(&input),
        }
        .map_err(|e| e.with_context("path", path.display().to_string()))?;

        info!(
            path = %path.display(),
            resources = document.resources.len(),
            "Loaded policy document"
        );
        Ok(document)
    }

    /// Build the resources this document declares.
    pub fn build(&self) -> Result<ResourceRegistry> {
        let defaults = self
            .defaults
            .as_ref()
            .map(|spec| spec.to_permission(Scope::GLOBAL))
            .transpose()?;

        let mut registry = ResourceRegistry::new();
        for (name, spec) in &self.resources {
            if name.is_empty() {
                return Err(GatehouseError::configuration("resource name must not be empty"));
            }

            let own = spec.permission.to_permission(name.as_str())?;
            let permission = merge(Some(&own), defaults.as_ref());

            let mut resource = Resource::new(name.as_str());
            if !permission.is_unconfigured() {
                resource = resource.with_permission(permission);
            }
            for (field, field_spec) in &spec.fields {
                let field_permission = field_spec.to_permission(format!("{name}.{field}"))?;
                resource = resource.with_field(field.as_str(), Some(field_permission));
            }
            registry.register(resource);
        }
        Ok(registry)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Context;
    use crate::roles::RoleName;

    use PermissionMode::{Create, Delete, Read, Update};

    const DOCUMENT: &str = r#"
[defaults.deny]
delete = ["intern"]

[resources.order.allow]
crud = ["admin"]
read = ["viewer"]

[resources.order.fields.price.deny]
read = ["viewer"]

[resources.audit_log.deny]
update = ["*"]
"#;

    #[test]
    fn test_permission_spec_expands_crud() {
        let spec: PermissionSpec = toml::from_str("[allow]\ncrud = [\"editor\"]\n").unwrap();
        let permission = spec.to_permission("doc").unwrap();
        for mode in [Create, Read, Update, Delete] {
            assert_eq!(permission.allowed_roles(mode), Some(&[RoleName::new("editor")][..]));
        }
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        let document = PolicyDocument::from_toml("[resources.order.allow]\nlist = [\"viewer\"]\n").unwrap();
        assert_eq!(document.build().unwrap_err().code(), ErrorCode::InvalidMode);
    }

    #[test]
    fn test_malformed_document_is_rejected() {
        let result = PolicyDocument::from_toml("[resources.order]\nallow = \"viewer\"\n");
        assert_eq!(result.unwrap_err().code(), ErrorCode::InvalidConfiguration);
    }

    #[test]
    fn test_malformed_json_document_is_rejected() {
        let err = PolicyDocument::from_json(r#"{"resources": {"order": {"allow": 3}}}"#).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidConfiguration);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_build_merges_defaults_under_resources() {
        let registry = PolicyDocument::from_toml(DOCUMENT).unwrap().build().unwrap();
        assert_eq!(registry.len(), 2);

        let order = registry.get("order").unwrap();
        let permission = order.permission().unwrap();
        assert_eq!(permission.scope().as_str(), "order");
        assert!(!order.has_permission(Delete, &Context::new(["admin", "intern"])));
        assert!(order.has_permission(Delete, &Context::new(["admin"])));
        assert!(order.has_permission(Read, &Context::new(["viewer"])));
        assert!(!order.has_permission(Create, &Context::new(["viewer"])));
    }

    #[test]
    fn test_build_deny_only_resource_defaults_to_allow() {
        let registry = PolicyDocument::from_toml(DOCUMENT).unwrap().build().unwrap();
        let audit = registry.get("audit_log").unwrap();

        assert!(audit.has_permission(Read, &Context::new(["anyone-at-all"])));
        assert!(!audit.has_permission(Update, &Context::new(["admin"])));
        assert!(!audit.has_permission(Delete, &Context::new(["intern"])));
    }

    #[test]
    fn test_build_field_rules() {
        let registry = PolicyDocument::from_toml(DOCUMENT).unwrap().build().unwrap();
        assert!(registry
            .authorize("order", Some("price"), Read, &Context::new(["viewer"]))
            .is_err());
        assert!(registry
            .authorize("order", Some("price"), Read, &Context::new(["admin"]))
            .is_ok());
    }

    #[test]
    fn test_json_and_yaml_documents() {
        let json = r#"{"resources": {"order": {"allow": {"read": ["viewer"]}}}}"#;
        let yaml = "resources:\n  order:\n    allow:\n      read: [viewer]\n";

        let from_json = PolicyDocument::from_json(json).unwrap();
        let from_yaml = PolicyDocument::from_yaml(yaml).unwrap();
        assert_eq!(from_json, from_yaml);
    }

    #[test]
    fn test_from_path_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("policy.yaml");
        std::fs::write(&path, "resources:\n  order:\n    deny:\n      delete: ['*']\n").unwrap();

        let document = PolicyDocument::from_path(&path).unwrap();
        assert_eq!(
            document.resources["order"].permission.deny["delete"],
            vec!["*".to_string()]
        );
    }

    #[test]
    fn test_missing_policy_file() {
        let err = PolicyDocument::from_path(Path::new("/nonexistent/policy.toml")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::MissingConfiguration);
    }

    #[test]
    fn test_config_without_policy_path() {
        let config = Config::default();
        assert!(config.load_policy().unwrap().is_none());
    }

    #[test]
    fn test_config_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let policy = dir.path().join("policy.toml");
        std::fs::write(&policy, DOCUMENT).unwrap();

        let config_path = dir.path().join("gatehouse.toml");
        std::fs::write(
            &config_path,
            format!(
                "policy_path = {:?}\n\n[observability.logging]\nlevel = \"debug\"\nformat = \"compact\"\n",
                policy.display().to_string()
            ),
        )
        .unwrap();

        let config = Config::from_file(&config_path).unwrap();
        assert_eq!(config.observability.logging.level, "debug");

        let registry = config.load_policy().unwrap().unwrap();
        assert!(registry.get("order").is_ok());
    }
}
