#![allow(clippy::result_large_err)]
//! # Gatehouse Core
//!
//! Role-based permission evaluation for create/read/update/delete operations.
//!
//! ## Architecture
//!
//! - **Roles**: Role names, the `*` wildcard, scopes, and role providers
//! - **Permission**: Allow/deny rule sets with deny-overrides-allow evaluation,
//!   merging, and frozen snapshots
//! - **Resource**: Permission-protected resources with field-level rules
//! - **Config**: Environment-driven configuration and declarative policy documents
//! - **Telemetry**: Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use gatehouse_core::prelude::*;
//!
//! let mut permission = Permission::scoped("order");
//! permission
//!     .allow(PermissionMode::Crud, ["admin"])
//!     .deny(PermissionMode::Delete, ["intern"]);
//!
//! let order = Resource::new("order").with_permission(permission);
//! assert!(order.authorize(PermissionMode::Delete, &Context::new(["admin"])).is_ok());
//! assert!(order.authorize(PermissionMode::Delete, &Context::new(["admin", "intern"])).is_err());
//! ```

pub mod config;
pub mod error;
pub mod permission;
pub mod resource;
pub mod roles;
pub mod telemetry;

pub use error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, GatehouseError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{Config, PermissionSpec, PolicyDocument, ResourceSpec};
    pub use crate::error::{ErrorCode, ErrorContext, ErrorDetails, ErrorSeverity, GatehouseError, Result};
    pub use crate::permission::{
        merge, resolve_roles, Actor, FrozenPermission, OwnedActor, Permission, PermissionError,
        PermissionMode, PolicyDecision,
    };
    pub use crate::resource::{Context, Resource, ResourceRegistry};
    pub use crate::roles::{RoleName, RoleProvider, RoleSet, Scope};
    pub use crate::telemetry::{init_logging, LogFormat, LoggingConfig};
}
