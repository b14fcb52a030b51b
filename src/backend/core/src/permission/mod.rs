//! Permission policies for protected resources.
//!
//! This module provides:
//! - **Modes**: `create`, `read`, `update`, `delete`, and the `crud` shorthand
//! - **Builder**: `allow` / `deny` rules per mode, chained on a `Permission`
//! - **Merge**: layering a more specific permission over an inherited one
//! - **Decision**: deny-overrides-allow evaluation against a set of actors
//! - **Freeze**: an immutable snapshot for concurrent evaluation
//!
//! # Usage
//!
//! ```rust
//! use gatehouse_core::permission::{Actor, Permission, PermissionMode};
//!
//! let mut permission = Permission::new();
//! permission
//!     .allow(PermissionMode::Crud, ["admin"])
//!     .allow(PermissionMode::Read, ["viewer"])
//!     .deny(PermissionMode::Delete, ["intern"]);
//!
//! let permission = permission.freeze();
//! assert!(permission.has_permission(PermissionMode::Read, &[Actor::from("viewer")]));
//! assert!(!permission.has_permission(PermissionMode::Update, &[Actor::from("viewer")]));
//! ```

pub mod actor;
pub mod mode;
pub mod policy;

pub use actor::{resolve_roles, Actor, OwnedActor};
pub use mode::PermissionMode;
pub use policy::{merge, FrozenPermission, Permission, PermissionError, PolicyDecision};
