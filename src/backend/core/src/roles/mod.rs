//! Role registry: role names, reserved sentinels, and the role-provider capability.
//!
//! Two names are reserved:
//!
//! | Constant           | Value      | Meaning                                         |
//! |--------------------|------------|-------------------------------------------------|
//! | `RoleName::ANYONE` | `"*"`      | Wildcard role, matches every actor              |
//! | `Scope::GLOBAL`    | `"global"` | Default scope of a permission built by merging  |

pub mod models;
pub mod provider;

pub use models::{RoleName, Scope};
pub use provider::{RoleProvider, RoleSet};
