//! Permission modes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::policy::PermissionError;

/// The action a permission rule applies to.
///
/// `Crud` is shorthand for all four concrete modes. It is accepted when
/// building a permission and rejected when evaluating one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionMode {
    Create,
    Read,
    Update,
    Delete,
    Crud,
}

impl PermissionMode {
    /// The four concrete modes, in expansion order.
    pub const CONCRETE: [PermissionMode; 4] = [Self::Create, Self::Update, Self::Read, Self::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Crud => "crud",
        }
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, Self::Crud)
    }

    /// Expand into the concrete modes this value stands for.
    pub fn expand(self) -> Vec<PermissionMode> {
        match self {
            Self::Crud => Self::CONCRETE.to_vec(),
            mode => vec![mode],
        }
    }
}

impl fmt::Display for PermissionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PermissionMode {
    type Err = PermissionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(Self::Create),
            "read" => Ok(Self::Read),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            "crud" => Ok(Self::Crud),
            other => Err(PermissionError::InvalidMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crud_expands_to_concrete_modes() {
        assert_eq!(
            PermissionMode::Crud.expand(),
            vec![
                PermissionMode::Create,
                PermissionMode::Update,
                PermissionMode::Read,
                PermissionMode::Delete,
            ]
        );
        assert_eq!(PermissionMode::Read.expand(), vec![PermissionMode::Read]);
    }

    #[test]
    fn test_parse_round_trips_display() {
        for mode in PermissionMode::Crud.expand().into_iter().chain([PermissionMode::Crud]) {
            assert_eq!(mode.to_string().parse::<PermissionMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_parse_is_case_sensitive() {
        assert!(matches!(
            "Read".parse::<PermissionMode>(),
            Err(PermissionError::InvalidMode(ref m)) if m == "Read"
        ));
    }

    #[test]
    fn test_serde_lowercase() {
        let json = serde_json::to_string(&PermissionMode::Delete).unwrap();
        assert_eq!(json, "\"delete\"");
        let mode: PermissionMode = serde_json::from_str("\"crud\"").unwrap();
        assert!(mode.is_aggregate());
    }
}
