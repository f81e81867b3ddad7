//! Schema drift policy
//!
//! The header is committed by the first record written to a fresh file.
//! The policy decides what happens when a later record carries a field
//! the header does not have. Fields the record lacks are always written
//! as empty cells.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaPolicy {
    /// Append new columns to the header
    #[default]
    Evolve,
    /// Write the row without the unknown fields
    DropExtra,
    /// Refuse the record before any state changes
    Reject,
}

impl SchemaPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaPolicy::Evolve => "evolve",
            SchemaPolicy::DropExtra => "drop_extra",
            SchemaPolicy::Reject => "reject",
        }
    }
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SchemaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "evolve" => Ok(SchemaPolicy::Evolve),
            "drop_extra" | "drop-extra" => Ok(SchemaPolicy::DropExtra),
            "reject" => Ok(SchemaPolicy::Reject),
            other => Err(format!(
                "unknown schema policy '{}': expected evolve, drop_extra or reject",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_evolve() {
        assert_eq!(SchemaPolicy::default(), SchemaPolicy::Evolve);
    }

    #[test]
    fn test_parse() {
        assert_eq!("reject".parse::<SchemaPolicy>(), Ok(SchemaPolicy::Reject));
        assert_eq!("drop-extra".parse::<SchemaPolicy>(), Ok(SchemaPolicy::DropExtra));
        assert!("rewrite".parse::<SchemaPolicy>().is_err());
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SchemaPolicy::DropExtra).unwrap();
        assert_eq!(json, "\"drop_extra\"");
        let back: SchemaPolicy = serde_json::from_str("\"reject\"").unwrap();
        assert_eq!(back, SchemaPolicy::Reject);
    }
}
