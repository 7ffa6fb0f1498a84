//! Staging action types and review counts.
//!
//! A staging row records the validator's verdict for one input row:
//! create a new product, update an existing one, or skip it. A row that
//! failed validation has no staging action at all — it lives in the
//! error table instead.

use serde::{Deserialize, Serialize};

/// Action the committer will take for a staged row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StagingAction {
    Create,
    Update,
    Skip,
}

impl StagingAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Skip => "skip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "create" => Some(Self::Create),
            "update" => Some(Self::Update),
            "skip" => Some(Self::Skip),
            _ => None,
        }
    }

    /// All valid action values.
    pub const ALL: &'static [&'static str] = &["create", "update", "skip"];
}

impl std::fmt::Display for StagingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Job-wide staging counts by action, as reported by the staging store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionCounts {
    pub create: i64,
    pub update: i64,
}

impl ActionCounts {
    /// Rows that will be written on commit.
    pub fn valid(&self) -> i64 {
        self.create + self.update
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_strings() {
        for name in StagingAction::ALL {
            let action = StagingAction::parse(name).expect("known action");
            assert_eq!(action.as_str(), *name);
        }
        assert_eq!(StagingAction::parse("delete"), None);
    }

    #[test]
    fn valid_is_create_plus_update() {
        let counts = ActionCounts { create: 7, update: 2 };
        assert_eq!(counts.valid(), 9);
    }
}
