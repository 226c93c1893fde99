//! Operation kinds and the per-kind referral policy switch.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directory operation kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Add an entry.
    Add,
    /// Modify attributes.
    Modify,
    /// Delete a leaf entry.
    Delete,
    /// Move and/or rename an entry.
    Move,
    /// Search below a base.
    Search,
    /// Compare an attribute value.
    Compare,
    /// Read one entry.
    Lookup,
    /// Existence test.
    Exists,
}

impl OperationKind {
    /// True for operations that change stored entries.
    pub fn is_write(self) -> bool {
        matches!(self, Self::Add | Self::Modify | Self::Delete | Self::Move)
    }

    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Modify => "modify",
            Self::Delete => "delete",
            Self::Move => "move",
            Self::Search => "search",
            Self::Compare => "compare",
            Self::Lookup => "lookup",
            Self::Exists => "exists",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a target that is itself a referral entry redirects the
/// operation. Ancestor delegation is always honored; this only governs the
/// target's own `ref` values outside ManageDsaIt.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferralPolicyConfig {
    /// Kinds for which a referral target is handled as plain data.
    pub target_referral_as_data: Vec<OperationKind>,
}

impl ReferralPolicyConfig {
    /// True if a referral target redirects operations of `kind`.
    pub fn honors_target_referral(&self, kind: OperationKind) -> bool {
        !self.target_referral_as_data.contains(&kind)
    }
}
