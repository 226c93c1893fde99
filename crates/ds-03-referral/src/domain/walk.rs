//! Ancestor walk results.

use shared_types::{DelegationTarget, Dn, Entry};

/// One visited ancestor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AncestorStep {
    /// Ancestor name (a prefix of the walked name).
    pub dn: Dn,
    /// Stored entry, `None` if absent.
    pub entry: Option<Entry>,
}

/// A delegation point and its targets.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delegation {
    /// Name of the referral entry, as a prefix of the walked name.
    pub point: Dn,
    /// Targets from the entry's `ref` values, in registration order.
    pub targets: Vec<DelegationTarget>,
}

impl Delegation {
    /// Delegation described by a referral entry reached as `point`.
    pub fn from_entry(point: Dn, entry: &Entry) -> Self {
        Self {
            point,
            targets: entry.delegation_targets(),
        }
    }
}

/// Ancestors of a name from its parent toward the partition suffix,
/// truncated at the first referral entry.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AncestorWalk {
    /// Visited ancestors, nearest first.
    pub steps: Vec<AncestorStep>,
    /// Nearest referral ancestor, if any.
    pub delegation: Option<Delegation>,
}

impl AncestorWalk {
    /// True if a referral entry was met.
    pub fn is_delegated(&self) -> bool {
        self.delegation.is_some()
    }

    /// The immediate parent's entry, if the parent was visited and exists.
    pub fn parent(&self) -> Option<&Entry> {
        self.steps.first().and_then(|s| s.entry.as_ref())
    }
}
