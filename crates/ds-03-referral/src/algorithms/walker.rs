//! # Ancestor Walker
//!
//! Visits the ancestors of a name from the immediate parent toward the
//! partition suffix (inclusive). The first referral entry ends the walk: the
//! nearest delegation point takes precedence over farther ones.

use crate::domain::{AncestorStep, AncestorWalk, Delegation};
use ds_02_partitions::PartitionView;
use shared_types::Dn;
use tracing::debug;

/// Walk the ancestors of `name` inside the partition owning `suffix`.
///
/// Names equal to the suffix, or outside it, have no ancestors in the
/// partition and produce an empty walk.
pub fn walk_ancestors(name: &Dn, suffix: &Dn, view: &dyn PartitionView) -> AncestorWalk {
    let mut walk = AncestorWalk::default();
    if !suffix.is_ancestor_of(name) {
        return walk;
    }

    for ancestor in name.ancestors() {
        if ancestor.len() < suffix.len() {
            break;
        }

        let entry = view.get(&ancestor).cloned();
        let delegation = entry
            .as_ref()
            .filter(|e| e.is_referral())
            .map(|e| Delegation::from_entry(ancestor.clone(), e));

        walk.steps.push(AncestorStep {
            dn: ancestor,
            entry,
        });

        if let Some(delegation) = delegation {
            debug!(
                "[ds-03] {} is delegated at {} ({} targets)",
                name,
                delegation.point,
                delegation.targets.len()
            );
            walk.delegation = Some(delegation);
            break;
        }
    }

    walk
}
