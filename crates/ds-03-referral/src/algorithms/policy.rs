//! # Referral Policy Engine
//!
//! Turns the facts gathered for one operation (does the target exist, the
//! nearest ancestor delegation, is the target itself a referral) into an
//! [`Outcome`] under the caller's [`ReferralMode`].

use crate::domain::{AncestorWalk, Delegation, OperationKind, Outcome, RedirectTarget, ReferralPolicyConfig};
use shared_types::{Dn, Entry, ReferralMode};
use tracing::debug;

/// Referral classification with the configured target-referral policy.
#[derive(Clone, Debug, Default)]
pub struct ReferralPolicy {
    config: ReferralPolicyConfig,
}

impl ReferralPolicy {
    /// Create a policy.
    pub fn new(config: ReferralPolicyConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &ReferralPolicyConfig {
        &self.config
    }

    /// Classify an operation on `name`, whose own entry is `target`.
    pub fn classify(
        &self,
        kind: OperationKind,
        mode: ReferralMode,
        name: &Dn,
        target: Option<&Entry>,
        walk: &AncestorWalk,
    ) -> Outcome {
        self.classify_at(kind, mode, name, name, target, walk)
    }

    /// Classify an add of `name`: the parent plays the target role, while
    /// redirect remainders are computed against the full new name. A referral
    /// parent is an ancestor of the new entry, so it always delegates outside
    /// ManageDsaIt whatever the target-referral configuration says.
    pub fn classify_add(
        &self,
        mode: ReferralMode,
        name: &Dn,
        parent_dn: &Dn,
        parent: Option<&Entry>,
        parent_walk: &AncestorWalk,
    ) -> Outcome {
        let parent_referral = parent
            .filter(|e| e.is_referral())
            .map(|e| Delegation::from_entry(parent_dn.clone(), e));

        let outcome = decide(
            parent.is_some(),
            parent_walk.delegation.as_ref(),
            parent_referral.as_ref(),
            mode,
            name,
        );
        log_outcome(OperationKind::Add, mode, name, &outcome);
        outcome
    }

    /// Classify the destination of a move. A new superior that is, or sits
    /// below, a referral entry belongs to a foreign naming context; the move
    /// is rejected in every mode rather than redirected.
    pub fn classify_move_destination(
        &self,
        new_superior: &Dn,
        superior: Option<&Entry>,
        walk: &AncestorWalk,
    ) -> Outcome {
        let outcome = if walk.is_delegated() || superior.is_some_and(Entry::is_referral) {
            Outcome::AffectsMultipleNamingContexts
        } else if superior.is_none() {
            Outcome::NotFound
        } else {
            Outcome::Proceed
        };
        debug!(
            "[ds-03] move destination {} classified as {}",
            new_superior,
            outcome.label()
        );
        outcome
    }

    fn classify_at(
        &self,
        kind: OperationKind,
        mode: ReferralMode,
        name: &Dn,
        target_dn: &Dn,
        target: Option<&Entry>,
        walk: &AncestorWalk,
    ) -> Outcome {
        let target_referral = target
            .filter(|e| e.is_referral() && self.config.honors_target_referral(kind))
            .map(|e| Delegation::from_entry(target_dn.clone(), e));

        let outcome = decide(
            target.is_some(),
            walk.delegation.as_ref(),
            target_referral.as_ref(),
            mode,
            name,
        );
        log_outcome(kind, mode, name, &outcome);
        outcome
    }
}

fn log_outcome(kind: OperationKind, mode: ReferralMode, name: &Dn, outcome: &Outcome) {
    debug!(
        "[ds-03] {} {} under {} classified as {}",
        kind,
        name,
        mode,
        outcome.label()
    );
}

/// The decision table. Ancestor delegation dominates; the target's own
/// delegation is only consulted when no ancestor is delegated.
pub fn decide(
    target_exists: bool,
    ancestor: Option<&Delegation>,
    target_referral: Option<&Delegation>,
    mode: ReferralMode,
    name: &Dn,
) -> Outcome {
    if mode == ReferralMode::ManageDsaIt {
        return if target_exists {
            Outcome::Proceed
        } else {
            Outcome::NotFound
        };
    }

    if let Some(delegation) = ancestor {
        return delegated(delegation, mode, name);
    }

    if !target_exists {
        return Outcome::NotFound;
    }

    match target_referral {
        Some(delegation) => delegated(delegation, mode, name),
        None => Outcome::Proceed,
    }
}

fn delegated(delegation: &Delegation, mode: ReferralMode, name: &Dn) -> Outcome {
    match mode {
        ReferralMode::Ignore => Outcome::PartialResult,
        _ => Outcome::Redirect {
            targets: redirect_targets(delegation, name),
        },
    }
}

/// Replace the delegation point in `name` with each target's base,
/// keeping the unresolved leaf RDNs.
pub fn redirect_targets(delegation: &Delegation, name: &Dn) -> Vec<RedirectTarget> {
    let unresolved = name.relative_to(&delegation.point).unwrap_or(&[]);
    delegation
        .targets
        .iter()
        .map(|target| RedirectTarget {
            location: target.location.clone(),
            remainder: Dn::concat(unresolved, &target.base),
        })
        .collect()
}
