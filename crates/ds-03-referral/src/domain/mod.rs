//! # Domain Module
//!
//! Per-operation, short-lived values produced during referral resolution.

pub mod kind;
pub mod outcome;
pub mod walk;

pub use kind::{OperationKind, ReferralPolicyConfig};
pub use outcome::{Outcome, RedirectTarget};
pub use walk::{AncestorStep, AncestorWalk, Delegation};
