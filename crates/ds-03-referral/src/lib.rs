//! # DS-03 Referral Resolution
//!
//! Decides what happens to an operation when part of its target name has
//! been delegated to another server.
//!
//! **Subsystem ID:** 03
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Walk a name's ancestors bottom-up over a partition snapshot, stopping
//!   at the nearest referral entry
//! - Classify the walk under the caller's referral mode into an [`Outcome`]
//! - Reject moves into a foreign naming context
//! - Build redirect URLs from delegation targets and the unresolved part of
//!   the name
//!
//! ## Decision Table
//!
//! | target exists | ancestor delegation | target is referral | mode        | outcome        |
//! |---------------|---------------------|--------------------|-------------|----------------|
//! | no            | no                  | -                  | any         | NotFound       |
//! | no            | yes                 | -                  | Throw       | Redirect       |
//! | no            | yes                 | -                  | Ignore      | PartialResult  |
//! | no            | yes                 | -                  | ManageDsaIt | NotFound       |
//! | yes           | no                  | yes                | Throw       | Redirect       |
//! | yes           | no                  | yes                | Ignore      | PartialResult  |
//! | yes           | -                   | -                  | ManageDsaIt | Proceed        |
//! | yes           | no                  | no                 | any         | Proceed        |
//!
//! ## Module Structure
//!
//! ```text
//! ds-03-referral/
//! ├── domain/          # Outcome, RedirectTarget, AncestorWalk, OperationKind, policy config
//! └── algorithms/      # walk_ancestors, ReferralPolicy
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod algorithms;
pub mod domain;

// Re-exports
pub use algorithms::{decide, redirect_targets, walk_ancestors, ReferralPolicy};
pub use domain::{
    AncestorStep, AncestorWalk, Delegation, OperationKind, Outcome, RedirectTarget,
    ReferralPolicyConfig,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
