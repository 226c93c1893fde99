//! # Algorithms Module
//!
//! Ancestor walking and referral classification. Both are pure functions of
//! a partition snapshot, so classifying the same state twice gives the same
//! outcome.

pub mod policy;
pub mod walker;

pub use policy::{decide, redirect_targets, ReferralPolicy};
pub use walker::walk_ancestors;
