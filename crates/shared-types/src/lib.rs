//! # Shared Types Crate
//!
//! The directory data model shared by every subsystem: structured names,
//! entries and modifications, LDAP URLs and delegation targets, the caller's
//! referral-handling mode, and the error taxonomy with its protocol result
//! codes.
//!
//! ## Design Principles
//!
//! - **Names are immutable values**: a `Dn` compares by its normalized form
//!   but keeps the user-provided form for display and redirects.
//! - **Errors are protocol-shaped**: every `DirectoryError` maps to exactly one
//!   LDAP result code.

pub mod entry;
pub mod errors;
pub mod mode;
pub mod name;
pub mod url;

pub use entry::{
    Attribute, Entry, Modification, ModificationOp, OBJECT_CLASS, REFERRAL_CLASS, REF_ATTRIBUTE,
};
pub use errors::{DirectoryError, ResultCode};
pub use mode::ReferralMode;
pub use name::{Dn, Rdn};
pub use url::{escape_dn, DelegationTarget, LdapUrl};
