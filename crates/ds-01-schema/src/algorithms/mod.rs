//! # Algorithms Module
//!
//! Syntax checking, entry validation and name normalization.

pub mod normalize;
pub mod syntax;
pub mod validation;

pub use normalize::{canonical_attribute, normalize_dn, normalize_entry};
pub use syntax::{apache_syntax_checkers, standard_syntax_checkers, SyntaxChecker};
pub use validation::validate_entry;
