//! # DS-01 Schema
//!
//! Name normalization and entry validation against registered attribute
//! types, object classes and syntaxes.
//!
//! **Subsystem ID:** 01
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The operation router never interprets schema itself; it consults a
//! long-lived, read-mostly [`SchemaFacade`] handed to it at construction:
//! - `normalize` turns text into a structured name with canonical attribute types
//! - `validate` checks an entry against its object classes and syntaxes
//! - `values_match` applies an attribute's equality matching rule
//!
//! ## Module Structure
//!
//! ```text
//! ds-01-schema/
//! ├── domain/          # AttributeType, ObjectClass, MatchingRule, syntax OIDs
//! ├── algorithms/      # Syntax checkers, entry validation, name normalization
//! ├── ports/           # SchemaFacade trait
//! └── adapters/        # In-memory registry
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemorySchema, SchemaBuilder};
pub use algorithms::{
    apache_syntax_checkers, canonical_attribute, normalize_dn, normalize_entry,
    standard_syntax_checkers, validate_entry, SyntaxChecker,
};
pub use domain::{
    syntaxes, AttributeType, AttributeUsage, MatchingRule, ObjectClass, ObjectClassKind,
    SchemaExtensions,
};
pub use ports::SchemaFacade;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
