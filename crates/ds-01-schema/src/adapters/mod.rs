//! # Adapters Layer (Hexagonal Architecture)
//!
//! Registry implementations of the schema facade.

mod in_memory;

pub use in_memory::{InMemorySchema, SchemaBuilder};
