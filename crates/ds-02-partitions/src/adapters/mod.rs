//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the `Partition` storage port.

mod memory;

pub use memory::InMemoryPartition;
