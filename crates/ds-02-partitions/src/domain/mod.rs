//! # Domain Module
//!
//! Suffix ownership rules.

pub mod registry;

pub use registry::{PartitionRegistry, Superior};
