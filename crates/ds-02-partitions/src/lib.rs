//! # DS-02 Partitions
//!
//! Ownership of naming suffixes by storage partitions.
//!
//! **Subsystem ID:** 02
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! - Register partitions under disjoint suffixes (overlap is a fatal
//!   configuration error)
//! - Resolve the partition owning a name (longest matching suffix)
//! - Find the deepest existing superior of a name that does not exist yet
//! - Hand out read snapshots so a walk sees one consistent view
//!
//! ## Module Structure
//!
//! ```text
//! ds-02-partitions/
//! ├── domain/          # PartitionRegistry, Superior
//! ├── ports/           # Partition (storage) and PartitionView (snapshot) traits
//! └── adapters/        # Copy-on-write in-memory partition
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::InMemoryPartition;
pub use domain::{PartitionRegistry, Superior};
pub use ports::{Partition, PartitionView};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
