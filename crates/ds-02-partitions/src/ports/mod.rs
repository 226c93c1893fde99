//! # Ports Layer

pub mod outbound;

pub use outbound::{Partition, PartitionView};
