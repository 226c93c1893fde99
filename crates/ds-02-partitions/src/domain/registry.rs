//! Partition registry.
//!
//! Suffixes are pairwise disjoint: no registered suffix is equal to, above or
//! below another. Resolution therefore matches at most one partition.

use crate::ports::Partition;
use shared_types::{DirectoryError, Dn};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Deepest existing prefix of a name, and the partition holding it.
#[derive(Clone)]
pub struct Superior {
    /// Number of root-most RDNs of the name that denote an existing entry
    /// (0 when not even the suffix entry exists).
    pub matched: usize,
    /// Owning partition.
    pub partition: Arc<dyn Partition>,
}

impl fmt::Debug for Superior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Superior")
            .field("matched", &self.matched)
            .field("partition", &self.partition.id())
            .finish()
    }
}

/// Maps naming suffixes to the partitions that own them.
#[derive(Default)]
pub struct PartitionRegistry {
    partitions: Vec<Arc<dyn Partition>>,
}

impl PartitionRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a partition. Overlapping suffixes and duplicate ids are
    /// configuration errors.
    pub fn register(&mut self, partition: Arc<dyn Partition>) -> Result<(), DirectoryError> {
        let suffix = partition.suffix();

        if suffix.is_root() {
            return Err(DirectoryError::Configuration(format!(
                "partition {} cannot own the root name",
                partition.id()
            )));
        }

        for existing in &self.partitions {
            if existing.id() == partition.id() {
                return Err(DirectoryError::Configuration(format!(
                    "duplicate partition id {}",
                    partition.id()
                )));
            }
            let other = existing.suffix();
            if other.is_ancestor_or_self_of(suffix) || suffix.is_ancestor_or_self_of(other) {
                return Err(DirectoryError::Configuration(format!(
                    "suffix {} of partition {} overlaps {} of partition {}",
                    suffix,
                    partition.id(),
                    other,
                    existing.id()
                )));
            }
        }

        info!(
            "[ds-02] Registered partition {} for suffix {}",
            partition.id(),
            suffix
        );
        self.partitions.push(partition);
        Ok(())
    }

    /// Partition whose suffix is an ancestor-or-self of `dn`, or `None` when
    /// the name is not covered.
    pub fn resolve(&self, dn: &Dn) -> Option<Arc<dyn Partition>> {
        // Disjointness means at most one candidate; longest match is kept
        // regardless.
        self.partitions
            .iter()
            .filter(|p| p.suffix().is_ancestor_or_self_of(dn))
            .max_by_key(|p| p.suffix().len())
            .cloned()
    }

    /// Walk `dn` from its full length down to the owning suffix and report
    /// the first prefix that exists.
    pub async fn find_existing_superior(&self, dn: &Dn) -> Result<Option<Superior>, DirectoryError> {
        let Some(partition) = self.resolve(dn) else {
            return Ok(None);
        };

        let view = partition.snapshot().await?;
        let floor = partition.suffix().len();

        let matched = (floor..=dn.len())
            .rev()
            .find(|&depth| view.exists(&dn.suffix(depth)))
            .unwrap_or(0);

        debug!(
            "[ds-02] Existing superior of {}: {} of {} RDNs in {}",
            dn,
            matched,
            dn.len(),
            partition.id()
        );

        Ok(Some(Superior { matched, partition }))
    }

    /// Suffixes of every registered partition, in registration order.
    pub fn naming_contexts(&self) -> Vec<Dn> {
        self.partitions.iter().map(|p| p.suffix().clone()).collect()
    }

    /// Partition by id.
    pub fn get(&self, id: &str) -> Option<Arc<dyn Partition>> {
        self.partitions.iter().find(|p| p.id() == id).cloned()
    }

    /// All partitions.
    pub fn partitions(&self) -> &[Arc<dyn Partition>] {
        &self.partitions
    }

    /// Number of registered partitions.
    pub fn len(&self) -> usize {
        self.partitions.len()
    }

    /// True when nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }
}
