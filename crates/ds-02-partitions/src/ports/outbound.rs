//! # Outbound Ports
//!
//! The storage interface every partition exposes to the router.

use async_trait::async_trait;
use shared_types::{DirectoryError, Dn, Entry};
use std::sync::Arc;

/// A consistent, read-only view of a partition's entries.
///
/// Obtained once per walk; later writes to the partition are not visible
/// through it.
pub trait PartitionView: Send + Sync {
    /// Entry stored under `dn`.
    fn get(&self, dn: &Dn) -> Option<&Entry>;

    /// True if `dn` names a stored entry.
    fn exists(&self, dn: &Dn) -> bool {
        self.get(dn).is_some()
    }

    /// Immediate subordinates of `dn`.
    fn children(&self, dn: &Dn) -> Vec<&Entry>;

    /// True if `dn` has at least one subordinate.
    fn has_children(&self, dn: &Dn) -> bool;

    /// `dn` and every entry below it, parents before children.
    fn subtree(&self, dn: &Dn) -> Vec<&Entry>;
}

/// Storage partition - outbound port.
///
/// Each partition owns the subtree rooted at its suffix and handles its own
/// internal concurrency. Errors other than the structural ones
/// (`NoSuchObject`, `AlreadyExists`, `NotAllowedOnNonLeaf`) are reported as
/// `StorageFailure` and surfaced unchanged.
#[async_trait]
pub trait Partition: Send + Sync {
    /// Partition identifier.
    fn id(&self) -> &str;

    /// Naming suffix owned by this partition.
    fn suffix(&self) -> &Dn;

    /// Point-in-time read view.
    async fn snapshot(&self) -> Result<Arc<dyn PartitionView>, DirectoryError>;

    /// Look up an entry.
    async fn get(&self, dn: &Dn) -> Result<Option<Entry>, DirectoryError> {
        Ok(self.snapshot().await?.get(dn).cloned())
    }

    /// Existence check.
    async fn exists(&self, dn: &Dn) -> Result<bool, DirectoryError> {
        Ok(self.snapshot().await?.exists(dn))
    }

    /// Store a new entry. The parent must exist unless the entry is the
    /// suffix itself.
    async fn create(&self, entry: Entry) -> Result<(), DirectoryError>;

    /// Replace an existing entry.
    async fn update(&self, entry: Entry) -> Result<(), DirectoryError>;

    /// Remove a leaf entry.
    async fn delete(&self, dn: &Dn) -> Result<(), DirectoryError>;

    /// Move the subtree at `from` to `entry.dn()`, storing `entry` as the new
    /// subtree root.
    async fn relocate(&self, from: &Dn, entry: Entry) -> Result<(), DirectoryError>;
}
