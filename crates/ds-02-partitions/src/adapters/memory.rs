//! In-memory partition.
//!
//! Entries live in an ordered map keyed so that a subtree is one contiguous
//! key range. The map sits behind an `Arc`; snapshots share it and writers
//! copy it on first write while a snapshot is outstanding.

use crate::ports::{Partition, PartitionView};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{DirectoryError, Dn, Entry};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

type EntryMap = BTreeMap<String, Entry>;

/// Root-first storage key. Normalized RDNs escape `,`, so a name's key is a
/// strict prefix of every descendant's key.
fn storage_key(dn: &Dn) -> String {
    let mut key = String::new();
    for rdn in dn.rdns().iter().rev() {
        key.push_str(&rdn.normalized());
        key.push(',');
    }
    key
}

/// In-memory partition with copy-on-write snapshots.
pub struct InMemoryPartition {
    id: String,
    suffix: Dn,
    entries: RwLock<Arc<EntryMap>>,
}

impl InMemoryPartition {
    /// Create an empty partition owning `suffix`.
    pub fn new(id: impl Into<String>, suffix: Dn) -> Self {
        Self {
            id: id.into(),
            suffix,
            entries: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    fn check_owned(&self, dn: &Dn) -> Result<(), DirectoryError> {
        if self.suffix.is_ancestor_or_self_of(dn) {
            Ok(())
        } else {
            Err(DirectoryError::StorageFailure(format!(
                "{} is outside partition {} ({})",
                dn, self.id, self.suffix
            )))
        }
    }

    fn check_parent(&self, map: &EntryMap, dn: &Dn) -> Result<(), DirectoryError> {
        if dn == &self.suffix {
            return Ok(());
        }
        match dn.parent() {
            Some(parent) if map.contains_key(&storage_key(&parent)) => Ok(()),
            Some(parent) => Err(DirectoryError::NoSuchObject(parent.to_string())),
            None => Err(DirectoryError::NoSuchObject(dn.to_string())),
        }
    }
}

fn subtree_keys(map: &EntryMap, key: &str) -> Vec<String> {
    map.range(key.to_string()..)
        .take_while(|(k, _)| k.starts_with(key))
        .map(|(k, _)| k.clone())
        .collect()
}

#[async_trait]
impl Partition for InMemoryPartition {
    fn id(&self) -> &str {
        &self.id
    }

    fn suffix(&self) -> &Dn {
        &self.suffix
    }

    async fn snapshot(&self) -> Result<Arc<dyn PartitionView>, DirectoryError> {
        let entries = Arc::clone(&self.entries.read());
        Ok(Arc::new(MemoryView { entries }))
    }

    async fn create(&self, entry: Entry) -> Result<(), DirectoryError> {
        let dn = entry.dn().clone();
        self.check_owned(&dn)?;
        debug!("[ds-02] {}: create {}", self.id, dn);

        let mut guard = self.entries.write();
        let map = Arc::make_mut(&mut guard);
        let key = storage_key(&dn);
        if map.contains_key(&key) {
            return Err(DirectoryError::AlreadyExists(dn.to_string()));
        }
        self.check_parent(map, &dn)?;
        map.insert(key, entry);
        Ok(())
    }

    async fn update(&self, entry: Entry) -> Result<(), DirectoryError> {
        let dn = entry.dn().clone();
        self.check_owned(&dn)?;
        debug!("[ds-02] {}: update {}", self.id, dn);

        let mut guard = self.entries.write();
        let map = Arc::make_mut(&mut guard);
        match map.get_mut(&storage_key(&dn)) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => Err(DirectoryError::NoSuchObject(dn.to_string())),
        }
    }

    async fn delete(&self, dn: &Dn) -> Result<(), DirectoryError> {
        self.check_owned(dn)?;
        debug!("[ds-02] {}: delete {}", self.id, dn);

        let mut guard = self.entries.write();
        let key = storage_key(dn);
        if !guard.contains_key(&key) {
            return Err(DirectoryError::NoSuchObject(dn.to_string()));
        }
        if subtree_keys(&guard, &key).len() > 1 {
            return Err(DirectoryError::NotAllowedOnNonLeaf(dn.to_string()));
        }
        Arc::make_mut(&mut guard).remove(&key);
        Ok(())
    }

    async fn relocate(&self, from: &Dn, entry: Entry) -> Result<(), DirectoryError> {
        let to = entry.dn().clone();
        self.check_owned(from)?;
        self.check_owned(&to)?;
        debug!("[ds-02] {}: relocate {} -> {}", self.id, from, to);

        if from.is_ancestor_of(&to) {
            return Err(DirectoryError::UnwillingToPerform(format!(
                "cannot move {} below itself",
                from
            )));
        }

        let mut guard = self.entries.write();
        let map = Arc::make_mut(&mut guard);

        let from_key = storage_key(from);
        if !map.contains_key(&from_key) {
            return Err(DirectoryError::NoSuchObject(from.to_string()));
        }
        let to_key = storage_key(&to);
        if to_key != from_key && map.contains_key(&to_key) {
            return Err(DirectoryError::AlreadyExists(to.to_string()));
        }
        self.check_parent(map, &to)?;

        let keys = subtree_keys(map, &from_key);
        let mut moved = Vec::with_capacity(keys.len());
        for key in keys {
            if let Some(mut child) = map.remove(&key) {
                if child.dn() == from {
                    moved.push(entry.clone());
                    continue;
                }
                if let Some(new_dn) = child.dn().rebase(from, &to) {
                    child.set_dn(new_dn);
                }
                moved.push(child);
            }
        }
        for child in moved {
            map.insert(storage_key(child.dn()), child);
        }
        Ok(())
    }
}

/// Snapshot of an in-memory partition.
struct MemoryView {
    entries: Arc<EntryMap>,
}

impl PartitionView for MemoryView {
    fn get(&self, dn: &Dn) -> Option<&Entry> {
        self.entries.get(&storage_key(dn))
    }

    fn children(&self, dn: &Dn) -> Vec<&Entry> {
        let depth = dn.len() + 1;
        self.subtree(dn)
            .into_iter()
            .filter(|e| e.dn().len() == depth)
            .collect()
    }

    fn has_children(&self, dn: &Dn) -> bool {
        let key = storage_key(dn);
        self.entries
            .range(key.clone()..)
            .take_while(|(k, _)| k.starts_with(&key))
            .nth(1)
            .is_some()
    }

    fn subtree(&self, dn: &Dn) -> Vec<&Entry> {
        let key = storage_key(dn);
        self.entries
            .range(key.clone()..)
            .take_while(|(k, _)| k.starts_with(&key))
            .map(|(_, e)| e)
            .collect()
    }
}
