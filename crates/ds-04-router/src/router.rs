//! # Operation Router
//!
//! Orchestrates schema checks, partition resolution, ancestor walking and
//! referral classification for each operation kind. Classification only
//! reads from a partition snapshot; only `Proceed` writes reach storage.
//!
//! ## Order of checks
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | add       | normalize → partition → already exists → schema → classify parent → create |
//! | modify    | normalize → partition → classify target → apply → schema → update |
//! | delete    | normalize → partition → classify target → leaf check → delete |
//! | move      | normalize → destination rule → classify source → same partition → schema → relocate |
//! | search    | normalize → partition → classify base → descend, reporting referrals met below |
//! | compare   | normalize → partition → classify target → equality match |

use crate::domain::{
    Filter, OperationContext, OperationRequest, OperationResponse, SearchReference, SearchResult,
    SearchScope,
};
use crate::ports::OperationHandler;
use async_trait::async_trait;
use dashmap::DashMap;
use ds_01_schema::SchemaFacade;
use ds_02_partitions::{Partition, PartitionRegistry, PartitionView, Superior};
use ds_03_referral::{
    redirect_targets, walk_ancestors, Delegation, OperationKind, Outcome, RedirectTarget,
    ReferralPolicy,
};
use shared_types::{DirectoryError, Dn, Entry, Modification, Rdn, ReferralMode};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

/// Per-name async locks for mutations.
///
/// Mutations of the same normalized name are serialized; different names
/// proceed concurrently. Reads never lock.
#[derive(Default)]
pub struct NameLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl NameLocks {
    /// Empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock every name in `names`. Keys are taken in sorted order so two
    /// multi-name operations cannot deadlock.
    pub async fn acquire(&self, names: &[&Dn]) -> NameGuard<'_> {
        let mut keys: Vec<String> = names.iter().map(|dn| dn.normalized()).collect();
        keys.sort();
        keys.dedup();

        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            let lock = Arc::clone(self.locks.entry(key).or_default().value());
            guards.push(lock.lock_owned().await);
        }
        NameGuard {
            table: self,
            guards,
        }
    }

    /// Drop table entries nobody holds or waits for.
    pub fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }

    /// Number of tracked names.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    /// True when no name is tracked.
    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Locks held by one mutation. Dropping releases them and prunes the table.
pub struct NameGuard<'a> {
    table: &'a NameLocks,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl NameGuard<'_> {
    /// Number of distinct names held.
    pub fn len(&self) -> usize {
        self.guards.len()
    }

    /// True when no name is held.
    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl Drop for NameGuard<'_> {
    fn drop(&mut self) {
        self.guards.clear();
        self.table.prune();
    }
}

/// Referral-aware operation router.
pub struct OperationRouter {
    schema: Arc<dyn SchemaFacade>,
    partitions: Arc<PartitionRegistry>,
    policy: ReferralPolicy,
    locks: NameLocks,
}

impl OperationRouter {
    /// Create a router over a populated schema and partition registry.
    pub fn new(
        schema: Arc<dyn SchemaFacade>,
        partitions: Arc<PartitionRegistry>,
        policy: ReferralPolicy,
    ) -> Self {
        Self {
            schema,
            partitions,
            policy,
            locks: NameLocks::new(),
        }
    }

    /// Schema facade.
    pub fn schema(&self) -> &Arc<dyn SchemaFacade> {
        &self.schema
    }

    /// Partition registry.
    pub fn partitions(&self) -> &Arc<PartitionRegistry> {
        &self.partitions
    }

    /// Suffixes of the registered partitions.
    pub fn naming_contexts(&self) -> Vec<Dn> {
        self.partitions.naming_contexts()
    }

    /// Mutation lock table.
    pub fn locks(&self) -> &NameLocks {
        &self.locks
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Add `entry`.
    pub async fn add(&self, entry: Entry, mode: ReferralMode) -> Result<(), DirectoryError> {
        let dn = self.schema.normalize_dn(entry.dn().clone())?;
        let mut entry = self.schema.normalize_entry(entry);
        entry.set_dn(dn.clone());

        let partition = self.partition_for(&dn)?;
        let _guard = self.locks.acquire(&[&dn]).await;
        let view = partition.snapshot().await?;

        if view.exists(&dn) {
            return Err(DirectoryError::AlreadyExists(dn.to_string()));
        }

        self.schema.validate(&entry)?;

        if let Some(parent) = dn.parent().filter(|_| &dn != partition.suffix()) {
            let walk = walk_ancestors(&parent, partition.suffix(), view.as_ref());
            let outcome = self
                .policy
                .classify_add(mode, &dn, &parent, view.get(&parent), &walk);
            check(OperationKind::Add, &dn, outcome)?;
        }

        partition.create(entry).await
    }

    /// Apply `changes` to the entry at `dn`.
    pub async fn modify(
        &self,
        dn: Dn,
        changes: Vec<Modification>,
        mode: ReferralMode,
    ) -> Result<(), DirectoryError> {
        let dn = self.schema.normalize_dn(dn)?;
        let changes: Vec<Modification> = changes
            .into_iter()
            .map(|mut change| {
                change.attribute = self.schema.canonical_attribute(&change.attribute);
                change
            })
            .collect();

        let partition = self.partition_for(&dn)?;
        let _guard = self.locks.acquire(&[&dn]).await;
        let view = partition.snapshot().await?;

        let outcome = self.classify(OperationKind::Modify, mode, &dn, partition.as_ref(), view.as_ref());
        check(OperationKind::Modify, &dn, outcome)?;

        let mut updated = existing(view.as_ref(), &dn)?;
        updated.apply(&changes)?;
        self.schema.validate(&updated)?;

        partition.update(updated).await
    }

    /// Delete the leaf entry at `dn`.
    pub async fn delete(&self, dn: Dn, mode: ReferralMode) -> Result<(), DirectoryError> {
        let dn = self.schema.normalize_dn(dn)?;
        let partition = self.partition_for(&dn)?;
        let _guard = self.locks.acquire(&[&dn]).await;
        let view = partition.snapshot().await?;

        let outcome = self.classify(OperationKind::Delete, mode, &dn, partition.as_ref(), view.as_ref());
        check(OperationKind::Delete, &dn, outcome)?;

        if view.has_children(&dn) {
            return Err(DirectoryError::NotAllowedOnNonLeaf(dn.to_string()));
        }

        partition.delete(&dn).await
    }

    /// Move `dn` under `new_superior` and/or rename it to `new_rdn`.
    pub async fn move_entry(
        &self,
        dn: Dn,
        new_superior: Option<Dn>,
        new_rdn: Option<Rdn>,
        delete_old_rdn: bool,
        mode: ReferralMode,
    ) -> Result<(), DirectoryError> {
        if new_superior.is_none() && new_rdn.is_none() {
            return Err(DirectoryError::UnwillingToPerform(
                "move needs a new superior or a new RDN".into(),
            ));
        }

        let dn = self.schema.normalize_dn(dn)?;
        let new_superior = new_superior
            .map(|sup| self.schema.normalize_dn(sup))
            .transpose()?;
        let new_rdn = new_rdn.map(|rdn| self.normalize_rdn(rdn)).transpose()?;

        let source = self.partition_for(&dn)?;
        let (Some(current_parent), Some(current_rdn)) = (dn.parent(), dn.rdn().cloned()) else {
            return Err(DirectoryError::UnwillingToPerform("cannot move the root".into()));
        };
        if &dn == source.suffix() {
            return Err(DirectoryError::UnwillingToPerform(format!(
                "cannot move naming context {}",
                dn
            )));
        }

        let parent = new_superior.clone().unwrap_or(current_parent);
        let new_dn = parent.child(new_rdn.clone().unwrap_or(current_rdn));

        let _guard = self.locks.acquire(&[&dn, &new_dn]).await;
        let view = source.snapshot().await?;

        // The destination rule dominates the source classification.
        let destination = match &new_superior {
            Some(superior) => {
                let Superior {
                    matched,
                    partition: target,
                } = self
                    .partitions
                    .find_existing_superior(superior)
                    .await?
                    .ok_or_else(|| DirectoryError::NoSuchObject(superior.to_string()))?;
                let target_view = if target.id() == source.id() {
                    Arc::clone(&view)
                } else {
                    target.snapshot().await?
                };
                let walk = walk_ancestors(superior, target.suffix(), target_view.as_ref());
                let outcome = self.policy.classify_move_destination(
                    superior,
                    target_view.get(superior),
                    &walk,
                );
                if outcome == Outcome::AffectsMultipleNamingContexts {
                    return check(OperationKind::Move, &dn, outcome);
                }
                Some((superior, target, matched))
            }
            None => None,
        };

        let outcome = self.classify(OperationKind::Move, mode, &dn, source.as_ref(), view.as_ref());
        check(OperationKind::Move, &dn, outcome)?;

        if let Some((superior, target, matched)) = destination {
            if matched < superior.len() {
                debug!(
                    "[ds-04] move {}: new superior {} missing, nearest existing is {}",
                    dn,
                    superior,
                    superior.suffix(matched)
                );
                return Err(DirectoryError::NoSuchObject(superior.to_string()));
            }
            if target.id() != source.id() {
                debug!(
                    "[ds-04] move {} -> {} crosses partitions {} and {}",
                    dn,
                    new_dn,
                    source.id(),
                    target.id()
                );
                return Err(DirectoryError::AffectsMultipleDsas(dn.to_string()));
            }
        }

        if dn.is_ancestor_of(&new_dn) {
            return Err(DirectoryError::UnwillingToPerform(format!(
                "cannot move {} below itself",
                dn
            )));
        }
        if new_dn != dn && view.exists(&new_dn) {
            return Err(DirectoryError::AlreadyExists(new_dn.to_string()));
        }

        let mut moved = existing(view.as_ref(), &dn)?;
        moved.set_dn(new_dn.clone());
        if let Some(rdn) = &new_rdn {
            moved.push_value(rdn.norm_type(), rdn.value());
            if delete_old_rdn {
                if let Some(old) = dn.rdn().filter(|old| *old != rdn) {
                    moved.remove_value(old.norm_type(), old.value());
                }
            }
        }
        self.schema.validate(&moved)?;

        source.relocate(&dn, moved).await
    }

    /// Search below `base`.
    pub async fn search(
        &self,
        base: Dn,
        scope: SearchScope,
        filter: &Filter,
        mode: ReferralMode,
    ) -> Result<SearchResult, DirectoryError> {
        let base = self.schema.normalize_dn(base)?;
        let partition = self.partition_for(&base)?;
        let view = partition.snapshot().await?;

        let outcome = self.classify(OperationKind::Search, mode, &base, partition.as_ref(), view.as_ref());
        check(OperationKind::Search, &base, outcome)?;

        let mut candidates: Vec<&Entry> = match scope {
            SearchScope::Base => view.get(&base).into_iter().collect(),
            SearchScope::OneLevel => view.children(&base),
            SearchScope::Subtree => view.subtree(&base),
        };
        let mut result = SearchResult::default();

        // A referral base read as data still delegates everything below it.
        if let Some(entry) = view.get(&base).filter(|e| e.is_referral() && !mode.manages_dsa_it()) {
            candidates.retain(|candidate| candidate.dn() == &base);
            if scope != SearchScope::Base {
                if mode == ReferralMode::Ignore {
                    result.partial = true;
                } else {
                    result.references.push(reference(entry));
                }
            }
        }

        let mut delegated: Vec<&Dn> = Vec::new();

        for entry in candidates {
            if delegated.iter().any(|point| point.is_ancestor_of(entry.dn())) {
                continue;
            }

            let below_base = entry.dn() != &base;
            if below_base && entry.is_referral() && !mode.manages_dsa_it() {
                delegated.push(entry.dn());
                if mode == ReferralMode::Ignore {
                    result.partial = true;
                } else {
                    result.references.push(reference(entry));
                }
                continue;
            }

            if filter.matches(entry, self.schema.as_ref()) {
                result.entries.push(entry.clone());
            }
        }

        debug!(
            "[ds-04] search {} ({:?}, {}) returned {} entries, {} references{}",
            base,
            scope,
            filter,
            result.entries.len(),
            result.references.len(),
            if result.partial { ", partial" } else { "" }
        );
        Ok(result)
    }

    /// Compare `value` against `attribute` of the entry at `dn`.
    pub async fn compare(
        &self,
        dn: Dn,
        attribute: &str,
        value: &str,
        mode: ReferralMode,
    ) -> Result<bool, DirectoryError> {
        let entry = self.read(OperationKind::Compare, dn, mode).await?;

        let at = self
            .schema
            .attribute_type(attribute)
            .ok_or_else(|| DirectoryError::UndefinedAttributeType(attribute.to_string()))?;
        let values: Vec<&String> = at
            .names
            .iter()
            .chain(std::iter::once(&at.oid))
            .flat_map(|name| entry.values(name))
            .collect();
        if values.is_empty() {
            return Err(DirectoryError::NoSuchAttribute {
                dn: entry.dn().to_string(),
                attribute: attribute.to_string(),
            });
        }

        Ok(values.iter().any(|v| at.equality.matches(v, value)))
    }

    /// Read the entry at `dn`.
    pub async fn lookup(&self, dn: Dn, mode: ReferralMode) -> Result<Entry, DirectoryError> {
        self.read(OperationKind::Lookup, dn, mode).await
    }

    /// True if `dn` exists. Delegation outcomes are still reported as errors.
    pub async fn exists(&self, dn: Dn, mode: ReferralMode) -> Result<bool, DirectoryError> {
        match self.read(OperationKind::Exists, dn, mode).await {
            Ok(_) => Ok(true),
            Err(DirectoryError::NoSuchObject(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    async fn read(
        &self,
        kind: OperationKind,
        dn: Dn,
        mode: ReferralMode,
    ) -> Result<Entry, DirectoryError> {
        let dn = self.schema.normalize_dn(dn)?;
        let partition = self.partition_for(&dn)?;
        let view = partition.snapshot().await?;

        let outcome = self.classify(kind, mode, &dn, partition.as_ref(), view.as_ref());
        check(kind, &dn, outcome)?;
        existing(view.as_ref(), &dn)
    }

    fn partition_for(&self, dn: &Dn) -> Result<Arc<dyn Partition>, DirectoryError> {
        self.partitions
            .resolve(dn)
            .ok_or_else(|| DirectoryError::NoSuchObject(dn.to_string()))
    }

    fn classify(
        &self,
        kind: OperationKind,
        mode: ReferralMode,
        dn: &Dn,
        partition: &dyn Partition,
        view: &dyn PartitionView,
    ) -> Outcome {
        let walk = walk_ancestors(dn, partition.suffix(), view);
        self.policy.classify(kind, mode, dn, view.get(dn), &walk)
    }

    fn normalize_rdn(&self, rdn: Rdn) -> Result<Rdn, DirectoryError> {
        self.schema
            .normalize_dn(Dn::from_rdns(vec![rdn]))?
            .into_rdns()
            .pop()
            .ok_or_else(|| DirectoryError::InvalidName("empty RDN".into()))
    }
}

fn check(kind: OperationKind, dn: &Dn, outcome: Outcome) -> Result<(), DirectoryError> {
    if !outcome.is_proceed() {
        debug!("[ds-04] {} {} stopped: {}", kind, dn, outcome.label());
    }
    outcome.into_result(dn)
}

/// Continuation reference for a referral entry met by a search.
fn reference(entry: &Entry) -> SearchReference {
    let delegation = Delegation::from_entry(entry.dn().clone(), entry);
    SearchReference {
        dn: entry.dn().clone(),
        urls: redirect_targets(&delegation, entry.dn())
            .iter()
            .map(RedirectTarget::to_url)
            .collect(),
    }
}

fn existing(view: &dyn PartitionView, dn: &Dn) -> Result<Entry, DirectoryError> {
    view.get(dn)
        .cloned()
        .ok_or_else(|| DirectoryError::NoSuchObject(dn.to_string()))
}

#[async_trait]
impl OperationHandler for OperationRouter {
    async fn handle(&self, ctx: &mut OperationContext) -> Result<OperationResponse, DirectoryError> {
        let mode = ctx.mode;
        match ctx.request.clone() {
            OperationRequest::Add { entry } => {
                self.add(entry, mode).await?;
                Ok(OperationResponse::Done)
            }
            OperationRequest::Modify { dn, changes } => {
                self.modify(dn, changes, mode).await?;
                Ok(OperationResponse::Done)
            }
            OperationRequest::Delete { dn } => {
                self.delete(dn, mode).await?;
                Ok(OperationResponse::Done)
            }
            OperationRequest::Move {
                dn,
                new_superior,
                new_rdn,
                delete_old_rdn,
            } => {
                self.move_entry(dn, new_superior, new_rdn, delete_old_rdn, mode)
                    .await?;
                Ok(OperationResponse::Done)
            }
            OperationRequest::Search {
                base,
                scope,
                filter,
            } => Ok(OperationResponse::Search(
                self.search(base, scope, &filter, mode).await?,
            )),
            OperationRequest::Compare {
                dn,
                attribute,
                value,
            } => Ok(OperationResponse::Compared(
                self.compare(dn, &attribute, &value, mode).await?,
            )),
            OperationRequest::Lookup { dn } => {
                Ok(OperationResponse::Entry(Box::new(self.lookup(dn, mode).await?)))
            }
            OperationRequest::Exists { dn } => {
                Ok(OperationResponse::Exists(self.exists(dn, mode).await?))
            }
        }
    }
}
