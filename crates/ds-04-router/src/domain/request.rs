//! Operation requests, the in-flight context and responses.

use ds_03_referral::OperationKind;
use serde::{Deserialize, Serialize};
use shared_types::{Dn, Entry, Modification, Rdn, ReferralMode};

use super::filter::Filter;

/// How far below the base a search descends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchScope {
    /// The base entry only.
    Base,
    /// Immediate subordinates of the base.
    OneLevel,
    /// The base and everything below it.
    #[default]
    Subtree,
}

/// A directory operation.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationRequest {
    /// Add `entry` under its own name.
    Add {
        /// Entry to store.
        entry: Entry,
    },
    /// Apply attribute changes.
    Modify {
        /// Target name.
        dn: Dn,
        /// Changes, applied in order.
        changes: Vec<Modification>,
    },
    /// Delete a leaf entry.
    Delete {
        /// Target name.
        dn: Dn,
    },
    /// Move under a new superior and/or rename.
    Move {
        /// Entry to move.
        dn: Dn,
        /// New parent; `None` keeps the current one.
        new_superior: Option<Dn>,
        /// New RDN; `None` keeps the current one.
        new_rdn: Option<Rdn>,
        /// Drop the old RDN value from the entry.
        delete_old_rdn: bool,
    },
    /// Search below a base.
    Search {
        /// Search base.
        base: Dn,
        /// Depth.
        scope: SearchScope,
        /// Entry filter.
        filter: Filter,
    },
    /// Compare one attribute value.
    Compare {
        /// Target name.
        dn: Dn,
        /// Attribute type.
        attribute: String,
        /// Asserted value.
        value: String,
    },
    /// Read one entry.
    Lookup {
        /// Target name.
        dn: Dn,
    },
    /// Existence test.
    Exists {
        /// Target name.
        dn: Dn,
    },
}

impl OperationRequest {
    /// Operation kind.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Add { .. } => OperationKind::Add,
            Self::Modify { .. } => OperationKind::Modify,
            Self::Delete { .. } => OperationKind::Delete,
            Self::Move { .. } => OperationKind::Move,
            Self::Search { .. } => OperationKind::Search,
            Self::Compare { .. } => OperationKind::Compare,
            Self::Lookup { .. } => OperationKind::Lookup,
            Self::Exists { .. } => OperationKind::Exists,
        }
    }

    /// The name the operation addresses.
    pub fn target(&self) -> &Dn {
        match self {
            Self::Add { entry } => entry.dn(),
            Self::Modify { dn, .. }
            | Self::Delete { dn }
            | Self::Move { dn, .. }
            | Self::Compare { dn, .. }
            | Self::Lookup { dn }
            | Self::Exists { dn } => dn,
            Self::Search { base, .. } => base,
        }
    }
}

/// An operation in flight through the interceptor chain.
#[derive(Clone, Debug)]
pub struct OperationContext {
    /// The request; stages may augment it.
    pub request: OperationRequest,
    /// Referral handling chosen by the caller.
    pub mode: ReferralMode,
    /// Authenticated principal, `None` for anonymous.
    pub principal: Option<Dn>,
}

impl OperationContext {
    /// New context.
    pub fn new(request: OperationRequest, mode: ReferralMode, principal: Option<Dn>) -> Self {
        Self {
            request,
            mode,
            principal,
        }
    }

    /// Operation kind.
    pub fn kind(&self) -> OperationKind {
        self.request.kind()
    }

    /// Target name.
    pub fn target(&self) -> &Dn {
        self.request.target()
    }
}

/// A continuation reference met during a search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchReference {
    /// Name of the referral entry.
    pub dn: Dn,
    /// Continuation URLs, in registration order.
    pub urls: Vec<String>,
}

/// Search results.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResult {
    /// Matching entries, parents before children.
    pub entries: Vec<Entry>,
    /// Referral entries met below the base, or a referral base read as
    /// data (Throw mode).
    pub references: Vec<SearchReference>,
    /// True when delegated subtrees were skipped (Ignore mode).
    pub partial: bool,
}

impl SearchResult {
    /// Names of the matching entries.
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.dn().to_string()).collect()
    }
}

/// Successful operation results.
#[derive(Clone, Debug, PartialEq)]
pub enum OperationResponse {
    /// Write applied.
    Done,
    /// Entry read by lookup.
    Entry(Box<Entry>),
    /// Existence test result.
    Exists(bool),
    /// Compare result.
    Compared(bool),
    /// Search result.
    Search(SearchResult),
}
