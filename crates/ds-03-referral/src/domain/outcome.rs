//! Classified operation outcomes.

use shared_types::{escape_dn, DirectoryError, Dn};
use std::fmt;

/// Where a redirected operation continues.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget {
    /// `scheme://host[:port]` of the delegated server.
    pub location: String,
    /// The operation's name as that server knows it.
    pub remainder: Dn,
}

impl RedirectTarget {
    /// Continuation reference URL, with unsafe characters percent-escaped.
    pub fn to_url(&self) -> String {
        format!("{}/{}", self.location, escape_dn(&self.remainder.to_string()))
    }
}

impl fmt::Display for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_url())
    }
}

/// Result of referral classification. Built once per operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Dispatch to the owning partition.
    Proceed,
    /// Name does not exist (or delegation is not honored).
    NotFound,
    /// Delegation found and the caller asked to ignore referrals.
    PartialResult,
    /// Continue at these targets, in registration order.
    Redirect {
        /// Ordered redirect targets.
        targets: Vec<RedirectTarget>,
    },
    /// The operation would cross into another naming context.
    AffectsMultipleNamingContexts,
}

impl Outcome {
    /// True for `Proceed`.
    pub fn is_proceed(&self) -> bool {
        matches!(self, Self::Proceed)
    }

    /// Short label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Proceed => "proceed",
            Self::NotFound => "not_found",
            Self::PartialResult => "partial_result",
            Self::Redirect { .. } => "redirect",
            Self::AffectsMultipleNamingContexts => "affects_multiple_naming_contexts",
        }
    }

    /// Map to the caller-visible result. `name` is reported for name-level
    /// failures.
    pub fn into_result(self, name: &Dn) -> Result<(), DirectoryError> {
        match self {
            Self::Proceed => Ok(()),
            Self::NotFound => Err(DirectoryError::NoSuchObject(name.to_string())),
            Self::PartialResult => Err(DirectoryError::PartialResult),
            Self::Redirect { targets } => Err(DirectoryError::Referral {
                urls: targets.iter().map(RedirectTarget::to_url).collect(),
            }),
            Self::AffectsMultipleNamingContexts => {
                Err(DirectoryError::AffectsMultipleDsas(name.to_string()))
            }
        }
    }
}
