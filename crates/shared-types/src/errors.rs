//! # Error Types
//!
//! The directory error taxonomy shared by every subsystem, and the LDAP
//! result codes each error is reported with.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// LDAP result codes (RFC 4511 Section 4.1.9).
///
/// `PartialResults` is the LDAPv2 code that JNDI-style clients still map to a
/// partial-result failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum ResultCode {
    Success = 0,
    OperationsError = 1,
    CompareFalse = 5,
    CompareTrue = 6,
    PartialResults = 9,
    Referral = 10,
    NoSuchAttribute = 16,
    UndefinedAttributeType = 17,
    AttributeOrValueExists = 20,
    InvalidAttributeSyntax = 21,
    NoSuchObject = 32,
    InvalidDnSyntax = 34,
    InsufficientAccessRights = 50,
    UnwillingToPerform = 53,
    ObjectClassViolation = 65,
    NotAllowedOnNonLeaf = 66,
    EntryAlreadyExists = 68,
    AffectsMultipleDsas = 71,
    Other = 80,
}

impl ResultCode {
    /// Numeric protocol value.
    pub fn code(self) -> u16 {
        self as u16
    }
}

/// Errors raised by directory operations.
///
/// Referral-related variants (`Referral`, `PartialResult`,
/// `AffectsMultipleDsas`, and `NoSuchObject` produced by delegation) are
/// ordinary control outcomes handed back to the caller, not internal faults.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DirectoryError {
    /// Malformed distinguished name.
    #[error("Invalid DN syntax: {0}")]
    InvalidName(String),

    /// Entry does not conform to its object classes.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// A value is rejected by its attribute's syntax checker.
    #[error("Invalid syntax for attribute {attribute}: {value:?}")]
    InvalidAttributeSyntax {
        /// Attribute type name
        attribute: String,
        /// Offending value
        value: String,
    },

    /// Attribute type is not registered in the schema.
    #[error("Undefined attribute type: {0}")]
    UndefinedAttributeType(String),

    /// Target entry does not exist.
    #[error("No such object: {0}")]
    NoSuchObject(String),

    /// Entry already exists.
    #[error("Entry already exists: {0}")]
    AlreadyExists(String),

    /// Delete of an entry that still has subordinates.
    #[error("Not allowed on non-leaf entry: {0}")]
    NotAllowedOnNonLeaf(String),

    /// Attribute (or value) missing from the entry.
    #[error("No such attribute {attribute} in {dn}")]
    NoSuchAttribute {
        /// Entry name
        dn: String,
        /// Attribute type name
        attribute: String,
    },

    /// Value being added is already present.
    #[error("Attribute or value exists: {attribute}={value}")]
    AttributeOrValueExists {
        /// Attribute type name
        attribute: String,
        /// Duplicate value
        value: String,
    },

    /// Delegation was found and the caller asked for referrals to be ignored.
    #[error("Partial result: part of the name is delegated to another server")]
    PartialResult,

    /// Delegation was found; the caller must continue at one of these URLs.
    #[error("Referral: {}", urls.join(" "))]
    Referral {
        /// Continuation references, in registration order
        urls: Vec<String>,
    },

    /// The operation would span more than one naming context.
    #[error("Operation affects multiple naming contexts: {0}")]
    AffectsMultipleDsas(String),

    /// Denied by access control.
    #[error("Insufficient access rights: {0}")]
    InsufficientAccessRights(String),

    /// Request is understood but refused.
    #[error("Unwilling to perform: {0}")]
    UnwillingToPerform(String),

    /// Opaque failure surfaced unchanged from a partition.
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Fatal service configuration error (startup only).
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl DirectoryError {
    /// Protocol result code for this error.
    pub fn result_code(&self) -> ResultCode {
        match self {
            Self::InvalidName(_) => ResultCode::InvalidDnSyntax,
            Self::SchemaViolation(_) => ResultCode::ObjectClassViolation,
            Self::InvalidAttributeSyntax { .. } => ResultCode::InvalidAttributeSyntax,
            Self::UndefinedAttributeType(_) => ResultCode::UndefinedAttributeType,
            Self::NoSuchObject(_) => ResultCode::NoSuchObject,
            Self::AlreadyExists(_) => ResultCode::EntryAlreadyExists,
            Self::NotAllowedOnNonLeaf(_) => ResultCode::NotAllowedOnNonLeaf,
            Self::NoSuchAttribute { .. } => ResultCode::NoSuchAttribute,
            Self::AttributeOrValueExists { .. } => ResultCode::AttributeOrValueExists,
            Self::PartialResult => ResultCode::PartialResults,
            Self::Referral { .. } => ResultCode::Referral,
            Self::AffectsMultipleDsas(_) => ResultCode::AffectsMultipleDsas,
            Self::InsufficientAccessRights(_) => ResultCode::InsufficientAccessRights,
            Self::UnwillingToPerform(_) => ResultCode::UnwillingToPerform,
            Self::StorageFailure(_) => ResultCode::OperationsError,
            Self::Configuration(_) => ResultCode::Other,
        }
    }

    /// True for outcomes produced by referral classification.
    pub fn is_referral_outcome(&self) -> bool {
        matches!(
            self,
            Self::Referral { .. } | Self::PartialResult | Self::AffectsMultipleDsas(_)
        )
    }
}
