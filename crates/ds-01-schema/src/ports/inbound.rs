//! # Inbound Ports
//!
//! What the router asks of the schema subsystem.

use crate::algorithms::{canonical_attribute, normalize_dn, normalize_entry, validate_entry, SyntaxChecker};
use crate::domain::{AttributeType, ObjectClass};
use shared_types::{DirectoryError, Dn, Entry};

/// Schema facade - inbound port.
///
/// Implementors supply the three registry lookups; normalization, validation
/// and matching are derived from them.
pub trait SchemaFacade: Send + Sync {
    /// Attribute type by name, alias or OID (case-insensitive).
    fn attribute_type(&self, name: &str) -> Option<&AttributeType>;

    /// Object class by name or OID (case-insensitive).
    fn object_class(&self, name: &str) -> Option<&ObjectClass>;

    /// Syntax checker for a syntax OID.
    fn syntax_checker(&self, oid: &str) -> Option<&dyn SyntaxChecker>;

    /// Parse and normalize a textual name.
    fn normalize(&self, text: &str) -> Result<Dn, DirectoryError> {
        self.normalize_dn(Dn::parse(text)?)
    }

    /// Normalize an already parsed name.
    fn normalize_dn(&self, dn: Dn) -> Result<Dn, DirectoryError> {
        normalize_dn(self, dn)
    }

    /// Store attributes under their primary names.
    fn normalize_entry(&self, entry: Entry) -> Entry {
        normalize_entry(self, entry)
    }

    /// Primary name of an attribute identifier (unknown ids unchanged).
    fn canonical_attribute(&self, id: &str) -> String {
        canonical_attribute(self, id)
    }

    /// Check an entry against its object classes.
    fn validate(&self, entry: &Entry) -> Result<(), DirectoryError> {
        validate_entry(self, entry)
    }

    /// Equality match of two values of `attribute`.
    fn values_match(&self, attribute: &str, a: &str, b: &str) -> Result<bool, DirectoryError> {
        let at = self
            .attribute_type(attribute)
            .ok_or_else(|| DirectoryError::UndefinedAttributeType(attribute.to_string()))?;
        Ok(at.equality.matches(a, b))
    }
}
