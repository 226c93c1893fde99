//! # Entries
//!
//! An entry maps attribute identifiers to one or more values and always
//! carries an `objectClass` set once it has passed schema validation.
//! Attribute identifiers are matched case-insensitively; values keep their
//! insertion order, which is significant for `ref` (delegation targets are
//! surfaced in registration order).

use crate::errors::DirectoryError;
use crate::name::Dn;
use crate::url::DelegationTarget;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// `objectClass` attribute identifier.
pub const OBJECT_CLASS: &str = "objectclass";

/// Object class marking a referral entry.
pub const REFERRAL_CLASS: &str = "referral";

/// Attribute holding delegation targets.
pub const REF_ATTRIBUTE: &str = "ref";

/// A named attribute with its values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Identifier as provided by the user.
    pub id: String,
    /// Values in insertion order.
    pub values: Vec<String>,
}

impl Attribute {
    /// Create an attribute.
    pub fn new(id: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            id: id.into(),
            values,
        }
    }

    /// Case-insensitive value membership.
    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v.eq_ignore_ascii_case(value))
    }
}

/// Kind of change applied by a modify operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModificationOp {
    /// Add values (creating the attribute if needed).
    Add,
    /// Remove the listed values, or the whole attribute if none are listed.
    Remove,
    /// Replace all values; an empty list removes the attribute.
    Replace,
}

/// One change in a modify request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modification {
    /// Change kind.
    pub op: ModificationOp,
    /// Attribute identifier.
    pub attribute: String,
    /// Values involved.
    pub values: Vec<String>,
}

impl Modification {
    /// Add values.
    pub fn add(attribute: impl Into<String>, values: &[&str]) -> Self {
        Self::with(ModificationOp::Add, attribute, values)
    }

    /// Remove values (or the whole attribute when `values` is empty).
    pub fn remove(attribute: impl Into<String>, values: &[&str]) -> Self {
        Self::with(ModificationOp::Remove, attribute, values)
    }

    /// Replace values.
    pub fn replace(attribute: impl Into<String>, values: &[&str]) -> Self {
        Self::with(ModificationOp::Replace, attribute, values)
    }

    fn with(op: ModificationOp, attribute: impl Into<String>, values: &[&str]) -> Self {
        Self {
            op,
            attribute: attribute.into(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }
}

/// A directory entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    dn: Dn,
    attributes: BTreeMap<String, Attribute>,
}

impl Entry {
    /// Empty entry at `dn`.
    pub fn new(dn: Dn) -> Self {
        Self {
            dn,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style attribute insertion (values are appended).
    pub fn with(mut self, id: &str, values: &[&str]) -> Self {
        for value in values {
            self.push_value(id, value);
        }
        self
    }

    /// Entry name.
    pub fn dn(&self) -> &Dn {
        &self.dn
    }

    /// Rename the entry (attributes are untouched).
    pub fn set_dn(&mut self, dn: Dn) {
        self.dn = dn;
    }

    /// Look up an attribute case-insensitively.
    pub fn get(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(&id.to_ascii_lowercase())
    }

    /// Values of an attribute (empty when absent).
    pub fn values(&self, id: &str) -> &[String] {
        self.get(id).map(|a| a.values.as_slice()).unwrap_or(&[])
    }

    /// Case-insensitive membership test.
    pub fn contains_value(&self, id: &str, value: &str) -> bool {
        self.get(id).is_some_and(|a| a.contains(value))
    }

    /// All attributes, keyed by lowercase identifier.
    pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
        self.attributes.values()
    }

    /// Append a value unless already present. Returns `false` on duplicates.
    pub fn push_value(&mut self, id: &str, value: &str) -> bool {
        let attr = self
            .attributes
            .entry(id.to_ascii_lowercase())
            .or_insert_with(|| Attribute::new(id, Vec::new()));
        if attr.contains(value) {
            return false;
        }
        attr.values.push(value.to_string());
        true
    }

    /// Replace all values of an attribute; empty `values` removes it.
    pub fn put(&mut self, id: &str, values: Vec<String>) {
        if values.is_empty() {
            self.attributes.remove(&id.to_ascii_lowercase());
        } else {
            self.attributes
                .insert(id.to_ascii_lowercase(), Attribute::new(id, values));
        }
    }

    /// Remove a single value; the attribute disappears with its last value.
    pub fn remove_value(&mut self, id: &str, value: &str) -> bool {
        let key = id.to_ascii_lowercase();
        let Some(attr) = self.attributes.get_mut(&key) else {
            return false;
        };
        let before = attr.values.len();
        attr.values.retain(|v| !v.eq_ignore_ascii_case(value));
        let removed = attr.values.len() != before;
        if attr.values.is_empty() {
            self.attributes.remove(&key);
        }
        removed
    }

    /// Remove an attribute entirely.
    pub fn remove_attribute(&mut self, id: &str) -> Option<Attribute> {
        self.attributes.remove(&id.to_ascii_lowercase())
    }

    /// `objectClass` values.
    pub fn object_classes(&self) -> &[String] {
        self.values(OBJECT_CLASS)
    }

    /// Case-insensitive object class test.
    pub fn has_object_class(&self, class: &str) -> bool {
        self.contains_value(OBJECT_CLASS, class)
    }

    /// True when the entry is a referral (delegation point).
    pub fn is_referral(&self) -> bool {
        self.has_object_class(REFERRAL_CLASS)
    }

    /// Delegation targets from `ref`, in registration order. Unparseable
    /// values are skipped.
    pub fn delegation_targets(&self) -> Vec<DelegationTarget> {
        self.values(REF_ATTRIBUTE)
            .iter()
            .filter_map(|value| match DelegationTarget::from_ref(value) {
                Ok(target) => Some(target),
                Err(e) => {
                    warn!(dn = %self.dn, value = %value, error = %e, "Skipping unusable ref value");
                    None
                }
            })
            .collect()
    }

    /// Apply a modify request. Schema conformance is checked by the caller.
    pub fn apply(&mut self, changes: &[Modification]) -> Result<(), DirectoryError> {
        for change in changes {
            match change.op {
                ModificationOp::Add => {
                    for value in &change.values {
                        if !self.push_value(&change.attribute, value) {
                            return Err(DirectoryError::AttributeOrValueExists {
                                attribute: change.attribute.clone(),
                                value: value.clone(),
                            });
                        }
                    }
                }
                ModificationOp::Remove if change.values.is_empty() => {
                    if self.remove_attribute(&change.attribute).is_none() {
                        return Err(self.no_such_attribute(&change.attribute));
                    }
                }
                ModificationOp::Remove => {
                    for value in &change.values {
                        if !self.remove_value(&change.attribute, value) {
                            return Err(self.no_such_attribute(&change.attribute));
                        }
                    }
                }
                ModificationOp::Replace => {
                    self.put(&change.attribute, change.values.clone());
                }
            }
        }
        Ok(())
    }

    fn no_such_attribute(&self, attribute: &str) -> DirectoryError {
        DirectoryError::NoSuchAttribute {
            dn: self.dn.to_string(),
            attribute: attribute.to_string(),
        }
    }
}
