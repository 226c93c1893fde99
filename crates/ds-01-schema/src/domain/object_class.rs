//! # Object Classes
//!
//! Reference: RFC 4512 Section 4.1.1

use serde::{Deserialize, Serialize};

/// Object class kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClassKind {
    /// Only usable through subclasses (`top`).
    Abstract,
    /// Defines what an entry is; every entry needs one.
    Structural,
    /// Mixed in to add attributes.
    Auxiliary,
}

/// An object class definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectClass {
    /// Numeric OID.
    pub oid: String,
    /// Names, primary first.
    pub names: Vec<String>,
    /// Kind.
    pub kind: ObjectClassKind,
    /// Superclass names.
    #[serde(default)]
    pub superiors: Vec<String>,
    /// Required attribute names.
    #[serde(default)]
    pub must: Vec<String>,
    /// Allowed attribute names.
    #[serde(default)]
    pub may: Vec<String>,
}

impl ObjectClass {
    /// Create a class with no superiors or attributes.
    pub fn new(oid: &str, names: &[&str], kind: ObjectClassKind) -> Self {
        Self {
            oid: oid.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            kind,
            superiors: Vec::new(),
            must: Vec::new(),
            may: Vec::new(),
        }
    }

    /// Set superclasses.
    pub fn sup(mut self, superiors: &[&str]) -> Self {
        self.superiors = superiors.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set required attributes.
    pub fn must(mut self, attrs: &[&str]) -> Self {
        self.must = attrs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Set allowed attributes.
    pub fn may(mut self, attrs: &[&str]) -> Self {
        self.may = attrs.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Primary name, falling back to the OID.
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }
}
