//! # Attribute Types
//!
//! Reference: RFC 4512 Section 4.1.2

use serde::{Deserialize, Serialize};
use shared_types::Dn;

/// Whether an attribute holds user data or is maintained by the server.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeUsage {
    /// Ordinary user attribute.
    #[default]
    UserApplications,
    /// Operational attribute (timestamps, creators, ...).
    DirectoryOperation,
}

/// Equality matching rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchingRule {
    /// caseIgnoreMatch: case-folded, insignificant spaces collapsed.
    #[default]
    CaseIgnore,
    /// caseExactMatch: insignificant spaces collapsed.
    CaseExact,
    /// integerMatch.
    Integer,
    /// booleanMatch.
    Boolean,
    /// distinguishedNameMatch.
    DistinguishedName,
}

impl MatchingRule {
    /// Compare two assertion values under this rule. Values that cannot be
    /// interpreted under the rule never match.
    pub fn matches(self, a: &str, b: &str) -> bool {
        match self {
            Self::CaseIgnore => fold_spaces(a).to_lowercase() == fold_spaces(b).to_lowercase(),
            Self::CaseExact => fold_spaces(a) == fold_spaces(b),
            Self::Integer => match (a.trim().parse::<i128>(), b.trim().parse::<i128>()) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            },
            Self::Boolean => a.trim().eq_ignore_ascii_case(b.trim()),
            Self::DistinguishedName => match (Dn::parse(a), Dn::parse(b)) {
                (Ok(x), Ok(y)) => x == y,
                _ => false,
            },
        }
    }
}

fn fold_spaces(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// An attribute type definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeType {
    /// Numeric OID.
    pub oid: String,
    /// Names, primary first.
    pub names: Vec<String>,
    /// Syntax OID.
    pub syntax: String,
    /// Equality rule.
    #[serde(default)]
    pub equality: MatchingRule,
    /// At most one value allowed.
    #[serde(default)]
    pub single_value: bool,
    /// User or operational.
    #[serde(default)]
    pub usage: AttributeUsage,
}

impl AttributeType {
    /// Create a multi-valued, case-ignore user attribute.
    pub fn new(oid: &str, names: &[&str], syntax: &str) -> Self {
        Self {
            oid: oid.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            syntax: syntax.to_string(),
            equality: MatchingRule::CaseIgnore,
            single_value: false,
            usage: AttributeUsage::UserApplications,
        }
    }

    /// Set the equality rule.
    pub fn equality(mut self, rule: MatchingRule) -> Self {
        self.equality = rule;
        self
    }

    /// Mark single-valued.
    pub fn single_valued(mut self) -> Self {
        self.single_value = true;
        self
    }

    /// Mark operational.
    pub fn operational(mut self) -> Self {
        self.usage = AttributeUsage::DirectoryOperation;
        self
    }

    /// Primary name, falling back to the OID.
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or(&self.oid)
    }

    /// True for server-maintained attributes.
    pub fn is_operational(&self) -> bool {
        self.usage == AttributeUsage::DirectoryOperation
    }
}
