//! # Structured Names
//!
//! Distinguished names as ordered sequences of relative distinguished names
//! (RDNs), stored leaf first: `cn=Alex,o=MNN,c=WW` holds `[cn=Alex, o=MNN,
//! c=WW]`.
//!
//! Every RDN keeps the user-provided form (used for display and for building
//! referral URLs) next to a normalized form (used for equality and hashing).
//! The schema facade may replace the normalized attribute type with its
//! canonical name; values are normalized case-insensitively with internal
//! whitespace collapsed.

use crate::errors::DirectoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A single `type=value` naming component.
#[derive(Clone, Debug)]
pub struct Rdn {
    attr_type: String,
    value: String,
    norm_type: String,
    norm_value: String,
}

impl Rdn {
    /// Build an RDN from an attribute type and an unescaped value.
    pub fn new(attr_type: impl Into<String>, value: impl Into<String>) -> Result<Self, DirectoryError> {
        let attr_type = attr_type.into().trim().to_string();
        let value = value.into();

        if !is_valid_attr_type(&attr_type) {
            return Err(DirectoryError::InvalidName(format!(
                "invalid attribute type {:?}",
                attr_type
            )));
        }

        let norm_value = normalize_value(&value);
        if norm_value.is_empty() {
            return Err(DirectoryError::InvalidName(format!(
                "empty value for attribute type {}",
                attr_type
            )));
        }

        Ok(Self {
            norm_type: attr_type.to_ascii_lowercase(),
            attr_type,
            value,
            norm_value,
        })
    }

    /// Replace the normalized attribute type (schema canonical name or OID).
    pub fn with_canonical_type(mut self, canonical: &str) -> Self {
        self.norm_type = canonical.to_ascii_lowercase();
        self
    }

    /// Attribute type as provided by the user.
    pub fn attr_type(&self) -> &str {
        &self.attr_type
    }

    /// Unescaped value as provided by the user.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Normalized attribute type.
    pub fn norm_type(&self) -> &str {
        &self.norm_type
    }

    /// Normalized value.
    pub fn norm_value(&self) -> &str {
        &self.norm_value
    }

    /// Normalized `type=value` string.
    pub fn normalized(&self) -> String {
        format!("{}={}", self.norm_type, escape_value(&self.norm_value))
    }
}

impl PartialEq for Rdn {
    fn eq(&self, other: &Self) -> bool {
        self.norm_type == other.norm_type && self.norm_value == other.norm_value
    }
}

impl Eq for Rdn {}

impl Hash for Rdn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.norm_type.hash(state);
        self.norm_value.hash(state);
    }
}

impl fmt::Display for Rdn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.attr_type, escape_value(&self.value))
    }
}

impl FromStr for Rdn {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rdn(s)
    }
}

/// A distinguished name. The empty name is the root of the tree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Dn {
    rdns: Vec<Rdn>,
}

impl Dn {
    /// The empty (root) name.
    pub fn root() -> Self {
        Self { rdns: Vec::new() }
    }

    /// Parse a textual name such as `cn=Alex, o=MNN, c=WW`.
    pub fn parse(text: &str) -> Result<Self, DirectoryError> {
        if text.trim().is_empty() {
            return Ok(Self::root());
        }

        let rdns = split_unescaped(text, ',')
            .into_iter()
            .map(parse_rdn)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { rdns })
    }

    /// Build a name from RDNs ordered leaf first.
    pub fn from_rdns(rdns: Vec<Rdn>) -> Self {
        Self { rdns }
    }

    /// RDNs, leaf first.
    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Consume the name into its RDNs.
    pub fn into_rdns(self) -> Vec<Rdn> {
        self.rdns
    }

    /// Leaf RDN, `None` for the root.
    pub fn rdn(&self) -> Option<&Rdn> {
        self.rdns.first()
    }

    /// Number of RDNs (depth).
    pub fn len(&self) -> usize {
        self.rdns.len()
    }

    /// True for the root name.
    pub fn is_root(&self) -> bool {
        self.rdns.is_empty()
    }

    /// Immediate superior, `None` for the root.
    pub fn parent(&self) -> Option<Dn> {
        if self.rdns.is_empty() {
            return None;
        }
        Some(Self {
            rdns: self.rdns[1..].to_vec(),
        })
    }

    /// Name of a child of this entry.
    pub fn child(&self, rdn: Rdn) -> Dn {
        let mut rdns = Vec::with_capacity(self.rdns.len() + 1);
        rdns.push(rdn);
        rdns.extend_from_slice(&self.rdns);
        Self { rdns }
    }

    /// The ancestor-or-self holding the `depth` root-most RDNs.
    pub fn suffix(&self, depth: usize) -> Dn {
        let depth = depth.min(self.rdns.len());
        Self {
            rdns: self.rdns[self.rdns.len() - depth..].to_vec(),
        }
    }

    /// Strict ancestor test.
    pub fn is_ancestor_of(&self, other: &Dn) -> bool {
        self.rdns.len() < other.rdns.len() && self.is_ancestor_or_self_of(other)
    }

    /// Ancestor-or-equal test.
    pub fn is_ancestor_or_self_of(&self, other: &Dn) -> bool {
        self.rdns.len() <= other.rdns.len()
            && other.rdns[other.rdns.len() - self.rdns.len()..] == self.rdns[..]
    }

    /// Strict descendant test.
    pub fn is_descendant_of(&self, other: &Dn) -> bool {
        other.is_ancestor_of(self)
    }

    /// Leaf-side RDNs of `self` below `ancestor`, if `ancestor` is an
    /// ancestor-or-self.
    pub fn relative_to(&self, ancestor: &Dn) -> Option<&[Rdn]> {
        if !ancestor.is_ancestor_or_self_of(self) {
            return None;
        }
        Some(&self.rdns[..self.rdns.len() - ancestor.rdns.len()])
    }

    /// Replace the `old_base` suffix of this name with `new_base`.
    pub fn rebase(&self, old_base: &Dn, new_base: &Dn) -> Option<Dn> {
        let relative = self.relative_to(old_base)?;
        Some(Self::concat(relative, new_base))
    }

    /// `leaf_rdns` followed by `base`.
    pub fn concat(leaf_rdns: &[Rdn], base: &Dn) -> Dn {
        let mut rdns = Vec::with_capacity(leaf_rdns.len() + base.rdns.len());
        rdns.extend_from_slice(leaf_rdns);
        rdns.extend_from_slice(&base.rdns);
        Self { rdns }
    }

    /// Strict ancestors, nearest (parent) first, ending with the one-RDN name.
    pub fn ancestors(&self) -> impl Iterator<Item = Dn> + '_ {
        (1..self.rdns.len()).map(move |i| Dn {
            rdns: self.rdns[i..].to_vec(),
        })
    }

    /// Normalized string form, suitable as a storage key.
    pub fn normalized(&self) -> String {
        self.rdns
            .iter()
            .map(Rdn::normalized)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl PartialEq for Dn {
    fn eq(&self, other: &Self) -> bool {
        self.rdns == other.rdns
    }
}

impl Eq for Dn {}

impl Hash for Dn {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rdns.hash(state);
    }
}

impl fmt::Display for Dn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rdn) in self.rdns.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", rdn)?;
        }
        Ok(())
    }
}

impl FromStr for Dn {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Dn {
    type Error = DirectoryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Dn> for String {
    fn from(dn: Dn) -> Self {
        dn.to_string()
    }
}

fn parse_rdn(raw: &str) -> Result<Rdn, DirectoryError> {
    if split_unescaped(raw, '+').len() > 1 {
        return Err(DirectoryError::InvalidName(format!(
            "multi-valued RDN not supported: {:?}",
            raw.trim()
        )));
    }

    let eq = find_unescaped(raw, '=')
        .ok_or_else(|| DirectoryError::InvalidName(format!("missing '=' in {:?}", raw.trim())))?;

    let value = unescape(trim_value(&raw[eq + 1..]))?;
    Rdn::new(&raw[..eq], value)
}

fn split_unescaped(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == sep {
            parts.push(&input[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&input[start..]);
    parts
}

fn find_unescaped(input: &str, target: char) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in input.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == target {
            return Some(i);
        }
    }
    None
}

/// Strip insignificant leading and trailing spaces, keeping an escaped
/// trailing space.
fn trim_value(raw: &str) -> &str {
    let raw = raw.trim_start();
    let bytes = raw.as_bytes();
    let mut end = bytes.len();
    while end > 0 && bytes[end - 1] == b' ' {
        let backslashes = bytes[..end - 1]
            .iter()
            .rev()
            .take_while(|&&b| b == b'\\')
            .count();
        if backslashes % 2 == 1 {
            break;
        }
        end -= 1;
    }
    &raw[..end]
}

fn unescape(raw: &str) -> Result<String, DirectoryError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        if let Some(byte) = hex_pair(raw.get(i + 1..i + 3)) {
            out.push(byte);
            i += 3;
            continue;
        }

        match bytes.get(i + 1) {
            Some(c) if c.is_ascii() && !c.is_ascii_alphanumeric() => {
                out.push(*c);
                i += 2;
            }
            _ => {
                return Err(DirectoryError::InvalidName(format!(
                    "bad escape sequence in {:?}",
                    raw
                )))
            }
        }
    }

    String::from_utf8(out)
        .map_err(|_| DirectoryError::InvalidName(format!("escaped value is not UTF-8: {:?}", raw)))
}

/// Decode a two-digit hex escape such as `C3`.
pub(crate) fn hex_pair(digits: Option<&str>) -> Option<u8> {
    let mut byte = [0u8; 1];
    hex::decode_to_slice(digits?, &mut byte).ok()?;
    Some(byte[0])
}

fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let last = value.chars().count().saturating_sub(1);

    for (i, c) in value.chars().enumerate() {
        let special = matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=')
            || (i == 0 && (c == '#' || c == ' '))
            || (i == last && c == ' ');
        if special {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn normalize_value(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn is_valid_attr_type(attr_type: &str) -> bool {
    let mut chars = attr_type.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphanumeric() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';')
}
