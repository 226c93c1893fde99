//! # Search Filters
//!
//! The RFC 4515 subset used by the core: presence, equality, and, or, not.
//!
//! ```text
//! (objectClass=*)
//! (&(objectClass=person)(cn=Alex Karasulu))
//! (|(ou=Roles)(!(cn=*)))
//! ```

use ds_01_schema::SchemaFacade;
use shared_types::{DirectoryError, Entry};
use std::fmt;
use std::str::FromStr;

/// A search filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Filter {
    /// `(attr=*)`
    Present(String),
    /// `(attr=value)`
    Equality {
        /// Attribute type.
        attribute: String,
        /// Asserted value (unescaped).
        value: String,
    },
    /// `(&...)`; empty matches everything.
    And(Vec<Filter>),
    /// `(|...)`; empty matches nothing.
    Or(Vec<Filter>),
    /// `(!...)`
    Not(Box<Filter>),
}

impl Filter {
    /// `(objectClass=*)`.
    pub fn everything() -> Self {
        Self::Present("objectClass".to_string())
    }

    /// Parse a filter string.
    pub fn parse(text: &str) -> Result<Self, DirectoryError> {
        let mut parser = Parser {
            input: text.trim(),
            pos: 0,
        };
        let filter = parser.filter()?;
        if parser.pos != parser.input.len() {
            return Err(parser.error("trailing characters"));
        }
        Ok(filter)
    }

    /// Evaluate against `entry`, matching attribute aliases and values with
    /// the schema's equality rules. Unknown attributes never match.
    pub fn matches(&self, entry: &Entry, schema: &dyn SchemaFacade) -> bool {
        match self {
            Self::Present(attribute) => {
                !attribute_values(entry, schema, attribute).is_empty()
            }
            Self::Equality { attribute, value } => {
                let Some(at) = schema.attribute_type(attribute) else {
                    return false;
                };
                attribute_values(entry, schema, attribute)
                    .iter()
                    .any(|v| at.equality.matches(v, value))
            }
            Self::And(filters) => filters.iter().all(|f| f.matches(entry, schema)),
            Self::Or(filters) => filters.iter().any(|f| f.matches(entry, schema)),
            Self::Not(filter) => !filter.matches(entry, schema),
        }
    }
}

/// Every value stored under any name of `attribute`.
fn attribute_values<'e>(entry: &'e Entry, schema: &dyn SchemaFacade, attribute: &str) -> Vec<&'e String> {
    match schema.attribute_type(attribute) {
        Some(at) => at
            .names
            .iter()
            .chain(std::iter::once(&at.oid))
            .flat_map(|name| entry.values(name))
            .collect(),
        None => Vec::new(),
    }
}

impl FromStr for Filter {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present(attribute) => write!(f, "({}=*)", attribute),
            Self::Equality { attribute, value } => {
                write!(f, "({}={})", attribute, escape_assertion(value))
            }
            Self::And(filters) => {
                f.write_str("(&")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Self::Or(filters) => {
                f.write_str("(|")?;
                for filter in filters {
                    write!(f, "{}", filter)?;
                }
                f.write_str(")")
            }
            Self::Not(filter) => write!(f, "(!{})", filter),
        }
    }
}

fn escape_assertion(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => out.push_str("\\2a"),
            '(' => out.push_str("\\28"),
            ')' => out.push_str("\\29"),
            '\\' => out.push_str("\\5c"),
            '\0' => out.push_str("\\00"),
            _ => out.push(c),
        }
    }
    out
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn error(&self, reason: &str) -> DirectoryError {
        DirectoryError::UnwillingToPerform(format!(
            "invalid filter {:?} at {}: {}",
            self.input, self.pos, reason
        ))
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }

    fn expect(&mut self, byte: u8) -> Result<(), DirectoryError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(&format!("expected {:?}", byte as char)))
        }
    }

    fn skip_spaces(&mut self) {
        while self.peek() == Some(b' ') {
            self.pos += 1;
        }
    }

    fn filter(&mut self) -> Result<Filter, DirectoryError> {
        self.skip_spaces();
        self.expect(b'(')?;
        let filter = match self.peek() {
            Some(b'&') => {
                self.pos += 1;
                Filter::And(self.filter_list()?)
            }
            Some(b'|') => {
                self.pos += 1;
                Filter::Or(self.filter_list()?)
            }
            Some(b'!') => {
                self.pos += 1;
                Filter::Not(Box::new(self.filter()?))
            }
            Some(_) => self.item()?,
            None => return Err(self.error("unexpected end")),
        };
        self.skip_spaces();
        self.expect(b')')?;
        Ok(filter)
    }

    fn filter_list(&mut self) -> Result<Vec<Filter>, DirectoryError> {
        let mut filters = Vec::new();
        loop {
            self.skip_spaces();
            if self.peek() != Some(b'(') {
                return Ok(filters);
            }
            filters.push(self.filter()?);
        }
    }

    fn item(&mut self) -> Result<Filter, DirectoryError> {
        let input = self.input;
        let rest = &input[self.pos..];
        let eq = rest.find('=').ok_or_else(|| self.error("missing '='"))?;
        let attribute = rest[..eq].trim();
        if attribute.is_empty()
            || !attribute
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';')
        {
            return Err(self.error("bad attribute description"));
        }
        if matches!(attribute.as_bytes().last(), Some(b'~' | b'<' | b'>' | b':')) {
            return Err(self.error("unsupported match type"));
        }

        let value_start = self.pos + eq + 1;
        let close = input[value_start..]
            .find(')')
            .map(|i| value_start + i)
            .ok_or_else(|| self.error("unterminated item"))?;
        let raw = &input[value_start..close];
        self.pos = close;

        if raw == "*" {
            return Ok(Filter::Present(attribute.to_string()));
        }
        if raw.contains('*') {
            return Err(self.error("substring assertions are not supported"));
        }
        Ok(Filter::Equality {
            attribute: attribute.to_string(),
            value: unescape_assertion(raw).ok_or_else(|| self.error("bad escape"))?,
        })
    }
}

fn unescape_assertion(raw: &str) -> Option<String> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' {
            let mut byte = [0u8; 1];
            hex::decode_to_slice(raw.get(i + 1..i + 3)?, &mut byte).ok()?;
            out.push(byte[0]);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
