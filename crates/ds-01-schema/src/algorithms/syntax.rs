//! # Syntax Checkers
//!
//! Value-level syntax validation keyed by syntax OID.
//!
//! Reference: RFC 4517 Section 3.3; the Java primitive syntaxes registered by
//! the Apache schema producer.

use crate::domain::syntaxes;
use shared_types::Dn;

/// Validates values of one syntax.
pub trait SyntaxChecker: Send + Sync {
    /// Syntax OID this checker handles.
    fn oid(&self) -> &str;

    /// True if `value` conforms.
    fn is_valid(&self, value: &str) -> bool;
}

/// Directory String: any non-empty UTF-8 string.
pub struct DirectoryStringChecker;

impl SyntaxChecker for DirectoryStringChecker {
    fn oid(&self) -> &str {
        syntaxes::DIRECTORY_STRING
    }

    fn is_valid(&self, value: &str) -> bool {
        !value.is_empty()
    }
}

/// IA5 String: ASCII only.
pub struct Ia5StringChecker;

impl SyntaxChecker for Ia5StringChecker {
    fn oid(&self) -> &str {
        syntaxes::IA5_STRING
    }

    fn is_valid(&self, value: &str) -> bool {
        value.is_ascii()
    }
}

/// Integer: optional minus sign, no leading zeros, no negative zero.
pub struct IntegerChecker;

impl SyntaxChecker for IntegerChecker {
    fn oid(&self) -> &str {
        syntaxes::INTEGER
    }

    fn is_valid(&self, value: &str) -> bool {
        is_integer(value)
    }
}

/// Boolean: `TRUE` or `FALSE`.
pub struct BooleanChecker;

impl SyntaxChecker for BooleanChecker {
    fn oid(&self) -> &str {
        syntaxes::BOOLEAN
    }

    fn is_valid(&self, value: &str) -> bool {
        value == "TRUE" || value == "FALSE"
    }
}

/// Distinguished Name.
pub struct DnChecker;

impl SyntaxChecker for DnChecker {
    fn oid(&self) -> &str {
        syntaxes::DN
    }

    fn is_valid(&self, value: &str) -> bool {
        Dn::parse(value).is_ok()
    }
}

/// OID: numeric OID or a descriptor.
pub struct OidChecker;

impl SyntaxChecker for OidChecker {
    fn oid(&self) -> &str {
        syntaxes::OID
    }

    fn is_valid(&self, value: &str) -> bool {
        let mut chars = value.chars();
        match chars.next() {
            Some(c) if c.is_ascii_alphabetic() => {
                chars.all(|c| c.is_ascii_alphanumeric() || c == '-')
            }
            Some(c) if c.is_ascii_digit() => value
                .split('.')
                .all(|arc| !arc.is_empty() && arc.bytes().all(|b| b.is_ascii_digit())),
            _ => false,
        }
    }
}

/// Generalized Time: `YYYYMMDDHH[MM[SS[(.|,)fraction]]]` followed by `Z` or
/// a `+HHMM`/`-HHMM` offset.
pub struct GeneralizedTimeChecker;

impl SyntaxChecker for GeneralizedTimeChecker {
    fn oid(&self) -> &str {
        syntaxes::GENERALIZED_TIME
    }

    fn is_valid(&self, value: &str) -> bool {
        let (body, zone) = if let Some(body) = value.strip_suffix('Z') {
            (body, "")
        } else if let Some(pos) = value.rfind(['+', '-']) {
            (&value[..pos], &value[pos + 1..])
        } else {
            return false;
        };

        if !zone.is_empty() && !(zone.len() == 4 && zone.bytes().all(|b| b.is_ascii_digit())) {
            return false;
        }

        let (digits, fraction) = match body.find(['.', ',']) {
            Some(pos) => (&body[..pos], Some(&body[pos + 1..])),
            None => (body, None),
        };

        if !matches!(digits.len(), 10 | 12 | 14) || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        if let Some(fraction) = fraction {
            if fraction.is_empty() || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
        }

        let field = |range: std::ops::Range<usize>| digits[range].parse::<u32>().unwrap_or(u32::MAX);
        let month = field(4..6);
        let day = field(6..8);
        let hour = field(8..10);
        (1..=12).contains(&month) && (1..=31).contains(&day) && hour <= 23
    }
}

/// Java primitive integer syntaxes: integer syntax within the signed range
/// of the given bit width.
pub struct JavaIntegralChecker {
    oid: &'static str,
    min: i128,
    max: i128,
}

impl JavaIntegralChecker {
    /// Java `byte`.
    pub fn byte() -> Self {
        Self {
            oid: syntaxes::JAVA_BYTE,
            min: i8::MIN as i128,
            max: i8::MAX as i128,
        }
    }

    /// Java `short`.
    pub fn short() -> Self {
        Self {
            oid: syntaxes::JAVA_SHORT,
            min: i16::MIN as i128,
            max: i16::MAX as i128,
        }
    }

    /// Java `int`.
    pub fn int() -> Self {
        Self {
            oid: syntaxes::JAVA_INT,
            min: i32::MIN as i128,
            max: i32::MAX as i128,
        }
    }

    /// Java `long`.
    pub fn long() -> Self {
        Self {
            oid: syntaxes::JAVA_LONG,
            min: i64::MIN as i128,
            max: i64::MAX as i128,
        }
    }
}

impl SyntaxChecker for JavaIntegralChecker {
    fn oid(&self) -> &str {
        self.oid
    }

    fn is_valid(&self, value: &str) -> bool {
        if !is_integer(value) {
            return false;
        }
        value
            .parse::<i128>()
            .map(|n| n >= self.min && n <= self.max)
            .unwrap_or(false)
    }
}

fn is_integer(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if digits.len() > 1 && digits.starts_with('0') {
        return false;
    }
    // "-0" is not a valid integer
    !(value.starts_with('-') && digits == "0")
}

/// RFC 4517 checkers for the syntaxes the core schema uses.
pub fn standard_syntax_checkers() -> Vec<Box<dyn SyntaxChecker>> {
    vec![
        Box::new(DirectoryStringChecker),
        Box::new(Ia5StringChecker),
        Box::new(IntegerChecker),
        Box::new(BooleanChecker),
        Box::new(DnChecker),
        Box::new(OidChecker),
        Box::new(GeneralizedTimeChecker),
    ]
}

/// The Apache schema's Java primitive syntax checkers.
pub fn apache_syntax_checkers() -> Vec<Box<dyn SyntaxChecker>> {
    vec![
        Box::new(JavaIntegralChecker::byte()),
        Box::new(JavaIntegralChecker::short()),
        Box::new(JavaIntegralChecker::int()),
        Box::new(JavaIntegralChecker::long()),
    ]
}
