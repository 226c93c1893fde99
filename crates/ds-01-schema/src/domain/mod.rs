//! # Domain Module
//!
//! Schema object definitions consulted during validation and matching.

pub mod attribute_type;
pub mod object_class;

pub use attribute_type::*;
pub use object_class::*;

use serde::{Deserialize, Serialize};

/// Extra schema definitions supplied by configuration on top of the core set.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaExtensions {
    /// Additional attribute types.
    pub attribute_types: Vec<AttributeType>,
    /// Additional object classes.
    pub object_classes: Vec<ObjectClass>,
}

/// Syntax OIDs (RFC 4517 and the Apache Java syntaxes).
pub mod syntaxes {
    /// Boolean.
    pub const BOOLEAN: &str = "1.3.6.1.4.1.1466.115.121.1.7";
    /// Distinguished Name.
    pub const DN: &str = "1.3.6.1.4.1.1466.115.121.1.12";
    /// Directory String.
    pub const DIRECTORY_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.15";
    /// Generalized Time.
    pub const GENERALIZED_TIME: &str = "1.3.6.1.4.1.1466.115.121.1.24";
    /// IA5 String.
    pub const IA5_STRING: &str = "1.3.6.1.4.1.1466.115.121.1.26";
    /// Integer.
    pub const INTEGER: &str = "1.3.6.1.4.1.1466.115.121.1.27";
    /// OID.
    pub const OID: &str = "1.3.6.1.4.1.1466.115.121.1.38";
    /// Java byte (signed 8 bit).
    pub const JAVA_BYTE: &str = "1.3.6.1.4.1.18060.0.4.1.0.0";
    /// Java short (signed 16 bit).
    pub const JAVA_SHORT: &str = "1.3.6.1.4.1.18060.0.4.1.0.2";
    /// Java long (signed 64 bit).
    pub const JAVA_LONG: &str = "1.3.6.1.4.1.18060.0.4.1.0.3";
    /// Java int (signed 32 bit).
    pub const JAVA_INT: &str = "1.3.6.1.4.1.18060.0.4.1.0.4";
}
