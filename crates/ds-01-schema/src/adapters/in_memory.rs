//! In-memory schema registry.
//!
//! Built once at startup and shared read-only afterwards, so lookups need no
//! locking.

use crate::algorithms::{apache_syntax_checkers, standard_syntax_checkers, SyntaxChecker};
use crate::domain::{
    syntaxes, AttributeType, MatchingRule, ObjectClass, ObjectClassKind, SchemaExtensions,
};
use crate::ports::SchemaFacade;
use shared_types::DirectoryError;
use std::collections::HashMap;
use tracing::{debug, info};

/// Schema registry keyed by lowercase names and OIDs.
pub struct InMemorySchema {
    attribute_types: Vec<AttributeType>,
    attribute_index: HashMap<String, usize>,
    object_classes: Vec<ObjectClass>,
    class_index: HashMap<String, usize>,
    checkers: HashMap<String, Box<dyn SyntaxChecker>>,
}

impl InMemorySchema {
    /// Empty builder with every syntax checker registered.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    /// Builder preloaded with the core attribute types and object classes.
    pub fn core_builder() -> SchemaBuilder {
        let mut builder = Self::builder();
        for at in core_attribute_types() {
            builder = builder.attribute_type(at);
        }
        for oc in core_object_classes() {
            builder = builder.object_class(oc);
        }
        builder
    }

    /// The core schema.
    pub fn core() -> Result<Self, DirectoryError> {
        Self::core_builder().build()
    }

    /// Registered attribute types.
    pub fn attribute_types(&self) -> &[AttributeType] {
        &self.attribute_types
    }

    /// Registered object classes.
    pub fn object_classes(&self) -> &[ObjectClass] {
        &self.object_classes
    }
}

impl SchemaFacade for InMemorySchema {
    fn attribute_type(&self, name: &str) -> Option<&AttributeType> {
        self.attribute_index
            .get(&name.trim().to_ascii_lowercase())
            .map(|&i| &self.attribute_types[i])
    }

    fn object_class(&self, name: &str) -> Option<&ObjectClass> {
        self.class_index
            .get(&name.trim().to_ascii_lowercase())
            .map(|&i| &self.object_classes[i])
    }

    fn syntax_checker(&self, oid: &str) -> Option<&dyn SyntaxChecker> {
        self.checkers.get(oid).map(|c| c.as_ref())
    }
}

/// Collects definitions and checks their cross references on `build`.
pub struct SchemaBuilder {
    attribute_types: Vec<AttributeType>,
    object_classes: Vec<ObjectClass>,
    checkers: Vec<Box<dyn SyntaxChecker>>,
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        let mut checkers = standard_syntax_checkers();
        checkers.extend(apache_syntax_checkers());
        Self {
            attribute_types: Vec::new(),
            object_classes: Vec::new(),
            checkers,
        }
    }
}

impl SchemaBuilder {
    /// Register an attribute type.
    pub fn attribute_type(mut self, at: AttributeType) -> Self {
        self.attribute_types.push(at);
        self
    }

    /// Register an object class.
    pub fn object_class(mut self, oc: ObjectClass) -> Self {
        self.object_classes.push(oc);
        self
    }

    /// Register (or override) a syntax checker.
    pub fn syntax_checker(mut self, checker: Box<dyn SyntaxChecker>) -> Self {
        self.checkers.push(checker);
        self
    }

    /// Add configured extensions.
    pub fn extend(mut self, extensions: SchemaExtensions) -> Self {
        self.attribute_types.extend(extensions.attribute_types);
        self.object_classes.extend(extensions.object_classes);
        self
    }

    /// Index everything and verify that every referenced name resolves.
    pub fn build(self) -> Result<InMemorySchema, DirectoryError> {
        let mut attribute_index = HashMap::new();
        for (i, at) in self.attribute_types.iter().enumerate() {
            for key in at.names.iter().chain(std::iter::once(&at.oid)) {
                if attribute_index.insert(key.to_ascii_lowercase(), i).is_some() {
                    return Err(DirectoryError::Configuration(format!(
                        "attribute type name {} registered twice",
                        key
                    )));
                }
            }
        }

        let mut class_index = HashMap::new();
        for (i, oc) in self.object_classes.iter().enumerate() {
            for key in oc.names.iter().chain(std::iter::once(&oc.oid)) {
                if class_index.insert(key.to_ascii_lowercase(), i).is_some() {
                    return Err(DirectoryError::Configuration(format!(
                        "object class name {} registered twice",
                        key
                    )));
                }
            }
        }

        for oc in &self.object_classes {
            for sup in &oc.superiors {
                if !class_index.contains_key(&sup.to_ascii_lowercase()) {
                    return Err(DirectoryError::Configuration(format!(
                        "object class {} has unknown superior {}",
                        oc.primary_name(),
                        sup
                    )));
                }
            }
            for attr in oc.must.iter().chain(&oc.may) {
                if !attribute_index.contains_key(&attr.to_ascii_lowercase()) {
                    return Err(DirectoryError::Configuration(format!(
                        "object class {} names unknown attribute type {}",
                        oc.primary_name(),
                        attr
                    )));
                }
            }
        }

        let checkers: HashMap<String, Box<dyn SyntaxChecker>> = self
            .checkers
            .into_iter()
            .map(|c| (c.oid().to_string(), c))
            .collect();

        for at in &self.attribute_types {
            if !checkers.contains_key(&at.syntax) {
                debug!(
                    attribute = at.primary_name(),
                    syntax = %at.syntax,
                    "[ds-01] No checker for syntax; values accepted as-is"
                );
            }
        }

        info!(
            attribute_types = self.attribute_types.len(),
            object_classes = self.object_classes.len(),
            syntaxes = checkers.len(),
            "[ds-01] Schema loaded"
        );

        Ok(InMemorySchema {
            attribute_types: self.attribute_types,
            attribute_index,
            object_classes: self.object_classes,
            class_index,
            checkers,
        })
    }
}

fn core_attribute_types() -> Vec<AttributeType> {
    use syntaxes::*;

    vec![
        AttributeType::new("2.5.4.0", &["objectClass"], OID),
        AttributeType::new("2.5.4.3", &["cn", "commonName"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.4", &["sn", "surname"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.6", &["c", "countryName"], DIRECTORY_STRING).single_valued(),
        AttributeType::new("2.5.4.10", &["o", "organizationName"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.11", &["ou", "organizationalUnitName"], DIRECTORY_STRING),
        AttributeType::new("0.9.2342.19200300.100.1.25", &["dc", "domainComponent"], IA5_STRING)
            .single_valued(),
        AttributeType::new("0.9.2342.19200300.100.1.1", &["uid", "userid"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.13", &["description"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.20", &["telephoneNumber"], DIRECTORY_STRING),
        AttributeType::new("2.5.4.35", &["userPassword"], DIRECTORY_STRING)
            .equality(MatchingRule::CaseExact),
        AttributeType::new("2.5.4.34", &["seeAlso"], DN).equality(MatchingRule::DistinguishedName),
        AttributeType::new("2.5.4.31", &["member"], DN).equality(MatchingRule::DistinguishedName),
        AttributeType::new("2.16.840.1.113730.3.1.34", &["ref"], IA5_STRING)
            .equality(MatchingRule::CaseExact),
        AttributeType::new("2.5.18.1", &["createTimestamp"], GENERALIZED_TIME)
            .single_valued()
            .operational(),
        AttributeType::new("2.5.18.2", &["modifyTimestamp"], GENERALIZED_TIME)
            .single_valued()
            .operational(),
        AttributeType::new("2.5.18.3", &["creatorsName"], DN)
            .equality(MatchingRule::DistinguishedName)
            .single_valued()
            .operational(),
        AttributeType::new("2.5.18.4", &["modifiersName"], DN)
            .equality(MatchingRule::DistinguishedName)
            .single_valued()
            .operational(),
    ]
}

fn core_object_classes() -> Vec<ObjectClass> {
    use ObjectClassKind::*;

    vec![
        ObjectClass::new("2.5.6.0", &["top"], Abstract).must(&["objectClass"]),
        ObjectClass::new("2.5.6.2", &["country"], Structural)
            .sup(&["top"])
            .must(&["c"])
            .may(&["description"]),
        ObjectClass::new("2.5.6.4", &["organization"], Structural)
            .sup(&["top"])
            .must(&["o"])
            .may(&["description", "seeAlso", "telephoneNumber", "userPassword"]),
        ObjectClass::new("2.5.6.5", &["organizationalUnit"], Structural)
            .sup(&["top"])
            .must(&["ou"])
            .may(&["description", "seeAlso", "telephoneNumber", "userPassword"]),
        ObjectClass::new("2.5.6.6", &["person"], Structural)
            .sup(&["top"])
            .must(&["sn", "cn"])
            .may(&["userPassword", "telephoneNumber", "seeAlso", "description"]),
        ObjectClass::new("2.5.6.7", &["organizationalPerson"], Structural)
            .sup(&["person"])
            .may(&["ou", "uid"]),
        ObjectClass::new("2.5.6.9", &["groupOfNames"], Structural)
            .sup(&["top"])
            .must(&["member", "cn"])
            .may(&["description", "o", "ou", "seeAlso"]),
        ObjectClass::new("0.9.2342.19200300.100.4.13", &["domain"], Structural)
            .sup(&["top"])
            .must(&["dc"])
            .may(&["description", "o", "seeAlso", "telephoneNumber", "userPassword"]),
        ObjectClass::new("1.3.6.1.4.1.1466.344", &["dcObject"], Auxiliary)
            .sup(&["top"])
            .must(&["dc"]),
        ObjectClass::new("1.3.6.1.1.3.1", &["uidObject"], Auxiliary)
            .sup(&["top"])
            .must(&["uid"]),
        ObjectClass::new("1.3.6.1.4.1.1466.101.120.111", &["extensibleObject"], Auxiliary)
            .sup(&["top"]),
        ObjectClass::new("2.16.840.1.113730.3.2.6", &["referral"], Structural)
            .sup(&["top"])
            .must(&["ref"]),
    ]
}
