//! # Entry Validation
//!
//! Checks an entry against the object classes it declares:
//!
//! 1. at least one known object class, at least one of them structural
//! 2. every MUST attribute (inherited through superiors) is present
//! 3. every attribute is known, allowed by MUST/MAY, by `extensibleObject`,
//!    or operational
//! 4. single-valued attributes hold one value, values pass their syntax
//! 5. the RDN value is present in the entry
//! 6. referral entries carry at least one usable delegation target

use crate::domain::{ObjectClass, ObjectClassKind};
use crate::ports::SchemaFacade;
use shared_types::{DelegationTarget, DirectoryError, Entry, OBJECT_CLASS, REF_ATTRIBUTE};
use std::collections::HashSet;
use tracing::debug;

const EXTENSIBLE_OBJECT: &str = "extensibleobject";

/// Validate `entry` against `schema`.
pub fn validate_entry<S>(schema: &S, entry: &Entry) -> Result<(), DirectoryError>
where
    S: SchemaFacade + ?Sized,
{
    let declared = entry.object_classes();
    if declared.is_empty() {
        return Err(DirectoryError::SchemaViolation(format!(
            "{} has no objectClass",
            entry.dn()
        )));
    }

    let classes = resolve_class_closure(schema, declared)?;

    if !classes.iter().any(|oc| oc.kind == ObjectClassKind::Structural) {
        return Err(DirectoryError::SchemaViolation(format!(
            "{} has no structural object class",
            entry.dn()
        )));
    }

    let extensible = classes
        .iter()
        .any(|oc| oc.names.iter().any(|n| n.eq_ignore_ascii_case(EXTENSIBLE_OBJECT)));

    let mut must = HashSet::new();
    let mut may = HashSet::new();
    for oc in &classes {
        for name in &oc.must {
            must.insert(attribute_oid(schema, name)?);
        }
        for name in &oc.may {
            may.insert(attribute_oid(schema, name)?);
        }
    }

    let object_class_oid = attribute_oid(schema, OBJECT_CLASS)?;
    let mut present = HashSet::new();

    for attr in entry.attributes() {
        let at = schema
            .attribute_type(&attr.id)
            .ok_or_else(|| DirectoryError::UndefinedAttributeType(attr.id.clone()))?;

        if !present.insert(at.oid.clone()) {
            return Err(DirectoryError::SchemaViolation(format!(
                "attribute {} given more than once under different names",
                at.primary_name()
            )));
        }

        if attr.values.is_empty() {
            return Err(DirectoryError::SchemaViolation(format!(
                "attribute {} has no values",
                attr.id
            )));
        }

        if at.single_value && attr.values.len() > 1 {
            return Err(DirectoryError::SchemaViolation(format!(
                "attribute {} is single-valued",
                attr.id
            )));
        }

        if let Some(checker) = schema.syntax_checker(&at.syntax) {
            if let Some(bad) = attr.values.iter().find(|v| !checker.is_valid(v)) {
                return Err(DirectoryError::InvalidAttributeSyntax {
                    attribute: attr.id.clone(),
                    value: bad.clone(),
                });
            }
        }

        let allowed = at.is_operational()
            || extensible
            || at.oid == object_class_oid
            || must.contains(&at.oid)
            || may.contains(&at.oid);
        if !allowed {
            return Err(DirectoryError::SchemaViolation(format!(
                "attribute {} is not allowed in {}",
                attr.id,
                entry.dn()
            )));
        }
    }

    if let Some(missing) = must.iter().find(|oid| !present.contains(*oid)) {
        let name = schema
            .attribute_type(missing)
            .map(|at| at.primary_name().to_string())
            .unwrap_or_else(|| missing.clone());
        return Err(DirectoryError::SchemaViolation(format!(
            "{} is missing required attribute {}",
            entry.dn(),
            name
        )));
    }

    if let Some(rdn) = entry.dn().rdn() {
        let at = schema
            .attribute_type(rdn.attr_type())
            .ok_or_else(|| DirectoryError::UndefinedAttributeType(rdn.attr_type().to_string()))?;
        let found = at
            .names
            .iter()
            .chain(std::iter::once(&at.oid))
            .flat_map(|name| entry.values(name))
            .any(|v| at.equality.matches(v, rdn.value()));
        if !found {
            return Err(DirectoryError::SchemaViolation(format!(
                "RDN value {} is not present in the entry",
                rdn
            )));
        }
    }

    if entry.is_referral() {
        for value in entry.values(REF_ATTRIBUTE) {
            if DelegationTarget::from_ref(value).is_err() {
                return Err(DirectoryError::InvalidAttributeSyntax {
                    attribute: REF_ATTRIBUTE.to_string(),
                    value: value.clone(),
                });
            }
        }
    }

    debug!(dn = %entry.dn(), classes = classes.len(), "[ds-01] Entry validated");
    Ok(())
}

fn resolve_class_closure<S>(schema: &S, declared: &[String]) -> Result<Vec<ObjectClass>, DirectoryError>
where
    S: SchemaFacade + ?Sized,
{
    let mut seen = HashSet::new();
    let mut classes = Vec::new();
    let mut pending: Vec<String> = declared.to_vec();

    while let Some(name) = pending.pop() {
        let oc = schema.object_class(&name).ok_or_else(|| {
            DirectoryError::SchemaViolation(format!("unknown object class {}", name))
        })?;
        if !seen.insert(oc.oid.clone()) {
            continue;
        }
        pending.extend(oc.superiors.iter().cloned());
        classes.push(oc.clone());
    }

    Ok(classes)
}

fn attribute_oid<S>(schema: &S, name: &str) -> Result<String, DirectoryError>
where
    S: SchemaFacade + ?Sized,
{
    schema
        .attribute_type(name)
        .map(|at| at.oid.clone())
        .ok_or_else(|| DirectoryError::UndefinedAttributeType(name.to_string()))
}
