//! # Name Normalization
//!
//! Resolves every RDN attribute type against the schema and replaces the
//! normalized type with the canonical (primary) name, so `commonName=x` and
//! `cn=X` compare equal. Entries get the same treatment for their attribute
//! identifiers.

use crate::ports::SchemaFacade;
use shared_types::{DirectoryError, Dn, Entry};

/// Normalize `dn` against `schema`. Unknown attribute types make the name
/// invalid.
pub fn normalize_dn<S>(schema: &S, dn: Dn) -> Result<Dn, DirectoryError>
where
    S: SchemaFacade + ?Sized,
{
    let rdns = dn
        .into_rdns()
        .into_iter()
        .map(|rdn| {
            let at = schema.attribute_type(rdn.attr_type()).ok_or_else(|| {
                DirectoryError::InvalidName(format!(
                    "unknown attribute type {:?} in name",
                    rdn.attr_type()
                ))
            })?;
            let canonical = at.primary_name().to_string();
            Ok(rdn.with_canonical_type(&canonical))
        })
        .collect::<Result<Vec<_>, DirectoryError>>()?;

    Ok(Dn::from_rdns(rdns))
}

/// Rename every known attribute of `entry` to its primary name, merging
/// values given under aliases. Unknown attributes are kept as given.
pub fn normalize_entry<S>(schema: &S, entry: Entry) -> Entry
where
    S: SchemaFacade + ?Sized,
{
    let mut normalized = Entry::new(entry.dn().clone());
    for attr in entry.attributes() {
        let id = canonical_attribute(schema, &attr.id);
        for value in &attr.values {
            normalized.push_value(&id, value);
        }
    }
    normalized
}

/// Primary name of `id`, or `id` itself when unknown.
pub fn canonical_attribute<S>(schema: &S, id: &str) -> String
where
    S: SchemaFacade + ?Sized,
{
    schema
        .attribute_type(id)
        .map(|at| at.primary_name().to_string())
        .unwrap_or_else(|| id.to_string())
}
