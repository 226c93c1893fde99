//! # LDAP URLs and Delegation Targets
//!
//! Referral entries carry their delegation targets as LDAP URL values of the
//! `ref` attribute (`ldap://hostd/ou=Roles,dc=apache,dc=org`). A target is the
//! location part (`ldap://hostd`) plus the base name the remote server knows
//! the delegated subtree by.

use crate::errors::DirectoryError;
use crate::name::{hex_pair, Dn};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use std::fmt;

const SCHEMES: [&str; 3] = ["ldap", "ldaps", "ldapi"];

/// A parsed LDAP URL. Only the scheme, host and base DN are retained;
/// attribute/scope/filter/extension parts are ignored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LdapUrl {
    scheme: String,
    host: String,
    dn: Dn,
}

impl LdapUrl {
    /// Parse an LDAP URL.
    pub fn parse(text: &str) -> Result<Self, DirectoryError> {
        let text = text.trim();
        let (scheme, rest) = text
            .split_once("://")
            .ok_or_else(|| DirectoryError::InvalidName(format!("not an LDAP URL: {:?}", text)))?;

        let scheme = scheme.to_ascii_lowercase();
        if !SCHEMES.contains(&scheme.as_str()) {
            return Err(DirectoryError::InvalidName(format!(
                "unsupported URL scheme {:?}",
                scheme
            )));
        }

        let (host, path) = match rest.split_once('/') {
            Some((host, path)) => (host, path),
            None => (rest, ""),
        };

        // Drop ?attrs?scope?filter?extensions.
        let dn_part = path.split('?').next().unwrap_or_default();
        let dn = Dn::parse(&percent_decode(dn_part)?)?;

        Ok(Self {
            scheme,
            host: host.to_string(),
            dn,
        })
    }

    /// `scheme://host[:port]`.
    pub fn location(&self) -> String {
        format!("{}://{}", self.scheme, self.host)
    }

    /// Base DN named by the URL.
    pub fn dn(&self) -> &Dn {
        &self.dn
    }
}

impl fmt::Display for LdapUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.location(), escape_dn(&self.dn.to_string()))
    }
}

/// Where resolution continues for a delegated subtree.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationTarget {
    /// `scheme://host[:port]` of the server holding the subtree.
    pub location: String,
    /// Name of the delegated subtree on that server.
    pub base: Dn,
}

impl DelegationTarget {
    /// Build a target from a `ref` attribute value.
    pub fn from_ref(value: &str) -> Result<Self, DirectoryError> {
        let url = LdapUrl::parse(value)?;
        Ok(Self {
            location: url.location(),
            base: url.dn,
        })
    }

    /// Render as a URL with `name` as the DN part.
    pub fn url_for(&self, name: &Dn) -> String {
        format!("{}/{}", self.location, escape_dn(&name.to_string()))
    }
}

/// Characters escaped in the DN part of a URL. DN separators and the
/// RFC 3986 sub-delimiters stay literal.
const DN_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b',')
    .remove(b'=')
    .remove(b'+')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*');

/// Percent-escape the characters that are unsafe in the DN part of a URL.
pub fn escape_dn(dn_text: &str) -> String {
    utf8_percent_encode(dn_text, DN_ESCAPES).to_string()
}

fn percent_decode(text: &str) -> Result<String, DirectoryError> {
    let malformed = text
        .match_indices('%')
        .any(|(i, _)| hex_pair(text.get(i + 1..i + 3)).is_none());
    if malformed {
        return Err(DirectoryError::InvalidName(format!(
            "bad percent escape in {:?}",
            text
        )));
    }

    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| DirectoryError::InvalidName(format!("URL is not UTF-8: {:?}", text)))
}
