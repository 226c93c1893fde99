//! # Test Fixtures
//!
//! A directory service built the way the node builds it (JSON config →
//! `DirectoryService::from_config`) and populated with the referral tree:
//!
//! ```text
//! ou=system
//! └── c=WW
//!     ├── o=MNN
//!     │   ├── ou=Roles   referral → ldap://hostd/ou=Roles,dc=apache,dc=org
//!     │   ├── ou=People  referral → ldap://hostb/OU=People,DC=example,DC=com
//!     │   │                         ldap://hostc/OU=People,O=MNN,C=WW
//!     │   └── cn=Alex Karasulu
//!     └── o=PNN
//! dc=example,dc=com
//! ```

use ds_04_router::{DirectoryConfig, DirectoryService, Session};
use shared_types::{DirectoryError, Dn, Entry, ReferralMode};

pub const ADMIN: &str = "uid=admin,ou=system";
pub const MNN: &str = "o=MNN,c=WW,ou=system";
pub const PNN: &str = "o=PNN,c=WW,ou=system";
pub const ROLES: &str = "ou=Roles,o=MNN,c=WW,ou=system";
pub const PEOPLE: &str = "ou=People,o=MNN,c=WW,ou=system";
pub const AKARASULU: &str = "cn=Alex Karasulu,o=MNN,c=WW,ou=system";
pub const EXAMPLE: &str = "dc=example,dc=com";

pub const ROLES_REF: &str = "ldap://hostd/ou=Roles,dc=apache,dc=org";
pub const PEOPLE_REF_B: &str = "ldap://hostb/OU=People,DC=example,DC=com";
pub const PEOPLE_REF_C: &str = "ldap://hostc/OU=People,O=MNN,C=WW";

/// Configuration document for the two fixture partitions.
pub const CONFIG_JSON: &str = r#"{
    "partitions": [
        {
            "id": "system",
            "suffix": "ou=system",
            "context_entry": { "objectClass": ["top", "organizationalUnit"], "ou": ["system"] }
        },
        {
            "id": "example",
            "suffix": "dc=example,dc=com",
            "context_entry": { "objectClass": ["top", "domain"], "dc": ["example"] }
        }
    ],
    "default_referral_mode": "throw",
    "access": { "administrators": ["uid=admin,ou=system"] }
}"#;

/// Parse a name the test knows to be valid.
pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap_or_else(|e| panic!("bad fixture name {text}: {e}"))
}

/// Fixture configuration.
pub fn config() -> DirectoryConfig {
    DirectoryConfig::from_json(CONFIG_JSON).unwrap_or_else(|e| panic!("bad fixture config: {e}"))
}

/// Entries below the context entries.
pub fn tree() -> Vec<Entry> {
    vec![
        Entry::new(dn("c=WW,ou=system"))
            .with("objectClass", &["top", "country"])
            .with("c", &["WW"]),
        Entry::new(dn(MNN))
            .with("objectClass", &["top", "organization"])
            .with("o", &["MNN"]),
        Entry::new(dn(PNN))
            .with("objectClass", &["top", "organization"])
            .with("o", &["PNN"]),
        referral(ROLES, "Roles", &[ROLES_REF]),
        referral(PEOPLE, "People", &[PEOPLE_REF_B, PEOPLE_REF_C]),
        Entry::new(dn(AKARASULU))
            .with("objectClass", &["top", "person", "organizationalPerson"])
            .with("cn", &["Alex Karasulu"])
            .with("sn", &["Karasulu"])
            .with("telephoneNumber", &["+1 555 0100"]),
    ]
}

/// A referral entry named by an `ou` RDN.
pub fn referral(name: &str, ou: &str, refs: &[&str]) -> Entry {
    Entry::new(dn(name))
        .with("objectClass", &["top", "extensibleObject", "referral"])
        .with("ou", &[ou])
        .with("ref", refs)
}

/// A minimal valid person.
pub fn person(name: &str) -> Entry {
    let parsed = dn(name);
    let cn = parsed
        .rdn()
        .map(|rdn| rdn.value().to_string())
        .unwrap_or_default();
    Entry::new(parsed)
        .with("objectClass", &["top", "person"])
        .with("cn", &[cn.as_str()])
        .with("sn", &["Test"])
}

/// Bootstrapped and seeded service.
pub async fn directory() -> DirectoryService {
    let service = DirectoryService::from_config(&config())
        .await
        .unwrap_or_else(|e| panic!("fixture service failed to start: {e}"));
    for entry in tree() {
        let dn = entry.dn().to_string();
        service
            .seed(entry)
            .await
            .unwrap_or_else(|e| panic!("seeding {dn} failed: {e}"));
    }
    service
}

/// Administrator session in `mode`.
pub fn admin(service: &DirectoryService, mode: ReferralMode) -> Session {
    service
        .session(Some(ADMIN))
        .unwrap_or_else(|e| panic!("admin session: {e}"))
        .with_mode(mode)
}

/// Referral URLs of a failed operation.
pub fn referral_urls<T>(result: Result<T, DirectoryError>) -> Vec<String> {
    match result {
        Err(DirectoryError::Referral { urls }) => urls,
        Err(other) => panic!("expected a referral, got {other}"),
        Ok(_) => panic!("expected a referral, got success"),
    }
}
