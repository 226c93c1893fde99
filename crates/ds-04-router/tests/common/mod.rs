//! Shared fixture: a two-partition directory with referral entries.
//!
//! ```text
//! ou=system                                  (partition "system")
//! └── c=WW
//!     ├── o=MNN
//!     │   ├── ou=Roles   referral → ldap://hostd/ou=Roles,dc=apache,dc=org
//!     │   ├── ou=People  referral → ldap://hostb/OU=People,DC=example,DC=com
//!     │   │                         ldap://hostc/OU=People,O=MNN,C=WW
//!     │   └── cn=Alex Karasulu
//!     └── o=PNN
//!         └── cn=Alex
//! dc=example,dc=com                          (partition "example")
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use ds_01_schema::{InMemorySchema, SchemaFacade};
use ds_02_partitions::{InMemoryPartition, Partition, PartitionRegistry, PartitionView};
use ds_04_router::{DirectoryConfig, DirectoryService, Session};
use shared_types::{DirectoryError, Dn, Entry, ReferralMode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const ADMIN: &str = "uid=admin,ou=system";
pub const MNN: &str = "o=MNN,c=WW,ou=system";
pub const PNN: &str = "o=PNN,c=WW,ou=system";
pub const ROLES: &str = "ou=Roles,o=MNN,c=WW,ou=system";
pub const PEOPLE: &str = "ou=People,o=MNN,c=WW,ou=system";
pub const AKARASULU: &str = "cn=Alex Karasulu,o=MNN,c=WW,ou=system";
pub const ALEX: &str = "cn=Alex,o=PNN,c=WW,ou=system";
pub const EXAMPLE: &str = "dc=example,dc=com";

pub const ROLES_REF: &str = "ldap://hostd/ou=Roles,dc=apache,dc=org";
pub const PEOPLE_REF_B: &str = "ldap://hostb/OU=People,DC=example,DC=com";
pub const PEOPLE_REF_C: &str = "ldap://hostc/OU=People,O=MNN,C=WW";

pub fn dn(text: &str) -> Dn {
    Dn::parse(text).unwrap()
}

/// In-memory partition that counts storage writes.
pub struct CountingPartition {
    inner: InMemoryPartition,
    writes: AtomicUsize,
}

impl CountingPartition {
    pub fn new(id: &str, suffix: &str) -> Self {
        Self {
            inner: InMemoryPartition::new(id, dn(suffix)),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.writes.store(0, Ordering::SeqCst);
    }

    fn count(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Partition for CountingPartition {
    fn id(&self) -> &str {
        self.inner.id()
    }

    fn suffix(&self) -> &Dn {
        self.inner.suffix()
    }

    async fn snapshot(&self) -> Result<Arc<dyn PartitionView>, DirectoryError> {
        self.inner.snapshot().await
    }

    async fn create(&self, entry: Entry) -> Result<(), DirectoryError> {
        self.count();
        self.inner.create(entry).await
    }

    async fn update(&self, entry: Entry) -> Result<(), DirectoryError> {
        self.count();
        self.inner.update(entry).await
    }

    async fn delete(&self, dn: &Dn) -> Result<(), DirectoryError> {
        self.count();
        self.inner.delete(dn).await
    }

    async fn relocate(&self, from: &Dn, entry: Entry) -> Result<(), DirectoryError> {
        self.count();
        self.inner.relocate(from, entry).await
    }
}

pub fn tree() -> Vec<Entry> {
    vec![
        Entry::new(dn("ou=system"))
            .with("objectClass", &["top", "organizationalUnit"])
            .with("ou", &["system"]),
        Entry::new(dn("c=WW,ou=system"))
            .with("objectClass", &["top", "country"])
            .with("c", &["WW"]),
        Entry::new(dn(MNN))
            .with("objectClass", &["top", "organization"])
            .with("o", &["MNN"]),
        Entry::new(dn(PNN))
            .with("objectClass", &["top", "organization"])
            .with("o", &["PNN"]),
        Entry::new(dn(ROLES))
            .with("objectClass", &["top", "extensibleObject", "referral"])
            .with("ou", &["Roles"])
            .with("ref", &[ROLES_REF]),
        Entry::new(dn(PEOPLE))
            .with("objectClass", &["top", "extensibleObject", "referral"])
            .with("ou", &["People"])
            .with("ref", &[PEOPLE_REF_B, PEOPLE_REF_C]),
        Entry::new(dn(AKARASULU))
            .with("objectClass", &["top", "person"])
            .with("cn", &["Alex Karasulu"])
            .with("sn", &["Karasulu"]),
        Entry::new(dn(ALEX))
            .with("objectClass", &["top", "person"])
            .with("cn", &["Alex"])
            .with("sn", &["Karasulu"]),
        Entry::new(dn(EXAMPLE))
            .with("objectClass", &["top", "domain"])
            .with("dc", &["example"]),
    ]
}

pub struct Fixture {
    pub service: DirectoryService,
    pub system: Arc<CountingPartition>,
    pub example: Arc<CountingPartition>,
}

impl Fixture {
    /// Administrator session in `mode`.
    pub fn admin(&self, mode: ReferralMode) -> Session {
        self.service.session(Some(ADMIN)).unwrap().with_mode(mode)
    }

    /// Anonymous session in `mode`.
    pub fn anonymous(&self, mode: ReferralMode) -> Session {
        self.service.session(None).unwrap().with_mode(mode)
    }

    pub fn writes(&self) -> usize {
        self.system.writes() + self.example.writes()
    }
}

pub async fn fixture() -> Fixture {
    fixture_with(DirectoryConfig::default()).await
}

pub async fn fixture_with(config: DirectoryConfig) -> Fixture {
    let schema: Arc<dyn SchemaFacade> = Arc::new(InMemorySchema::core().unwrap());
    let system = Arc::new(CountingPartition::new("system", "ou=system"));
    let example = Arc::new(CountingPartition::new("example", EXAMPLE));

    let mut registry = PartitionRegistry::new();
    registry.register(system.clone()).unwrap();
    registry.register(example.clone()).unwrap();

    let service = DirectoryService::new(schema, registry, &config).unwrap();
    for entry in tree() {
        assert!(service.seed(entry).await.unwrap());
    }
    system.reset();
    example.reset();

    Fixture {
        service,
        system,
        example,
    }
}

pub fn person(name: &str, cn: &str) -> Entry {
    Entry::new(dn(name))
        .with("objectClass", &["top", "person"])
        .with("cn", &[cn])
        .with("sn", &["Test"])
}

pub fn referral_urls(result: Result<impl Sized, DirectoryError>) -> Vec<String> {
    match result {
        Err(DirectoryError::Referral { urls }) => urls,
        Err(other) => panic!("expected a referral, got {other}"),
        Ok(_) => panic!("expected a referral, got success"),
    }
}
