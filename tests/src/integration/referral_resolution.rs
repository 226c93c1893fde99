//! # Referral Resolution Properties
//!
//! Checks the resolution guarantees end to end:
//!
//! 1. **Partition resolution**: at most one owner, always an ancestor-or-self
//! 2. **Nearest delegation**: a closer referral shadows a farther one
//! 3. **ManageDsaIt**: never redirects, whatever the delegation state
//! 4. **Pure classification**: same snapshot and mode, same outcome
//! 5. **Move rules**: foreign destinations and cross-partition moves rejected

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use ds_02_partitions::{Partition, PartitionView};
    use ds_03_referral::{walk_ancestors, OperationKind, Outcome, ReferralPolicy};
    use ds_04_router::SearchScope;
    use shared_types::{DirectoryError, Modification, ReferralMode};

    use ReferralMode::{Ignore, ManageDsaIt, Throw};

    const EUROPE: &str = "ou=Europe,ou=People,o=MNN,c=WW,ou=system";
    const EUROPE_REF: &str = "ldap://hoste/ou=Europe,dc=example,dc=org";

    // =========================================================================
    // PARTITION RESOLUTION
    // =========================================================================

    #[tokio::test]
    async fn test_resolution_returns_owning_suffix_only() {
        let service = directory().await;
        let registry = service.router().partitions();

        for name in [
            "ou=system",
            AKARASULU,
            "cn=X,ou=Roles,o=MNN,c=WW,ou=system",
            EXAMPLE,
            "ou=people,dc=example,dc=com",
        ] {
            let name = dn(name);
            let partition = registry.resolve(&name).unwrap();
            assert!(partition.suffix().is_ancestor_or_self_of(&name), "{name}");
        }

        for uncovered in ["o=elsewhere", "dc=com", "c=WW"] {
            assert!(registry.resolve(&dn(uncovered)).is_none(), "{uncovered}");
        }
    }

    #[tokio::test]
    async fn test_find_existing_superior() {
        let service = directory().await;
        let registry = service.router().partitions();

        let superior = registry
            .find_existing_superior(&dn("cn=A,ou=Missing,o=PNN,c=WW,ou=system"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(superior.matched, dn(PNN).len());
        assert_eq!(superior.partition.id(), "system");

        let exact = registry
            .find_existing_superior(&dn(AKARASULU))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(exact.matched, dn(AKARASULU).len());

        assert!(registry
            .find_existing_superior(&dn("o=elsewhere"))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_naming_contexts() {
        let service = directory().await;
        assert_eq!(service.naming_contexts(), vec![dn("ou=system"), dn(EXAMPLE)]);
    }

    // =========================================================================
    // NEAREST DELEGATION
    // =========================================================================

    #[tokio::test]
    async fn test_nearest_referral_wins() {
        let service = directory().await;
        admin(&service, ManageDsaIt)
            .add(referral(EUROPE, "Europe", &[EUROPE_REF]))
            .await
            .unwrap();

        let session = admin(&service, Throw);
        assert_eq!(
            referral_urls(session.lookup("cn=Jo,ou=Europe,ou=People,o=MNN,c=WW,ou=system").await),
            vec!["ldap://hoste/cn=Jo,ou=Europe,dc=example,dc=org"]
        );
        assert_eq!(
            referral_urls(session.lookup("cn=Jo,ou=People,o=MNN,c=WW,ou=system").await),
            vec![
                "ldap://hostb/cn=Jo,OU=People,DC=example,DC=com",
                "ldap://hostc/cn=Jo,OU=People,O=MNN,C=WW",
            ]
        );
    }

    #[tokio::test]
    async fn test_walk_stops_at_first_referral() {
        let service = directory().await;
        admin(&service, ManageDsaIt)
            .add(referral(EUROPE, "Europe", &[EUROPE_REF]))
            .await
            .unwrap();

        let name = dn("cn=Jo,ou=Europe,ou=People,o=MNN,c=WW,ou=system");
        let partition = service.router().partitions().resolve(&name).unwrap();
        let view = partition.snapshot().await.unwrap();
        let walk = walk_ancestors(&name, partition.suffix(), view.as_ref());

        let delegation = walk.delegation.unwrap();
        assert_eq!(delegation.point, dn(EUROPE));
        assert_eq!(walk.steps.len(), 1, "walk ends at the nearest referral");
    }

    // =========================================================================
    // MANAGE DSA IT
    // =========================================================================

    #[tokio::test]
    async fn test_manage_dsa_it_never_redirects() {
        let service = directory().await;
        let session = admin(&service, ManageDsaIt);

        let below = "cn=X,ou=Roles,o=MNN,c=WW,ou=system";
        let results: Vec<Result<(), DirectoryError>> = vec![
            session.lookup(ROLES).await.map(|_| ()),
            session.lookup(below).await.map(|_| ()),
            session.compare(PEOPLE, "ou", "People").await.map(|_| ()),
            session
                .modify(below, vec![Modification::add("description", &["x"])])
                .await,
            session.delete(below).await,
            session
                .search(ROLES, SearchScope::Subtree, "(objectClass=*)")
                .await
                .map(|_| ()),
        ];

        for result in results {
            assert!(
                !matches!(
                    result,
                    Err(DirectoryError::Referral { .. }) | Err(DirectoryError::PartialResult)
                ),
                "{result:?}"
            );
        }
    }

    // =========================================================================
    // PURE CLASSIFICATION
    // =========================================================================

    #[tokio::test]
    async fn test_classification_is_repeatable() {
        let service = directory().await;
        let policy = ReferralPolicy::default();
        let name = dn("cn=X,ou=People,o=MNN,c=WW,ou=system");
        let partition = service.router().partitions().resolve(&name).unwrap();
        let view = partition.snapshot().await.unwrap();

        for mode in [Throw, Ignore, ManageDsaIt] {
            let classify = || {
                let walk = walk_ancestors(&name, partition.suffix(), view.as_ref());
                policy.classify(OperationKind::Search, mode, &name, view.get(&name), &walk)
            };
            let first = classify();
            assert_eq!(first, classify(), "mode {mode}");
            match mode {
                Throw => assert!(matches!(first, Outcome::Redirect { ref targets } if targets.len() == 2)),
                Ignore => assert_eq!(first, Outcome::PartialResult),
                ManageDsaIt => assert_eq!(first, Outcome::NotFound),
            }
        }
    }

    #[tokio::test]
    async fn test_snapshot_ignores_later_writes() {
        let service = directory().await;
        let partition = service.router().partitions().resolve(&dn(PNN)).unwrap();
        let before = partition.snapshot().await.unwrap();

        admin(&service, Throw)
            .add(person("cn=Late,o=PNN,c=WW,ou=system"))
            .await
            .unwrap();

        assert!(!before.exists(&dn("cn=Late,o=PNN,c=WW,ou=system")));
        assert!(partition
            .snapshot()
            .await
            .unwrap()
            .exists(&dn("cn=Late,o=PNN,c=WW,ou=system")));
    }

    // =========================================================================
    // MOVE RULES
    // =========================================================================

    #[tokio::test]
    async fn test_move_scenarios() {
        let service = directory().await;
        let missing = "cn=X,ou=Roles,o=MNN,c=WW,ou=system";

        assert_eq!(
            referral_urls(admin(&service, Throw).move_entry(missing, PNN).await),
            vec!["ldap://hostd/cn=X,ou=Roles,dc=apache,dc=org"]
        );
        assert_eq!(
            admin(&service, Ignore).move_entry(missing, PNN).await,
            Err(DirectoryError::PartialResult)
        );
        assert!(matches!(
            admin(&service, ManageDsaIt).move_entry(missing, PNN).await,
            Err(DirectoryError::NoSuchObject(_))
        ));

        for mode in [Throw, Ignore, ManageDsaIt] {
            assert!(matches!(
                admin(&service, mode).move_entry(AKARASULU, PEOPLE).await,
                Err(DirectoryError::AffectsMultipleDsas(_))
            ));
        }

        assert!(matches!(
            admin(&service, ManageDsaIt)
                .move_and_rename(AKARASULU, EXAMPLE, "cn=Alex", true)
                .await,
            Err(DirectoryError::AffectsMultipleDsas(_))
        ));
        assert!(admin(&service, Throw).exists(AKARASULU).await.unwrap());
    }

    #[tokio::test]
    async fn test_moving_a_subtree_moves_descendants() {
        let service = directory().await;
        let session = admin(&service, Throw);
        session
            .add(
                shared_types::Entry::new(dn("ou=Staff,o=PNN,c=WW,ou=system"))
                    .with("objectClass", &["top", "organizationalUnit"])
                    .with("ou", &["Staff"]),
            )
            .await
            .unwrap();
        session
            .add(person("cn=Kim,ou=Staff,o=PNN,c=WW,ou=system"))
            .await
            .unwrap();

        session
            .move_entry("ou=Staff,o=PNN,c=WW,ou=system", MNN)
            .await
            .unwrap();

        assert!(session
            .exists("cn=Kim,ou=Staff,o=MNN,c=WW,ou=system")
            .await
            .unwrap());
        assert!(!session
            .exists("cn=Kim,ou=Staff,o=PNN,c=WW,ou=system")
            .await
            .unwrap());
        assert!(matches!(
            session
                .move_entry(MNN, "ou=Staff,o=MNN,c=WW,ou=system")
                .await,
            Err(DirectoryError::UnwillingToPerform(_))
        ));
    }
}
