//! # Routing Benchmarks
//!
//! | Path | Work per call |
//! |------|---------------|
//! | ds-03 walk + classify | one snapshot read per ancestor, bounded by depth |
//! | ds-02 resolve | linear in registered partitions |
//! | ds-04 lookup | full chain: tracing, access control, router |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ds_02_partitions::{InMemoryPartition, Partition, PartitionRegistry, PartitionView};
use ds_03_referral::{walk_ancestors, OperationKind, ReferralPolicy};
use ds_tests::fixtures::{admin, directory, dn, AKARASULU};
use shared_types::{Dn, Entry, ReferralMode};
use std::sync::Arc;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

/// `depth` organizational units below `o=bench`, with a referral at the top
/// when `delegated`. Returns the partition and the deepest name.
fn chain(rt: &Runtime, depth: usize, delegated: bool) -> (Arc<InMemoryPartition>, Dn) {
    let partition = Arc::new(InMemoryPartition::new("bench", dn("o=bench")));
    let mut name = dn("o=bench");
    rt.block_on(async {
        partition
            .create(Entry::new(name.clone()).with("o", &["bench"]))
            .await
            .unwrap();
        for level in 0..depth {
            name = dn(&format!("ou=l{level},{name}"));
            let ou = format!("l{level}");
            let mut entry = Entry::new(name.clone()).with("ou", &[ou.as_str()]);
            if delegated && level == 0 {
                entry = entry
                    .with("objectClass", &["top", "referral"])
                    .with("ref", &["ldap://remote/ou=l0,o=elsewhere"]);
            }
            partition.create(entry).await.unwrap();
        }
    });
    (partition, dn(&format!("cn=leaf,{name}")))
}

fn bench_walk_and_classify(c: &mut Criterion) {
    let rt = runtime();
    let policy = ReferralPolicy::default();
    let mut group = c.benchmark_group("ds-03-walk-classify");

    for depth in [1, 4, 16, 64] {
        for delegated in [false, true] {
            let (partition, leaf) = chain(&rt, depth, delegated);
            let view = rt.block_on(partition.snapshot()).unwrap();
            let label = if delegated { "delegated" } else { "local" };

            group.bench_with_input(BenchmarkId::new(label, depth), &leaf, |b, leaf| {
                b.iter(|| {
                    let walk = walk_ancestors(leaf, partition.suffix(), view.as_ref());
                    black_box(policy.classify(
                        OperationKind::Lookup,
                        ReferralMode::Throw,
                        leaf,
                        view.get(leaf),
                        &walk,
                    ))
                })
            });
        }
    }

    group.finish();
}

fn bench_partition_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("ds-02-resolve");

    for count in [1, 10, 100] {
        let mut registry = PartitionRegistry::new();
        for i in 0..count {
            registry
                .register(Arc::new(InMemoryPartition::new(
                    format!("p{i}"),
                    dn(&format!("dc=p{i},dc=bench")),
                )))
                .unwrap();
        }
        let name = dn(&format!("cn=x,ou=people,dc=p{},dc=bench", count - 1));

        group.bench_with_input(BenchmarkId::from_parameter(count), &name, |b, name| {
            b.iter(|| black_box(registry.resolve(name).is_some()))
        });
    }

    group.finish();
}

fn bench_service_lookup(c: &mut Criterion) {
    let rt = runtime();
    let service = rt.block_on(directory());
    let session = admin(&service, ReferralMode::Throw);
    let mut group = c.benchmark_group("ds-04-lookup");

    group.bench_function("existing_entry", |b| {
        b.iter(|| black_box(rt.block_on(session.lookup(AKARASULU)).is_ok()))
    });
    group.bench_function("below_referral", |b| {
        b.iter(|| {
            black_box(
                rt.block_on(session.lookup("cn=X,ou=Roles,o=MNN,c=WW,ou=system"))
                    .is_err(),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_walk_and_classify,
    bench_partition_resolve,
    bench_service_lookup
);
criterion_main!(benches);
