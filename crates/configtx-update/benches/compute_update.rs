use criterion::{black_box, criterion_group, criterion_main, Criterion};

use configtx_core::{Config, ConfigPath, Group, Policy, PolicyRule, Value};
use configtx_update::{apply_update, compute_update};

/// A channel with `orgs` organizations under each of two sections.
fn channel(orgs: usize) -> Config {
    let org = |i: usize| {
        Group::new("Admins")
            .with_value("MSP", Value::new(format!("msp-{i}").into_bytes(), "Admins"))
            .with_value("AnchorPeers", Value::new(format!("peer{i}:7051").into_bytes(), "Admins"))
            .with_policy("Admins", Policy::new(PolicyRule::signature(format!("OR('Org{i}.admin')")), "Admins"))
            .with_policy("Readers", Policy::new(PolicyRule::signature(format!("OR('Org{i}.member')")), "Admins"))
    };
    let mut application = Group::new("Admins");
    let mut orderer = Group::new("Admins");
    for i in 0..orgs {
        application.groups.insert(format!("Org{i}"), org(i));
        orderer.groups.insert(format!("OrdererOrg{i}"), org(i));
    }
    Config::new(
        Group::new("Admins")
            .with_group("Application", application)
            .with_group("Orderer", orderer),
    )
}

fn bench_compute_update(c: &mut Criterion) {
    let base = channel(100);

    c.bench_function("compute_update/identical_100_orgs", |b| {
        let updated = base.clone();
        b.iter(|| compute_update(black_box(&base), black_box(&updated)))
    });

    let mut updated = base.clone();
    let org = updated
        .channel_group
        .group_at_mut(&ConfigPath::group(["Application", "Org42"]))
        .expect("org exists");
    org.values.insert("AnchorPeers".into(), Value::new(b"peer9:7051".to_vec(), "Admins"));
    c.bench_function("compute_update/one_change_100_orgs", |b| {
        b.iter(|| compute_update(black_box(&base), black_box(&updated)))
    });

    let update = compute_update(&base, &updated);
    c.bench_function("apply_update/one_change_100_orgs", |b| {
        b.iter(|| apply_update(black_box(&base), black_box(&update)))
    });
}

criterion_group!(benches, bench_compute_update);
criterion_main!(benches);
