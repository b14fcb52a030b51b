//! Benchmarks for permission evaluation and merging.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use gatehouse_core::permission::{merge, Actor, Permission, PermissionMode};
use gatehouse_core::roles::RoleSet;

fn build_permission(roles: usize) -> Permission {
    let mut permission = Permission::scoped("bench");
    permission
        .allow(PermissionMode::Crud, (0..roles).map(|i| format!("role-{i}")))
        .deny(PermissionMode::Delete, ["intern"]);
    permission
}

fn bench_has_permission(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_permission");
    for size in [1, 10, 100, 1_000] {
        let permission = build_permission(size).freeze();
        let last = format!("role-{}", size - 1);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("last_role_matches", size), &size, |b, _| {
            b.iter(|| permission.has_permission(PermissionMode::Read, black_box(&[Actor::from(last.as_str())])))
        });
        group.bench_with_input(BenchmarkId::new("no_match", size), &size, |b, _| {
            b.iter(|| permission.has_permission(PermissionMode::Read, black_box(&[Actor::from("nobody")])))
        });
    }
    group.finish();
}

fn bench_provider_actor(c: &mut Criterion) {
    let permission = build_permission(100).freeze();
    let staff = RoleSet::new((0..20).map(|i| format!("staff-{i}")).chain(["role-99".to_string()]));
    c.bench_function("provider_actor_20_roles", |b| {
        b.iter(|| permission.has_permission(PermissionMode::Update, black_box(&[Actor::provider(&staff)])))
    });
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");
    for size in [10, 100, 1_000] {
        let receiver = build_permission(size);
        let other = build_permission(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| merge(black_box(Some(&receiver)), black_box(Some(&other))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_has_permission, bench_provider_actor, bench_merge);
criterion_main!(benches);
