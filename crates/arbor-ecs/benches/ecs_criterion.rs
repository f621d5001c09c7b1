//! Scene kernel benchmarks using criterion for historical comparison.

use std::hint::black_box;

use arbor_ecs::{Entity, OnEnabled, Surface, World, hooks};
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

fn leaf(_world: &mut World) -> eyre::Result<u32> {
    Ok(0)
}

fn build_wide(count: u64) -> (World, Entity) {
    let mut world = World::new();
    let root = world
        .create_root(Some("root"), |_world: &mut World| Ok(()))
        .map(|c| c.header().entity)
        .unwrap_or_else(|err| panic!("root: {err}"));
    for _ in 0..count {
        world
            .create_child(root, None, leaf)
            .unwrap_or_else(|err| panic!("child: {err}"));
    }
    (world, root)
}

fn create_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("create_child");

    for count in [1, 100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("wide", count), &count, |b, &count| {
            b.iter(|| black_box(build_wide(count)));
        });

        group.bench_with_input(BenchmarkId::new("with_hooks", count), &count, |b, &count| {
            b.iter(|| {
                let mut world = World::new();
                let root = world
                    .create_root(None, |_world: &mut World| Ok(()))
                    .map(|c| c.header().entity)
                    .unwrap_or_else(|err| panic!("root: {err}"));
                for _ in 0..count {
                    let _ = world.create_child(root, None, |world: &mut World| {
                        hooks::on_enabled(world, |_| Ok(()))?;
                        hooks::on_disabled(world, |_| Ok(()))?;
                        Ok(())
                    });
                }
                black_box(world)
            });
        });
    }

    group.finish();
}

fn cascade_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("cascade");

    for count in [100, 1000, 10000] {
        group.throughput(Throughput::Elements(count));

        group.bench_with_input(BenchmarkId::new("disable_enable", count), &count, |b, &count| {
            let (mut world, root) = build_wide(count);
            b.iter(|| {
                let _ = world.disable(root);
                let _ = world.enable(root);
            });
        });

        group.bench_with_input(BenchmarkId::new("snapshot", count), &count, |b, &count| {
            let (world, root) = build_wide(count);
            b.iter(|| {
                for id in world.descendants(root).iter().flat_map(|&e| world.components_of(e)) {
                    black_box(world.snapshot::<OnEnabled>(*id));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, create_benchmarks, cascade_benchmarks);
criterion_main!(benches);
