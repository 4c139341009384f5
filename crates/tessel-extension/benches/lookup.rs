//! Benchmark: phase lookup over registry chains
//!
//! # Background
//!
//! `lookup` merges every ancestor's entries with the local ones, then
//! validates and sorts the merged view. Nothing is cached, so the cost
//! grows with chain depth and with the number of extensions per node.
//!
//! We measure a forward and a backward phase for chains as deep as a
//! realistic nested test tree (1 to 16 levels, 4 extensions per level).
//!
//! # When to revisit
//!
//! - If lookups move into a per-leaf hot loop
//! - If nodes routinely carry dozens of extensions

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;
use tessel_extension::{
    Extension, ExtensionRegistry, FactoryTable, FnExtension, Origin, Phase, PhaseSet, PhaseTable,
    Position,
};

const PER_LEVEL: &[Position] = &[
    Position::OutsideDefault,
    Position::Default,
    Position::Default,
    Position::InsideDefault,
];

fn extension(level: usize, slot: usize) -> Arc<dyn Extension> {
    FnExtension::shared(format!("ext-{level}-{slot}"), PhaseSet::EACH, |_| Ok(()))
}

fn build_chain(depth: usize) -> ExtensionRegistry {
    let mut node = ExtensionRegistry::root_with(
        PhaseTable::shared(),
        FactoryTable::with_builtins().shared(),
        &tessel_extension::default_extension_types(),
    )
    .expect("root builds");

    for level in 0..depth {
        for (slot, &position) in PER_LEVEL.iter().enumerate() {
            node.register_extension(
                extension(level, slot),
                Origin::Programmatic(format!("level-{level}")),
                position,
            )
            .expect("allowed");
        }
        if level + 1 < depth {
            let parent = Arc::new(node);
            node = ExtensionRegistry::new_child(&parent, &[]).expect("child builds");
        }
    }
    node
}

fn bench_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("lookup");

    for depth in [1usize, 4, 16] {
        let leaf = build_chain(depth);

        group.bench_with_input(BenchmarkId::new("before_each", depth), &depth, |b, _| {
            b.iter(|| black_box(leaf.lookup(Phase::BeforeEach)));
        });

        group.bench_with_input(BenchmarkId::new("after_each", depth), &depth, |b, _| {
            b.iter(|| black_box(leaf.lookup(Phase::AfterEach)));
        });
    }

    group.finish();
}

fn bench_build_child(c: &mut Criterion) {
    let root = Arc::new(build_chain(4));
    let types = tessel_extension::default_extension_types();

    c.bench_function("new_child/defaults_already_registered", |b| {
        b.iter(|| black_box(ExtensionRegistry::new_child(&root, &types)));
    });
}

criterion_group!(benches, bench_lookup, bench_build_child);
criterion_main!(benches);
