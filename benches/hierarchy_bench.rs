use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use tracegraph::hierarchy::build_hierarchy;
use tracegraph::normalize::{normalize, TypeTable};
use tracegraph::types::{Item, RawNode, TypeDefinition, PROP_DB_KEY};

/// Pallets of 40 cases of 24 units each.
fn pallet_items(pallets: usize) -> Vec<Item> {
    let table = TypeTable::load([
        TypeDefinition::new("PALLET01", 3, "pallet"),
        TypeDefinition::new("CASE0001", 2, "case"),
        TypeDefinition::new("UNIT0001", 1, "unit"),
    ])
    .expect("static type table");

    let mut items = Vec::new();
    let mut id = 0i64;
    let mut push = |key: String, parent: Option<&str>| {
        id += 1;
        let raw = RawNode::new(id).with(PROP_DB_KEY, key);
        items.push(normalize(&raw, parent, &table).expect("known type"));
    };
    for p in 0..pallets {
        let pallet = format!("PALLET01P{p}");
        push(pallet.clone(), None);
        for c in 0..40 {
            let case = format!("CASE0001C{p}-{c}");
            push(case.clone(), Some(&pallet));
            for u in 0..24 {
                push(format!("UNIT0001U{p}-{c}-{u}"), Some(&case));
            }
        }
    }
    items
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_hierarchy");
    for pallets in [1usize, 10, 50] {
        let items = pallet_items(pallets);
        group.bench_with_input(BenchmarkId::from_parameter(pallets), &items, |b, items| {
            b.iter(|| build_hierarchy(black_box(items.clone())))
        });
    }
    group.finish();
}

fn bench_count(c: &mut Criterion) {
    let tree = build_hierarchy(pallet_items(50)).hierarchy;
    c.bench_function("count_descendants/50_pallets", |b| {
        b.iter(|| black_box(tree.root().count_descendants()))
    });
}

criterion_group!(benches, bench_build, bench_count);
criterion_main!(benches);
