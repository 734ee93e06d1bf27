//! Property-based tests for tracegraph using proptest.
//!
//! These tests verify invariants that must hold for all possible inputs,
//! finding edge cases that unit tests might miss.

use proptest::prelude::*;

use tracegraph::error::TraceGraphError;
use tracegraph::hierarchy::build_hierarchy;
use tracegraph::normalize::{normalize, TypeTable};
use tracegraph::types::{Item, RawNode, TypeDefinition, TypeId, PROP_DB_KEY};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

const CODES: &[&str] = &["ABCD1234", "EFGH5678", "PALLET01", "CASE0001"];

fn table() -> TypeTable {
    TypeTable::load(
        CODES
            .iter()
            .enumerate()
            .map(|(i, code)| TypeDefinition::new(*code, i as i32 + 1, *code)),
    )
    .unwrap()
}

/// Strategy for a known type code.
fn arb_code() -> impl Strategy<Value = &'static str> {
    prop::sample::select(CODES)
}

/// Strategy for a serial suffix (may be empty, may be non-ASCII).
fn arb_serial() -> impl Strategy<Value = String> {
    "[A-Za-z0-9ÄÖü\\-]{0,16}".prop_map(|s| s)
}

/// Strategy for a forest: `parents[i]` is either `None`, an index `< i`
/// (a real parent), or an out-of-window marker.
fn arb_forest(max: usize) -> impl Strategy<Value = Vec<Option<Result<usize, ()>>>> {
    prop::collection::vec(
        prop_oneof![
            Just(None),
            any::<prop::sample::Index>().prop_map(|i| Some(Ok(i.index(usize::MAX)))),
            Just(Some(Err(()))),
        ],
        0..max,
    )
}

fn forest_items(shape: &[Option<Result<usize, ()>>], table: &TypeTable) -> Vec<Item> {
    shape
        .iter()
        .enumerate()
        .map(|(i, parent)| {
            let key = format!("ABCD1234N{i}");
            let parent_key = match parent {
                None => None,
                Some(Ok(_)) if i == 0 => None,
                Some(Ok(p)) => Some(format!("ABCD1234N{}", p % i)),
                Some(Err(())) => Some(format!("ABCD1234MISSING{i}")),
            };
            let raw = RawNode::new(i as i64).with(PROP_DB_KEY, key);
            normalize(&raw, parent_key.as_deref(), table).unwrap()
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    /// P1: prefix resolves to the table entry, serial is the exact remainder.
    #[test]
    fn decomposition_round_trip(code in arb_code(), serial in arb_serial()) {
        let t = table();
        let key = format!("{code}{serial}");
        let item = normalize(&RawNode::new(1).with(PROP_DB_KEY, key.as_str()), None, &t).unwrap();
        prop_assert_eq!(item.type_id, t.get(code).unwrap().id);
        prop_assert_eq!(&item.serial, &serial);
        prop_assert_eq!(item.db_key(), key.as_str());
    }

    /// P2: an unknown prefix always fails with UnknownTypeCode.
    #[test]
    fn unknown_prefix_always_fails(prefix in "[Q-Z]{8}", serial in arb_serial()) {
        let key = format!("{prefix}{serial}");
        let result = normalize(&RawNode::new(1).with(PROP_DB_KEY, key.as_str()), None, &table());
        let is_unknown = matches!(result, Err(TraceGraphError::UnknownTypeCode { .. }));
        prop_assert!(is_unknown);
    }

    /// P3: N distinct keys give N descendants, whatever the input order.
    #[test]
    fn total_count_equals_item_count(shape in arb_forest(64), seed in any::<u64>()) {
        let t = table();
        let mut items = forest_items(&shape, &t);
        let n = items.len();
        // Deterministic shuffle driven by the seed.
        if n > 1 {
            let mut s = seed;
            for i in (1..n).rev() {
                s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
                items.swap(i, (s >> 33) as usize % (i + 1));
            }
        }
        let outcome = build_hierarchy(items);
        prop_assert_eq!(outcome.hierarchy.root().count_descendants(), n);
        prop_assert_eq!(outcome.hierarchy.walk().count(), n);
        prop_assert!(outcome.report.is_clean());
    }

    /// P4: items whose parent is outside the set become root children.
    #[test]
    fn orphans_attach_to_root(shape in arb_forest(32)) {
        let t = table();
        let items = forest_items(&shape, &t);
        let expected_roots: Vec<String> = items
            .iter()
            .filter(|i| i.parent_db_key().map_or(true, |p| p.contains("MISSING")))
            .map(|i| i.db_key().to_string())
            .collect();
        let tree = build_hierarchy(items).hierarchy;
        let mut roots: Vec<String> = tree
            .root()
            .children()
            .map(|c| c.item().unwrap().db_key().to_string())
            .collect();
        let mut expected = expected_roots;
        roots.sort();
        expected.sort();
        prop_assert_eq!(roots, expected);
    }

    /// P5: counting does not change the tree.
    #[test]
    fn counting_is_idempotent(shape in arb_forest(32)) {
        let tree = build_hierarchy(forest_items(&shape, &table())).hierarchy;
        let first = tree.root().count_descendants();
        let second = tree.root().count_descendants();
        prop_assert_eq!(first, second);
    }

    /// Per-type counts sum to the total.
    #[test]
    fn type_counts_sum_to_total(shape in arb_forest(32)) {
        let tree = build_hierarchy(forest_items(&shape, &table())).hierarchy;
        let by_type = tree.root().count_by_type();
        let sum: usize = by_type.values().sum();
        prop_assert_eq!(sum, tree.root().count_descendants());
        prop_assert!(by_type.keys().all(|id| *id == TypeId(1)) || by_type.is_empty());
    }
}
