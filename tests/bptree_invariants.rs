//! Property and stress tests for the B+ tree index.
//!
//! Random operation sequences run against a `BTreeMap` reference model;
//! after every mutation the tree must pass `check_invariants`, and at
//! the end its contents must match the model exactly.

use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use blockindex::{BPlusTree, DeleteResult, Key, RecordPtr};

#[derive(Debug, Clone, Copy)]
enum Op {
    Insert(Key),
    Delete(Key),
}

fn op_strategy(key_space: Key) -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (0..key_space).prop_map(Op::Insert),
        2 => (0..key_space).prop_map(Op::Delete),
    ]
}

/// Applies `ops` to a fresh tree and a `BTreeMap` model side by side,
/// validating invariants after every mutation. Locators are unique per
/// insertion so the model can track individual occurrences.
fn run_ops(order: usize, ops: &[Op]) -> Result<(BPlusTree, BTreeMap<Key, Vec<RecordPtr>>), TestCaseError> {
    let mut tree = BPlusTree::new(order).unwrap();
    let mut model: BTreeMap<Key, Vec<RecordPtr>> = BTreeMap::new();
    let mut next_offset = 0u32;

    for op in ops {
        match *op {
            Op::Insert(key) => {
                let ptr = RecordPtr::new(0, next_offset);
                next_offset += 1;
                tree.insert(key, ptr);
                model.entry(key).or_default().push(ptr);
            }
            Op::Delete(key) => {
                // The tree removes the occurrence that sits first on the
                // leaf chain; mirror that exact locator in the model.
                let found = tree.exact_search(key);
                let result = tree.delete(key);
                if let Some(&removed) = found.first() {
                    prop_assert_eq!(result, DeleteResult::Deleted);
                    let ptrs = model.get_mut(&key).unwrap();
                    let pos = ptrs.iter().position(|p| *p == removed).unwrap();
                    ptrs.remove(pos);
                    if ptrs.is_empty() {
                        model.remove(&key);
                    }
                } else if model.is_empty() {
                    prop_assert_eq!(result, DeleteResult::EmptyTree);
                } else {
                    prop_assert_eq!(result, DeleteResult::KeyNotFound);
                }
            }
        }
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }

    Ok((tree, model))
}

fn assert_matches_model(
    tree: &BPlusTree,
    model: &BTreeMap<Key, Vec<RecordPtr>>,
) -> Result<(), TestCaseError> {
    let total: usize = model.values().map(Vec::len).sum();
    prop_assert_eq!(tree.len(), total);
    prop_assert_eq!(tree.is_empty(), total == 0);

    // Per-key contents, compared as sets (all locators are distinct).
    for (&key, ptrs) in model {
        let mut found = tree.exact_search(key);
        let mut expected = ptrs.clone();
        found.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(found, expected, "key {}", key);
    }

    // The leaf chain is the sorted multiset of all keys in the model.
    let chain: Vec<Key> = tree.leaves().flatten().collect();
    let flat: Vec<Key> = model
        .iter()
        .flat_map(|(&key, ptrs)| std::iter::repeat(key).take(ptrs.len()))
        .collect();
    prop_assert_eq!(chain, flat);

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_tree_matches_model(
        order in 3usize..8,
        ops in prop::collection::vec(op_strategy(60), 1..300),
    ) {
        let (tree, model) = run_ops(order, &ops)?;
        assert_matches_model(&tree, &model)?;
    }

    // A tiny key space forces heavy duplication, stressing the
    // equal-separator paths in descent and deletion.
    #[test]
    fn prop_duplicate_heavy_workload(
        order in 3usize..6,
        ops in prop::collection::vec(op_strategy(5), 1..200),
    ) {
        let (tree, model) = run_ops(order, &ops)?;
        assert_matches_model(&tree, &model)?;
    }

    #[test]
    fn prop_range_search_matches_model(
        order in 3usize..8,
        ops in prop::collection::vec(op_strategy(60), 1..200),
        low in -5i64..65,
        width in 0i64..70,
    ) {
        let (tree, model) = run_ops(order, &ops)?;

        let high = low + width;
        let mut expected: Vec<RecordPtr> = Vec::new();
        for (&key, ptrs) in &model {
            if low < key && key < high {
                expected.extend(ptrs.iter().copied());
            }
        }

        // Bounds are exclusive on both sides; duplicates within one key
        // may come back in either chain order, so compare as sets.
        let mut found = tree.range_search(low, high);
        found.sort_unstable();
        expected.sort_unstable();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn prop_deleting_everything_empties_the_tree(
        order in 3usize..8,
        keys in prop::collection::vec(0i64..100, 1..150),
    ) {
        let mut tree = BPlusTree::new(order).unwrap();
        for (i, &key) in keys.iter().enumerate() {
            tree.insert(key, RecordPtr::new(0, i as u32));
        }

        for &key in &keys {
            prop_assert_eq!(tree.delete(key), DeleteResult::Deleted, "key {}", key);
            prop_assert_eq!(tree.check_invariants(), Ok(()));
        }

        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.height(), 0);
        prop_assert_eq!(tree.node_count(), 0);
    }
}

// Deterministic large-scale shuffle: insert a few thousand keys in
// random order, delete a random half, then the rest.
#[test]
fn test_shuffled_bulk_insert_then_delete() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x1db5eed);

    for order in [3, 4, 7, 32] {
        let mut keys: Vec<Key> = (0..2000).collect();
        keys.shuffle(&mut rng);

        let mut tree = BPlusTree::new(order).unwrap();
        for (i, &key) in keys.iter().enumerate() {
            tree.insert(key, RecordPtr::new(0, i as u32));
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 2000);

        keys.shuffle(&mut rng);
        let (first_half, second_half) = keys.split_at(1000);

        for &key in first_half {
            assert_eq!(tree.delete(key), DeleteResult::Deleted, "order {order} key {key}");
        }
        tree.check_invariants().unwrap();
        assert_eq!(tree.len(), 1000);

        // The survivors are exactly the second half.
        let mut remaining: Vec<Key> = second_half.to_vec();
        remaining.sort_unstable();
        let chain: Vec<Key> = tree.leaves().flatten().collect();
        assert_eq!(chain, remaining);

        for &key in second_half {
            assert_eq!(tree.delete(key), DeleteResult::Deleted, "order {order} key {key}");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 0);
    }
}
