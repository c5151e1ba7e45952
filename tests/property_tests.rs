//! Property-based tests using proptest
//!
//! These tests generate random sequences of operations, replay them against both
//! the heap and a brute-force model, and verify that the heap invariants hold
//! after every step.

use keyed_fibonacci_heap::fibonacci::FibonacciHeap;
use keyed_fibonacci_heap::{HeapError, KeyedHeap, Relaxation};
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum Op {
    InsertOrImprove(i32, u8),
    InsertOnly(i32, u8),
    Decrease(i32, u8),
    Delete(u8),
    Pop,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (-1000i32..1000, 0u8..40).prop_map(|(v, k)| Op::InsertOrImprove(v, k)),
        1 => (-1000i32..1000, 0u8..40).prop_map(|(v, k)| Op::InsertOnly(v, k)),
        2 => (-1000i32..1000, 0u8..40).prop_map(|(v, k)| Op::Decrease(v, k)),
        1 => (0u8..40).prop_map(Op::Delete),
        2 => Just(Op::Pop),
    ]
}

/// Replays `ops` on a heap and on a map model, comparing after every step
fn check_against_model(ops: Vec<Op>) -> Result<(), TestCaseError> {
    let mut heap: FibonacciHeap<u8, i32> = FibonacciHeap::new();
    let mut model: HashMap<u8, i32> = HashMap::new();

    for op in ops {
        match op {
            Op::InsertOrImprove(value, key) => {
                let expected = match model.get(&key) {
                    None => Relaxation::Inserted,
                    Some(&current) if value < current => Relaxation::Improved,
                    Some(_) => Relaxation::Unchanged,
                };
                prop_assert_eq!(heap.insert_or_improve(value, key), expected);
                let entry = model.entry(key).or_insert(value);
                *entry = (*entry).min(value);
            }
            Op::InsertOnly(value, key) => {
                prop_assert_eq!(heap.insert_only(value, key), model.contains_key(&key));
                model.entry(key).or_insert(value);
            }
            Op::Decrease(value, key) => match model.get_mut(&key) {
                Some(current) => {
                    prop_assert_eq!(heap.decrease(value, &key), Ok(()));
                    *current = (*current).min(value);
                }
                None => prop_assert_eq!(heap.decrease(value, &key), Err(HeapError::NotFound)),
            },
            Op::Delete(key) => match model.remove(&key) {
                Some(value) => {
                    prop_assert_eq!(heap.delete(&key), Ok(value));
                    prop_assert_eq!(heap.get_value(&key), Err(HeapError::NotFound));
                }
                None => prop_assert_eq!(heap.delete(&key), Err(HeapError::NotFound)),
            },
            Op::Pop => match model.values().min().copied() {
                Some(min) => {
                    let (value, key) = heap.pop_min().map_err(|e| TestCaseError::fail(e.to_string()))?;
                    prop_assert_eq!(value, min);
                    prop_assert_eq!(model.remove(&key), Some(min));
                }
                None => prop_assert_eq!(heap.pop_min(), Err(HeapError::Empty)),
            },
        }

        prop_assert!(heap.verify_structure());
        prop_assert_eq!(heap.len(), model.len());
        prop_assert_eq!(heap.is_empty(), model.is_empty());

        // Min correctness against a brute-force scan
        match model.values().min() {
            Some(&min) => {
                let (value, key) = heap.peek_min().map_err(|e| TestCaseError::fail(e.to_string()))?;
                prop_assert_eq!(value, min);
                prop_assert_eq!(model.get(key), Some(&min));
            }
            None => prop_assert_eq!(heap.peek_min(), Err(HeapError::Empty)),
        }

        // Index consistency
        let mut stored: Vec<(u8, i32)> = heap.iter().map(|(k, v)| (*k, v)).collect();
        let mut expected: Vec<(u8, i32)> = model.iter().map(|(k, v)| (*k, *v)).collect();
        stored.sort();
        expected.sort();
        prop_assert_eq!(stored, expected);
    }

    Ok(())
}

/// Pops everything and checks non-decreasing order with exactly len pops
fn check_drain_order(values: Vec<i32>, decreases: Vec<(usize, i32)>) -> Result<(), TestCaseError> {
    let mut heap: FibonacciHeap<usize, i32> = FibonacciHeap::new();
    for (key, value) in values.iter().enumerate() {
        heap.insert_or_improve(*value, key);
    }
    // Consolidate once so decreases cut real trees
    if heap.pop_min().is_ok() {
        for (key, value) in decreases {
            let _ = heap.decrease(value, &key);
        }
    }

    let len = heap.len();
    let mut last = i32::MIN;
    for _ in 0..len {
        let (value, _) = heap.pop_min().map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert!(value >= last, "popped {} after {}", value, last);
        last = value;
    }
    prop_assert_eq!(heap.pop_min(), Err(HeapError::Empty));
    Ok(())
}

proptest! {
    #[test]
    fn test_fibonacci_matches_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        check_against_model(ops)?;
    }

    #[test]
    fn test_fibonacci_drain_order(
        values in prop::collection::vec(-1000i32..1000, 0..150),
        decreases in prop::collection::vec((0usize..150, -2000i32..1000), 0..80)
    ) {
        check_drain_order(values, decreases)?;
    }

    #[test]
    fn test_fibonacci_non_decrease_is_no_op(
        values in prop::collection::vec(-1000i32..1000, 2..60),
        bumps in prop::collection::vec((0usize..60, 0i32..500), 1..30)
    ) {
        let mut heap: FibonacciHeap<usize, i32> = FibonacciHeap::new();
        for (key, value) in values.iter().enumerate() {
            heap.insert_or_improve(*value, key);
        }
        heap.pop_min().map_err(|e| TestCaseError::fail(e.to_string()))?;

        let before: Vec<(usize, i32)> = {
            let mut v: Vec<_> = heap.iter().map(|(k, v)| (*k, v)).collect();
            v.sort();
            v
        };
        let min_before = heap.peek_min().map(|(v, k)| (v, *k));

        for (key, bump) in bumps {
            if let Ok(current) = heap.get_value(&key) {
                prop_assert_eq!(heap.decrease(current + bump, &key), Ok(()));
                prop_assert_eq!(heap.insert_or_improve(current + bump, key), Relaxation::Unchanged);
            }
        }

        let mut after: Vec<(usize, i32)> = heap.iter().map(|(k, v)| (*k, v)).collect();
        after.sort();
        prop_assert_eq!(after, before);
        prop_assert_eq!(heap.peek_min().map(|(v, k)| (v, *k)), min_before);
    }
}
