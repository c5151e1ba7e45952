//! Keyed Fibonacci Heap for Shortest-Path Search
//!
//! This crate provides a min-priority queue implemented as a Fibonacci heap whose
//! entries are addressed by caller-chosen keys rather than by handles:
//!
//! - **Insert / insert-or-improve**: O(1) amortized
//! - **Decrease**: O(1) amortized, located through an O(1) key index
//! - **Extract-min / delete**: O(log n) amortized
//!
//! The heap is the engine of the [`pathfinding`] module, which runs a bidirectional
//! Dijkstra search over a directed weighted graph.
//!
//! # Example
//!
//! ```rust
//! use keyed_fibonacci_heap::fibonacci::FibonacciHeap;
//! use keyed_fibonacci_heap::KeyedHeap;
//!
//! let mut heap = FibonacciHeap::new();
//! heap.insert_or_improve(5, "a");
//! heap.insert_or_improve(3, "b");
//! heap.decrease(1, &"a").unwrap();
//! assert_eq!(heap.peek_min(), Ok((1, &"a")));
//! ```

pub mod degree;
pub mod fibonacci;
pub mod pathfinding;
pub mod traits;

// Re-export the main trait for convenience
pub use traits::{HeapError, KeyedHeap, Priority, Relaxation};
