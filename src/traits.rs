//! Common traits for keyed heap data structures
//!
//! This module provides the vocabulary shared by every keyed priority queue in the crate:
//!
//! - [`HeapError`]: the two recoverable failures a heap operation can report
//! - [`Priority`]: totally ordered values with a designated minimum sentinel
//! - [`Relaxation`]: the outcome of an insert-or-improve call
//! - [`KeyedHeap`]: the operations a shortest-path search needs from its frontier
//!
//! Unlike handle-based heaps, a keyed heap addresses entries by an external
//! identifier (for example a graph node id). An internal index maps each key to
//! its entry, so lookups and decreases never require the caller to keep handles.

use std::fmt;
use std::hash::Hash;

/// Error type for keyed heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The key is not stored in the heap
    NotFound,
    /// The heap holds no elements
    Empty,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::NotFound => write!(f, "key is not present in the heap"),
            HeapError::Empty => write!(f, "heap is empty"),
        }
    }
}

impl std::error::Error for HeapError {}

/// A totally ordered priority with a designated smallest value.
///
/// `MIN_SENTINEL` must compare less than or equal to every other value of the
/// type. [`KeyedHeap::delete`] forces an entry down to it so that the entry
/// becomes the minimum before it is extracted.
pub trait Priority: Ord + Copy + fmt::Debug {
    /// The smallest representable priority
    const MIN_SENTINEL: Self;
}

macro_rules! impl_priority {
    ($($t:ty),* $(,)?) => {
        $(
            impl Priority for $t {
                const MIN_SENTINEL: Self = <$t>::MIN;
            }
        )*
    };
}

impl_priority!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// What [`KeyedHeap::insert_or_improve`] did with the supplied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relaxation {
    /// The key was absent and a new entry was created
    Inserted,
    /// The key was present and its value was lowered
    Improved,
    /// The key was present with a value no greater than the one supplied
    Unchanged,
}

impl Relaxation {
    /// Returns true if the heap was modified
    pub fn changed(self) -> bool {
        !matches!(self, Relaxation::Unchanged)
    }
}

/// Keyed min-priority queue
///
/// Each entry pairs a unique key with a priority value. Values only ever decrease
/// while an entry is stored; raising a priority requires deleting and re-inserting.
///
/// # Example
///
/// ```rust
/// use keyed_fibonacci_heap::{HeapError, KeyedHeap, Relaxation};
/// use keyed_fibonacci_heap::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// assert_eq!(heap.insert_or_improve(10, 7u32), Relaxation::Inserted);
/// assert_eq!(heap.insert_or_improve(4, 7u32), Relaxation::Improved);
/// assert_eq!(heap.insert_or_improve(9, 7u32), Relaxation::Unchanged);
/// assert_eq!(heap.pop_min(), Ok((4, 7)));
/// assert_eq!(heap.pop_min(), Err(HeapError::Empty));
/// ```
pub trait KeyedHeap<K: Clone + Eq + Hash, V: Priority> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of stored entries
    fn len(&self) -> usize;

    /// Returns true if `key` is stored in the heap
    fn contains_key(&self, key: &K) -> bool;

    /// Returns the current value stored under `key`
    ///
    /// # Errors
    /// Returns `HeapError::NotFound` if the key is absent.
    fn get_value(&self, key: &K) -> Result<V, HeapError>;

    /// Inserts `key` if absent, otherwise lowers its value if `value` is smaller
    ///
    /// This never raises a stored value, which is exactly the contract an edge
    /// relaxation needs.
    fn insert_or_improve(&mut self, value: V, key: K) -> Relaxation;

    /// Inserts `key` only if absent
    ///
    /// Returns true if the key already existed, in which case nothing changes.
    fn insert_only(&mut self, value: V, key: K) -> bool;

    /// Lowers the value stored under `key`
    ///
    /// A `value` that is not smaller than the current one leaves the heap untouched
    /// and still succeeds.
    ///
    /// # Errors
    /// Returns `HeapError::NotFound` if the key is absent.
    fn decrease(&mut self, value: V, key: &K) -> Result<(), HeapError>;

    /// Removes the entry stored under `key`, returning the value it held
    ///
    /// # Errors
    /// Returns `HeapError::NotFound` if the key is absent.
    fn delete(&mut self, key: &K) -> Result<V, HeapError>;

    /// Returns the minimum value and its key without removing it
    ///
    /// # Errors
    /// Returns `HeapError::Empty` if the heap holds no entries.
    fn peek_min(&self) -> Result<(V, &K), HeapError>;

    /// Removes and returns the minimum value and its key
    ///
    /// # Errors
    /// Returns `HeapError::Empty` if the heap holds no entries.
    fn pop_min(&mut self) -> Result<(V, K), HeapError>;
}
