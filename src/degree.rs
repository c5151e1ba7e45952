//! Degree type and utilities for Fibonacci heap nodes.
//!
//! # Why u8?
//!
//! The degree of a node is its number of direct children. In a Fibonacci heap a
//! node of degree `k` roots a subtree of at least `F(k + 2)` nodes, where `F` is
//! the Fibonacci sequence, so the degree never exceeds `log_φ(n) ≈ 1.44 log₂(n)`.
//! A heap with `usize::MAX` elements stays below degree 93, far inside `u8`.
//!
//! # Runtime Checks
//!
//! [`checked_increment`] and [`checked_decrement`] panic on overflow and underflow.
//! Either would mean the heap structure is corrupt, and continuing would corrupt
//! every later query.

/// Type alias for node degree.
pub type Degree = u8;

/// Maximum valid degree value.
pub const MAX_DEGREE: Degree = u8::MAX;

/// Increment a degree, panicking on overflow.
///
/// # Panics
///
/// Panics if `degree == MAX_DEGREE`.
///
/// # Example
///
/// ```rust
/// use keyed_fibonacci_heap::degree::{checked_increment, Degree};
///
/// let degree: Degree = 5;
/// assert_eq!(checked_increment(degree), 6);
/// ```
#[inline]
pub fn checked_increment(degree: Degree) -> Degree {
    degree.checked_add(1).expect(
        "degree overflow: a Fibonacci heap node cannot have more than log_phi(n) children",
    )
}

/// Decrement a degree, panicking if it is already zero.
///
/// # Panics
///
/// Panics if `degree == 0`, which means a child was cut from a node that had none.
#[inline]
pub fn checked_decrement(degree: Degree) -> Degree {
    degree
        .checked_sub(1)
        .expect("degree underflow: cut a child from a node with no children")
}

/// Largest degree any node can reach in a heap of `len` elements.
///
/// This is the largest `k` with `F(k + 2) <= len`. Consolidation sizes its
/// degree table with it.
///
/// ```rust
/// use keyed_fibonacci_heap::degree::max_degree_bound;
///
/// assert_eq!(max_degree_bound(1), 0);
/// assert_eq!(max_degree_bound(3), 2);
/// assert_eq!(max_degree_bound(1000), 14);
/// ```
pub fn max_degree_bound(len: usize) -> usize {
    // (F(k + 2), F(k + 3)) for the current k
    let (mut lo, mut hi) = (1usize, 2usize);
    let mut k = 0;
    while hi <= len {
        match lo.checked_add(hi) {
            Some(next) => {
                lo = hi;
                hi = next;
                k += 1;
            }
            None => return k + 1,
        }
    }
    k
}
