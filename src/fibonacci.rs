//! Keyed Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert and decrease
//! - O(log n) amortized extract-min and delete
//!
//! The structure consists of a collection of heap-ordered trees. The heap keeps the
//! roots in an unordered list and caches the minimum root. Trees are only merged
//! lazily, by `consolidate`, when the minimum is extracted.
//!
//! # Storage
//!
//! Every node lives in a generational arena (`slotmap`). Parent, child and root links
//! are arena keys, so the arena is the single owner of all nodes and links can never
//! dangle. Sibling order carries no meaning; each node records its `slot` inside the
//! list that holds it (the root list or its parent's child list) so it can be removed
//! in O(1) by swap-remove.
//!
//! An `FxHashMap` index maps each caller key to its node, giving O(1) lookup,
//! decrease and delete by key.

use crate::degree::{self, Degree};
use crate::traits::{HeapError, KeyedHeap, Priority, Relaxation};
use log::{error, trace};
use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::hash::Hash;

new_key_type! {
    /// Arena key of a heap node
    struct NodeKey;
}

#[derive(Debug, Clone)]
struct Node<K, V> {
    /// Creation order, used to break ties between equal values
    id: u64,
    key: K,
    value: V,
    degree: Degree,
    marked: bool,
    parent: Option<NodeKey>,
    children: SmallVec<[NodeKey; 4]>,
    /// Position in the root list or in the parent's child list
    slot: usize,
}

/// Fibonacci Heap addressed by key
///
/// # Example
///
/// ```rust
/// use keyed_fibonacci_heap::fibonacci::FibonacciHeap;
/// use keyed_fibonacci_heap::KeyedHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.insert_or_improve(5, "a");
/// heap.insert_or_improve(3, "b");
/// heap.insert_or_improve(8, "c");
/// heap.decrease(1, &"c").unwrap();
/// assert_eq!(heap.pop_min(), Ok((1, "c")));
/// assert_eq!(heap.pop_min(), Ok((3, "b")));
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciHeap<K, V> {
    nodes: SlotMap<NodeKey, Node<K, V>>,
    roots: Vec<NodeKey>,
    min: Option<NodeKey>,
    index: FxHashMap<K, NodeKey>,
    len: usize,
    next_id: u64,
}

impl<K: Clone + Eq + Hash, V: Priority> Default for FibonacciHeap<K, V> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: Clone + Eq + Hash, V: Priority> KeyedHeap<K, V> for FibonacciHeap<K, V> {
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn len(&self) -> usize {
        self.len
    }

    fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn get_value(&self, key: &K) -> Result<V, HeapError> {
        let node = self.index.get(key).ok_or(HeapError::NotFound)?;
        Ok(self.nodes[*node].value)
    }

    fn insert_or_improve(&mut self, value: V, key: K) -> Relaxation {
        match self.index.get(&key).copied() {
            None => {
                self.create(value, key);
                Relaxation::Inserted
            }
            Some(node) if value < self.nodes[node].value => {
                self.lower_value(node, value);
                Relaxation::Improved
            }
            Some(_) => Relaxation::Unchanged,
        }
    }

    fn insert_only(&mut self, value: V, key: K) -> bool {
        if self.index.contains_key(&key) {
            return true;
        }
        self.create(value, key);
        false
    }

    fn decrease(&mut self, value: V, key: &K) -> Result<(), HeapError> {
        let node = *self.index.get(key).ok_or(HeapError::NotFound)?;
        if value < self.nodes[node].value {
            self.lower_value(node, value);
        }
        Ok(())
    }

    fn delete(&mut self, key: &K) -> Result<V, HeapError> {
        let node = *self.index.get(key).ok_or(HeapError::NotFound)?;
        let value = self.nodes[node].value;
        self.promote_to_min(node);
        self.extract_min()?;
        Ok(value)
    }

    fn peek_min(&self) -> Result<(V, &K), HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;
        let node = &self.nodes[min];
        Ok((node.value, &node.key))
    }

    fn pop_min(&mut self) -> Result<(V, K), HeapError> {
        self.extract_min()
    }
}

impl<K: Clone + Eq + Hash, V: Priority> FibonacciHeap<K, V> {
    /// Creates an empty heap with room for `capacity` entries before reallocating
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: SlotMap::with_capacity_and_key(capacity),
            roots: Vec::new(),
            min: None,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            len: 0,
            next_id: 0,
        }
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.index.clear();
        self.min = None;
        self.len = 0;
    }

    /// Iterates over all stored `(key, value)` pairs in no particular order
    pub fn iter(&self) -> impl Iterator<Item = (&K, V)> + '_ {
        self.nodes.values().map(|node| (&node.key, node.value))
    }

    /// Walks the whole forest and checks every structural invariant
    ///
    /// Returns false and logs the first violation found. Intended for tests and
    /// debugging; it costs O(n).
    pub fn verify_structure(&self) -> bool {
        match self.check_structure() {
            Ok(()) => true,
            Err(violation) => {
                error!("fibonacci heap invariant violated: {}", violation);
                false
            }
        }
    }

    /// Orders nodes by value, then by creation id
    fn precedes(&self, a: NodeKey, b: NodeKey) -> bool {
        let (a, b) = (&self.nodes[a], &self.nodes[b]);
        (a.value, a.id) < (b.value, b.id)
    }

    /// Creates a node for an absent key and adds it to the root list
    fn create(&mut self, value: V, key: K) {
        let id = self.next_id;
        self.next_id += 1;

        let node = self.nodes.insert(Node {
            id,
            key: key.clone(),
            value,
            degree: 0,
            marked: false,
            parent: None,
            children: SmallVec::new(),
            slot: 0,
        });
        self.index.insert(key, node);
        self.add_root(node);

        match self.min {
            Some(min) if !self.precedes(node, min) => {}
            _ => self.min = Some(node),
        }
        self.len += 1;
    }

    /// Lowers a node's value, restoring heap order by cutting it if needed
    ///
    /// The caller guarantees `value` is smaller than the current value.
    fn lower_value(&mut self, node: NodeKey, value: V) {
        self.nodes[node].value = value;

        if let Some(parent) = self.nodes[node].parent {
            if value < self.nodes[parent].value {
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        // A node still below its parent cannot beat the min root
        if self.nodes[node].parent.is_none() {
            match self.min {
                Some(min) if !self.precedes(node, min) => {}
                _ => self.min = Some(node),
            }
        }
    }

    /// Forces a node to `V::MIN_SENTINEL` and makes it the minimum
    ///
    /// The sentinel acts as negative infinity: the node is cut even when its parent
    /// holds the sentinel too, and it replaces the min regardless of ties.
    fn promote_to_min(&mut self, node: NodeKey) {
        self.nodes[node].value = V::MIN_SENTINEL;
        if let Some(parent) = self.nodes[node].parent {
            self.cut(node, parent);
            self.cascading_cut(parent);
        }
        self.min = Some(node);
    }

    fn extract_min(&mut self) -> Result<(V, K), HeapError> {
        let min = self.min.ok_or(HeapError::Empty)?;

        // Promote every child of the min to a root
        let children = std::mem::take(&mut self.nodes[min].children);
        for child in children {
            let node = &mut self.nodes[child];
            node.parent = None;
            node.marked = false;
            self.add_root(child);
        }

        self.remove_root(min);
        self.min = None;
        self.consolidate();

        self.len -= 1;
        let node = self
            .nodes
            .remove(min)
            .expect("min node missing from the arena");
        self.index.remove(&node.key);
        Ok((node.value, node.key))
    }

    /// Links roots of equal degree until every degree occurs at most once
    fn consolidate(&mut self) {
        let roots = std::mem::take(&mut self.roots);
        let mut table: Vec<Option<NodeKey>> = vec![None; degree::max_degree_bound(self.len) + 1];

        for &root in &roots {
            let mut x = root;
            let mut d = self.nodes[x].degree as usize;
            loop {
                assert!(
                    d < table.len(),
                    "degree {} exceeds the bound for a heap of {} nodes",
                    d,
                    self.len
                );
                match table[d].take() {
                    Some(mut y) => {
                        if self.precedes(y, x) {
                            std::mem::swap(&mut x, &mut y);
                        }
                        self.link(y, x);
                        d += 1;
                    }
                    None => {
                        table[d] = Some(x);
                        break;
                    }
                }
            }
        }

        trace!(
            "consolidate: {} roots merged into {}",
            roots.len(),
            table.iter().flatten().count()
        );

        // Reuse the snapshot's allocation for the rebuilt root list
        self.roots = roots;
        self.roots.clear();
        for root in table.into_iter().flatten() {
            self.add_root(root);
            match self.min {
                Some(min) if !self.precedes(root, min) => {}
                _ => self.min = Some(root),
            }
        }
    }

    /// Makes `child` a child of `parent`
    ///
    /// `child` must already be off the root list.
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        let p = &mut self.nodes[parent];
        let slot = p.children.len();
        p.children.push(child);
        p.degree = degree::checked_increment(p.degree);

        let c = &mut self.nodes[child];
        c.parent = Some(parent);
        c.marked = false;
        c.slot = slot;
    }

    /// Detaches `node` from `parent` and moves it to the root list
    fn cut(&mut self, node: NodeKey, parent: NodeKey) {
        let slot = self.nodes[node].slot;
        let p = &mut self.nodes[parent];
        assert_eq!(
            p.children.get(slot),
            Some(&node),
            "child list out of sync with node slot"
        );
        p.children.swap_remove(slot);
        p.degree = degree::checked_decrement(p.degree);
        let moved = p.children.get(slot).copied();
        if let Some(moved) = moved {
            self.nodes[moved].slot = slot;
        }

        let n = &mut self.nodes[node];
        n.parent = None;
        n.marked = false;
        self.add_root(node);
        trace!("cut node {} from its parent", self.nodes[node].id);
    }

    /// Walks up from `node`, cutting marked ancestors and marking the first unmarked one
    fn cascading_cut(&mut self, mut node: NodeKey) {
        while let Some(parent) = self.nodes[node].parent {
            if !self.nodes[node].marked {
                self.nodes[node].marked = true;
                return;
            }
            self.cut(node, parent);
            node = parent;
        }
    }

    fn add_root(&mut self, node: NodeKey) {
        self.nodes[node].slot = self.roots.len();
        self.roots.push(node);
    }

    fn remove_root(&mut self, node: NodeKey) {
        let slot = self.nodes[node].slot;
        assert_eq!(
            self.roots.get(slot),
            Some(&node),
            "root list out of sync with node slot"
        );
        self.roots.swap_remove(slot);
        if let Some(&moved) = self.roots.get(slot) {
            self.nodes[moved].slot = slot;
        }
    }

    fn check_structure(&self) -> Result<(), String> {
        if self.len != self.nodes.len() || self.len != self.index.len() {
            return Err(format!(
                "len {} but arena holds {} nodes and index {} keys",
                self.len,
                self.nodes.len(),
                self.index.len()
            ));
        }

        for (key, &node) in &self.index {
            match self.nodes.get(node) {
                Some(n) if n.key == *key => {}
                _ => return Err("index entry points at a different node".to_string()),
            }
        }

        match self.min {
            None if self.len > 0 => return Err("non-empty heap has no min".to_string()),
            Some(min) => {
                if self.nodes[min].parent.is_some() {
                    return Err("min is not a root".to_string());
                }
                if self.roots.iter().any(|&r| self.nodes[r].value < self.nodes[min].value) {
                    return Err("a root has a smaller value than min".to_string());
                }
            }
            None => {}
        }

        let mut reached = 0;
        let mut stack = Vec::new();
        for (slot, &root) in self.roots.iter().enumerate() {
            let n = &self.nodes[root];
            if n.parent.is_some() || n.marked || n.slot != slot {
                return Err(format!("root {} has a parent, a mark or a stale slot", n.id));
            }
            stack.push(root);
        }

        while let Some(node) = stack.pop() {
            reached += 1;
            let n = &self.nodes[node];
            if n.degree as usize != n.children.len() {
                return Err(format!(
                    "node {} has degree {} but {} children",
                    n.id,
                    n.degree,
                    n.children.len()
                ));
            }
            for (slot, &child) in n.children.iter().enumerate() {
                let c = &self.nodes[child];
                if c.parent != Some(node) || c.slot != slot {
                    return Err(format!("child {} has a stale parent or slot", c.id));
                }
                if c.value < n.value {
                    return Err(format!("child {} is smaller than parent {}", c.id, n.id));
                }
                stack.push(child);
            }
        }

        if reached != self.len {
            return Err(format!("{} nodes reachable but len is {}", reached, self.len));
        }
        Ok(())
    }
}
