//! Bidirectional Dijkstra search driven by a keyed heap
//!
//! This module provides a directed weighted [`Graph`] and shortest-path searches that
//! use the keyed heaps of this crate as their frontier. Graph node ids double as heap
//! keys, so an edge relaxation is a single [`KeyedHeap::insert_or_improve`] call:
//! unseen nodes are inserted, better distances lower the stored value, and worse ones
//! are ignored.
//!
//! # Design
//!
//! The bidirectional search keeps one frontier per direction. Each step alternates
//! direction, settles the closest node of that frontier and relaxes its outgoing
//! (forward) or incoming (backward) edges. Whenever a relaxed node has a tentative
//! distance from both ends, the sum is a candidate path. The search stops as soon as
//! a node is settled from both sides; the best candidate seen so far is then optimal.
//!
//! Edge costs must be non-negative.
//!
//! # Example
//!
//! ```rust
//! use keyed_fibonacci_heap::pathfinding::{shortest_path, Graph};
//!
//! let mut graph = Graph::new();
//! graph.add_edge(1, 2, 4u32);
//! graph.add_edge(2, 3, 1);
//! graph.add_edge(1, 3, 7);
//!
//! let result = shortest_path(&graph, &1, &3).unwrap();
//! assert_eq!(result.cost, 5);
//! assert_eq!(result.path, vec![1, 2, 3]);
//! ```

use crate::fibonacci::FibonacciHeap;
use crate::traits::{KeyedHeap, Priority};
use log::debug;
use rustc_hash::FxHashMap;
use std::hash::Hash;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Trait for types that can be used as edge and path costs.
///
/// `Default` must be the zero cost. Path sums that do not fit in the cost type are
/// never produced: a relaxation whose sum overflows is skipped, so a target that is
/// only reachable through such a path is reported as unreachable.
pub trait Cost: Priority + Default {
    /// Adds two costs, or returns `None` if the sum does not fit.
    fn checked_add(self, other: Self) -> Option<Self>;
}

macro_rules! impl_cost {
    ($($t:ty),*) => {
        $(
            impl Cost for $t {
                #[inline]
                fn checked_add(self, other: Self) -> Option<Self> {
                    <$t>::checked_add(self, other)
                }
            }
        )*
    };
}

impl_cost!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

/// Directed graph with weighted edges, indexed in both directions.
#[derive(Debug, Clone)]
pub struct Graph<K, C> {
    successors: FxHashMap<K, Vec<(K, C)>>,
    predecessors: FxHashMap<K, Vec<(K, C)>>,
    edge_count: usize,
}

impl<K: Clone + Eq + Hash, C: Cost> Default for Graph<K, C> {
    fn default() -> Self {
        Self::with_capacity(0)
    }
}

impl<K: Clone + Eq + Hash, C: Cost> Graph<K, C> {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty graph with room for `nodes` nodes.
    pub fn with_capacity(nodes: usize) -> Self {
        Graph {
            successors: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            predecessors: FxHashMap::with_capacity_and_hasher(nodes, Default::default()),
            edge_count: 0,
        }
    }

    /// Adds an isolated node. Adding an existing node does nothing.
    pub fn add_node(&mut self, node: K) {
        self.successors.entry(node.clone()).or_default();
        self.predecessors.entry(node).or_default();
    }

    /// Adds the edge `from -> to`.
    ///
    /// A parallel edge keeps the cheaper of the two costs.
    pub fn add_edge(&mut self, from: K, to: K, cost: C) {
        self.add_node(from.clone());
        self.add_node(to.clone());

        let out = self.successors.entry(from.clone()).or_default();
        if let Some(edge) = out.iter_mut().find(|(n, _)| *n == to) {
            if cost < edge.1 {
                edge.1 = cost;
                let incoming = self.predecessors.entry(to).or_default();
                if let Some(back) = incoming.iter_mut().find(|(n, _)| *n == from) {
                    back.1 = cost;
                }
            }
            return;
        }

        out.push((to.clone(), cost));
        self.predecessors.entry(to).or_default().push((from, cost));
        self.edge_count += 1;
    }

    /// Returns the edges leaving `node`.
    pub fn successors(&self, node: &K) -> &[(K, C)] {
        self.successors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the edges entering `node`, as `(source, cost)` pairs.
    pub fn predecessors(&self, node: &K) -> &[(K, C)] {
        self.predecessors.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns true if `node` has been added to the graph.
    pub fn contains_node(&self, node: &K) -> bool {
        self.successors.contains_key(node)
    }

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.successors.len()
    }

    /// Number of distinct edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }
}

/// Result of a successful shortest-path search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPath<K, C> {
    /// Total cost of the path
    pub cost: C,
    /// The path from source to target (inclusive)
    pub path: Vec<K>,
    /// Number of nodes settled by the search, both directions combined
    pub settled: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Forward,
    Backward,
}

impl Direction {
    fn index(self) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => 1,
        }
    }

    fn flip(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}

/// Search state of one direction.
struct Side<K, C> {
    /// Best known distance from this side's origin
    distance: FxHashMap<K, C>,
    /// Previous node on the best known path from the origin
    came_from: FxHashMap<K, K>,
    /// Nodes whose distance is final
    settled: FxHashMap<K, C>,
}

impl<K: Clone + Eq + Hash, C: Cost> Side<K, C> {
    fn new(origin: K) -> Self {
        let mut distance = FxHashMap::default();
        distance.insert(origin, C::default());
        Side {
            distance,
            came_from: FxHashMap::default(),
            settled: FxHashMap::default(),
        }
    }

    /// Follows `came_from` links from `node` back to the origin.
    fn walk_back(&self, node: &K) -> Vec<K> {
        let mut path = vec![node.clone()];
        let mut current = node;
        while let Some(prev) = self.came_from.get(current) {
            path.push(prev.clone());
            current = prev;
        }
        path
    }
}

/// Builder for bidirectional Dijkstra queries.
///
/// Provides a fluent API for limiting a search before running it.
///
/// # Example
///
/// ```rust
/// use keyed_fibonacci_heap::pathfinding::{BidirectionalDijkstra, Graph};
///
/// let mut graph = Graph::new();
/// for i in 0..100u32 {
///     graph.add_edge(i, i + 1, 1u64);
/// }
///
/// let search = BidirectionalDijkstra::new(&graph);
/// assert_eq!(search.run(&0, &100).map(|p| p.cost), Some(100));
///
/// let limited = BidirectionalDijkstra::new(&graph).max_cost(10);
/// assert!(limited.run(&0, &100).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct BidirectionalDijkstra<'g, K, C> {
    graph: &'g Graph<K, C>,
    max_cost: Option<C>,
    max_settled: Option<usize>,
}

impl<'g, K: Clone + Eq + Hash, C: Cost> BidirectionalDijkstra<'g, K, C> {
    /// Creates a search over `graph` with no limits.
    pub fn new(graph: &'g Graph<K, C>) -> Self {
        BidirectionalDijkstra {
            graph,
            max_cost: None,
            max_settled: None,
        }
    }

    /// Gives up once either direction settles a node farther than `cost` from its origin.
    pub fn max_cost(mut self, cost: C) -> Self {
        self.max_cost = Some(cost);
        self
    }

    /// Gives up once more than `count` nodes are settled, both directions combined.
    pub fn max_settled(mut self, count: usize) -> Self {
        self.max_settled = Some(count);
        self
    }

    /// Runs the search using a [`FibonacciHeap`] per direction.
    pub fn run(&self, source: &K, target: &K) -> Option<ShortestPath<K, C>> {
        self.run_with::<FibonacciHeap<K, C>>(source, target)
    }

    /// Runs the search with any keyed heap as the frontier.
    ///
    /// Returns `None` if either endpoint is not in the graph, no path exists, or a
    /// configured limit is hit first.
    pub fn run_with<H: KeyedHeap<K, C>>(&self, source: &K, target: &K) -> Option<ShortestPath<K, C>> {
        if !self.graph.contains_node(source) || !self.graph.contains_node(target) {
            return None;
        }
        if source == target {
            return Some(ShortestPath {
                cost: C::default(),
                path: vec![source.clone()],
                settled: 0,
            });
        }

        let mut frontier = [H::new(), H::new()];
        frontier[0].insert_or_improve(C::default(), source.clone());
        frontier[1].insert_or_improve(C::default(), target.clone());
        let mut sides = [Side::new(source.clone()), Side::new(target.clone())];

        // Cost of the best path found so far and the node where its halves meet
        let mut best: Option<(C, K)> = None;
        let mut settled = 0usize;
        let mut direction = Direction::Backward;

        while !frontier[0].is_empty() && !frontier[1].is_empty() {
            direction = direction.flip();
            let (d, other) = (direction.index(), direction.flip().index());

            let (dist, node) = frontier[d].pop_min().ok()?;
            if self.max_cost.is_some_and(|limit| dist > limit) {
                debug!("bidirectional search hit max cost after settling {} nodes", settled);
                return None;
            }

            sides[d].settled.insert(node.clone(), dist);
            settled += 1;
            if self.max_settled.is_some_and(|limit| settled > limit) {
                debug!("bidirectional search hit max settled count {}", settled - 1);
                return None;
            }

            if sides[other].settled.contains_key(&node) {
                break;
            }

            let edges = match direction {
                Direction::Forward => self.graph.successors(&node),
                Direction::Backward => self.graph.predecessors(&node),
            };

            for (next, weight) in edges {
                let Some(alt) = dist.checked_add(*weight) else {
                    continue;
                };
                let improves = sides[d].distance.get(next).map_or(true, |&known| alt < known);
                if !improves {
                    continue;
                }

                sides[d].distance.insert(next.clone(), alt);
                sides[d].came_from.insert(next.clone(), node.clone());
                frontier[d].insert_or_improve(alt, next.clone());

                let through = sides[other].distance.get(next).and_then(|&rest| alt.checked_add(rest));
                if let Some(total) = through {
                    if best.as_ref().map_or(true, |(cost, _)| total < *cost) {
                        best = Some((total, next.clone()));
                    }
                }
            }
        }

        let (cost, meeting) = best?;
        let mut path = sides[0].walk_back(&meeting);
        path.reverse();
        path.extend(sides[1].walk_back(&meeting).into_iter().skip(1));

        debug!(
            "bidirectional search settled {} nodes, path of {} nodes with cost {:?}",
            settled,
            path.len(),
            cost
        );
        Some(ShortestPath { cost, path, settled })
    }

    /// Runs one search per `(source, target)` pair, in order.
    ///
    /// Every query gets its own frontier heaps; the limits apply to each query
    /// separately.
    ///
    /// # Example
    ///
    /// ```rust
    /// use keyed_fibonacci_heap::pathfinding::{BidirectionalDijkstra, Graph};
    ///
    /// let mut graph = Graph::new();
    /// graph.add_edge(0u32, 1, 2u64);
    /// graph.add_edge(1, 2, 3);
    ///
    /// let results = BidirectionalDijkstra::new(&graph).run_many(&[(0, 2), (2, 0), (1, 1)]);
    /// let costs: Vec<_> = results.iter().map(|r| r.as_ref().map(|p| p.cost)).collect();
    /// assert_eq!(costs, vec![Some(5), None, Some(0)]);
    /// ```
    pub fn run_many(&self, queries: &[(K, K)]) -> Vec<Option<ShortestPath<K, C>>> {
        let results: Vec<_> = queries.iter().map(|(source, target)| self.run(source, target)).collect();
        debug!(
            "batch search answered {} of {} queries",
            results.iter().filter(|r| r.is_some()).count(),
            queries.len()
        );
        results
    }
}

#[cfg(feature = "rayon")]
impl<'g, K, C> BidirectionalDijkstra<'g, K, C>
where
    K: Clone + Eq + Hash + Send + Sync,
    C: Cost + Send + Sync,
{
    /// Like [`run_many`](Self::run_many), but spreads the queries over the rayon
    /// thread pool. Results keep the order of `queries`.
    pub fn par_run_many(&self, queries: &[(K, K)]) -> Vec<Option<ShortestPath<K, C>>> {
        let results: Vec<_> = queries
            .par_iter()
            .map(|(source, target)| self.run(source, target))
            .collect();
        debug!(
            "parallel batch search answered {} of {} queries",
            results.iter().filter(|r| r.is_some()).count(),
            queries.len()
        );
        results
    }
}

/// Finds a shortest path from `source` to `target` with bidirectional Dijkstra.
pub fn shortest_path<K, C>(graph: &Graph<K, C>, source: &K, target: &K) -> Option<ShortestPath<K, C>>
where
    K: Clone + Eq + Hash,
    C: Cost,
{
    BidirectionalDijkstra::new(graph).run(source, target)
}

/// Finds a shortest path for every `(source, target)` pair in `queries`.
///
/// The result at index `i` answers `queries[i]`.
pub fn shortest_paths<K, C>(graph: &Graph<K, C>, queries: &[(K, K)]) -> Vec<Option<ShortestPath<K, C>>>
where
    K: Clone + Eq + Hash,
    C: Cost,
{
    BidirectionalDijkstra::new(graph).run_many(queries)
}

/// Computes the distance from `source` to every node it can reach.
///
/// This is the classic single-direction Dijkstra over a [`FibonacciHeap`].
pub fn dijkstra<K, C>(graph: &Graph<K, C>, source: &K) -> FxHashMap<K, C>
where
    K: Clone + Eq + Hash,
    C: Cost,
{
    let mut settled = FxHashMap::default();
    if !graph.contains_node(source) {
        return settled;
    }

    let mut heap: FibonacciHeap<K, C> = FibonacciHeap::with_capacity(graph.node_count());
    heap.insert_or_improve(C::default(), source.clone());

    let mut relaxed = 0usize;
    while let Ok((dist, node)) = heap.pop_min() {
        settled.insert(node.clone(), dist);
        for (next, weight) in graph.successors(&node) {
            if settled.contains_key(next) {
                continue;
            }
            if let Some(alt) = dist.checked_add(*weight) {
                if heap.insert_or_improve(alt, next.clone()).changed() {
                    relaxed += 1;
                }
            }
        }
    }

    debug!("dijkstra settled {} nodes after {} relaxations", settled.len(), relaxed);
    settled
}
