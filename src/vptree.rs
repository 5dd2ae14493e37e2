//! Vantage-Point Trees are a data structure for fast, exact
//! k-nearest-neighbor searches in any metric space.
//!
//! A tree is built once from a collection of items and never changes
//! afterwards. Searches borrow the tree immutably and keep all of their
//! working state on their own stack, so one tree can serve any number of
//! threads at the same time.
use std::fmt::{Debug, Write};

use num::Zero;
use rand::rngs::{StdRng, ThreadRng};
use rand::{thread_rng, Rng, SeedableRng};

use crate::heap::KNearest;
use crate::metric::{Float, Metric, Scalar};
use crate::partition::partition_by_key;

struct VPNode<F: Scalar> {
    inner: Option<Box<VPNode<F>>>,
    outer: Option<Box<VPNode<F>>>,
    /// Position of the vantage point in the tree's item buffer.
    center: usize,
    mu: F
}

impl<F: Scalar> VPNode<F> {
    fn is_leaf(&self) -> bool {
        self.inner.is_none() && self.outer.is_none()
    }

    fn depth(&self) -> usize {
        let inner = self.inner.as_ref().map_or(0, |n| n.depth());
        let outer = self.outer.as_ref().map_or(0, |n| n.depth());
        1 + inner.max(outer)
    }
}

/// Build the subtree over `items[lower..upper]`.
///
/// A random element of the range becomes the vantage point and is moved to
/// `lower`. The rest of the range is partitioned around the distance of its
/// middle element: the inner subtree gets `lower + 1..boundary`, the outer
/// one `boundary..upper`, and `mu` is the distance to whatever element ends
/// up at `boundary`.
fn build_node<T, M, R>(items: &mut [T], lower: usize, upper: usize, metric: &M, rng: &mut R)
                       -> Option<Box<VPNode<M::Distance>>>
    where M: Metric<T>, R: Rng + ?Sized {

    if lower >= upper {
        return None;
    }

    items.swap(lower, rng.gen_range(lower..upper));

    let (center, rest) = match items[lower..upper].split_first_mut() {
        Some(split) => split,
        None => return None
    };
    if rest.is_empty() {
        return Some(Box::new(VPNode { inner: None,
                                      outer: None,
                                      center: lower,
                                      mu: <M::Distance as Zero>::zero() }));
    }
    let center: &T = center;

    let median = rest.len() / 2;
    let store = partition_by_key(rest, median, |x| metric.distance(x, center));
    let mu = metric.distance(&rest[store], center);

    let boundary = lower + 1 + store;
    let inner = build_node(items, lower + 1, boundary, metric, rng);
    let outer = build_node(items, boundary, upper, metric, rng);

    Some(Box::new(VPNode { inner: inner, outer: outer, center: lower, mu: mu }))
}

/// One result of a nearest-neighbor query.
#[derive(Debug, PartialEq)]
pub struct Neighbor<'a, T: 'a, F> {
    pub item: &'a T,
    pub distance: F
}

/// Traversal counters for a single query.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes whose vantage point was compared against the query. Each one
    /// costs exactly one distance evaluation.
    pub nodes_visited: usize,
    /// Child subtrees skipped by the triangle inequality.
    pub subtrees_pruned: usize
}

/// Working state of one search call. Never shared between calls.
struct SearchState<'a, T: 'a, F: Scalar> {
    tau: F,
    nearest: KNearest<'a, F, T>,
    stats: SearchStats
}

/// A vantage point tree over items of type `T` under the metric `M`.
///
/// ```
/// use vptree_knn::VPTree;
///
/// let metric = |a: &(f64, f64), b: &(f64, f64)| ((a.0 - b.0).powi(2) + (a.1 - b.1).powi(2)).sqrt();
/// let tree = VPTree::new(metric, vec![(24.0, 57.0), (35.0, 28.0), (55.0, 48.0), (68.0, 42.0)]);
///
/// let (items, distances) = tree.search(&(12.0, 34.0), 3);
/// assert_eq!(items, vec![&(35.0, 28.0), &(24.0, 57.0), &(55.0, 48.0)]);
/// assert!((distances[0] - 23.7697).abs() < 1e-4);
/// ```
pub struct VPTree<T, M: Metric<T>> {
    items: Vec<T>,
    metric: M,
    root: Option<Box<VPNode<M::Distance>>>
}

impl<T, M: Metric<T>> VPTree<T, M> {
    /// Construct a new vantage point tree from a set of elements, picking
    /// vantage points with the thread-local random number generator.
    ///
    /// The tree takes ownership of `items` and reorders them.
    pub fn new(metric: M, items: Vec<T>) -> VPTree<T, M> {
        VPTree::with_rng(metric, items, &mut thread_rng())
    }

    /// Construct a tree using `rng` to pick vantage points. With a seeded
    /// generator the resulting tree is reproducible.
    pub fn with_rng<R: Rng + ?Sized>(metric: M, mut items: Vec<T>, rng: &mut R) -> VPTree<T, M> {
        let n = items.len();
        let root = build_node(&mut items, 0, n, &metric, rng);
        let tree = VPTree { items: items, metric: metric, root: root };

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("built vantage point tree over {} items, depth {}", tree.len(), tree.depth());
        }
        tree
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |n| n.depth())
    }

    /// The indexed items, in the order construction left them.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Discard the tree and hand back its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// Find the `k` items closest to `target`.
    ///
    /// Returns the items and their distances as two parallel vectors,
    /// ascending by distance. Both hold `min(k, self.len())` entries; both
    /// are empty when `k == 0`.
    pub fn search(&self, target: &T, k: usize) -> (Vec<&T>, Vec<M::Distance>) {
        self.nearest_neighbors(target, k).into_iter()
            .map(|n| (n.item, n.distance))
            .unzip()
    }

    /// Find the nearest neighbor, or `None` if the tree is empty.
    pub fn nearest_neighbor(&self, target: &T) -> Option<Neighbor<'_, T, M::Distance>> {
        self.nearest_neighbors(target, 1).pop()
    }

    /// Find the `k` nearest neighbors, closest first.
    pub fn nearest_neighbors(&self, target: &T, k: usize) -> Vec<Neighbor<'_, T, M::Distance>> {
        self.nearest_neighbors_traced(target, k).0
    }

    /// Like `nearest_neighbors`, also reporting how much of the tree the
    /// query had to touch.
    pub fn nearest_neighbors_traced(&self, target: &T, k: usize)
                                    -> (Vec<Neighbor<'_, T, M::Distance>>, SearchStats) {
        let root = match self.root {
            Some(ref root) if k > 0 => root,
            _ => return (Vec::new(), SearchStats::default())
        };

        let mut state = SearchState {
            tau: <M::Distance as Float>::max_value(),
            nearest: KNearest::new(k),
            stats: SearchStats::default()
        };
        self.search_node(root, target, &mut state);

        // The heap drains largest first.
        let mut found: Vec<_> = state.nearest.drain().into_iter()
            .map(|e| Neighbor { item: e.item, distance: e.dist })
            .collect();
        found.reverse();

        log::trace!("knn search k={}: {} found, {} nodes visited, {} subtrees pruned",
                    k, found.len(), state.stats.nodes_visited, state.stats.subtrees_pruned);
        (found, state.stats)
    }

    fn search_node<'a>(&'a self, node: &'a VPNode<M::Distance>, target: &T,
                       state: &mut SearchState<'a, T, M::Distance>) {
        state.stats.nodes_visited += 1;
        let center = &self.items[node.center];
        let dist = self.metric.distance(center, target);

        // Until k candidates are held, every node is one; NaN distances included.
        if !state.nearest.is_full() || dist < state.tau {
            if state.nearest.is_full() {
                state.nearest.pop_max();
            }
            state.nearest.push(dist, center);
            if state.nearest.is_full() {
                if let Some(d) = state.nearest.max_dist() {
                    state.tau = d;
                }
            }
        }

        if node.is_leaf() {
            return;
        }

        let mut sides = [(&node.inner, true), (&node.outer, false)];

        // Visit the outer node first if we're outside the ring.
        if !(dist < node.mu) {
            sides.swap(0, 1);
        }

        // Ties sit on either side of mu, so both bounds stay inclusive
        // (`dist - tau <= mu`, `dist + tau >= mu`). Written negated so an
        // incomparable (NaN) bound never prunes.
        for &(child, is_inner) in &sides {
            if let Some(ref child) = *child {
                let reachable = if is_inner {
                    !(dist - state.tau > node.mu)
                } else {
                    !(dist + state.tau < node.mu)
                };
                if reachable {
                    self.search_node(child, target, state);
                } else {
                    state.stats.subtrees_pruned += 1;
                }
            }
        }
    }
}

impl<T: Debug, M: Metric<T>> VPTree<T, M> {
    /// Render the tree one node per line, children indented under their
    /// parent. Inner subtrees are marked `<`, outer ones `>`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if let Some(ref root) = self.root {
            self.dump_node(root, 0, '*', &mut out);
        }
        out
    }

    fn dump_node(&self, node: &VPNode<M::Distance>, level: usize, tag: char, out: &mut String) {
        let item = &self.items[node.center];
        // Writing into a String cannot fail.
        let _ = if node.is_leaf() {
            writeln!(out, "{:width$}{} {:?}", "", tag, item, width = 2 * level)
        } else {
            writeln!(out, "{:width$}{} {:?} mu={}", "", tag, item, node.mu, width = 2 * level)
        };
        if let Some(ref inner) = node.inner {
            self.dump_node(inner, level + 1, '<', out);
        }
        if let Some(ref outer) = node.outer {
            self.dump_node(outer, level + 1, '>', out);
        }
    }
}

/// Configures how trees pick their vantage points.
///
/// ```
/// use vptree_knn::Builder;
///
/// let abs = |a: &i32, b: &i32| ((a - b) as f64).abs();
/// let first = Builder::seeded(7).build(abs, (0..100).collect::<Vec<i32>>());
/// let second = Builder::seeded(7).build(abs, (0..100).collect::<Vec<i32>>());
/// assert_eq!(first.items(), second.items());
/// ```
pub struct Builder<R: Rng> {
    rng: R
}

impl Builder<ThreadRng> {
    /// Pick vantage points with the thread-local generator.
    pub fn new() -> Self {
        Builder { rng: thread_rng() }
    }
}

impl Default for Builder<ThreadRng> {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder<StdRng> {
    /// Pick vantage points from a generator seeded with `seed`, so builds
    /// over the same input produce the same tree.
    pub fn seeded(seed: u64) -> Self {
        Builder { rng: StdRng::seed_from_u64(seed) }
    }
}

impl<R: Rng> Builder<R> {
    pub fn with_rng(rng: R) -> Self {
        Builder { rng: rng }
    }

    /// Build a tree over `items`. The generator carries over between
    /// builds, so consecutive builds from one builder differ.
    pub fn build<T, M: Metric<T>>(&mut self, metric: M, items: Vec<T>) -> VPTree<T, M> {
        VPTree::with_rng(metric, items, &mut self.rng)
    }
}
