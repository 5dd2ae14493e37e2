//! Fixed-capacity "keep the k closest" buffer used by the search.
use std::cmp::{Ord, PartialOrd, Ordering};
use std::collections::BinaryHeap;

use crate::metric::Scalar;

/// A candidate item, ordered by its distance to the query.
pub struct HeapElem<'a, F: Scalar, T: 'a> {
    pub dist: F,
    pub item: &'a T
}

impl<'a, F: Scalar, T: 'a> HeapElem<'a, F, T> {
    pub fn new(d: F, i: &'a T) -> Self {
        HeapElem { dist: d, item: i }
    }
}

impl<'a, F: Scalar, T: 'a> PartialOrd for HeapElem<'a, F, T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'a, F: Scalar, T: 'a> PartialEq for HeapElem<'a, F, T> {
    fn eq(&self, other: &Self) -> bool {
        self.dist.eq(&other.dist)
    }
}

impl<'a, F: Scalar, T: 'a> Eq for HeapElem<'a, F, T> {
}

impl<'a, F: Scalar, T: 'a> Ord for HeapElem<'a, F, T> {
    // Incomparable (NaN) distances compare equal rather than panicking.
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist.partial_cmp(&other.dist).unwrap_or(Ordering::Equal)
    }
}

/// Max-heap of at most `capacity` candidates, largest distance on top.
///
/// The buffer never evicts on its own: callers check `is_full` and
/// `pop_max` before pushing, so the top is always the current k-th best.
pub struct KNearest<'a, F: Scalar, T: 'a> {
    capacity: usize,
    heap: BinaryHeap<HeapElem<'a, F, T>>
}

impl<'a, F: Scalar, T: 'a> KNearest<'a, F, T> {
    pub fn new(capacity: usize) -> Self {
        KNearest { capacity: capacity, heap: BinaryHeap::with_capacity(capacity) }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_full(&self) -> bool {
        self.heap.len() >= self.capacity
    }

    /// Distance of the worst candidate kept so far.
    pub fn max_dist(&self) -> Option<F> {
        self.heap.peek().map(|e| e.dist)
    }

    pub fn pop_max(&mut self) -> Option<HeapElem<'a, F, T>> {
        self.heap.pop()
    }

    pub fn push(&mut self, dist: F, item: &'a T) {
        debug_assert!(self.heap.len() < self.capacity, "push into a full KNearest");
        self.heap.push(HeapElem::new(dist, item));
    }

    /// Empty the buffer, largest distance first.
    pub fn drain(mut self) -> Vec<HeapElem<'a, F, T>> {
        let mut out = Vec::with_capacity(self.len());
        while let Some(e) = self.heap.pop() {
            out.push(e);
        }
        out
    }
}

#[cfg(test)]
mod tests
{
    use super::KNearest;

    #[test]
    fn test_keeps_max_on_top() {
        let items = ["a", "b", "c"];
        let mut h = KNearest::new(3);
        h.push(2.0, &items[0]);
        h.push(5.0, &items[1]);
        assert!(!h.is_full());
        h.push(1.0, &items[2]);
        assert!(h.is_full());
        assert_eq!(h.max_dist(), Some(5.0));
        assert_eq!(*h.pop_max().unwrap().item, "b");
        assert_eq!(h.max_dist(), Some(2.0));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn test_drain_largest_first() {
        let items: Vec<usize> = (0..6).collect();
        let dists = [3.0, 0.5, 4.0, 1.5, 9.0, 2.5];
        let mut h = KNearest::new(4);
        for (i, &d) in dists.iter().enumerate() {
            if h.is_full() {
                if h.max_dist().unwrap() <= d {
                    continue;
                }
                h.pop_max();
            }
            h.push(d, &items[i]);
        }
        let drained: Vec<f64> = h.drain().into_iter().map(|e| e.dist).collect();
        assert_eq!(drained, vec![3.0, 2.5, 1.5, 0.5]);
    }

    #[test]
    fn test_zero_capacity() {
        let h: KNearest<f32, u8> = KNearest::new(0);
        assert!(h.is_full());
        assert_eq!(h.len(), 0);
        assert_eq!(h.max_dist(), None);
        assert!(h.drain().is_empty());
    }

    #[test]
    fn test_nan_does_not_panic() {
        let items = [0u8, 1, 2];
        let mut h = KNearest::new(3);
        h.push(1.0, &items[0]);
        h.push(::std::f64::NAN, &items[1]);
        h.push(0.5, &items[2]);
        assert_eq!(h.drain().len(), 3);
    }
}
