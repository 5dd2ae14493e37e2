//! Exact k-nearest-neighbor search over arbitrary metric spaces with
//! vantage point trees.
//!
//! Items never need coordinates, only a distance function satisfying the
//! metric axioms (see [`Metric`]). Build a [`VPTree`] once, then query it
//! from as many threads as you like.
extern crate log;
extern crate num;
extern crate rand;

pub mod metric;
pub mod vptree;
mod heap;
mod partition;

pub use metric::{Float, Metric, Scalar};
pub use vptree::{Builder, Neighbor, SearchStats, VPTree};
