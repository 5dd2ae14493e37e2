//! Distance functions accepted by the tree.
use std::fmt::{Debug, Display};
pub use num::Float;

/// Numeric type a metric reports distances in.
pub trait Scalar: Float + Debug + Display {}
impl<T: Float + Debug + Display> Scalar for T {}

/// A distance function over items of type `T`.
///
/// Implementations must describe a true metric space:
///
/// * `distance(a, b) >= 0`
/// * `distance(a, b) == 0` iff `a` and `b` are the same item
/// * `distance(a, b) == distance(b, a)`
/// * `distance(a, c) <= distance(a, b) + distance(b, c)`
///
/// None of this is checked. A function that breaks these rules (a squared
/// Euclidean distance, for instance) produces silently wrong search
/// results, and `NaN` or infinite distances are not supported.
///
/// Any closure `Fn(&T, &T) -> D` is a metric:
///
/// ```
/// use vptree_knn::Metric;
///
/// let abs = |a: &f64, b: &f64| (a - b).abs();
/// assert_eq!(abs.distance(&1.0, &3.5), 2.5);
/// ```
pub trait Metric<T: ?Sized> {
    type Distance: Scalar;

    fn distance(&self, a: &T, b: &T) -> Self::Distance;
}

impl<T: ?Sized, D: Scalar, M> Metric<T> for M
    where M: Fn(&T, &T) -> D {
    type Distance = D;

    fn distance(&self, a: &T, b: &T) -> D {
        self(a, b)
    }
}
