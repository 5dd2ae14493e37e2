//! In-place partitioning of a slice around one element's key.
use std::cmp::Ordering;

/// Partition `arr` in place around the key of `arr[pivot]` and return the
/// index the pivot element ends up at.
///
/// Afterwards every element before the returned index has a key `<=` the
/// pivot key and every element from the index on has a key `>=` it; the
/// pivot itself sits at the index. Keys equal to or incomparable with the
/// pivot key (`NaN`) are dealt alternately to the two sides, so runs of
/// such keys still split in half.
///
/// `key` is evaluated once per element.
pub fn partition_by_key<T, F, K>(arr: &mut [T], pivot: usize, mut key: K) -> usize
    where F: PartialOrd, K: FnMut(&T) -> F {

    let n = arr.len();
    debug_assert!(pivot < n, "pivot {} out of bounds for length {}", pivot, n);

    let last = n - 1;
    arr.swap(pivot, last);
    let pivot_key = key(&arr[last]);

    let mut store = 0;
    let mut tie_low = true;
    for i in 0..last {
        let goes_low = match key(&arr[i]).partial_cmp(&pivot_key) {
            Some(Ordering::Less) => true,
            Some(Ordering::Greater) => false,
            Some(Ordering::Equal) | None => {
                let low = tie_low;
                tie_low = !tie_low;
                low
            }
        };
        if goes_low {
            arr.swap(store, i);
            store += 1;
        }
    }

    // Move the pivot to the boundary.
    arr.swap(store, last);
    store
}

#[cfg(test)]
mod tests
{
    use super::partition_by_key;

    fn check(v: &[i32], b: usize, pivot_key: i32) {
        assert_eq!(v[b], pivot_key);
        for x in &v[..b] {
            assert!(*x <= pivot_key, "{:?} split at {}", v, b);
        }
        for x in &v[b..] {
            assert!(*x >= pivot_key, "{:?} split at {}", v, b);
        }
    }

    #[test]
    fn test_partition_every_pivot() {
        for p in 0..11 {
            let mut v = vec![2, 0, 4, 6, 5, 1, 3, 9, 7, 8, 2];
            let pivot_key = v[p];
            let b = partition_by_key(&mut v, p, |x| *x);
            check(&v, b, pivot_key);
        }
    }

    #[test]
    fn test_partition_sorted_input() {
        let mut v: Vec<i32> = (0..20).collect();
        let b = partition_by_key(&mut v, 10, |x| *x);
        assert_eq!(b, 10);
        check(&v, b, 10);
    }

    #[test]
    fn test_partition_single() {
        let mut v = vec![7];
        assert_eq!(partition_by_key(&mut v, 0, |x| *x), 0);
        assert_eq!(v, vec![7]);
    }

    #[test]
    fn test_ties_split_both_ways() {
        let mut v = vec![1; 9];
        let b = partition_by_key(&mut v, 4, |x| *x);
        assert_eq!(b, 4);
        check(&v, b, 1);
    }

    #[test]
    fn test_key_called_once_per_element() {
        let mut v = vec![3.0, 1.0, 2.0, 5.0, 4.0];
        let mut calls = 0;
        let b = partition_by_key(&mut v, 2, |x: &f64| { calls += 1; *x });
        assert_eq!(calls, 5);
        assert_eq!(v[b], 2.0);
        assert_eq!(b, 1);
    }

    #[test]
    fn test_nan_keys_alternate() {
        let nan = ::std::f64::NAN;
        let mut v = vec![nan, 1.0, 3.0, nan, 2.0];
        let b = partition_by_key(&mut v, 4, |x: &f64| *x);
        assert_eq!(b, 2);
        assert_eq!(v[1], 1.0);
        assert_eq!(v[b], 2.0);
        assert_eq!(v[4], 3.0);
        assert!(v[0].is_nan() && v[3].is_nan());
    }

    #[test]
    fn test_nan_pivot_splits_evenly() {
        let mut v = vec![::std::f64::NAN; 9];
        let b = partition_by_key(&mut v, 3, |x: &f64| *x);
        assert_eq!(b, 4);
    }
}
