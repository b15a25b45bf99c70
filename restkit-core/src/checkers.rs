//! Slice comparison helpers for tests
//!
//! Unlike `assert_eq!`, these can ignore order and compare floats with a
//! tolerance, and they report *what* differs instead of panicking.

use std::fmt::Debug;

use thiserror::Error;

/// Whether item positions must match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Strict,
    Any,
}

/// First difference found between expected and actual
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("length differs: expected {expected}, actual {actual}")]
    Length { expected: usize, actual: usize },

    #[error("expected item {item} at index {index} was not found in actual")]
    ItemNotFound { item: String, index: usize },
}

/// Compare two slices item by item.
pub fn check_items<T>(expected: &[T], actual: &[T], order: Order) -> Result<(), Mismatch>
where
    T: PartialEq + Debug,
{
    check_with(expected, actual, order, |e, a| e == a)
}

/// Compare two float slices, treating values within `tolerance` as equal.
pub fn check_floats<T>(
    expected: &[T],
    actual: &[T],
    tolerance: f64,
    order: Order,
) -> Result<(), Mismatch>
where
    T: Copy + Into<f64> + Debug,
{
    check_with(expected, actual, order, |e, a| {
        let (e, a): (f64, f64) = ((*e).into(), (*a).into());
        (e - a).abs() <= tolerance
    })
}

fn check_with<T, F>(expected: &[T], actual: &[T], order: Order, eq: F) -> Result<(), Mismatch>
where
    T: Debug,
    F: Fn(&T, &T) -> bool,
{
    if expected.len() != actual.len() {
        return Err(Mismatch::Length {
            expected: expected.len(),
            actual: actual.len(),
        });
    }

    let not_found = |item: &T, index: usize| Mismatch::ItemNotFound {
        item: format!("{:?}", item),
        index,
    };

    match order {
        Order::Strict => {
            for (index, (e, a)) in expected.iter().zip(actual).enumerate() {
                if !eq(e, a) {
                    return Err(not_found(e, index));
                }
            }
        }
        Order::Any => {
            // each actual item may satisfy only one expected item
            let mut used = vec![false; actual.len()];
            for (index, e) in expected.iter().enumerate() {
                let found = actual
                    .iter()
                    .enumerate()
                    .position(|(j, a)| !used[j] && eq(e, a));
                match found {
                    Some(j) => used[j] = true,
                    None => return Err(not_found(e, index)),
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_order() {
        assert!(check_items(&["a", "b"], &["a", "b"], Order::Strict).is_ok());
        assert_eq!(
            check_items(&["a", "b"], &["b", "a"], Order::Strict),
            Err(Mismatch::ItemNotFound {
                item: "\"a\"".into(),
                index: 0
            })
        );
    }

    #[test]
    fn any_order_is_multiset() {
        assert!(check_items(&[1, 2, 2], &[2, 1, 2], Order::Any).is_ok());
        assert_eq!(
            check_items(&[1, 2, 2], &[2, 1, 1], Order::Any),
            Err(Mismatch::ItemNotFound {
                item: "2".into(),
                index: 2
            })
        );
    }

    #[test]
    fn length_mismatch() {
        assert_eq!(
            check_items(&[1, 2], &[1], Order::Any),
            Err(Mismatch::Length {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn floats_with_tolerance() {
        let expected = [1.0_f32, 2.5, 3.25];
        let actual = [3.2501_f32, 1.0001, 2.4999];
        assert!(check_floats(&expected, &actual, 0.001, Order::Any).is_ok());
        assert!(check_floats(&expected, &actual, 0.001, Order::Strict).is_err());
        assert!(check_floats(&[1.0_f64], &[1.1], 0.01, Order::Strict).is_err());
    }

    #[test]
    fn empty_slices_match() {
        let empty: [u64; 0] = [];
        assert!(check_items(&empty, &empty, Order::Strict).is_ok());
    }
}
