//! Milestone ordering rules
//!
//! Orders within one assignment are always `0..n`. These helpers compute new
//! orders; persisting them is the store's job.

use std::collections::HashSet;

use thiserror::Error;

/// A reorder request that is not a permutation of the current ids
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Milestone IDs don't match: expected {expected} distinct ids, got {supplied:?}")]
pub struct OrderMismatch {
    pub expected: usize,
    pub supplied: Vec<i64>,
}

/// Check that `requested` is a permutation of `current`
///
/// Set equality alone would accept `[a, a, b]` for `{a, b}`, so the lengths
/// must agree as well. An empty request is never a valid reorder.
pub fn validate_permutation(current: &[i64], requested: &[i64]) -> Result<(), OrderMismatch> {
    if requested.is_empty() {
        return Err(OrderMismatch {
            expected: current.iter().collect::<HashSet<_>>().len(),
            supplied: Vec::new(),
        });
    }

    let current_set: HashSet<i64> = current.iter().copied().collect();
    let requested_set: HashSet<i64> = requested.iter().copied().collect();

    if current_set == requested_set && requested.len() == requested_set.len() && current.len() == current_set.len() {
        Ok(())
    } else {
        Err(OrderMismatch {
            expected: current_set.len(),
            supplied: requested.to_vec(),
        })
    }
}

/// Pair each id with its position in the list
pub fn assign_positions(ids: &[i64]) -> Vec<(i64, u32)> {
    ids.iter().enumerate().map(|(pos, id)| (*id, pos as u32)).collect()
}

/// Renumber `(id, order)` pairs to `0..n`, keeping relative order
///
/// Ties on order are broken by id. Returns only pairs whose order changed.
pub fn repair_orders(entries: &[(i64, u32)]) -> Vec<(i64, u32)> {
    let mut sorted = entries.to_vec();
    sorted.sort_by_key(|(id, order)| (*order, *id));
    sorted
        .iter()
        .enumerate()
        .filter(|(pos, (_, order))| *order != *pos as u32)
        .map(|(pos, (id, _))| (*id, pos as u32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_permutation_accepted() {
        assert!(validate_permutation(&[1, 2, 3], &[3, 1, 2]).is_ok());
        assert!(validate_permutation(&[4], &[4]).is_ok());
    }

    #[test]
    fn test_empty_order_rejected() {
        let err = validate_permutation(&[], &[]).unwrap_err();
        assert_eq!(err.expected, 0);
        assert!(err.supplied.is_empty());

        let err = validate_permutation(&[1, 2], &[]).unwrap_err();
        assert_eq!(err.expected, 2);
    }

    #[test]
    fn test_missing_id_rejected() {
        let err = validate_permutation(&[1, 2, 3], &[1, 2]).unwrap_err();
        assert_eq!(err.expected, 3);
        assert_eq!(err.supplied, vec![1, 2]);
    }

    #[test]
    fn test_extra_id_rejected() {
        assert!(validate_permutation(&[1, 2, 3], &[1, 2, 3, 4]).is_err());
        assert!(validate_permutation(&[1, 2, 3], &[1, 2, 9]).is_err());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        assert!(validate_permutation(&[1, 2, 3], &[1, 1, 2, 3]).is_err());
        assert!(validate_permutation(&[1, 2], &[1, 1, 2]).is_err());
    }

    #[test]
    fn test_assign_positions() {
        assert_eq!(assign_positions(&[7, 3, 5]), vec![(7, 0), (3, 1), (5, 2)]);
    }

    #[test]
    fn test_repair_closes_gaps() {
        let changed = repair_orders(&[(10, 0), (11, 4), (12, 2)]);
        assert_eq!(changed, vec![(12, 1), (11, 2)]);
    }

    #[test]
    fn test_repair_breaks_ties_by_id() {
        let changed = repair_orders(&[(5, 1), (4, 1), (6, 0)]);
        assert_eq!(changed, vec![(5, 2)]);
    }

    #[test]
    fn test_repair_noop_when_contiguous() {
        assert!(repair_orders(&[(1, 0), (2, 1), (3, 2)]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_repair_yields_contiguous_orders(
            orders in proptest::collection::vec(0u32..50, 0..20)
        ) {
            let entries: Vec<(i64, u32)> = orders.iter().enumerate().map(|(i, o)| (i as i64, *o)).collect();
            let changed = repair_orders(&entries);

            let mut final_orders: Vec<(i64, u32)> = entries
                .iter()
                .map(|(id, o)| {
                    let repaired = changed.iter().find(|(cid, _)| cid == id).map(|(_, no)| *no);
                    (*id, repaired.unwrap_or(*o))
                })
                .collect();
            final_orders.sort_by_key(|(_, o)| *o);
            for (pos, (_, o)) in final_orders.iter().enumerate() {
                prop_assert_eq!(*o, pos as u32);
            }
        }
    }
}
