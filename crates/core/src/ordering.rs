//! Field ordering
//!
//! A form's question fields carry zero-based `order_index` positions
//! that must stay contiguous: exactly the integers `0..N` with no gaps
//! or duplicates. The two operations here restore that invariant after
//! any move or deletion. Both are total functions; an unknown source or
//! target key leaves the input untouched rather than failing.

/// Relocate the item with key `source` to the position currently held
/// by the item with key `target`, shifting everything in between by one
/// to close the gap. Relative order of untouched items is preserved.
///
/// No-op cases: `source == target`, or either key absent from `items`.
pub fn move_by_key<T, K, F>(items: Vec<T>, source: &K, target: &K, key_of: F) -> Vec<T>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    if source == target {
        return items;
    }

    let from = items.iter().position(|item| key_of(item) == *source);
    let to = items.iter().position(|item| key_of(item) == *target);

    let (Some(from), Some(to)) = (from, to) else {
        return items;
    };

    let mut items = items;
    let moved = items.remove(from);
    items.insert(to, moved);
    items
}

/// Assign contiguous zero-based positions in sequence order.
///
/// Returns `(item, position)` pairs; callers persist the positions that
/// actually changed. Used after moves and after deletions, so stored
/// order never accumulates gaps.
pub fn resequence<T>(items: Vec<T>) -> Vec<(T, i32)> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| (item, index as i32))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        order_index: i32,
    }

    fn items(ids: &[u32]) -> Vec<Item> {
        ids.iter()
            .enumerate()
            .map(|(i, &id)| Item {
                id,
                order_index: i as i32,
            })
            .collect()
    }

    fn ids(items: &[Item]) -> Vec<u32> {
        items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_move_forward() {
        let moved = move_by_key(items(&[1, 2, 3, 4]), &1, &3, |i| i.id);
        assert_eq!(ids(&moved), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_move_backward() {
        let moved = move_by_key(items(&[1, 2, 3, 4]), &4, &2, |i| i.id);
        assert_eq!(ids(&moved), vec![1, 4, 2, 3]);
    }

    #[test]
    fn test_move_same_key_is_noop() {
        let moved = move_by_key(items(&[1, 2, 3]), &2, &2, |i| i.id);
        assert_eq!(ids(&moved), vec![1, 2, 3]);
    }

    #[test]
    fn test_move_unknown_key_is_noop() {
        let moved = move_by_key(items(&[1, 2, 3]), &9, &2, |i| i.id);
        assert_eq!(ids(&moved), vec![1, 2, 3]);

        let moved = move_by_key(items(&[1, 2, 3]), &1, &9, |i| i.id);
        assert_eq!(ids(&moved), vec![1, 2, 3]);
    }

    #[test]
    fn test_noop_move_changes_no_positions() {
        // Callers skip persistence (and version bumps) when every
        // resequenced position equals the stored one; a no-op move
        // must land in that case.
        for (source, target) in [(2u32, 2u32), (9, 2), (1, 9)] {
            let moved = move_by_key(items(&[1, 2, 3]), &source, &target, |i| i.id);
            let seq = resequence(moved);
            assert!(seq.iter().all(|(item, pos)| item.order_index == *pos));
        }
    }

    #[test]
    fn test_resequence_assigns_contiguous_positions() {
        let seq = resequence(items(&[7, 5, 9]));
        let positions: Vec<i32> = seq.iter().map(|(_, p)| *p).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_positions_after_any_move_are_a_permutation() {
        // For every (source, target) pair over a 6-item list, the
        // resequenced positions must be exactly 0..6 and the relative
        // order of the unmoved items must be unchanged.
        let base = items(&[10, 20, 30, 40, 50, 60]);
        for source in ids(&base) {
            for target in ids(&base) {
                let moved = move_by_key(base.clone(), &source, &target, |i| i.id);
                let seq = resequence(moved);

                let positions: Vec<i32> = seq.iter().map(|(_, p)| *p).collect();
                assert_eq!(positions, (0..6).collect::<Vec<i32>>());

                let rest_before: Vec<u32> = ids(&base)
                    .into_iter()
                    .filter(|id| *id != source)
                    .collect();
                let rest_after: Vec<u32> = seq
                    .iter()
                    .map(|(item, _)| item.id)
                    .filter(|id| *id != source)
                    .collect();
                assert_eq!(rest_before, rest_after);
            }
        }
    }

    #[test]
    fn test_resequence_after_delete_closes_gap() {
        let mut list = items(&[1, 2, 3, 4]);
        list.remove(1);
        let seq = resequence(list);
        let pairs: Vec<(u32, i32)> = seq.iter().map(|(i, p)| (i.id, *p)).collect();
        assert_eq!(pairs, vec![(1, 0), (3, 1), (4, 2)]);
    }
}
