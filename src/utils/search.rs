use std::cmp::Ordering;

use crate::types::{page_reference::PageReference, tuple::Tuple, value::Value};

/// Binary search over a sorted slice.
///
/// `compare` reports how an element orders relative to the target. Returns
/// the index of a matching element, or `-(insertion_point + 1)` when no
/// element matches.
pub fn binary_search_by<T, F>(items: &[T], mut compare: F) -> isize
where
    F: FnMut(&T) -> Ordering,
{
    let mut low: isize = 0;
    let mut high: isize = items.len() as isize - 1;

    while low <= high {
        let mid = low + (high - low) / 2;
        match compare(&items[mid as usize]) {
            Ordering::Less => low = mid + 1,
            Ordering::Greater => high = mid - 1,
            Ordering::Equal => return mid,
        }
    }

    -(low + 1)
}

/// Decodes a search result into the index where the target sits or would
/// be inserted.
pub fn insertion_index(search_result: isize) -> usize {
    if search_result < 0 {
        (-(search_result + 1)) as usize
    } else {
        search_result as usize
    }
}

/// Searches by clustering key. `target` is either a stored tuple or a
/// [`Tuple::key_only`] tuple.
pub fn search_tuples(tuples: &[Tuple], target: &Tuple) -> isize {
    binary_search_by(tuples, |tuple| tuple.compare(target))
}

pub fn search_page_references(references: &[PageReference], key: &Value) -> isize {
    binary_search_by(references, |reference| reference.key_in_range(key))
}
