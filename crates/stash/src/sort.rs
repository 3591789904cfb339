//! Comparators and interchangeable in-place sort strategies.
//!
//! [`FixedVec`](crate::FixedVec) never sorts through the standard library's
//! merge sort because that may allocate a scratch buffer. The strategies here
//! all work in place on a slice:
//!
//! | strategy | stable | best for |
//! |----------|--------|----------|
//! | [`QuickSort`] | no | large, randomly ordered data |
//! | [`ShellSort`] | no | medium data, predictable cost |
//! | [`InsertionSort`] | yes | small or nearly sorted data, priority lists |
//!
//! Callers needing "ties keep insertion order" must pick [`InsertionSort`].

use std::cmp::Ordering;

/// Orders an item against a key.
///
/// The key type defaults to the item type, which is what sorting needs. Lookups
/// use a different key type so that searching never has to build a throwaway
/// item just to compare against it: a phase list can be searched with a bare
/// phase value, a channel table with a `&str`.
///
/// Any `Fn(&T, &K) -> Ordering` closure is a comparator.
pub trait Comparator<T: ?Sized, K: ?Sized = T> {
    /// Compares `item` with `key`.
    fn compare(&self, item: &T, key: &K) -> Ordering;
}

impl<T: ?Sized, K: ?Sized, F> Comparator<T, K> for F
where
    F: Fn(&T, &K) -> Ordering,
{
    fn compare(&self, item: &T, key: &K) -> Ordering {
        self(item, key)
    }
}

/// An in-place sorting algorithm.
pub trait SortStrategy {
    /// Sorts `items` in ascending order according to `cmp`.
    fn sort<T, C: Comparator<T>>(&self, items: &mut [T], cmp: &C);

    /// Returns `true` if equal elements keep their relative order.
    fn is_stable(&self) -> bool {
        false
    }
}

// =============================================================================
// Quick Sort
// =============================================================================

/// Slices at or below this length are finished with insertion sort.
const INSERTION_THRESHOLD: usize = 12;

/// Median-of-three quicksort, recursing into the smaller partition only.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuickSort;

impl SortStrategy for QuickSort {
    fn sort<T, C: Comparator<T>>(&self, items: &mut [T], cmp: &C) {
        quicksort(items, cmp);
    }
}

fn quicksort<T, C: Comparator<T>>(mut items: &mut [T], cmp: &C) {
    loop {
        if items.len() <= INSERTION_THRESHOLD {
            insertion_sort(items, cmp);
            return;
        }

        let pivot = partition(items, cmp);
        let (left, right) = std::mem::take(&mut items).split_at_mut(pivot);
        let right = &mut right[1..];

        // Bounded stack depth: recurse on the smaller side, loop on the larger.
        if left.len() < right.len() {
            quicksort(left, cmp);
            items = right;
        } else {
            quicksort(right, cmp);
            items = left;
        }
    }
}

/// Lomuto partition around the median of first, middle and last.
fn partition<T, C: Comparator<T>>(items: &mut [T], cmp: &C) -> usize {
    let last = items.len() - 1;
    let mid = items.len() / 2;

    if cmp.compare(&items[mid], &items[0]) == Ordering::Less {
        items.swap(mid, 0);
    }
    if cmp.compare(&items[last], &items[0]) == Ordering::Less {
        items.swap(last, 0);
    }
    // items[0] now holds the minimum; move the median into `last`.
    if cmp.compare(&items[mid], &items[last]) == Ordering::Less {
        items.swap(mid, last);
    }

    let mut store = 0;
    for i in 0..last {
        if cmp.compare(&items[i], &items[last]) == Ordering::Less {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}

// =============================================================================
// Shell Sort
// =============================================================================

/// Ciura gap sequence, extended by ×2.25 for longer inputs.
const CIURA_GAPS: [usize; 8] = [701, 301, 132, 57, 23, 10, 4, 1];

/// Shell sort using the Ciura gap sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellSort;

impl SortStrategy for ShellSort {
    fn sort<T, C: Comparator<T>>(&self, items: &mut [T], cmp: &C) {
        let len = items.len();
        if len < 2 {
            return;
        }

        // Gaps beyond the table for very large inputs.
        let mut large_gap = CIURA_GAPS[0];
        while large_gap * 9 / 4 < len {
            large_gap = large_gap * 9 / 4;
        }
        let mut extended = large_gap;
        while extended > CIURA_GAPS[0] {
            gapped_insertion(items, cmp, extended);
            extended = extended * 4 / 9;
        }

        for &gap in &CIURA_GAPS {
            if gap < len {
                gapped_insertion(items, cmp, gap);
            }
        }
    }
}

fn gapped_insertion<T, C: Comparator<T>>(items: &mut [T], cmp: &C, gap: usize) {
    for i in gap..items.len() {
        let mut j = i;
        while j >= gap && cmp.compare(&items[j - gap], &items[j]) == Ordering::Greater {
            items.swap(j - gap, j);
            j -= gap;
        }
    }
}

// =============================================================================
// Insertion Sort
// =============================================================================

/// Stable insertion sort. Linear on already-sorted input.
#[derive(Debug, Clone, Copy, Default)]
pub struct InsertionSort;

impl SortStrategy for InsertionSort {
    fn sort<T, C: Comparator<T>>(&self, items: &mut [T], cmp: &C) {
        insertion_sort(items, cmp);
    }

    fn is_stable(&self) -> bool {
        true
    }
}

fn insertion_sort<T, C: Comparator<T>>(items: &mut [T], cmp: &C) {
    for i in 1..items.len() {
        let mut j = i;
        while j > 0 && cmp.compare(&items[j - 1], &items[j]) == Ordering::Greater {
            items.swap(j - 1, j);
            j -= 1;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
