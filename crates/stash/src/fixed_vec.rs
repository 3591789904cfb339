//! Fixed-capacity, array-backed collection.
//!
//! [`FixedVec`] reserves its backing storage once and refuses to grow past the
//! capacity given at construction. It is the allocation-free backbone of the
//! pools, schedulers and per-frame registries built on top of it.
//!
//! # Sorted State
//!
//! The container tracks whether its contents are known to be sorted. Appending
//! marks it dirty; [`FixedVec::sort`] only does work when dirty (or forced),
//! so calling it once per frame costs nothing while nothing changed.
//!
//! # Example
//!
//! ```
//! use stash::{FixedVec, OverflowPolicy, ShellSort};
//!
//! let mut list: FixedVec<i32> = FixedVec::new(3);
//! list.push(3).unwrap();
//! list.push(1).unwrap();
//! list.push(2).unwrap();
//! assert!(list.push(4).is_err());
//!
//! let ascending = |a: &i32, b: &i32| a.cmp(b);
//! assert!(list.sort(&ShellSort, &ascending, false));
//! assert_eq!(list.find(&2, &ascending, true), Some(1));
//! ```

use std::cmp::Ordering;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sort::{Comparator, SortStrategy};

/// What a full [`FixedVec`] does with one more item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Reject the push with a [`CapacityError`].
    #[default]
    Error,
    /// Drop the item, log a warning and report success.
    Ignore,
}

/// A push was attempted on a full container.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("fixed container full (capacity {capacity})")]
pub struct CapacityError {
    /// Capacity of the container that rejected the item.
    pub capacity: usize,
}

/// Array-backed collection with a hard upper bound on its length.
///
/// Storage for `capacity` items is reserved up front; no operation
/// reallocates it. Items are kept in insertion order unless sorted.
#[derive(Debug, Clone)]
pub struct FixedVec<T> {
    items: Vec<T>,
    capacity: usize,
    sorted: bool,
    policy: OverflowPolicy,
}

impl<T> FixedVec<T> {
    /// Creates an empty container that rejects pushes beyond `capacity`.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, OverflowPolicy::Error)
    }

    /// Creates an empty container with an explicit overflow policy.
    #[must_use]
    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
            sorted: true,
            policy,
        }
    }

    /// Appends an item.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when the container is full and the policy is
    /// [`OverflowPolicy::Error`]. Existing entries are never touched.
    pub fn push(&mut self, item: T) -> Result<(), CapacityError> {
        if self.items.len() >= self.capacity {
            return match self.policy {
                OverflowPolicy::Error => Err(CapacityError {
                    capacity: self.capacity,
                }),
                OverflowPolicy::Ignore => {
                    tracing::warn!(capacity = self.capacity, "fixed container full, item dropped");
                    Ok(())
                }
            };
        }
        self.items.push(item);
        self.sorted = self.items.len() <= 1;
        Ok(())
    }

    /// Moves every item of `other` to the end of `self`, leaving `other` empty.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] (and moves nothing) if the combined length would
    /// exceed the capacity and the policy is [`OverflowPolicy::Error`]. Under
    /// [`OverflowPolicy::Ignore`] the items that do not fit are dropped.
    pub fn append(&mut self, other: &mut FixedVec<T>) -> Result<(), CapacityError> {
        if other.is_empty() {
            return Ok(());
        }
        if self.items.len() + other.items.len() > self.capacity
            && self.policy == OverflowPolicy::Error
        {
            return Err(CapacityError {
                capacity: self.capacity,
            });
        }
        for item in other.items.drain(..) {
            if self.items.len() < self.capacity {
                self.items.push(item);
            } else {
                tracing::warn!(capacity = self.capacity, "fixed container full, item dropped");
            }
        }
        other.sorted = true;
        self.sorted = self.items.len() <= 1;
        Ok(())
    }

    /// Removes and returns the last item, or `None` if empty.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Removes the item at `index`, shifting later items down.
    ///
    /// Preserves order (and therefore the sorted state).
    pub fn remove(&mut self, index: usize) -> Option<T> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Removes the item at `index` by swapping the last item into its place.
    pub fn swap_remove(&mut self, index: usize) -> Option<T> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.swap_remove(index);
        self.sorted = self.sorted && index >= self.items.len();
        Some(item)
    }

    /// Keeps only the items for which `keep` returns `true`, preserving order.
    pub fn retain<F: FnMut(&T) -> bool>(&mut self, keep: F) {
        self.items.retain(keep);
    }

    /// Removes all items. The backing storage is kept.
    pub fn clear(&mut self) {
        self.items.clear();
        self.sorted = true;
    }

    /// Removes all items, yielding them in order. The backing storage is kept.
    pub fn drain(&mut self) -> std::vec::Drain<'_, T> {
        self.sorted = true;
        self.items.drain(..)
    }

    /// Finds the index of an item matching `key`.
    ///
    /// With `sorted == true` this is a binary search returning the *first*
    /// matching index; it requires the container to have been sorted with an
    /// ordering consistent with `cmp`. If the container is dirty the search
    /// falls back to a linear scan.
    pub fn find<K: ?Sized, C: Comparator<T, K>>(
        &self,
        key: &K,
        cmp: &C,
        sorted: bool,
    ) -> Option<usize> {
        if sorted && self.sorted {
            self.lower_bound(key, cmp)
                .filter(|&index| cmp.compare(&self.items[index], key) == Ordering::Equal)
        } else {
            if sorted {
                tracing::trace!("binary search requested on unsorted container, scanning");
            }
            self.items
                .iter()
                .position(|item| cmp.compare(item, key) == Ordering::Equal)
        }
    }

    /// Index of the first item not less than `key`, or `None` if every item is
    /// less. Only meaningful on a sorted container.
    pub fn lower_bound<K: ?Sized, C: Comparator<T, K>>(&self, key: &K, cmp: &C) -> Option<usize> {
        let mut low = 0;
        let mut high = self.items.len();
        while low < high {
            let mid = low + (high - low) / 2;
            if cmp.compare(&self.items[mid], key) == Ordering::Less {
                low = mid + 1;
            } else {
                high = mid;
            }
        }
        (low < self.items.len()).then_some(low)
    }

    /// Sorts in place with `strategy` if the container is dirty or `force` is set.
    ///
    /// Returns `true` if a sort actually ran.
    pub fn sort<S: SortStrategy, C: Comparator<T>>(
        &mut self,
        strategy: &S,
        cmp: &C,
        force: bool,
    ) -> bool {
        if self.sorted && !force {
            return false;
        }
        strategy.sort(&mut self.items, cmp);
        self.sorted = true;
        true
    }

    /// Marks the contents as unsorted, e.g. after mutating sort keys in place.
    pub fn mark_dirty(&mut self) {
        self.sorted = false;
    }

    /// Returns `true` if the contents are known to be sorted.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Returns the number of items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if there are no items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns `true` if another push would overflow.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the overflow policy.
    #[must_use]
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Returns a reference to the item at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Returns a mutable reference to the item at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Returns the last item.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// Returns the items as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Returns the items as a mutable slice.
    ///
    /// Mutating sort keys through this slice requires [`FixedVec::mark_dirty`].
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    /// Iterates over the items in order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates mutably over the items in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }
}

impl<T> Index<usize> for FixedVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

impl<T> IndexMut<usize> for FixedVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.items[index]
    }
}

impl<'a, T> IntoIterator for &'a FixedVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut FixedVec<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter_mut()
    }
}

// =============================================================================
// Tests
// =============================================================================
