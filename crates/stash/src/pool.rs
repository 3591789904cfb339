//! # Object Pool
//!
//! Fixed set of pre-constructed instances recycled through allocate/release.
//!
//! The pool builds all `C` instances when it is created and never creates or
//! drops one afterwards. Allocating hands out a [`PoolHandle`] to a ready
//! instance; releasing runs the instance's [`Poolable::reset`] hook and makes
//! it available again.
//!
//! # Handle Safety
//!
//! Handles carry the generation of the slot they were issued for. Releasing a
//! slot bumps its generation, so a second release of the same handle, or any
//! access through it, is detected and reported instead of silently touching
//! whichever object reuses the slot next.
//!
//! # Example
//!
//! ```
//! use stash::{ObjectPool, PoolError, Poolable};
//!
//! #[derive(Default)]
//! struct Bullet { damage: u32 }
//! impl Poolable for Bullet {
//!     fn reset(&mut self) { self.damage = 0; }
//! }
//!
//! let mut pool = ObjectPool::new(1, |_| Bullet::default());
//! let bullet = pool.allocate().unwrap();
//! assert!(matches!(pool.allocate(), Err(PoolError::Exhausted { capacity: 1 })));
//!
//! pool.release(bullet).unwrap();
//! assert!(matches!(pool.release(bullet), Err(PoolError::StaleHandle(_))));
//! assert!(pool.get(bullet).is_none());
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fixed_vec::FixedVec;

/// Cleanup hook run when an instance goes back into its pool.
pub trait Poolable {
    /// Clears all transient state so the instance can be reused.
    fn reset(&mut self);
}

/// Errors reported by [`ObjectPool`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    /// Every instance is currently allocated. Pools never grow.
    #[error("object pool exhausted (capacity {capacity})")]
    Exhausted {
        /// Capacity of the exhausted pool.
        capacity: usize,
    },

    /// The handle was already released, or was never issued by this pool.
    #[error("stale pool handle {0}")]
    StaleHandle(PoolHandle),
}

/// Generation-checked reference to an allocated pool instance.
///
/// Handles are plain `Copy` values: storing one does not keep the instance
/// alive. Once the instance is released every copy of the handle goes stale.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// Returns the slot index this handle refers to.
    #[must_use]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation this handle was issued for.
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PoolHandle({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for PoolHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug)]
struct Slot<T> {
    value: T,
    generation: u32,
    live: bool,
}

/// A pool of `C` pre-built instances.
///
/// The pool keeps true ownership of every instance; callers only borrow them
/// through handles between `allocate` and `release`.
#[derive(Debug)]
pub struct ObjectPool<T> {
    slots: Box<[Slot<T>]>,
    /// Indices of slots ready to be handed out. Popped from the end.
    available: FixedVec<u32>,
}

impl<T> ObjectPool<T> {
    /// Creates a pool of `capacity` instances built by `fill(index)`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a `u32`.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new<F: FnMut(usize) -> T>(capacity: usize, mut fill: F) -> Self {
        assert!(u32::try_from(capacity).is_ok(), "pool capacity exceeds u32");

        let slots: Vec<Slot<T>> = (0..capacity)
            .map(|index| Slot {
                value: fill(index),
                generation: 0,
                live: false,
            })
            .collect();

        let mut available = FixedVec::new(capacity);
        // Reverse so that allocation hands out slot 0 first.
        for index in (0..capacity as u32).rev() {
            // Cannot overflow: the list was sized for exactly these indices.
            let _ = available.push(index);
        }

        Self {
            slots: slots.into_boxed_slice(),
            available,
        }
    }

    /// Creates a pool of `capacity` default-constructed instances.
    #[must_use]
    pub fn with_default(capacity: usize) -> Self
    where
        T: Default,
    {
        Self::new(capacity, |_| T::default())
    }

    /// Takes a ready instance out of the pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Exhausted`] when every instance is allocated.
    pub fn allocate(&mut self) -> Result<PoolHandle, PoolError> {
        let index = self.available.pop().ok_or(PoolError::Exhausted {
            capacity: self.slots.len(),
        })?;
        let slot = &mut self.slots[index as usize];
        slot.live = true;
        Ok(PoolHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Resets the instance and makes it available again.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::StaleHandle`] if the handle was already released or
    /// does not belong to this pool. The pool is left unchanged.
    pub fn release(&mut self, handle: PoolHandle) -> Result<(), PoolError>
    where
        T: Poolable,
    {
        let slot = self
            .slot_mut(handle)
            .ok_or(PoolError::StaleHandle(handle))?;
        slot.value.reset();
        slot.live = false;
        slot.generation = slot.generation.wrapping_add(1);
        // Cannot overflow: a live slot is by definition missing from the list.
        let _ = self.available.push(handle.index);
        Ok(())
    }

    /// Returns the instance behind a live handle.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.slots
            .get(handle.index())
            .filter(|slot| slot.live && slot.generation == handle.generation)
            .map(|slot| &slot.value)
    }

    /// Returns the instance behind a live handle, mutably.
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.value)
    }

    /// Returns two distinct live instances at once.
    ///
    /// Returns `None` if either handle is stale or both refer to the same slot.
    pub fn get_pair_mut(&mut self, a: PoolHandle, b: PoolHandle) -> Option<(&mut T, &mut T)> {
        if a.index == b.index || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (low, high, swapped) = if a.index < b.index {
            (a.index(), b.index(), false)
        } else {
            (b.index(), a.index(), true)
        };
        let (head, tail) = self.slots.split_at_mut(high);
        let first = &mut head[low].value;
        let second = &mut tail[0].value;
        Some(if swapped {
            (second, first)
        } else {
            (first, second)
        })
    }

    /// Returns `true` if the handle refers to a live instance.
    #[must_use]
    pub fn contains(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Iterates over live instances in slot order.
    #[allow(clippy::cast_possible_truncation)]
    pub fn iter(&self) -> impl Iterator<Item = (PoolHandle, &T)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.live)
            .map(|(index, slot)| {
                let handle = PoolHandle {
                    index: index as u32,
                    generation: slot.generation,
                };
                (handle, &slot.value)
            })
    }

    /// Returns the total number of instances.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of instances currently handed out.
    #[must_use]
    pub fn allocated_count(&self) -> usize {
        self.slots.len() - self.available.len()
    }

    /// Returns the number of instances ready to be allocated.
    #[must_use]
    pub fn available_count(&self) -> usize {
        self.available.len()
    }

    fn slot_mut(&mut self, handle: PoolHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index())
            .filter(|slot| slot.live && slot.generation == handle.generation)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Default, PartialEq)]
    struct Particle {
        life: f32,
        resets: u32,
    }

    impl Poolable for Particle {
        fn reset(&mut self) {
            self.life = 0.0;
            self.resets += 1;
        }
    }

    mod allocation_tests {
        use super::*;

        #[test]
        fn prebuilds_every_instance() {
            let mut built = 0;
            let pool: ObjectPool<Particle> = ObjectPool::new(5, |_| {
                built += 1;
                Particle::default()
            });
            assert_eq!(built, 5);
            assert_eq!(pool.capacity(), 5);
            assert_eq!(pool.allocated_count(), 0);
            assert_eq!(pool.available_count(), 5);
        }

        #[test]
        fn allocate_hands_out_lowest_slot_first() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(3);
            assert_eq!(pool.allocate().unwrap().index(), 0);
            assert_eq!(pool.allocate().unwrap().index(), 1);
        }

        #[test]
        fn exhaustion_is_an_error() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(2);
            pool.allocate().unwrap();
            pool.allocate().unwrap();
            assert_eq!(
                pool.allocate().unwrap_err(),
                PoolError::Exhausted { capacity: 2 }
            );
            assert_eq!(pool.allocated_count(), 2);
        }

        #[test]
        fn release_resets_and_recycles() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(1);
            let first = pool.allocate().unwrap();
            pool.get_mut(first).unwrap().life = 3.0;
            pool.release(first).unwrap();

            let second = pool.allocate().unwrap();
            assert_eq!(second.index(), first.index());
            assert_ne!(second.generation(), first.generation());
            let particle = pool.get(second).unwrap();
            assert_eq!(particle.life, 0.0);
            assert_eq!(particle.resets, 1);
        }
    }

    mod handle_tests {
        use super::*;

        #[test]
        fn double_release_is_rejected() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(2);
            let handle = pool.allocate().unwrap();
            pool.release(handle).unwrap();
            assert_eq!(pool.release(handle), Err(PoolError::StaleHandle(handle)));
            assert_eq!(pool.available_count(), 2);
        }

        #[test]
        fn stale_handle_cannot_reach_reused_slot() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(1);
            let old = pool.allocate().unwrap();
            pool.release(old).unwrap();
            let _new = pool.allocate().unwrap();
            assert!(pool.get(old).is_none());
            assert!(pool.get_mut(old).is_none());
        }

        #[test]
        #[allow(clippy::cast_precision_loss)]
        fn get_pair_mut_returns_both_in_argument_order() {
            let mut pool = ObjectPool::new(3, |i| Particle {
                life: i as f32,
                resets: 0,
            });
            let a = pool.allocate().unwrap();
            let b = pool.allocate().unwrap();

            let (second, first) = pool.get_pair_mut(b, a).unwrap();
            assert_eq!(second.life, 1.0);
            assert_eq!(first.life, 0.0);
            assert!(pool.get_pair_mut(a, a).is_none());
        }

        #[test]
        fn iter_visits_only_live_instances() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(4);
            let a = pool.allocate().unwrap();
            let b = pool.allocate().unwrap();
            pool.release(a).unwrap();
            let live: Vec<_> = pool.iter().map(|(handle, _)| handle).collect();
            assert_eq!(live, vec![b]);
        }

        #[test]
        fn handle_serializes() {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(1);
            let handle = pool.allocate().unwrap();
            let json = serde_json::to_string(&handle).unwrap();
            let back: PoolHandle = serde_json::from_str(&json).unwrap();
            assert_eq!(back, handle);
        }
    }

    proptest! {
        #[test]
        fn outstanding_never_exceeds_capacity(capacity in 1usize..16, ops in proptest::collection::vec(any::<bool>(), 0..128)) {
            let mut pool: ObjectPool<Particle> = ObjectPool::with_default(capacity);
            let mut outstanding = Vec::new();
            for allocate in ops {
                if allocate {
                    match pool.allocate() {
                        Ok(handle) => outstanding.push(handle),
                        Err(PoolError::Exhausted { .. }) => prop_assert_eq!(outstanding.len(), capacity),
                        Err(other) => prop_assert!(false, "unexpected {other}"),
                    }
                } else if let Some(handle) = outstanding.pop() {
                    prop_assert!(pool.release(handle).is_ok());
                }
                prop_assert!(pool.allocated_count() <= capacity);
                prop_assert_eq!(pool.allocated_count(), outstanding.len());
            }
        }
    }
}
