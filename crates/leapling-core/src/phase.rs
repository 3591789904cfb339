//! Update phases and the pending/active phase scheduler.
//!
//! Every schedulable unit carries a [`Phase`]. Within a frame lower phases run
//! first, in the canonical order:
//!
//! ```text
//! Think → Movement → Physics → PostPhysics → CollisionDetection
//!       → FrameEnd → Animation → Draw
//! ```
//!
//! # Pending vs Active
//!
//! [`PhaseScheduler`] keeps two fixed-capacity lists. [`PhaseScheduler::add`]
//! only appends to the pending list; [`PhaseScheduler::commit`] (once per frame
//! boundary) merges pending into active and re-sorts by phase. Units added
//! mid-frame therefore never disturb the iteration in progress, and sorting is
//! paid once per frame instead of once per insertion.
//!
//! # Example
//!
//! ```
//! use leapling_core::phase::{Phase, PhaseScheduler, Phased};
//!
//! struct Step(Phase, &'static str);
//! impl Phased for Step {
//!     fn phase(&self) -> Phase { self.0 }
//! }
//!
//! let mut scheduler = PhaseScheduler::new(8);
//! scheduler.add(Step(Phase::Draw, "draw")).unwrap();
//! scheduler.add(Step(Phase::Think, "think")).unwrap();
//! assert!(scheduler.find(Phase::Think).is_some()); // found in pending
//!
//! scheduler.commit().unwrap();
//! let order: Vec<_> = scheduler.iter().map(|step| step.1).collect();
//! assert_eq!(order, vec!["think", "draw"]);
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ops::Range;

use serde::{Deserialize, Serialize};
use stash::{CapacityError, FixedVec, InsertionSort};

/// Position of a unit within a frame. Lower runs earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Phase {
    /// AI and player decisions.
    Think = 0,
    /// Velocity and position integration.
    Movement = 1,
    /// Gravity, bounce and friction.
    Physics = 2,
    /// Corrections after physics.
    PostPhysics = 3,
    /// Background ray casts and dynamic volume registration.
    CollisionDetection = 4,
    /// Flushing aggregated state (inventory, HUD, lifetime).
    FrameEnd = 5,
    /// Animation clip selection.
    Animation = 6,
    /// Render scheduling.
    Draw = 7,
}

impl Phase {
    /// Every phase, in execution order.
    pub const ALL: [Phase; 8] = [
        Phase::Think,
        Phase::Movement,
        Phase::Physics,
        Phase::PostPhysics,
        Phase::CollisionDetection,
        Phase::FrameEnd,
        Phase::Animation,
        Phase::Draw,
    ];

    /// Returns the integer priority of this phase.
    #[must_use]
    pub const fn priority(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Think => "think",
            Self::Movement => "movement",
            Self::Physics => "physics",
            Self::PostPhysics => "post_physics",
            Self::CollisionDetection => "collision_detection",
            Self::FrameEnd => "frame_end",
            Self::Animation => "animation",
            Self::Draw => "draw",
        };
        f.write_str(name)
    }
}

/// A unit that can be scheduled by phase.
///
/// Only `Phased` types can be stored in a [`PhaseScheduler`], so adding an
/// unschedulable unit is a compile error rather than a runtime check.
pub trait Phased {
    /// Returns the phase this unit runs in.
    fn phase(&self) -> Phase;
}

fn by_phase<T: Phased>(a: &T, b: &T) -> Ordering {
    a.phase().cmp(&b.phase())
}

/// Search comparator keyed by a bare [`Phase`] value.
///
/// Lookups compare against the phase directly instead of constructing a
/// throwaway unit as the search key.
fn against_phase<T: Phased>(item: &T, key: &Phase) -> Ordering {
    item.phase().cmp(key)
}

/// Pending/active lists of phased units, sorted by phase on commit.
#[derive(Debug, Clone)]
pub struct PhaseScheduler<T: Phased> {
    active: FixedVec<T>,
    pending: FixedVec<T>,
    dirty: bool,
    sort_count: u64,
}

impl<T: Phased> PhaseScheduler<T> {
    /// Creates a scheduler holding at most `capacity` units in total.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            active: FixedVec::new(capacity),
            pending: FixedVec::new(capacity),
            dirty: false,
            sort_count: 0,
        }
    }

    /// Queues a unit. It becomes active at the next [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if active and pending units together would
    /// exceed the capacity.
    pub fn add(&mut self, unit: T) -> Result<(), CapacityError> {
        if self.active.len() + self.pending.len() >= self.active.capacity() {
            return Err(CapacityError {
                capacity: self.active.capacity(),
            });
        }
        self.pending.push(unit)?;
        self.dirty = true;
        Ok(())
    }

    /// Merges pending units into the active list and re-sorts if dirty.
    ///
    /// Sorting is stable: units sharing a phase keep their insertion order.
    /// Returns `true` if a sort ran.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the merge would overflow; nothing is moved.
    pub fn commit(&mut self) -> Result<bool, CapacityError> {
        self.active.append(&mut self.pending)?;
        if !self.dirty {
            return Ok(false);
        }
        self.active.sort(&InsertionSort, &by_phase::<T>, true);
        self.dirty = false;
        self.sort_count += 1;
        Ok(true)
    }

    /// Finds the first unit in `phase`.
    ///
    /// Binary-searches the active list, then falls back to a linear scan of
    /// the pending list.
    #[must_use]
    pub fn find(&self, phase: Phase) -> Option<&T> {
        self.active
            .find(&phase, &against_phase::<T>, true)
            .map(|index| &self.active[index])
            .or_else(|| {
                self.pending
                    .find(&phase, &against_phase::<T>, false)
                    .map(|index| &self.pending[index])
            })
    }

    /// Returns the index range of active units in `phase`.
    #[must_use]
    pub fn phase_range(&self, phase: Phase) -> Range<usize> {
        let Some(start) = self.active.find(&phase, &against_phase::<T>, true) else {
            return 0..0;
        };
        let len = self.active.as_slice()[start..]
            .iter()
            .take_while(|unit| unit.phase() == phase)
            .count();
        start..start + len
    }

    /// Returns the active units in `phase`, mutably, in insertion order.
    pub fn phase_slice_mut(&mut self, phase: Phase) -> &mut [T] {
        let range = self.phase_range(phase);
        &mut self.active.as_mut_slice()[range]
    }

    /// Iterates over active units in phase order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.active.iter()
    }

    /// Iterates mutably over active units in phase order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.active.iter_mut()
    }

    /// Iterates over units waiting for the next commit.
    pub fn pending(&self) -> std::slice::Iter<'_, T> {
        self.pending.iter()
    }

    /// Drops every active and pending unit.
    pub fn clear(&mut self) {
        self.active.clear();
        self.pending.clear();
        self.dirty = false;
    }

    /// Number of active units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if there are no active units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Number of units waiting for the next commit.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if the next commit will re-sort.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Number of sorts performed by [`commit`](Self::commit) so far.
    #[must_use]
    pub fn sort_count(&self) -> u64 {
        self.sort_count
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Unit {
        phase: Phase,
        id: u32,
    }

    impl Phased for Unit {
        fn phase(&self) -> Phase {
            self.phase
        }
    }

    fn unit(phase: Phase, id: u32) -> Unit {
        Unit { phase, id }
    }

    mod commit_tests {
        use super::*;

        #[test]
        fn added_units_stay_pending_until_commit() {
            let mut scheduler = PhaseScheduler::new(4);
            scheduler.add(unit(Phase::Draw, 0)).unwrap();
            assert_eq!(scheduler.len(), 0);
            assert_eq!(scheduler.pending_len(), 1);
            assert!(scheduler.is_dirty());

            assert!(scheduler.commit().unwrap());
            assert_eq!(scheduler.len(), 1);
            assert_eq!(scheduler.pending_len(), 0);
            assert!(!scheduler.is_dirty());
        }

        #[test]
        fn commit_sorts_by_phase_keeping_insertion_order_for_ties() {
            let mut scheduler = PhaseScheduler::new(8);
            scheduler.add(unit(Phase::Draw, 0)).unwrap();
            scheduler.add(unit(Phase::Think, 1)).unwrap();
            scheduler.add(unit(Phase::Physics, 2)).unwrap();
            scheduler.add(unit(Phase::Think, 3)).unwrap();
            scheduler.commit().unwrap();

            let ids: Vec<u32> = scheduler.iter().map(|u| u.id).collect();
            assert_eq!(ids, vec![1, 3, 2, 0]);
        }

        #[test]
        fn commit_without_changes_does_not_resort() {
            let mut scheduler = PhaseScheduler::new(4);
            scheduler.add(unit(Phase::Movement, 0)).unwrap();
            scheduler.commit().unwrap();
            assert_eq!(scheduler.sort_count(), 1);

            assert!(!scheduler.commit().unwrap());
            assert!(!scheduler.commit().unwrap());
            assert_eq!(scheduler.sort_count(), 1);
        }

        #[test]
        fn later_adds_merge_after_equal_phase_units() {
            let mut scheduler = PhaseScheduler::new(4);
            scheduler.add(unit(Phase::Think, 0)).unwrap();
            scheduler.commit().unwrap();
            scheduler.add(unit(Phase::Think, 1)).unwrap();
            scheduler.commit().unwrap();

            let ids: Vec<u32> = scheduler.iter().map(|u| u.id).collect();
            assert_eq!(ids, vec![0, 1]);
        }

        #[test]
        fn capacity_counts_pending_and_active() {
            let mut scheduler = PhaseScheduler::new(2);
            scheduler.add(unit(Phase::Think, 0)).unwrap();
            scheduler.commit().unwrap();
            scheduler.add(unit(Phase::Think, 1)).unwrap();
            assert!(scheduler.add(unit(Phase::Think, 2)).is_err());
            scheduler.commit().unwrap();
            assert_eq!(scheduler.len(), 2);
        }
    }

    mod find_tests {
        use super::*;

        #[test]
        fn find_prefers_active_and_falls_back_to_pending() {
            let mut scheduler = PhaseScheduler::new(4);
            scheduler.add(unit(Phase::Physics, 0)).unwrap();
            scheduler.commit().unwrap();
            scheduler.add(unit(Phase::Draw, 1)).unwrap();

            assert_eq!(scheduler.find(Phase::Physics).map(|u| u.id), Some(0));
            assert_eq!(scheduler.find(Phase::Draw).map(|u| u.id), Some(1));
            assert!(scheduler.find(Phase::Think).is_none());
        }

        #[test]
        fn phase_range_covers_every_unit_in_phase() {
            let mut scheduler = PhaseScheduler::new(8);
            for (id, phase) in [Phase::Think, Phase::Draw, Phase::Physics, Phase::Physics]
                .into_iter()
                .enumerate()
            {
                scheduler.add(unit(phase, u32::try_from(id).unwrap())).unwrap();
            }
            scheduler.commit().unwrap();

            assert_eq!(scheduler.phase_range(Phase::Physics), 1..3);
            assert_eq!(scheduler.phase_range(Phase::Movement), 0..0);
            let physics: Vec<u32> = scheduler
                .phase_slice_mut(Phase::Physics)
                .iter()
                .map(|u| u.id)
                .collect();
            assert_eq!(physics, vec![2, 3]);
        }
    }

    proptest! {
        #[test]
        fn committed_order_is_phase_sorted_and_stable(phases in proptest::collection::vec(0u8..8, 0..32)) {
            let mut scheduler = PhaseScheduler::new(32);
            for (id, p) in phases.iter().enumerate() {
                scheduler.add(unit(Phase::ALL[*p as usize], u32::try_from(id).unwrap())).unwrap();
            }
            scheduler.commit().unwrap();

            let units: Vec<&Unit> = scheduler.iter().collect();
            for pair in units.windows(2) {
                prop_assert!(pair[0].phase <= pair[1].phase);
                if pair[0].phase == pair[1].phase {
                    prop_assert!(pair[0].id < pair[1].id);
                }
            }
        }
    }
}
