//! Per-frame dynamic collision registry.
//!
//! Objects register their attack and vulnerability volumes during the
//! collision-detection phase. [`CollisionRegistry::resolve`] then runs once:
//!
//! 1. **Broad phase**: records are sorted by the left edge of their world
//!    bounding circle and swept left to right. A pair is tested only if the
//!    circles overlap.
//! 2. **Narrow phase**: for each direction of a candidate pair (A attacking B,
//!    then B attacking A) the first attack volume of the attacker that
//!    overlaps a matching vulnerability volume of the victim produces one hit.
//! 3. **Dispatch**: the [`HitArbiter`] is asked whether the attacker accepts
//!    the hit, then told the outcome.
//!
//! Records are cleared after resolution; every frame registers afresh.

use glam::Vec2;
use stash::{CapacityError, FixedVec, InsertionSort, OverflowPolicy};

use super::volume::{BoundingSphere, CollisionVolume, Flip, HitType, VolumeSet};
use crate::object::ObjectHandle;

/// Decides and applies hits between objects.
///
/// For every detected hit the registry calls [`accept_hit`](Self::accept_hit)
/// first and [`hit_victim`](Self::hit_victim) second, always with the same
/// arguments, and always both.
pub trait HitArbiter {
    /// Asks the attacker's hit reaction whether the hit goes through.
    fn accept_hit(&mut self, attacker: ObjectHandle, victim: ObjectHandle, hit: HitType) -> bool;

    /// Tells the victim's hit reaction about the hit and whether it was
    /// accepted.
    fn hit_victim(
        &mut self,
        attacker: ObjectHandle,
        victim: ObjectHandle,
        hit: HitType,
        accepted: bool,
    );
}

/// One object's volumes for this frame.
#[derive(Debug, Clone)]
pub struct CollisionRecord {
    /// The registering object.
    pub owner: ObjectHandle,
    /// Object position (bottom-left corner).
    pub position: Vec2,
    /// Object size.
    pub size: Vec2,
    /// Object mirroring.
    pub flip: Flip,
    /// Volumes that deal hits.
    pub attack: VolumeSet,
    /// Volumes that receive hits.
    pub vulnerability: VolumeSet,
    world_bounds: BoundingSphere,
}

impl CollisionRecord {
    /// Builds a record; `bounds` is the local bounding circle of both sets.
    #[must_use]
    pub fn new(
        owner: ObjectHandle,
        position: Vec2,
        size: Vec2,
        flip: Flip,
        bounds: BoundingSphere,
        attack: VolumeSet,
        vulnerability: VolumeSet,
    ) -> Self {
        Self {
            owner,
            position,
            size,
            flip,
            attack,
            vulnerability,
            world_bounds: bounds.to_world(position, size, flip),
        }
    }

    /// Bounding circle in world space.
    #[must_use]
    pub fn world_bounds(&self) -> BoundingSphere {
        self.world_bounds
    }

    /// First hit this record deals to `victim`, if any volume pair overlaps.
    fn first_hit_on(&self, victim: &CollisionRecord) -> Option<HitType> {
        self.attack
            .iter()
            .filter(|attack| attack.hit_type != HitType::Invalid)
            .find(|attack| {
                let attack_shape = attack.shape.to_world(self.position, self.size, self.flip);
                victim
                    .vulnerability
                    .iter()
                    .filter(|vulnerable| vulnerable.accepts(attack.hit_type))
                    .any(|vulnerable| {
                        let shape = vulnerable
                            .shape
                            .to_world(victim.position, victim.size, victim.flip);
                        attack_shape.intersects(&shape)
                    })
            })
            .map(|attack: &CollisionVolume| attack.hit_type)
    }
}

/// A hit dispatched during the last resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRecord {
    /// Object whose attack volume overlapped.
    pub attacker: ObjectHandle,
    /// Object whose vulnerability volume was overlapped.
    pub victim: ObjectHandle,
    /// Type of hit.
    pub hit_type: HitType,
    /// Whether the attacker accepted it.
    pub accepted: bool,
}

/// Collects records during a frame and resolves them once.
#[derive(Debug, Clone)]
pub struct CollisionRegistry {
    records: FixedVec<CollisionRecord>,
    last_hits: FixedVec<HitRecord>,
    pairs_tested: usize,
}

impl CollisionRegistry {
    /// Creates a registry for `capacity` records per frame.
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            records: FixedVec::with_policy(capacity, policy),
            last_hits: FixedVec::with_policy(capacity, OverflowPolicy::Ignore),
            pairs_tested: 0,
        }
    }

    /// Adds a record for this frame.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] if the registry is full under
    /// [`OverflowPolicy::Error`].
    pub fn register(&mut self, record: CollisionRecord) -> Result<(), CapacityError> {
        self.records.push(record)
    }

    /// Number of records registered this frame.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Detects every hit among this frame's records and dispatches it to
    /// `arbiter`. Clears the records. Returns the number of hits dispatched.
    pub fn resolve(&mut self, arbiter: &mut dyn HitArbiter) -> usize {
        self.last_hits.clear();
        self.pairs_tested = 0;
        let mut dispatched = 0;

        self.records.sort(
            &InsertionSort,
            &|a: &CollisionRecord, b: &CollisionRecord| {
                a.world_bounds.min_x().total_cmp(&b.world_bounds.min_x())
            },
            true,
        );

        let records = self.records.as_slice();
        for (i, first) in records.iter().enumerate() {
            let first_bounds = first.world_bounds;
            for second in &records[i + 1..] {
                let second_bounds = second.world_bounds;
                if second_bounds.min_x() > first_bounds.max_x() {
                    // Sorted by min x: nothing further right can overlap.
                    break;
                }
                if first.owner == second.owner || !first_bounds.intersects(&second_bounds) {
                    continue;
                }
                self.pairs_tested += 1;

                for (attacker, victim) in [(first, second), (second, first)] {
                    if let Some(hit_type) = attacker.first_hit_on(victim) {
                        let accepted = arbiter.accept_hit(attacker.owner, victim.owner, hit_type);
                        arbiter.hit_victim(attacker.owner, victim.owner, hit_type, accepted);
                        dispatched += 1;
                        tracing::trace!(
                            attacker = %attacker.owner,
                            victim = %victim.owner,
                            ?hit_type,
                            accepted,
                            "hit dispatched"
                        );
                        // Log is best effort; overflow is dropped under Ignore.
                        let _ = self.last_hits.push(HitRecord {
                            attacker: attacker.owner,
                            victim: victim.owner,
                            hit_type,
                            accepted,
                        });
                    }
                }
            }
        }

        self.records.clear();
        dispatched
    }

    /// Hits dispatched by the last [`resolve`](Self::resolve), up to the
    /// registry capacity.
    #[must_use]
    pub fn last_hits(&self) -> &[HitRecord] {
        self.last_hits.as_slice()
    }

    /// Candidate pairs that passed the broad phase during the last resolve.
    #[must_use]
    pub fn pairs_tested(&self) -> usize {
        self.pairs_tested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stash::ObjectPool;

    #[derive(Default)]
    struct Recording {
        calls: Vec<(&'static str, ObjectHandle, ObjectHandle, HitType, bool)>,
        accept: bool,
    }

    impl HitArbiter for Recording {
        fn accept_hit(&mut self, attacker: ObjectHandle, victim: ObjectHandle, hit: HitType) -> bool {
            self.calls.push(("accept", attacker, victim, hit, self.accept));
            self.accept
        }

        fn hit_victim(
            &mut self,
            attacker: ObjectHandle,
            victim: ObjectHandle,
            hit: HitType,
            accepted: bool,
        ) {
            self.calls.push(("victim", attacker, victim, hit, accepted));
        }
    }

    fn handles(count: usize) -> Vec<ObjectHandle> {
        let mut pool: ObjectPool<()> = ObjectPool::with_default(count);
        (0..count).map(|_| pool.allocate().unwrap()).collect()
    }

    fn record(owner: ObjectHandle, x: f32, attack: &[CollisionVolume], vulnerable: &[CollisionVolume]) -> CollisionRecord {
        let attack: VolumeSet = Arc::from(attack);
        let vulnerability: VolumeSet = Arc::from(vulnerable);
        let bounds = BoundingSphere::enclosing(attack.iter().chain(vulnerability.iter()));
        CollisionRecord::new(
            owner,
            Vec2::new(x, 0.0),
            Vec2::splat(10.0),
            Flip::default(),
            bounds,
            attack,
            vulnerability,
        )
    }

    fn body(hit: HitType) -> CollisionVolume {
        CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(10.0), hit)
    }

    #[test]
    fn overlapping_attack_calls_accept_then_victim() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry.register(record(ids[0], 0.0, &[body(HitType::Hit)], &[])).unwrap();
        registry.register(record(ids[1], 5.0, &[], &[body(HitType::Invalid)])).unwrap();

        let mut arbiter = Recording {
            accept: true,
            ..Recording::default()
        };
        assert_eq!(registry.resolve(&mut arbiter), 1);
        assert_eq!(
            arbiter.calls,
            vec![
                ("accept", ids[0], ids[1], HitType::Hit, true),
                ("victim", ids[0], ids[1], HitType::Hit, true),
            ]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn rejected_hits_still_reach_the_victim() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry.register(record(ids[0], 0.0, &[body(HitType::Hit)], &[])).unwrap();
        registry.register(record(ids[1], 5.0, &[], &[body(HitType::Invalid)])).unwrap();

        let mut arbiter = Recording::default();
        registry.resolve(&mut arbiter);
        assert_eq!(arbiter.calls[1], ("victim", ids[0], ids[1], HitType::Hit, false));
        assert!(!registry.last_hits()[0].accepted);
    }

    #[test]
    fn hits_are_tested_in_both_directions() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry
            .register(record(ids[0], 0.0, &[body(HitType::Hit)], &[body(HitType::Invalid)]))
            .unwrap();
        registry
            .register(record(ids[1], 5.0, &[body(HitType::Hit)], &[body(HitType::Invalid)]))
            .unwrap();

        let mut arbiter = Recording::default();
        assert_eq!(registry.resolve(&mut arbiter), 2);
        let attackers: Vec<ObjectHandle> = registry.last_hits().iter().map(|h| h.attacker).collect();
        assert_eq!(attackers, vec![ids[0], ids[1]]);
    }

    #[test]
    fn mismatched_vulnerability_is_ignored() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry.register(record(ids[0], 0.0, &[body(HitType::Hit)], &[])).unwrap();
        registry.register(record(ids[1], 5.0, &[], &[body(HitType::Collect)])).unwrap();

        let mut arbiter = Recording::default();
        assert_eq!(registry.resolve(&mut arbiter), 0);
        assert!(arbiter.calls.is_empty());
    }

    #[test]
    fn only_the_first_matching_attack_volume_fires() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry
            .register(record(ids[0], 0.0, &[body(HitType::Collect), body(HitType::Hit)], &[]))
            .unwrap();
        registry.register(record(ids[1], 5.0, &[], &[body(HitType::Invalid)])).unwrap();

        let mut arbiter = Recording::default();
        assert_eq!(registry.resolve(&mut arbiter), 1);
        assert_eq!(registry.last_hits()[0].hit_type, HitType::Collect);
    }

    #[test]
    fn distant_records_are_culled_by_the_sweep() {
        let ids = handles(3);
        let mut registry = CollisionRegistry::new(8, OverflowPolicy::Error);
        registry.register(record(ids[2], 500.0, &[body(HitType::Hit)], &[])).unwrap();
        registry.register(record(ids[0], 0.0, &[body(HitType::Hit)], &[])).unwrap();
        registry.register(record(ids[1], 250.0, &[], &[body(HitType::Invalid)])).unwrap();

        let mut arbiter = Recording::default();
        assert_eq!(registry.resolve(&mut arbiter), 0);
        assert_eq!(registry.pairs_tested(), 0);
    }

    #[test]
    fn full_registry_reports_capacity() {
        let ids = handles(2);
        let mut registry = CollisionRegistry::new(1, OverflowPolicy::Error);
        registry.register(record(ids[0], 0.0, &[], &[])).unwrap();
        assert!(registry.register(record(ids[1], 0.0, &[], &[])).is_err());
    }

    #[test]
    fn dispatch_count_survives_a_full_hit_log() {
        let ids = handles(3);
        let mut registry = CollisionRegistry::new(3, OverflowPolicy::Error);
        for (i, &id) in ids.iter().enumerate() {
            registry
                .register(record(id, 2.0 * i as f32, &[body(HitType::Hit)], &[body(HitType::Invalid)]))
                .unwrap();
        }

        let mut arbiter = Recording::default();
        assert_eq!(registry.resolve(&mut arbiter), 6);
        assert_eq!(registry.last_hits().len(), 3);
        assert_eq!(arbiter.calls.len(), 12);
    }
}
