//! Object lifecycle: pool, active list, deferred add/remove.
//!
//! Objects are never added to or removed from the active list mid-frame.
//! [`ObjectManager::add`] and [`ObjectManager::remove`] only queue the change;
//! [`ObjectManager::commit`] applies it at the frame boundary. Removals are
//! applied first, then additions, so an object added and removed in the same
//! frame never becomes active.

use stash::{FixedVec, ObjectPool};

use super::{GameObject, ObjectFlags, ObjectHandle};
use crate::config::SimConfig;
use crate::error::{SimError, SimResult};
use crate::object::factory::SpawnRecord;
use crate::phase::Phase;
use crate::systems::Systems;

/// Spawn and despawn requests raised by components mid-frame.
///
/// Components cannot reach the [`ObjectManager`]; they queue requests here
/// and the simulation forwards them at the next commit.
#[derive(Debug, Clone)]
pub struct LifecycleQueue {
    spawns: FixedVec<SpawnRecord>,
    despawns: FixedVec<ObjectHandle>,
}

impl LifecycleQueue {
    /// Creates a queue holding `capacity` requests of each kind.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            spawns: FixedVec::new(capacity),
            despawns: FixedVec::new(capacity),
        }
    }

    /// Requests a new object from `record`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the queue is full.
    pub fn request_spawn(&mut self, record: SpawnRecord) -> SimResult<()> {
        self.spawns
            .push(record)
            .map_err(SimError::exhausted("spawn queue"))
    }

    /// Requests removal of `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the queue is full.
    pub fn request_despawn(&mut self, handle: ObjectHandle) -> SimResult<()> {
        self.despawns
            .push(handle)
            .map_err(SimError::exhausted("despawn queue"))
    }

    /// Takes every queued spawn.
    pub fn drain_spawns(&mut self) -> impl Iterator<Item = SpawnRecord> + '_ {
        self.spawns.drain()
    }

    /// Takes every queued despawn.
    pub fn drain_despawns(&mut self) -> impl Iterator<Item = ObjectHandle> + '_ {
        self.despawns.drain()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.spawns.is_empty() && self.despawns.is_empty()
    }
}

/// Owns every game object.
#[derive(Debug)]
pub struct ObjectManager {
    pool: ObjectPool<GameObject>,
    active: FixedVec<ObjectHandle>,
    pending_add: FixedVec<ObjectHandle>,
    pending_remove: FixedVec<ObjectHandle>,
}

impl ObjectManager {
    /// Pre-builds `config.object_capacity` objects.
    #[must_use]
    pub fn new(config: &SimConfig) -> Self {
        let components = config.components_per_object;
        Self {
            pool: ObjectPool::new(config.object_capacity, |_| GameObject::new(components)),
            active: FixedVec::new(config.object_capacity),
            pending_add: FixedVec::new(config.pending_capacity),
            pending_remove: FixedVec::new(config.pending_capacity),
        }
    }

    /// Takes a blank object from the pool. It is not active until
    /// [`add`](Self::add) and the next [`commit`](Self::commit).
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the pool is empty.
    pub fn allocate(&mut self) -> SimResult<ObjectHandle> {
        Ok(self.pool.allocate()?)
    }

    /// Returns an object that was allocated but never added.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StaleHandle`] if the handle is not live.
    pub fn discard(&mut self, handle: ObjectHandle) -> SimResult<()> {
        Ok(self.pool.release(handle)?)
    }

    /// Queues `handle` for activation at the next commit.
    ///
    /// # Errors
    ///
    /// - [`SimError::StaleHandle`] if the handle is not live.
    /// - [`SimError::ResourceExhaustion`] if the pending list is full.
    pub fn add(&mut self, handle: ObjectHandle) -> SimResult<()> {
        if !self.pool.contains(handle) {
            return Err(SimError::StaleHandle(handle));
        }
        self.pending_add
            .push(handle)
            .map_err(SimError::exhausted("pending add list"))
    }

    /// Queues `handle` for removal at the next commit. Repeated requests for
    /// the same object are merged.
    ///
    /// # Errors
    ///
    /// - [`SimError::StaleHandle`] if the handle is not live.
    /// - [`SimError::ResourceExhaustion`] if the pending list is full.
    pub fn remove(&mut self, handle: ObjectHandle) -> SimResult<()> {
        let object = self
            .pool
            .get_mut(handle)
            .ok_or(SimError::StaleHandle(handle))?;
        if object.state.flags.contains(ObjectFlags::REMOVAL_PENDING) {
            return Ok(());
        }
        self.pending_remove
            .push(handle)
            .map_err(SimError::exhausted("pending remove list"))?;
        object.state.flags.insert(ObjectFlags::REMOVAL_PENDING);
        Ok(())
    }

    /// Applies queued removals, then queued additions.
    ///
    /// Removed objects go back to the pool. Added objects have their pending
    /// components activated. Returns `true` if the active list changed.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the active list or an
    /// object's component list overflows.
    pub fn commit(&mut self) -> SimResult<bool> {
        let mut changed = false;

        for handle in self.pending_remove.drain() {
            if let Some(index) = self.active.iter().position(|&h| h == handle) {
                self.active.remove(index);
            } else if let Some(index) = self.pending_add.iter().position(|&h| h == handle) {
                self.pending_add.remove(index);
            }
            if let Err(err) = self.pool.release(handle) {
                tracing::warn!(%handle, %err, "removal of released object skipped");
            }
            changed = true;
        }

        if !self.pending_add.is_empty() {
            changed = true;
        }
        self.active
            .append(&mut self.pending_add)
            .map_err(SimError::exhausted("active object list"))?;

        for &handle in self.active.iter() {
            if let Some(object) = self.pool.get_mut(handle) {
                object.commit_components()?;
            }
        }

        if changed {
            tracing::debug!(active = self.active.len(), "object list committed");
        }
        Ok(changed)
    }

    /// Runs `phase` on every active object, in activation order.
    ///
    /// # Errors
    ///
    /// Propagates the first component error.
    pub fn update_phase(&mut self, phase: Phase, systems: &mut Systems) -> SimResult<()> {
        for &handle in self.active.iter() {
            if let Some(object) = self.pool.get_mut(handle) {
                object.update_phase(phase, handle, systems)?;
            }
        }
        Ok(())
    }

    /// Returns a live object.
    #[must_use]
    pub fn get(&self, handle: ObjectHandle) -> Option<&GameObject> {
        self.pool.get(handle)
    }

    /// Returns a live object, mutably.
    pub fn get_mut(&mut self, handle: ObjectHandle) -> Option<&mut GameObject> {
        self.pool.get_mut(handle)
    }

    /// Returns `true` if `handle` is on the active list.
    #[must_use]
    pub fn is_active(&self, handle: ObjectHandle) -> bool {
        self.active.iter().any(|&h| h == handle)
    }

    /// Active objects in activation order.
    #[must_use]
    pub fn active(&self) -> &[ObjectHandle] {
        self.active.as_slice()
    }

    /// Number of active objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// Returns `true` if no object is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Objects still available in the pool.
    #[must_use]
    pub fn available(&self) -> usize {
        self.pool.available_count()
    }

    /// Pool access for hit arbitration.
    pub fn pool_mut(&mut self) -> &mut ObjectPool<GameObject> {
        &mut self.pool
    }

    /// Queues every active and pending object for removal.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the pending list is full.
    pub fn remove_all(&mut self) -> SimResult<()> {
        let handles: Vec<ObjectHandle> = self
            .active
            .iter()
            .chain(self.pending_add.iter())
            .copied()
            .collect();
        for handle in handles {
            self.remove(handle)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(objects: usize, pending: usize) -> SimConfig {
        SimConfig {
            object_capacity: objects,
            pending_capacity: pending,
            ..SimConfig::default()
        }
    }

    #[test]
    fn additions_become_active_only_on_commit() {
        let mut manager = ObjectManager::new(&config(4, 4));
        let handle = manager.allocate().unwrap();
        manager.add(handle).unwrap();
        assert!(!manager.is_active(handle));

        assert!(manager.commit().unwrap());
        assert!(manager.is_active(handle));
        assert!(!manager.commit().unwrap());
    }

    #[test]
    fn removal_releases_to_the_pool() {
        let mut manager = ObjectManager::new(&config(2, 4));
        let handle = manager.allocate().unwrap();
        manager.add(handle).unwrap();
        manager.commit().unwrap();
        assert_eq!(manager.available(), 1);

        manager.remove(handle).unwrap();
        manager.remove(handle).unwrap();
        assert!(manager.is_active(handle));
        manager.commit().unwrap();

        assert!(manager.is_empty());
        assert_eq!(manager.available(), 2);
        assert!(manager.get(handle).is_none());
        assert!(matches!(manager.remove(handle), Err(SimError::StaleHandle(_))));
    }

    #[test]
    fn add_then_remove_in_one_frame_never_activates() {
        let mut manager = ObjectManager::new(&config(2, 4));
        let handle = manager.allocate().unwrap();
        manager.add(handle).unwrap();
        manager.remove(handle).unwrap();
        manager.commit().unwrap();
        assert!(manager.is_empty());
        assert_eq!(manager.available(), 2);
    }

    #[test]
    fn pool_exhaustion_is_reported() {
        let mut manager = ObjectManager::new(&config(1, 4));
        manager.allocate().unwrap();
        let err = manager.allocate().unwrap_err();
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn activation_order_is_preserved_across_removals() {
        let mut manager = ObjectManager::new(&config(4, 4));
        let handles: Vec<ObjectHandle> = (0..3).map(|_| manager.allocate().unwrap()).collect();
        for &handle in &handles {
            manager.add(handle).unwrap();
        }
        manager.commit().unwrap();
        manager.remove(handles[1]).unwrap();
        manager.commit().unwrap();
        assert_eq!(manager.active(), &[handles[0], handles[2]]);
    }

    #[test]
    fn lifecycle_queue_reports_overflow() {
        let mut queue = LifecycleQueue::new(1);
        let mut manager = ObjectManager::new(&config(2, 2));
        let handle = manager.allocate().unwrap();
        queue.request_despawn(handle).unwrap();
        assert!(queue.request_despawn(handle).unwrap_err().is_resource_exhaustion());
        assert_eq!(queue.drain_despawns().count(), 1);
        assert!(queue.is_empty());
    }
}
