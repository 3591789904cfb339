//! The simulation root and frame loop.
//!
//! A [`Simulation`] owns the object manager, the shared [`Systems`] and the
//! object factory. One call to [`Simulation::step`] runs one frame:
//!
//! 1. Advance the clocks (freeze and time-scale effects apply here).
//! 2. Commit: forward queued despawns and spawns, then apply pending
//!    removals and additions to the active list.
//! 3. Run every phase in order. For each phase, every active object runs its
//!    components of that phase.
//! 4. Between the `CollisionDetection` and `FrameEnd` passes, resolve the
//!    dynamic collisions registered this frame.
//!
//! # Example
//!
//! ```
//! use glam::Vec2;
//! use leapling_core::config::SimConfig;
//! use leapling_core::object::{ObjectKind, SpawnRecord};
//! use leapling_core::Simulation;
//!
//! let mut sim = Simulation::new(SimConfig::default(), 42);
//! let coin = sim.spawn(&SpawnRecord::new(1, ObjectKind::Coin, Vec2::ZERO)).unwrap();
//! sim.step(1.0 / 60.0).unwrap();
//!
//! assert!(sim.objects().is_active(coin));
//! assert_eq!(sim.frame(), 1);
//! ```

use crate::collision::WorldGeometry;
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::object::{LevelData, ObjectArbiter, ObjectFactory, ObjectHandle, ObjectManager, SpawnRecord};
use crate::phase::Phase;
use crate::systems::Systems;
use crate::telemetry::GameEvent;

/// Deterministic frame-stepped simulation.
#[derive(Debug)]
pub struct Simulation {
    objects: ObjectManager,
    systems: Systems,
    factory: ObjectFactory,
    frame: u64,
    seed: u64,
}

impl Simulation {
    /// Creates an empty simulation. All pools and registries are sized from
    /// `config`; `seed` drives every random decision.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            objects: ObjectManager::new(&config),
            systems: Systems::new(config, seed),
            factory: ObjectFactory::new(),
            frame: 0,
            seed,
        }
    }

    /// Spawns every record of `level` and installs its geometry. Objects
    /// become active at the next frame. Returns the spawned handles.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`](crate::SimError::ResourceExhaustion)
    /// if the level needs more objects than configured.
    pub fn load_level(&mut self, level: &LevelData) -> SimResult<Vec<ObjectHandle>> {
        if !level.solids.is_empty() {
            self.set_world(Box::new(level.world()));
        }
        let handles = level
            .records
            .iter()
            .map(|record| self.spawn(record))
            .collect::<SimResult<Vec<_>>>()?;

        tracing::info!(level = %level.name, objects = handles.len(), "level loaded");
        self.systems.recorder.record(GameEvent::LevelStarted {
            name: level.name.clone(),
            objects: handles.len(),
        });
        Ok(handles)
    }

    /// Spawns one object; it becomes active at the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`](crate::SimError::ResourceExhaustion)
    /// if the pool or pending list is full.
    pub fn spawn(&mut self, record: &SpawnRecord) -> SimResult<ObjectHandle> {
        self.factory
            .spawn(record, &mut self.objects, &mut self.systems)
    }

    /// Queues `handle` for removal at the next frame.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::StaleHandle`](crate::SimError::StaleHandle) if the
    /// object is already gone.
    pub fn despawn(&mut self, handle: ObjectHandle) -> SimResult<()> {
        self.objects.remove(handle)
    }

    /// Installs background geometry.
    pub fn set_world(&mut self, world: Box<dyn WorldGeometry>) {
        self.systems.world = Some(world);
    }

    /// Applies queued lifecycle requests and pending list changes.
    ///
    /// Runs at the start of every [`step`](Self::step); calling it again
    /// without new requests changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`](crate::SimError::ResourceExhaustion)
    /// if a spawn cannot be served.
    pub fn commit(&mut self) -> SimResult<bool> {
        for handle in self.systems.lifecycle.drain_despawns().collect::<Vec<_>>() {
            if let Err(err) = self.objects.remove(handle) {
                tracing::debug!(%handle, %err, "despawn of missing object ignored");
            }
        }
        for record in self.systems.lifecycle.drain_spawns().collect::<Vec<_>>() {
            self.factory
                .spawn(&record, &mut self.objects, &mut self.systems)?;
        }
        self.objects.commit()
    }

    /// Runs one frame of `delta` real seconds.
    ///
    /// # Errors
    ///
    /// Returns the first resource exhaustion or contract violation raised by
    /// a commit or component. The frame is abandoned at that point.
    pub fn step(&mut self, delta: f32) -> SimResult<()> {
        self.systems.time.update(delta);
        self.commit()?;
        self.systems.render.begin_frame();

        for phase in Phase::ALL {
            self.objects.update_phase(phase, &mut self.systems)?;
            if phase == Phase::CollisionDetection {
                self.resolve_collisions();
            }
        }

        self.frame += 1;
        tracing::trace!(
            frame = self.frame,
            game_time = self.systems.time.game_time(),
            active = self.objects.len(),
            "frame complete"
        );
        Ok(())
    }

    fn resolve_collisions(&mut self) {
        let Systems {
            collisions,
            time,
            channels,
            sound,
            recorder,
            ..
        } = &mut self.systems;
        let Some(registry) = collisions.as_mut() else {
            return;
        };
        let mut arbiter = ObjectArbiter {
            objects: self.objects.pool_mut(),
            time,
            channels,
            sound: sound.as_mut(),
            recorder,
        };
        let hits = registry.resolve(&mut arbiter);
        if hits > 0 {
            tracing::debug!(hits, frame = self.frame, "collisions resolved");
        }
    }

    /// Frames stepped so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seed the simulation was created with.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// The object manager.
    #[must_use]
    pub fn objects(&self) -> &ObjectManager {
        &self.objects
    }

    /// The object manager, mutably.
    pub fn objects_mut(&mut self) -> &mut ObjectManager {
        &mut self.objects
    }

    /// Shared systems.
    #[must_use]
    pub fn systems(&self) -> &Systems {
        &self.systems
    }

    /// Shared systems, mutably (input, sound, telemetry wiring).
    pub fn systems_mut(&mut self) -> &mut Systems {
        &mut self.systems
    }
}
