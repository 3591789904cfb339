//! Shared systems handed to every component update.
//!
//! [`Systems`] replaces process-wide singletons: the simulation owns exactly
//! one, and components reach it through their
//! [`UpdateContext`](crate::components::UpdateContext). Optional collaborators
//! (collision registry, world geometry, sound) are `Option`s; components skip
//! the work that needs a missing one.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::channel::ChannelSystem;
use crate::collision::{CollisionRegistry, WorldGeometry};
use crate::config::SimConfig;
use crate::input::InputSystem;
use crate::object::LifecycleQueue;
use crate::render::RenderQueue;
use crate::sound::SoundSystem;
use crate::telemetry::EventRecorder;
use crate::time::TimeSystem;

/// Container of every system a component may use.
pub struct Systems {
    /// Capacities and tuning.
    pub config: SimConfig,
    /// Game and real clocks.
    pub time: TimeSystem,
    /// Input snapshot.
    pub input: InputSystem,
    /// Named value channels.
    pub channels: ChannelSystem,
    /// Draw commands for this frame.
    pub render: RenderQueue,
    /// Dynamic collision registry.
    pub collisions: Option<CollisionRegistry>,
    /// Static level geometry.
    pub world: Option<Box<dyn WorldGeometry>>,
    /// Sound playback.
    pub sound: Option<Box<dyn SoundSystem>>,
    /// Mid-frame spawn and despawn requests.
    pub lifecycle: LifecycleQueue,
    /// Event counters and telemetry hand-off.
    pub recorder: EventRecorder,
    /// Deterministic randomness for AI.
    pub rng: ChaCha8Rng,
}

impl Systems {
    /// Builds every system sized by `config`, seeding the RNG with `seed`.
    ///
    /// The collision registry is installed; world geometry and sound are not.
    #[must_use]
    pub fn new(config: SimConfig, seed: u64) -> Self {
        Self {
            time: TimeSystem::new(),
            input: InputSystem::new(),
            channels: ChannelSystem::new(),
            render: RenderQueue::new(config.render_capacity, config.overflow_policy),
            collisions: Some(CollisionRegistry::new(
                config.collision_capacity,
                config.overflow_policy,
            )),
            world: None,
            sound: None,
            lifecycle: LifecycleQueue::new(config.pending_capacity),
            recorder: EventRecorder::new(),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
        }
    }
}

impl std::fmt::Debug for Systems {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Systems")
            .field("time", &self.time)
            .field("channels", &self.channels.len())
            .field("render", &self.render.len())
            .field("collisions", &self.collisions.is_some())
            .field("world", &self.world.is_some())
            .field("sound", &self.sound.is_some())
            .finish_non_exhaustive()
    }
}
