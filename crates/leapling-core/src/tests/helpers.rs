//! Test helper functions for setting up simulations and objects.

use std::cell::RefCell;
use std::sync::Arc;

use glam::Vec2;
use parking_lot::Mutex;

use crate::collision::{CollisionVolume, HitType};
use crate::components::{DynamicCollisionComponent, ScriptComponent, UpdateContext};
use crate::config::SimConfig;
use crate::error::SimResult;
use crate::object::{Capabilities, HitReaction, LevelData, ObjectHandle, ObjectKind, ObjectState};
use crate::simulation::Simulation;
use crate::sound::{SoundHandle, SoundSystem, StreamId};

/// Frame length used by every scenario.
pub const DT: f32 = 1.0 / 60.0;

// =============================================================================
// Scenario Setup
// =============================================================================

/// A simulation with default capacities.
pub fn simulation(seed: u64) -> Simulation {
    Simulation::new(SimConfig::default(), seed)
}

/// Steps `sim` for `frames` frames of [`DT`].
pub fn run_frames(sim: &mut Simulation, frames: usize) {
    for _ in 0..frames {
        sim.step(DT).unwrap();
    }
}

/// A level with a wide floor whose top is at `y = 0`, one player at the
/// origin and patrollers spread out to the right.
pub fn patrol_level(patrollers: u32) -> LevelData {
    let mut records = vec![serde_json::json!({
        "id": 0, "kind": "player", "position": [0.0, 0.0]
    })];
    for id in 1..=patrollers {
        let x = 300.0 + 120.0 * id as f32;
        let facing = if id % 2 == 0 { 1.0 } else { -1.0 };
        records.push(serde_json::json!({
            "id": id,
            "kind": "patroller",
            "position": [x, 0.0],
            "params": { "facing": facing }
        }));
    }
    let json = serde_json::json!({
        "name": "patrol",
        "records": records,
        "solids": [ { "min": [-4000.0, -32.0], "max": [4000.0, 0.0] } ]
    });
    LevelData::from_json(&json.to_string()).unwrap()
}

/// Adds a bare object carrying only a dynamic collision component and a hit
/// reaction. It has 3 life and is 32 units square.
pub fn spawn_dummy(
    sim: &mut Simulation,
    position: Vec2,
    attack: Vec<CollisionVolume>,
    vulnerability: Vec<CollisionVolume>,
    reaction: HitReaction,
) -> ObjectHandle {
    let objects = sim.objects_mut();
    let handle = objects.allocate().unwrap();
    let object = objects.get_mut(handle).unwrap();
    object.state.kind = ObjectKind::Prop;
    object.state.capabilities =
        Capabilities::POSITION | Capabilities::LIFE | Capabilities::HIT_REACTION;
    object.state.position = position;
    object.state.size = Vec2::splat(32.0);
    object.state.life = 3;
    object.state.hit_reaction = Some(reaction);
    object
        .add_component(DynamicCollisionComponent::new(
            Arc::from(attack),
            Arc::from(vulnerability),
        ))
        .unwrap();
    objects.add(handle).unwrap();
    handle
}

/// A 32x32 box dealing `hit`.
pub fn attack_box(hit: HitType) -> Vec<CollisionVolume> {
    vec![CollisionVolume::aabox(Vec2::ZERO, Vec2::splat(32.0), hit)]
}

/// A 32x32 box vulnerable to everything.
pub fn vulnerable_box() -> Vec<CollisionVolume> {
    vec![CollisionVolume::aabox(
        Vec2::ZERO,
        Vec2::splat(32.0),
        HitType::Invalid,
    )]
}

/// Adds an object running only the given scripts.
pub fn spawn_scripted(sim: &mut Simulation, scripts: &[ScriptComponent]) -> ObjectHandle {
    let objects = sim.objects_mut();
    let handle = objects.allocate().unwrap();
    let object = objects.get_mut(handle).unwrap();
    for script in scripts {
        object.add_component(*script).unwrap();
    }
    objects.add(handle).unwrap();
    handle
}

// =============================================================================
// Phase Trace
// =============================================================================

thread_local! {
    static TRACE: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
}

/// Script hook appending `TAG` to this thread's trace.
#[allow(clippy::unnecessary_wraps)]
pub fn traced<const TAG: u32>(_state: &mut ObjectState, _ctx: &mut UpdateContext<'_>) -> SimResult<()> {
    TRACE.with(|trace| trace.borrow_mut().push(TAG));
    Ok(())
}

/// Takes and clears this thread's trace.
pub fn take_trace() -> Vec<u32> {
    TRACE.with(|trace| std::mem::take(&mut *trace.borrow_mut()))
}

// =============================================================================
// Sound
// =============================================================================

/// Sound system remembering every request.
#[derive(Debug, Clone, Default)]
pub struct RecordingSound {
    /// Sounds played, in order.
    pub played: Arc<Mutex<Vec<SoundHandle>>>,
}

impl SoundSystem for RecordingSound {
    fn play(&mut self, sound: SoundHandle, _looped: bool, _priority: u8) -> Option<StreamId> {
        let mut played = self.played.lock();
        played.push(sound);
        u32::try_from(played.len()).ok().map(StreamId)
    }
}
