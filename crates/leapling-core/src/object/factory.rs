//! Level data and object archetypes.
//!
//! A level is a list of [`SpawnRecord`]s plus solid boxes for the background
//! geometry. The [`ObjectFactory`] turns a record into a configured object:
//! it sets the state, grants capabilities, and attaches the archetype's
//! components. Collision volume sets are built once per factory and shared by
//! every instance through `Arc`.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::{Capabilities, GameObject, HitReaction, ObjectHandle, ObjectKind, ObjectManager, Pickup};
use crate::collision::{CollisionVolume, HitType, SegmentWorld, VolumeSet};
use crate::components::{
    AnimationComponent, AnimationMap, DynamicCollisionComponent, InventoryComponent,
    LifetimeComponent, MovementComponent, PatrolComponent, PhysicsComponent,
    PlayerControlComponent, RenderComponent, SimpleCollisionComponent,
};
use crate::error::{SimError, SimResult};
use crate::object::ActionType;
use crate::render::{ClipIndex, SpriteId};
use crate::systems::Systems;

/// Channel receiving the player's coin count.
pub const COIN_CHANNEL: &str = "coins";
/// Channel set when any button is pressed.
pub const SWITCH_CHANNEL: &str = "switch";

/// Per-record overrides of archetype defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnParams {
    /// Initial facing, `-1.0` for left.
    pub facing: Option<f32>,
    /// Initial velocity.
    pub velocity: Option<Vec2>,
    /// Initial life.
    pub life: Option<i32>,
    /// Item yielded when collected.
    pub pickup: Option<Pickup>,
}

/// One object to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpawnRecord {
    /// Level-unique id.
    pub id: u32,
    /// Archetype.
    pub kind: ObjectKind,
    /// Bottom-left corner.
    pub position: Vec2,
    /// Overrides.
    #[serde(default)]
    pub params: SpawnParams,
}

impl SpawnRecord {
    /// A record with default parameters.
    #[must_use]
    pub fn new(id: u32, kind: ObjectKind, position: Vec2) -> Self {
        Self {
            id,
            kind,
            position,
            params: SpawnParams::default(),
        }
    }
}

/// A solid axis-aligned block of level geometry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidBox {
    /// Bottom-left corner.
    pub min: Vec2,
    /// Top-right corner.
    pub max: Vec2,
}

/// Parsed level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelData {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Objects to spawn, in order.
    #[serde(default)]
    pub records: Vec<SpawnRecord>,
    /// Background geometry.
    #[serde(default)]
    pub solids: Vec<SolidBox>,
}

impl LevelData {
    /// Parses a level from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Level`] if the JSON is malformed; the level does
    /// not start.
    pub fn from_json(json: &str) -> SimResult<Self> {
        serde_json::from_str(json).map_err(SimError::Level)
    }

    /// Builds the ray-cast geometry for the solids.
    #[must_use]
    pub fn world(&self) -> SegmentWorld {
        let mut world = SegmentWorld::new();
        for solid in &self.solids {
            world.add_box(solid.min, solid.max);
        }
        world
    }
}

/// Shared volume sets for one archetype.
#[derive(Debug, Clone)]
struct Volumes {
    attack: VolumeSet,
    vulnerability: VolumeSet,
}

impl Volumes {
    fn new(attack: Vec<CollisionVolume>, vulnerability: Vec<CollisionVolume>) -> Self {
        Self {
            attack: Arc::from(attack),
            vulnerability: Arc::from(vulnerability),
        }
    }

    fn component(&self) -> DynamicCollisionComponent {
        DynamicCollisionComponent::new(Arc::clone(&self.attack), Arc::clone(&self.vulnerability))
    }
}

/// Builds objects from spawn records.
#[derive(Debug, Clone)]
pub struct ObjectFactory {
    player: Volumes,
    patroller: Volumes,
    coin: Volumes,
    button: Volumes,
    spring: Volumes,
    projectile: Volumes,
    ghost: Volumes,
}

impl Default for ObjectFactory {
    fn default() -> Self {
        Self::new()
    }
}

fn walker_animation(base: u16) -> AnimationMap {
    AnimationMap::default()
        .with(ActionType::Idle, ClipIndex(base))
        .with(ActionType::Move, ClipIndex(base + 1))
        .with(ActionType::HitReact, ClipIndex(base + 2))
        .with(ActionType::Death, ClipIndex(base + 3))
}

impl ObjectFactory {
    /// Builds the shared volume sets of every archetype.
    #[must_use]
    pub fn new() -> Self {
        let body = |w: f32, h: f32, hit| CollisionVolume::aabox(Vec2::ZERO, Vec2::new(w, h), hit);
        Self {
            player: Volumes::new(
                vec![
                    // Feet stomp first, then the body picks things up.
                    CollisionVolume::aabox(Vec2::new(4.0, 0.0), Vec2::new(24.0, 6.0), HitType::Hit),
                    CollisionVolume::sphere(Vec2::new(16.0, 24.0), 20.0, HitType::Collect),
                    CollisionVolume::sphere(Vec2::new(16.0, 24.0), 20.0, HitType::Depress),
                ],
                vec![CollisionVolume::aabox(
                    Vec2::new(6.0, 8.0),
                    Vec2::new(20.0, 36.0),
                    HitType::Invalid,
                )],
            ),
            patroller: Volumes::new(
                vec![CollisionVolume::aabox(
                    Vec2::new(2.0, 4.0),
                    Vec2::new(28.0, 18.0),
                    HitType::Hit,
                )],
                vec![CollisionVolume::aabox(
                    Vec2::new(0.0, 22.0),
                    Vec2::new(32.0, 10.0),
                    HitType::Hit,
                )],
            ),
            coin: Volumes::new(
                Vec::new(),
                vec![CollisionVolume::sphere(Vec2::splat(8.0), 8.0, HitType::Collect)],
            ),
            button: Volumes::new(Vec::new(), vec![body(32.0, 8.0, HitType::Depress)]),
            spring: Volumes::new(vec![body(32.0, 16.0, HitType::Launch)], Vec::new()),
            projectile: Volumes::new(
                vec![CollisionVolume::sphere(Vec2::splat(4.0), 4.0, HitType::Hit)],
                Vec::new(),
            ),
            ghost: Volumes::new(
                vec![CollisionVolume::sphere(Vec2::splat(16.0), 14.0, HitType::Possess)],
                Vec::new(),
            ),
        }
    }

    /// Allocates, configures and queues an object for `record`.
    ///
    /// The object becomes active at the next commit. If configuration fails
    /// the object goes straight back to the pool.
    ///
    /// # Errors
    ///
    /// - [`SimError::ResourceExhaustion`] if the pool, pending list or a
    ///   component list is full.
    /// - [`SimError::MissingCapabilities`] if an archetype is misconfigured.
    pub fn spawn(
        &self,
        record: &SpawnRecord,
        objects: &mut ObjectManager,
        systems: &mut Systems,
    ) -> SimResult<ObjectHandle> {
        let handle = objects.allocate()?;
        let configured = match objects.get_mut(handle) {
            Some(object) => self.configure(object, record, systems),
            None => Err(SimError::StaleHandle(handle)),
        };
        if let Err(err) = configured.and_then(|()| objects.add(handle)) {
            objects.discard(handle)?;
            return Err(err);
        }
        tracing::trace!(%handle, kind = ?record.kind, id = record.id, "object spawned");
        Ok(handle)
    }

    fn configure(
        &self,
        object: &mut GameObject,
        record: &SpawnRecord,
        systems: &mut Systems,
    ) -> SimResult<()> {
        let state = &mut object.state;
        state.kind = record.kind;
        state.spawn_id = Some(record.id);
        state.position = record.position;
        state.capabilities = Capabilities::POSITION;

        match record.kind {
            ObjectKind::Prop => {
                state.size = Vec2::splat(32.0);
                object.add_component(RenderComponent::new(SpriteId(0), 0))?;
            }
            ObjectKind::Player => {
                state.size = Vec2::new(32.0, 48.0);
                state.life = 3;
                state.capabilities = Capabilities::all();
                state.hit_reaction = Some(HitReaction::new(1.0).with_freeze_on_hit(0.05));
                let coins = systems.channels.register(COIN_CHANNEL);
                object.add_component(PlayerControlComponent::default())?;
                object.add_component(MovementComponent)?;
                object.add_component(PhysicsComponent::default())?;
                object.add_component(SimpleCollisionComponent::default())?;
                object.add_component(self.player.component())?;
                object.add_component(InventoryComponent::new(coins))?;
                object.add_component(LifetimeComponent::new(1.0))?;
                object.add_component(AnimationComponent::new(walker_animation(0)))?;
                object.add_component(RenderComponent::new(SpriteId(1), 10))?;
            }
            ObjectKind::Patroller => {
                state.size = Vec2::new(32.0, 32.0);
                state.life = 1;
                state.capabilities = Capabilities::POSITION
                    | Capabilities::VELOCITY
                    | Capabilities::ACTION
                    | Capabilities::LIFE
                    | Capabilities::TOUCH
                    | Capabilities::HIT_REACTION;
                state.hit_reaction = Some(HitReaction::new(0.0));
                object.add_component(PatrolComponent::default())?;
                object.add_component(MovementComponent)?;
                object.add_component(PhysicsComponent::default())?;
                object.add_component(SimpleCollisionComponent::default())?;
                object.add_component(self.patroller.component())?;
                object.add_component(LifetimeComponent::new(0.5))?;
                object.add_component(AnimationComponent::new(walker_animation(4)))?;
                object.add_component(RenderComponent::new(SpriteId(2), 5))?;
            }
            ObjectKind::Coin => {
                state.size = Vec2::splat(16.0);
                state.capabilities |= Capabilities::LIFE | Capabilities::HIT_REACTION;
                state.pickup = Some(Pickup::Coin);
                state.hit_reaction = Some(HitReaction::default());
                object.add_component(self.coin.component())?;
                object.add_component(LifetimeComponent::new(0.0))?;
                object.add_component(RenderComponent::new(SpriteId(3), 1))?;
            }
            ObjectKind::Button => {
                state.size = Vec2::new(32.0, 8.0);
                state.capabilities |= Capabilities::HIT_REACTION;
                let switch = systems.channels.register(SWITCH_CHANNEL);
                state.hit_reaction = Some(HitReaction::default().with_depress_channel(switch));
                object.add_component(self.button.component())?;
                object.add_component(RenderComponent::new(SpriteId(4), 1))?;
            }
            ObjectKind::Spring => {
                state.size = Vec2::new(32.0, 16.0);
                state.capabilities |= Capabilities::HIT_REACTION;
                state.hit_reaction =
                    Some(HitReaction::default().with_launch_impulse(Vec2::new(0.0, 600.0)));
                object.add_component(self.spring.component())?;
                object.add_component(RenderComponent::new(SpriteId(5), 1))?;
            }
            ObjectKind::Projectile => {
                state.size = Vec2::splat(8.0);
                state.capabilities |= Capabilities::VELOCITY
                    | Capabilities::TOUCH
                    | Capabilities::LIFE
                    | Capabilities::HIT_REACTION;
                state.hit_reaction = Some(HitReaction::default());
                object.add_component(MovementComponent)?;
                object.add_component(PhysicsComponent {
                    bounciness: 0.5,
                    ..PhysicsComponent::with_gravity(0.0)
                })?;
                object.add_component(SimpleCollisionComponent::default())?;
                object.add_component(self.projectile.component())?;
                object.add_component(LifetimeComponent::new(0.0).with_time_to_live(2.0))?;
                object.add_component(RenderComponent::new(SpriteId(6), 8))?;
            }
            ObjectKind::Ghost => {
                state.size = Vec2::splat(32.0);
                state.capabilities |= Capabilities::VELOCITY | Capabilities::HIT_REACTION;
                state.hit_reaction = Some(HitReaction::default());
                object.add_component(MovementComponent)?;
                object.add_component(self.ghost.component())?;
                object.add_component(RenderComponent::new(SpriteId(7), 9))?;
            }
        }

        let state = &mut object.state;
        let params = &record.params;
        if let Some(facing) = params.facing {
            state.facing = if facing < 0.0 { -1.0 } else { 1.0 };
        }
        if let Some(velocity) = params.velocity {
            state.velocity = velocity;
        }
        if let Some(life) = params.life {
            state.life = life;
        }
        if let Some(pickup) = params.pickup {
            state.pickup = Some(pickup);
        }
        Ok(())
    }
}
