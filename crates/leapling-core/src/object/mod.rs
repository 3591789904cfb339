//! Game objects and their shared state.
//!
//! A [`GameObject`] is a bag of [`ObjectState`] plus a phase-sorted list of
//! [`Component`]s. Components hold behaviour and per-component settings; the
//! object state holds everything components share (position, velocity, life,
//! touch timestamps, inventory).
//!
//! # Capabilities
//!
//! Each object declares which parts of its state are meaningful through a
//! [`Capabilities`] set, and each component declares which capabilities it
//! needs. Attaching a component the object cannot serve fails with
//! [`SimError::MissingCapabilities`] instead of surfacing as a bad downcast
//! mid-frame.
//!
//! Objects live in an [`ObjectPool`](stash::ObjectPool) owned by the
//! [`ObjectManager`]. Releasing one runs [`Poolable::reset`], which clears the
//! state and drops its components so the instance is ready for reuse.

pub mod factory;
pub mod hit_reaction;
pub mod manager;

use bitflags::bitflags;
use glam::Vec2;
use serde::{Deserialize, Serialize};
use stash::{PoolHandle, Poolable};

use crate::collision::Flip;
use crate::components::{Behavior, Component, UpdateContext};
use crate::error::{SimError, SimResult};
use crate::phase::{Phase, PhaseScheduler};
use crate::render::ClipIndex;
use crate::systems::Systems;

pub use factory::{LevelData, ObjectFactory, SolidBox, SpawnParams, SpawnRecord};
pub use hit_reaction::{apply_hit, HitOutcome, HitReaction, ObjectArbiter};
pub use manager::{LifecycleQueue, ObjectManager};

/// Handle to a pooled game object.
pub type ObjectHandle = PoolHandle;

bitflags! {
    /// Parts of [`ObjectState`] an object actually uses.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct Capabilities: u16 {
        /// Position and size.
        const POSITION = 1 << 0;
        /// Velocity, target velocity and acceleration.
        const VELOCITY = 1 << 1;
        /// Current action (idle, move, attack, ...).
        const ACTION = 1 << 2;
        /// Hit points.
        const LIFE = 1 << 3;
        /// Background collision normal and touch timestamps.
        const TOUCH = 1 << 4;
        /// Collected items.
        const INVENTORY = 1 << 5;
        /// Reaction to dynamic-collision hits.
        const HIT_REACTION = 1 << 6;
    }
}

bitflags! {
    /// Transient object status bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ObjectFlags: u8 {
        /// Controlled by another object.
        const POSSESSED = 1 << 0;
        /// Removal has been requested; the object leaves at the next commit.
        const REMOVAL_PENDING = 1 << 1;
    }
}

/// What an object is currently doing. Drives animation selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// No action assigned.
    Invalid,
    /// Standing still.
    #[default]
    Idle,
    /// Walking or flying.
    Move,
    /// Attacking.
    Attack,
    /// Recoiling from a hit.
    HitReact,
    /// Dying.
    Death,
    /// Out of sight, e.g. behind scenery.
    Hide,
    /// Held in place by a script; input is ignored.
    Frozen,
}

impl ActionType {
    /// Number of actions.
    pub const COUNT: usize = 8;

    /// Dense index for lookup tables.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Archetype an object was spawned from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Scenery with no behaviour.
    #[default]
    Prop,
    /// The player character.
    Player,
    /// Enemy walking back and forth.
    Patroller,
    /// Collectible.
    Coin,
    /// Pressable switch.
    Button,
    /// Launches whatever lands on it.
    Spring,
    /// Short-lived damaging shot.
    Projectile,
    /// Floats around and possesses what it touches.
    Ghost,
}

/// An item an object carries or can be collected as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pickup {
    /// Currency.
    Coin,
    /// Opens doors.
    Key,
    /// Rare collectible.
    Gem,
}

/// Items collected by an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Coins held.
    pub coins: u32,
    /// Keys held.
    pub keys: u32,
    /// Gems held.
    pub gems: u32,
    #[serde(skip)]
    dirty: bool,
}

impl Inventory {
    /// Adds one item.
    pub fn add(&mut self, pickup: Pickup) {
        match pickup {
            Pickup::Coin => self.coins += 1,
            Pickup::Key => self.keys += 1,
            Pickup::Gem => self.gems += 1,
        }
        self.dirty = true;
    }

    /// Returns `true` once after any change.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

/// Surface an object can touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Below.
    Ground,
    /// Above.
    Ceiling,
    /// To the left.
    LeftWall,
    /// To the right.
    RightWall,
}

/// Game time each surface was last touched.
///
/// A surface counts as touched for a short decay window afterwards so that a
/// player one frame off a ledge can still jump.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TouchState {
    last_touch: [Option<f32>; 4],
}

impl TouchState {
    /// Records a touch of `surface` at `time`.
    pub fn touch(&mut self, surface: Surface, time: f32) {
        self.last_touch[surface as usize] = Some(time);
    }

    /// Records the surfaces implied by a collision `normal`.
    pub fn touch_normal(&mut self, normal: Vec2, time: f32) {
        if normal.y > 0.0 {
            self.touch(Surface::Ground, time);
        } else if normal.y < 0.0 {
            self.touch(Surface::Ceiling, time);
        }
        if normal.x > 0.0 {
            self.touch(Surface::LeftWall, time);
        } else if normal.x < 0.0 {
            self.touch(Surface::RightWall, time);
        }
    }

    /// Returns `true` if `surface` was touched within `decay` seconds of `now`.
    #[must_use]
    pub fn touching(&self, surface: Surface, now: f32, decay: f32) -> bool {
        self.last_touch[surface as usize].is_some_and(|time| now - time <= decay)
    }

    /// Game time `surface` was last touched.
    #[must_use]
    pub fn last_touch(&self, surface: Surface) -> Option<f32> {
        self.last_touch[surface as usize]
    }
}

/// State shared by an object's components.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectState {
    /// Archetype.
    pub kind: ObjectKind,
    /// Level record this object was spawned from.
    pub spawn_id: Option<u32>,
    /// State parts in use.
    pub capabilities: Capabilities,
    /// Status bits.
    pub flags: ObjectFlags,
    /// Bottom-left corner.
    pub position: Vec2,
    /// Width and height.
    pub size: Vec2,
    /// Units per second.
    pub velocity: Vec2,
    /// Velocity the movement component steers toward.
    pub target_velocity: Vec2,
    /// Per-axis steering rate toward the target velocity. Zero leaves the
    /// axis alone.
    pub acceleration: Vec2,
    /// `1.0` facing right, `-1.0` facing left.
    pub facing: f32,
    /// Current action.
    pub action: ActionType,
    /// Hit points. The object is dead at zero or below.
    pub life: i32,
    /// Touch timestamps.
    pub touch: TouchState,
    /// Normal of the last background collision, zero if none this frame.
    pub collision_normal: Vec2,
    /// Collected items.
    pub inventory: Inventory,
    /// What collecting this object yields.
    pub pickup: Option<Pickup>,
    /// Dynamic-collision reaction settings.
    pub hit_reaction: Option<HitReaction>,
    /// Object in control of this one.
    pub possessed_by: Option<ObjectHandle>,
    /// Selected animation clip.
    pub clip: Option<ClipIndex>,
    /// Seconds the current clip has been playing.
    pub clip_time: f32,
}

impl Default for ObjectState {
    fn default() -> Self {
        Self {
            kind: ObjectKind::Prop,
            spawn_id: None,
            capabilities: Capabilities::POSITION,
            flags: ObjectFlags::empty(),
            position: Vec2::ZERO,
            size: Vec2::ZERO,
            velocity: Vec2::ZERO,
            target_velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            facing: 1.0,
            action: ActionType::Idle,
            life: 1,
            touch: TouchState::default(),
            collision_normal: Vec2::ZERO,
            inventory: Inventory::default(),
            pickup: None,
            hit_reaction: None,
            possessed_by: None,
            clip: None,
            clip_time: 0.0,
        }
    }
}

impl ObjectState {
    /// Center of the object box.
    #[must_use]
    pub fn center(&self) -> Vec2 {
        self.position + self.size * 0.5
    }

    /// Mirroring implied by the facing direction.
    #[must_use]
    pub fn flip(&self) -> Flip {
        Flip {
            horizontal: self.facing < 0.0,
            vertical: false,
        }
    }

    /// Returns `true` while life is positive.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.life > 0
    }
}

/// A pooled simulation entity.
#[derive(Debug, Clone)]
pub struct GameObject {
    /// Shared state.
    pub state: ObjectState,
    components: PhaseScheduler<Component>,
}

impl GameObject {
    /// Creates an empty object able to hold `component_capacity` components.
    #[must_use]
    pub fn new(component_capacity: usize) -> Self {
        Self {
            state: ObjectState::default(),
            components: PhaseScheduler::new(component_capacity),
        }
    }

    /// Attaches a component. It runs from the next commit onward.
    ///
    /// # Errors
    ///
    /// - [`SimError::MissingCapabilities`] if the object lacks state the
    ///   component needs.
    /// - [`SimError::ResourceExhaustion`] if the object's component list is full.
    pub fn add_component(&mut self, component: impl Into<Component>) -> SimResult<()> {
        let component = component.into();
        let declaration = component.declaration();
        let missing = declaration.requires - self.state.capabilities;
        if !missing.is_empty() {
            return Err(SimError::MissingCapabilities {
                component: declaration.name,
                missing,
            });
        }
        self.components
            .add(component)
            .map_err(SimError::exhausted("component list"))
    }

    /// Activates pending components.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the merge overflows.
    pub fn commit_components(&mut self) -> SimResult<bool> {
        self.components
            .commit()
            .map_err(SimError::exhausted("component list"))
    }

    /// Runs every active component in `phase`, in insertion order.
    ///
    /// # Errors
    ///
    /// Propagates the first component error.
    pub fn update_phase(
        &mut self,
        phase: Phase,
        handle: ObjectHandle,
        systems: &mut Systems,
    ) -> SimResult<()> {
        let components = self.components.phase_slice_mut(phase);
        if components.is_empty() {
            return Ok(());
        }
        let mut ctx = UpdateContext {
            dt: systems.time.frame_delta(),
            handle,
            systems,
        };
        for component in components {
            component.update(&mut self.state, &mut ctx)?;
        }
        Ok(())
    }

    /// First active (or pending) component in `phase`.
    #[must_use]
    pub fn find_component(&self, phase: Phase) -> Option<&Component> {
        self.components.find(phase)
    }

    /// Active components in phase order.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.iter()
    }

    /// Mutable access to the active components.
    pub fn components_mut(&mut self) -> impl Iterator<Item = &mut Component> {
        self.components.iter_mut()
    }

    /// Number of active components.
    #[must_use]
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl Poolable for GameObject {
    fn reset(&mut self) {
        self.state = ObjectState::default();
        self.components.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{MovementComponent, RenderComponent};
    use crate::render::SpriteId;

    #[test]
    fn components_requiring_absent_state_are_rejected() {
        let mut object = GameObject::new(4);
        let err = object.add_component(MovementComponent).unwrap_err();
        match err {
            SimError::MissingCapabilities { component, missing } => {
                assert_eq!(component, "movement");
                assert_eq!(missing, Capabilities::VELOCITY);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn component_list_capacity_is_enforced() {
        let mut object = GameObject::new(1);
        object.add_component(RenderComponent::new(SpriteId(0), 0)).unwrap();
        let err = object
            .add_component(RenderComponent::new(SpriteId(1), 0))
            .unwrap_err();
        assert!(err.is_resource_exhaustion());
    }

    #[test]
    fn reset_returns_object_to_blank_state() {
        let mut object = GameObject::new(4);
        object.state.capabilities |= Capabilities::VELOCITY;
        object.state.life = 7;
        object.add_component(MovementComponent).unwrap();
        object.commit_components().unwrap();

        object.reset();
        assert_eq!(object.state, ObjectState::default());
        assert_eq!(object.component_count(), 0);
        assert!(object.find_component(Phase::Movement).is_none());
    }

    #[test]
    fn touch_state_decays() {
        let mut touch = TouchState::default();
        touch.touch_normal(Vec2::Y, 1.0);
        assert!(touch.touching(Surface::Ground, 1.2, 0.3));
        assert!(!touch.touching(Surface::Ground, 1.5, 0.3));
        assert!(!touch.touching(Surface::Ceiling, 1.0, 0.3));
    }

    #[test]
    fn inventory_dirty_flag_is_taken_once() {
        let mut inventory = Inventory::default();
        inventory.add(Pickup::Coin);
        inventory.add(Pickup::Coin);
        assert_eq!(inventory.coins, 2);
        assert!(inventory.take_dirty());
        assert!(!inventory.take_dirty());
    }
}
