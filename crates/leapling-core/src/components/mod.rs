//! Built-in object components.
//!
//! Each component is a small behaviour bound to one [`Phase`]:
//!
//! | component | phase | needs |
//! |-----------|-------|-------|
//! | [`PlayerControlComponent`] | Think | velocity, action, touch, life |
//! | [`PatrolComponent`] | Think | velocity, action, touch, life |
//! | [`MovementComponent`] | Movement | velocity |
//! | [`PhysicsComponent`] | Physics | velocity, touch |
//! | [`SimpleCollisionComponent`] | `CollisionDetection` | touch |
//! | [`DynamicCollisionComponent`] | `CollisionDetection` | hit reaction |
//! | [`InventoryComponent`] | `FrameEnd` | inventory |
//! | [`LifetimeComponent`] | `FrameEnd` | life |
//! | [`AnimationComponent`] | Animation | action |
//! | [`RenderComponent`] | Draw | position |
//! | [`ScriptComponent`] | any | declared per script |
//!
//! The set is closed: [`Component`] is an enum over every built-in behaviour,
//! so objects store their components inline and dispatch without boxing.
//! Custom per-level behaviour goes through [`ScriptComponent`].

mod animation;
mod dynamic_collision;
mod inventory;
mod lifetime;
mod movement;
mod patrol;
mod physics;
mod player_control;
mod render;
mod script;
mod simple_collision;

pub use animation::{AnimationComponent, AnimationMap};
pub use dynamic_collision::DynamicCollisionComponent;
pub use inventory::InventoryComponent;
pub use lifetime::LifetimeComponent;
pub use movement::MovementComponent;
pub use patrol::PatrolComponent;
pub use physics::PhysicsComponent;
pub use player_control::PlayerControlComponent;
pub use render::RenderComponent;
pub use script::{ScriptComponent, ScriptFn};
pub use simple_collision::SimpleCollisionComponent;

use crate::error::SimResult;
use crate::object::{Capabilities, ObjectHandle, ObjectState};
use crate::phase::{Phase, Phased};
use crate::systems::Systems;

/// Static description of a component: its name, phase and the object state
/// it needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDeclaration {
    /// Stable name used in errors and traces.
    pub name: &'static str,
    /// Phase the component runs in.
    pub phase: Phase,
    /// Capabilities the owning object must provide.
    pub requires: Capabilities,
}

/// Everything a component may touch besides its own object.
pub struct UpdateContext<'a> {
    /// Game-time delta of this frame (0 while frozen).
    pub dt: f32,
    /// Handle of the object being updated.
    pub handle: ObjectHandle,
    /// Shared systems.
    pub systems: &'a mut Systems,
}

impl UpdateContext<'_> {
    /// Current game time.
    #[must_use]
    pub fn now(&self) -> f32 {
        self.systems.time.game_time()
    }
}

/// Behaviour contract shared by every component.
pub trait Behavior {
    /// Returns the component's declaration.
    fn declaration(&self) -> ComponentDeclaration;

    /// Advances the component by one frame.
    ///
    /// # Errors
    ///
    /// Returns an error only for resource exhaustion or contract violations.
    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()>;
}

/// Any built-in component.
#[derive(Debug, Clone)]
pub enum Component {
    /// Player input.
    PlayerControl(PlayerControlComponent),
    /// Enemy walk cycle.
    Patrol(PatrolComponent),
    /// Velocity integration.
    Movement(MovementComponent),
    /// Gravity and bounce.
    Physics(PhysicsComponent),
    /// Background ray cast.
    SimpleCollision(SimpleCollisionComponent),
    /// Dynamic volume registration.
    DynamicCollision(DynamicCollisionComponent),
    /// Inventory flush.
    Inventory(InventoryComponent),
    /// Death and expiry.
    Lifetime(LifetimeComponent),
    /// Clip selection.
    Animation(AnimationComponent),
    /// Draw scheduling.
    Render(RenderComponent),
    /// Level-specific hook.
    Script(ScriptComponent),
}

macro_rules! dispatch {
    ($component:expr, $inner:ident => $body:expr) => {
        match $component {
            Component::PlayerControl($inner) => $body,
            Component::Patrol($inner) => $body,
            Component::Movement($inner) => $body,
            Component::Physics($inner) => $body,
            Component::SimpleCollision($inner) => $body,
            Component::DynamicCollision($inner) => $body,
            Component::Inventory($inner) => $body,
            Component::Lifetime($inner) => $body,
            Component::Animation($inner) => $body,
            Component::Render($inner) => $body,
            Component::Script($inner) => $body,
        }
    };
}

macro_rules! component_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(component: $ty) -> Self {
                    Component::$variant(component)
                }
            }
        )*
    };
}

component_from!(
    PlayerControl(PlayerControlComponent),
    Patrol(PatrolComponent),
    Movement(MovementComponent),
    Physics(PhysicsComponent),
    SimpleCollision(SimpleCollisionComponent),
    DynamicCollision(DynamicCollisionComponent),
    Inventory(InventoryComponent),
    Lifetime(LifetimeComponent),
    Animation(AnimationComponent),
    Render(RenderComponent),
    Script(ScriptComponent),
);

impl Behavior for Component {
    fn declaration(&self) -> ComponentDeclaration {
        dispatch!(self, inner => inner.declaration())
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        dispatch!(self, inner => inner.update(state, ctx))
    }
}

impl Phased for Component {
    fn phase(&self) -> Phase {
        self.declaration().phase
    }
}

impl Component {
    /// Component name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.declaration().name
    }
}

/// Runs one update of `component` against `systems` with a throwaway handle.
#[cfg(test)]
pub(crate) fn run_once<B: Behavior>(
    component: &mut B,
    state: &mut ObjectState,
    systems: &mut Systems,
) -> SimResult<()> {
    let mut pool: stash::ObjectPool<u8> = stash::ObjectPool::with_default(1);
    let mut ctx = UpdateContext {
        dt: systems.time.frame_delta(),
        handle: pool.allocate()?,
        systems,
    };
    component.update(state, &mut ctx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::SpriteId;

    #[test]
    fn every_builtin_declares_the_documented_phase() {
        let cases: Vec<(Component, Phase)> = vec![
            (PlayerControlComponent::default().into(), Phase::Think),
            (PatrolComponent::default().into(), Phase::Think),
            (MovementComponent.into(), Phase::Movement),
            (PhysicsComponent::default().into(), Phase::Physics),
            (SimpleCollisionComponent::default().into(), Phase::CollisionDetection),
            (DynamicCollisionComponent::default().into(), Phase::CollisionDetection),
            (InventoryComponent::default().into(), Phase::FrameEnd),
            (LifetimeComponent::default().into(), Phase::FrameEnd),
            (AnimationComponent::default().into(), Phase::Animation),
            (RenderComponent::new(SpriteId(0), 0).into(), Phase::Draw),
        ];
        for (component, phase) in cases {
            assert_eq!(component.phase(), phase, "{}", component.name());
        }
    }

    #[test]
    fn declared_names_are_unique() {
        let names = [
            Component::from(PlayerControlComponent::default()).name(),
            Component::from(PatrolComponent::default()).name(),
            Component::from(MovementComponent).name(),
            Component::from(PhysicsComponent::default()).name(),
            Component::from(SimpleCollisionComponent::default()).name(),
            Component::from(DynamicCollisionComponent::default()).name(),
            Component::from(InventoryComponent::default()).name(),
            Component::from(LifetimeComponent::default()).name(),
            Component::from(AnimationComponent::default()).name(),
            Component::from(RenderComponent::new(SpriteId(0), 0)).name(),
        ];
        let mut sorted = names.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted.len(), names.len());
    }
}
