//! Enemy walk cycle.

use rand::Rng;

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{ActionType, Capabilities, ObjectState, Surface};
use crate::phase::Phase;

/// Walks in the facing direction, turning at walls and now and then at
/// random.
///
/// The random turns draw from the simulation's seeded generator, so a run is
/// reproducible from its seed.
#[derive(Debug, Clone, PartialEq)]
pub struct PatrolComponent {
    /// Walking speed.
    pub speed: f32,
    /// Steering rate toward walking speed.
    pub acceleration: f32,
    /// Expected random turns per second of game time.
    pub turn_rate: f32,
}

impl Default for PatrolComponent {
    fn default() -> Self {
        Self {
            speed: 60.0,
            acceleration: 400.0,
            turn_rate: 0.2,
        }
    }
}

impl Behavior for PatrolComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "patrol",
            phase: Phase::Think,
            requires: Capabilities::VELOCITY
                | Capabilities::ACTION
                | Capabilities::TOUCH
                | Capabilities::LIFE,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if !state.is_alive() {
            state.target_velocity.x = 0.0;
            return Ok(());
        }

        let now = ctx.now();
        let decay = ctx.systems.config.surface_decay;
        if state.facing < 0.0 && state.touch.touching(Surface::LeftWall, now, decay) {
            state.facing = 1.0;
        } else if state.facing > 0.0 && state.touch.touching(Surface::RightWall, now, decay) {
            state.facing = -1.0;
        } else if ctx.dt > 0.0 && ctx.systems.rng.gen::<f32>() < self.turn_rate * ctx.dt {
            state.facing = -state.facing;
        }

        state.target_velocity.x = state.facing * self.speed;
        state.acceleration.x = self.acceleration;
        let recoiling = state
            .hit_reaction
            .as_ref()
            .is_some_and(|reaction| reaction.is_invulnerable(now));
        if !recoiling {
            state.action = ActionType::Move;
        }
        Ok(())
    }
}
