//! Player input to movement intent.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::input::keys;
use crate::math;
use crate::object::{ActionType, Capabilities, ObjectState, Surface};
use crate::phase::Phase;

/// Turns held buttons and the movement axis into target velocity, facing and
/// jumps.
///
/// Jumping needs a *triggered* jump button and ground touched within the
/// surface decay window, so a held button jumps once and a player who just
/// ran off a ledge can still jump.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerControlComponent {
    /// Horizontal speed at full input.
    pub run_speed: f32,
    /// Horizontal steering rate (units/s²).
    pub run_acceleration: f32,
    /// Vertical velocity set by a jump.
    pub jump_impulse: f32,
    /// Button code moving left.
    pub left_button: usize,
    /// Button code moving right.
    pub right_button: usize,
    /// Button code jumping.
    pub jump_button: usize,
}

impl Default for PlayerControlComponent {
    fn default() -> Self {
        Self {
            run_speed: 160.0,
            run_acceleration: 900.0,
            jump_impulse: 330.0,
            left_button: keys::LEFT,
            right_button: keys::RIGHT,
            jump_button: keys::JUMP,
        }
    }
}

impl PlayerControlComponent {
    fn horizontal_input(&self, ctx: &UpdateContext<'_>) -> f32 {
        let input = &ctx.systems.input;
        let mut axis = input.axis().x;
        if input.is_pressed(self.left_button) {
            axis -= 1.0;
        }
        if input.is_pressed(self.right_button) {
            axis += 1.0;
        }
        axis.clamp(-1.0, 1.0)
    }
}

impl Behavior for PlayerControlComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "player_control",
            phase: Phase::Think,
            requires: Capabilities::VELOCITY
                | Capabilities::ACTION
                | Capabilities::TOUCH
                | Capabilities::LIFE,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if !state.is_alive() || state.action == ActionType::Frozen {
            state.target_velocity.x = 0.0;
            return Ok(());
        }

        let axis = self.horizontal_input(ctx);
        state.target_velocity.x = axis * self.run_speed;
        state.acceleration.x = self.run_acceleration;
        if axis != 0.0 {
            state.facing = math::sign(axis);
        }

        let now = ctx.now();
        let time = &ctx.systems.time;
        let grounded = state
            .touch
            .touching(Surface::Ground, now, ctx.systems.config.surface_decay);
        let jump = ctx.systems.input.is_triggered(
            self.jump_button,
            time.real_time(),
            time.real_frame_delta(),
        );
        if jump && grounded {
            state.velocity.y = self.jump_impulse;
            tracing::trace!(handle = %ctx.handle, "jump");
        }

        let recoiling = state
            .hit_reaction
            .as_ref()
            .is_some_and(|reaction| reaction.is_invulnerable(now));
        if !recoiling {
            state.action = if axis == 0.0 {
                ActionType::Idle
            } else {
                ActionType::Move
            };
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::HitType;
    use crate::components::run_once;
    use crate::config::SimConfig;
    use crate::object::HitReaction;
    use crate::systems::Systems;
    use glam::Vec2;

    fn player() -> ObjectState {
        ObjectState {
            capabilities: Capabilities::all(),
            ..ObjectState::default()
        }
    }

    fn run(systems: &mut Systems, state: &mut ObjectState) {
        run_once(&mut PlayerControlComponent::default(), state, systems).unwrap();
    }

    fn systems() -> Systems {
        let mut systems = Systems::new(SimConfig::default(), 0);
        systems.time.update(1.0 / 60.0);
        systems
    }

    #[test]
    fn held_direction_sets_target_and_facing() {
        let mut systems = systems();
        systems.input.press_button(keys::LEFT, 0.0);
        let mut state = player();
        run(&mut systems, &mut state);

        assert_eq!(state.target_velocity.x, -160.0);
        assert_eq!(state.facing, -1.0);
        assert_eq!(state.action, ActionType::Move);
    }

    #[test]
    fn jump_needs_recent_ground_contact() {
        let mut systems = systems();
        let now = systems.time.real_time();
        systems.input.press_button(keys::JUMP, now);

        let mut airborne = player();
        run(&mut systems, &mut airborne);
        assert_eq!(airborne.velocity, Vec2::ZERO);

        let mut grounded = player();
        grounded.touch.touch(Surface::Ground, systems.time.game_time());
        run(&mut systems, &mut grounded);
        assert_eq!(grounded.velocity.y, 330.0);
    }

    #[test]
    fn recoil_keeps_hit_reaction_action() {
        let mut systems = systems();
        let mut state = player();
        let mut reaction = HitReaction::new(1.0);
        reaction.record_hit(HitType::Hit, 0.0);
        state.hit_reaction = Some(reaction);
        state.action = ActionType::HitReact;
        run(&mut systems, &mut state);
        assert_eq!(state.action, ActionType::HitReact);
    }

    #[test]
    fn frozen_player_ignores_input() {
        let mut systems = systems();
        systems.input.press_button(keys::RIGHT, 0.0);
        let mut state = player();
        state.action = ActionType::Frozen;
        state.target_velocity.x = 50.0;
        run(&mut systems, &mut state);
        assert_eq!(state.target_velocity.x, 0.0);
        assert_eq!(state.action, ActionType::Frozen);
    }
}
