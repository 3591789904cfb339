//! Gravity, bounce and ground friction.

use glam::Vec2;

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::math;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Applies gravity and responds to the last background collision.
///
/// Velocity into the collision normal is removed (or reflected, scaled by
/// `bounciness`). On ground contact horizontal speed decays by `friction`
/// unless the object is steering.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsComponent {
    /// Vertical acceleration, negative pulls down. `None` uses the configured
    /// default.
    pub gravity: Option<f32>,
    /// Fraction of impact speed returned along the normal.
    pub bounciness: f32,
    /// Horizontal deceleration on the ground (units/s²).
    pub friction: f32,
}

impl Default for PhysicsComponent {
    fn default() -> Self {
        Self {
            gravity: None,
            bounciness: 0.0,
            friction: 600.0,
        }
    }
}

impl PhysicsComponent {
    /// Physics with a fixed gravity, ignoring the configured default.
    #[must_use]
    pub fn with_gravity(gravity: f32) -> Self {
        Self {
            gravity: Some(gravity),
            ..Self::default()
        }
    }
}

impl Behavior for PhysicsComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "physics",
            phase: Phase::Physics,
            requires: Capabilities::VELOCITY | Capabilities::TOUCH,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        let dt = ctx.dt;
        let gravity = self.gravity.unwrap_or(ctx.systems.config.gravity);
        state.velocity.y += gravity * dt;

        let normal = state.collision_normal.normalize_or_zero();
        if normal == Vec2::ZERO {
            return Ok(());
        }
        let into_surface = state.velocity.dot(normal);
        if into_surface < 0.0 {
            state.velocity -= normal * into_surface * (1.0 + self.bounciness);
        }
        if normal.y > 0.0 && state.acceleration.x <= 0.0 {
            state.velocity.x = math::approach(state.velocity.x, 0.0, self.friction * dt);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::run_once;
    use crate::config::SimConfig;
    use crate::systems::Systems;

    fn systems(delta: f32) -> Systems {
        let mut systems = Systems::new(SimConfig::default(), 0);
        systems.time.update(delta);
        systems
    }

    #[test]
    fn gravity_defaults_to_config() {
        let mut systems = systems(0.5);
        let mut state = ObjectState::default();
        run_once(&mut PhysicsComponent::default(), &mut state, &mut systems).unwrap();
        assert_eq!(state.velocity.y, -200.0);
    }

    #[test]
    fn landing_cancels_or_reflects_normal_speed() {
        let mut systems = systems(0.1);
        let falling = ObjectState {
            velocity: Vec2::new(0.0, -50.0),
            collision_normal: Vec2::Y,
            ..ObjectState::default()
        };

        let mut dead = falling.clone();
        run_once(&mut PhysicsComponent::with_gravity(0.0), &mut dead, &mut systems).unwrap();
        assert_eq!(dead.velocity.y, 0.0);

        let mut bouncy = falling;
        let mut ball = PhysicsComponent {
            bounciness: 0.5,
            ..PhysicsComponent::with_gravity(0.0)
        };
        run_once(&mut ball, &mut bouncy, &mut systems).unwrap();
        assert_eq!(bouncy.velocity.y, 25.0);
    }

    #[test]
    fn ground_friction_stops_coasting() {
        let mut systems = systems(0.1);
        let mut state = ObjectState {
            velocity: Vec2::new(30.0, 0.0),
            collision_normal: Vec2::Y,
            ..ObjectState::default()
        };
        run_once(&mut PhysicsComponent::with_gravity(0.0), &mut state, &mut systems).unwrap();
        assert_eq!(state.velocity.x, 0.0);
    }
}
