//! Velocity integration.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::math;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Steers velocity toward the target velocity, then moves the object.
///
/// Each axis is steered only while its acceleration is positive, leaving the
/// other axis to physics (gravity, launches).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementComponent;

impl Behavior for MovementComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "movement",
            phase: Phase::Movement,
            requires: Capabilities::VELOCITY,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        let dt = ctx.dt;
        if state.acceleration.x > 0.0 {
            state.velocity.x = math::approach(
                state.velocity.x,
                state.target_velocity.x,
                state.acceleration.x * dt,
            );
        }
        if state.acceleration.y > 0.0 {
            state.velocity.y = math::approach(
                state.velocity.y,
                state.target_velocity.y,
                state.acceleration.y * dt,
            );
        }
        state.position += state.velocity * dt;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::run_once;
    use crate::config::SimConfig;
    use crate::systems::Systems;
    use glam::Vec2;

    #[test]
    fn steers_toward_target_then_integrates() {
        let mut systems = Systems::new(SimConfig::default(), 0);
        systems.time.update(0.5);
        let mut state = ObjectState {
            capabilities: Capabilities::POSITION | Capabilities::VELOCITY,
            velocity: Vec2::new(0.0, 10.0),
            target_velocity: Vec2::new(100.0, 0.0),
            acceleration: Vec2::new(80.0, 0.0),
            ..ObjectState::default()
        };
        run_once(&mut MovementComponent, &mut state, &mut systems).unwrap();

        // Only x has an acceleration, so only x steers.
        assert_eq!(state.velocity, Vec2::new(40.0, 10.0));
        assert_eq!(state.position, Vec2::new(20.0, 5.0));
    }
}
