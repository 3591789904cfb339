//! Background collision by ray cast.

use glam::Vec2;

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;

/// Casts a ray from the object's previous center to its current center and
/// snaps the object out of any surface it crossed.
///
/// On a hit the center is moved to the contact point along each axis the
/// normal has a component in, the normal is stored for the physics
/// component, and the implied surfaces are timestamped. Without world
/// geometry the component only tracks the previous center.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SimpleCollisionComponent {
    previous_center: Option<Vec2>,
}

impl Behavior for SimpleCollisionComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "simple_collision",
            phase: Phase::CollisionDetection,
            requires: Capabilities::TOUCH,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        state.collision_normal = Vec2::ZERO;
        let mut center = state.center();

        if let (Some(previous), Some(world)) = (self.previous_center, ctx.systems.world.as_deref()) {
            let movement = center - previous;
            if movement != Vec2::ZERO {
                if let Some(hit) = world.cast_ray(previous, center, movement) {
                    let half = state.size * 0.5;
                    if hit.normal.x != 0.0 {
                        state.position.x = hit.point.x - half.x;
                    }
                    if hit.normal.y != 0.0 {
                        state.position.y = hit.point.y - half.y;
                    }
                    state.collision_normal = hit.normal;
                    state.touch.touch_normal(hit.normal, ctx.systems.time.game_time());
                    center = state.center();
                }
            }
        }

        self.previous_center = Some(center);
        Ok(())
    }
}
