//! Draw scheduling.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{Capabilities, ObjectState};
use crate::phase::Phase;
use crate::render::{Drawable, RenderSink, SpriteId};

/// Schedules the object's sprite every frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderComponent {
    /// Sprite to draw.
    pub sprite: SpriteId,
    /// Draw order; lower first.
    pub priority: i32,
    /// `false` for HUD elements fixed to the screen.
    pub camera_relative: bool,
}

impl RenderComponent {
    /// World-space sprite at `priority`.
    #[must_use]
    pub fn new(sprite: SpriteId, priority: i32) -> Self {
        Self {
            sprite,
            priority,
            camera_relative: true,
        }
    }
}

impl Behavior for RenderComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "render",
            phase: Phase::Draw,
            requires: Capabilities::POSITION,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        let drawable = Drawable {
            sprite: self.sprite,
            clip: state.clip,
            clip_time: state.clip_time,
            flip: state.flip(),
        };
        ctx.systems.render.schedule_for_draw(
            drawable,
            state.position,
            self.priority,
            self.camera_relative,
        )
    }
}
