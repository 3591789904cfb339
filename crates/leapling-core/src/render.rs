//! Render scheduling.
//!
//! Draw-phase components describe what to draw through [`RenderSink`]; the
//! core's sink is a [`RenderQueue`] that the platform renderer drains after
//! each frame. Commands come out ordered by priority, and commands sharing a
//! priority keep the order they were scheduled in.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use stash::{FixedVec, InsertionSort, OverflowPolicy};

use crate::collision::Flip;
use crate::error::{SimError, SimResult};

/// A sprite sheet or texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpriteId(pub u16);

/// An animation clip within a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipIndex(pub u16);

/// What to draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Drawable {
    /// Source sprite.
    pub sprite: SpriteId,
    /// Clip to play, or the sprite's first frame.
    pub clip: Option<ClipIndex>,
    /// Seconds into the clip.
    pub clip_time: f32,
    /// Mirroring.
    pub flip: Flip,
}

/// A scheduled draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    /// What to draw.
    pub drawable: Drawable,
    /// World (or screen) position.
    pub position: Vec2,
    /// Lower draws first.
    pub priority: i32,
    /// `true` if `position` is in world space and follows the camera.
    pub camera_relative: bool,
}

/// Receives draw requests.
pub trait RenderSink {
    /// Schedules `drawable` at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::ResourceExhaustion`] if the sink is full.
    fn schedule_for_draw(
        &mut self,
        drawable: Drawable,
        position: Vec2,
        priority: i32,
        camera_relative: bool,
    ) -> SimResult<()>;
}

/// Per-frame queue of draw commands.
#[derive(Debug, Clone)]
pub struct RenderQueue {
    commands: FixedVec<DrawCommand>,
}

impl RenderQueue {
    /// Creates a queue holding `capacity` commands per frame.
    #[must_use]
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            commands: FixedVec::with_policy(capacity, policy),
        }
    }

    /// Drops any commands left over from the previous frame.
    pub fn begin_frame(&mut self) {
        self.commands.clear();
    }

    /// Sorts by priority and hands every command to the caller.
    pub fn drain(&mut self) -> impl Iterator<Item = DrawCommand> + '_ {
        self.commands.sort(
            &InsertionSort,
            &|a: &DrawCommand, b: &DrawCommand| a.priority.cmp(&b.priority),
            false,
        );
        self.commands.drain()
    }

    /// Commands scheduled so far, in scheduling order until drained.
    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        self.commands.as_slice()
    }

    /// Number of scheduled commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` if nothing is scheduled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl RenderSink for RenderQueue {
    fn schedule_for_draw(
        &mut self,
        drawable: Drawable,
        position: Vec2,
        priority: i32,
        camera_relative: bool,
    ) -> SimResult<()> {
        self.commands
            .push(DrawCommand {
                drawable,
                position,
                priority,
                camera_relative,
            })
            .map_err(SimError::exhausted("render queue"))
    }
}
