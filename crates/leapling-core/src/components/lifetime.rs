//! Death handling and expiry.

use super::{Behavior, ComponentDeclaration, UpdateContext};
use crate::error::SimResult;
use crate::object::{ActionType, Capabilities, ObjectFlags, ObjectState};
use crate::phase::Phase;
use crate::telemetry::GameEvent;

/// Removes the object once it has died (after `death_delay` seconds of death
/// animation) or once its time to live runs out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LifetimeComponent {
    /// Seconds between death and removal.
    pub death_delay: f32,
    /// Seconds until the object expires on its own.
    pub time_to_live: Option<f32>,
    dying_for: Option<f32>,
}

impl LifetimeComponent {
    /// Removal `death_delay` seconds after death.
    #[must_use]
    pub fn new(death_delay: f32) -> Self {
        Self {
            death_delay,
            ..Self::default()
        }
    }

    /// Also expires after `seconds`.
    #[must_use]
    pub fn with_time_to_live(mut self, seconds: f32) -> Self {
        self.time_to_live = Some(seconds);
        self
    }

    fn request_removal(state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if state.flags.contains(ObjectFlags::REMOVAL_PENDING) {
            return Ok(());
        }
        ctx.systems.lifecycle.request_despawn(ctx.handle)
    }
}

impl Behavior for LifetimeComponent {
    fn declaration(&self) -> ComponentDeclaration {
        ComponentDeclaration {
            name: "lifetime",
            phase: Phase::FrameEnd,
            requires: Capabilities::LIFE,
        }
    }

    fn update(&mut self, state: &mut ObjectState, ctx: &mut UpdateContext<'_>) -> SimResult<()> {
        if let Some(remaining) = self.time_to_live.as_mut() {
            *remaining -= ctx.dt;
            if *remaining <= 0.0 {
                self.time_to_live = None;
                return Self::request_removal(state, ctx);
            }
        }

        if state.is_alive() {
            return Ok(());
        }
        match self.dying_for.as_mut() {
            None => {
                self.dying_for = Some(0.0);
                state.action = ActionType::Death;
                ctx.systems.recorder.record(GameEvent::ObjectDied {
                    kind: state.kind,
                    position: state.position,
                });
                if self.death_delay <= 0.0 {
                    return Self::request_removal(state, ctx);
                }
            }
            Some(elapsed) => {
                *elapsed += ctx.dt;
                if *elapsed >= self.death_delay {
                    return Self::request_removal(state, ctx);
                }
            }
        }
        Ok(())
    }
}
