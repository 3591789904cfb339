//! Game clock with freeze and time-scale effects.
//!
//! The [`TimeSystem`] tracks two clocks:
//!
//! - **Real time**: the sum of every delta fed to [`TimeSystem::update`].
//! - **Game time**: what the simulation sees. It stops during a freeze (hit
//!   stop) and runs slower or faster under a scale effect (bullet time).
//!
//! # Freeze Boundary
//!
//! A frame is frozen while the freeze countdown is still positive *after*
//! subtracting that frame's delta. The frame that exhausts the countdown runs
//! with its full scaled delta; the part of the frame that overlapped the freeze
//! is not subtracted. With `freeze(0.5)` and 0.2 s frames the deltas are
//! `0, 0, 0.2`.
//!
//! # Example
//!
//! ```
//! use leapling_core::time::TimeSystem;
//!
//! let mut time = TimeSystem::new();
//! time.freeze(0.5);
//! time.update(0.2);
//! assert_eq!(time.frame_delta(), 0.0);
//! time.update(0.2);
//! assert_eq!(time.frame_delta(), 0.0);
//! time.update(0.2);
//! assert_eq!(time.frame_delta(), 0.2);
//! assert!(!time.is_frozen());
//! ```

use crate::math;

/// Seconds spent easing into and out of a scale effect.
pub const EASE_DURATION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
struct ScaleEffect {
    target: f32,
    duration: f32,
    ease: bool,
    /// Real time when the effect started.
    started_at: f32,
}

/// Real and game clocks for the simulation.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSystem {
    game_time: f32,
    real_time: f32,
    frame_delta: f32,
    real_frame_delta: f32,
    freeze_remaining: f32,
    scale_effect: Option<ScaleEffect>,
    scale: f32,
}

impl Default for TimeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSystem {
    /// Creates clocks at zero with no effects active.
    #[must_use]
    pub fn new() -> Self {
        Self {
            game_time: 0.0,
            real_time: 0.0,
            frame_delta: 0.0,
            real_frame_delta: 0.0,
            freeze_remaining: 0.0,
            scale_effect: None,
            scale: 1.0,
        }
    }

    /// Advances both clocks by one frame of `delta` real seconds.
    pub fn update(&mut self, delta: f32) {
        self.real_time += delta;
        self.real_frame_delta = delta;

        if self.freeze_remaining > 0.0 {
            self.freeze_remaining -= delta;
            if self.freeze_remaining > 0.0 {
                self.frame_delta = 0.0;
                return;
            }
            self.freeze_remaining = 0.0;
            tracing::trace!(real_time = self.real_time, "freeze ended");
        }

        self.scale = self.current_scale();
        self.frame_delta = delta * self.scale;
        self.game_time += self.frame_delta;
    }

    /// Stops game time for `seconds` of real time.
    ///
    /// Replaces any freeze already in progress.
    pub fn freeze(&mut self, seconds: f32) {
        self.freeze_remaining = seconds.max(0.0);
    }

    /// Scales game time by `factor` for `duration` real seconds.
    ///
    /// With `ease`, the scale eases from 1 to `factor` over the first
    /// [`EASE_DURATION`] seconds and back to 1 over the last. A new request
    /// while an effect is running changes its target and duration but keeps
    /// its first start time.
    pub fn apply_scale(&mut self, factor: f32, duration: f32, ease: bool) {
        let started_at = self
            .scale_effect
            .map_or(self.real_time, |effect| effect.started_at);
        self.scale_effect = Some(ScaleEffect {
            target: factor,
            duration,
            ease,
            started_at,
        });
    }

    fn current_scale(&mut self) -> f32 {
        let Some(effect) = self.scale_effect else {
            return 1.0;
        };

        let elapsed = self.real_time - effect.started_at;
        if elapsed > effect.duration {
            self.scale_effect = None;
            return 1.0;
        }
        if !effect.ease {
            return effect.target;
        }

        if elapsed <= EASE_DURATION {
            math::ease(1.0, effect.target, EASE_DURATION, elapsed)
        } else if effect.duration - elapsed < EASE_DURATION {
            let ease_out_time = EASE_DURATION - (effect.duration - elapsed);
            math::ease(effect.target, 1.0, EASE_DURATION, ease_out_time)
        } else {
            effect.target
        }
    }

    /// Seconds of game time elapsed.
    #[must_use]
    pub fn game_time(&self) -> f32 {
        self.game_time
    }

    /// Seconds of real time elapsed.
    #[must_use]
    pub fn real_time(&self) -> f32 {
        self.real_time
    }

    /// Game-time delta of the last frame (0 while frozen).
    #[must_use]
    pub fn frame_delta(&self) -> f32 {
        self.frame_delta
    }

    /// Real-time delta of the last frame.
    #[must_use]
    pub fn real_frame_delta(&self) -> f32 {
        self.real_frame_delta
    }

    /// Real seconds of freeze left.
    #[must_use]
    pub fn freeze_remaining(&self) -> f32 {
        self.freeze_remaining
    }

    /// Returns `true` while a freeze is in progress.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.freeze_remaining > 0.0
    }

    /// Scale applied to the last unfrozen frame.
    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Returns `true` while a scale effect is active.
    #[must_use]
    pub fn is_scaled(&self) -> bool {
        self.scale_effect.is_some()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{close, EPSILON};

    mod freeze_tests {
        use super::*;

        #[test]
        fn freeze_drops_the_remainder_at_the_boundary() {
            let mut time = TimeSystem::new();
            time.freeze(0.5);

            time.update(0.2);
            assert_eq!(time.frame_delta(), 0.0);
            assert!(close(time.freeze_remaining(), 0.3, EPSILON));

            time.update(0.2);
            assert_eq!(time.frame_delta(), 0.0);
            assert!(close(time.freeze_remaining(), 0.1, EPSILON));

            time.update(0.2);
            assert!(close(time.frame_delta(), 0.2, EPSILON));
            assert_eq!(time.freeze_remaining(), 0.0);
            assert!(close(time.game_time(), 0.2, EPSILON));
            assert!(close(time.real_time(), 0.6, EPSILON));
        }

        #[test]
        fn exhausting_the_freeze_exactly_unfreezes_that_frame() {
            let mut time = TimeSystem::new();
            time.freeze(0.25);
            time.update(0.125);
            assert_eq!(time.frame_delta(), 0.0);
            time.update(0.125);
            assert_eq!(time.frame_delta(), 0.125);
            assert!(!time.is_frozen());
        }

        #[test]
        fn real_time_keeps_running_while_frozen() {
            let mut time = TimeSystem::new();
            time.freeze(1.0);
            time.update(0.25);
            assert_eq!(time.game_time(), 0.0);
            assert_eq!(time.real_time(), 0.25);
            assert_eq!(time.real_frame_delta(), 0.25);
        }

        #[test]
        fn negative_freeze_is_ignored() {
            let mut time = TimeSystem::new();
            time.freeze(-1.0);
            time.update(0.5);
            assert_eq!(time.frame_delta(), 0.5);
        }
    }

    mod scale_tests {
        use super::*;

        #[test]
        fn unscaled_by_default() {
            let mut time = TimeSystem::new();
            time.update(0.5);
            assert_eq!(time.frame_delta(), 0.5);
            assert_eq!(time.scale(), 1.0);
        }

        #[test]
        fn hard_scale_applies_immediately_and_expires() {
            let mut time = TimeSystem::new();
            time.apply_scale(0.5, 1.0, false);
            time.update(0.25);
            assert_eq!(time.frame_delta(), 0.125);

            for _ in 0..4 {
                time.update(0.25);
            }
            assert!(!time.is_scaled());
            assert_eq!(time.frame_delta(), 0.25);
        }

        #[test]
        fn eased_scale_ramps_in_holds_and_ramps_out() {
            let mut time = TimeSystem::new();
            time.apply_scale(0.5, 2.0, true);

            // Midway through the ease-in: halfway between 1.0 and 0.5
            time.update(0.25);
            assert!(close(time.scale(), 0.75, EPSILON));

            // Plateau
            time.update(0.5);
            assert!(close(time.scale(), 0.5, EPSILON));

            // Midway through the ease-out
            time.update(1.0);
            assert!(close(time.scale(), 0.75, EPSILON));
        }

        #[test]
        fn frozen_frames_do_not_consult_the_scale() {
            let mut time = TimeSystem::new();
            time.apply_scale(2.0, 10.0, false);
            time.freeze(1.0);
            time.update(0.5);
            assert_eq!(time.frame_delta(), 0.0);
        }
    }
}
