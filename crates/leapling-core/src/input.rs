//! Input state snapshot read by control components.
//!
//! The platform layer writes presses and releases with real-time stamps; the
//! simulation only reads. A button is *triggered* when it is down and was
//! pressed within the last two frames, which turns a held key into a single
//! jump.

use glam::Vec2;

/// Number of tracked pointers (touches).
pub const MAX_POINTERS: usize = 5;
/// Number of keyboard/gamepad button codes.
pub const BUTTON_COUNT: usize = 256;

/// Conventional button codes used by the built-in control components.
pub mod keys {
    /// Move left.
    pub const LEFT: usize = 21;
    /// Move right.
    pub const RIGHT: usize = 22;
    /// Jump.
    pub const JUMP: usize = 62;
    /// Attack.
    pub const ATTACK: usize = 52;
}

/// State of one button.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputButton {
    pressed: bool,
    magnitude: f32,
    press_time: f32,
}

impl InputButton {
    /// Marks the button down at `time`. Repeated presses keep the first stamp.
    pub fn press(&mut self, time: f32, magnitude: f32) {
        if !self.pressed {
            self.pressed = true;
            self.press_time = time;
        }
        self.magnitude = magnitude;
    }

    /// Marks the button up.
    pub fn release(&mut self) {
        self.pressed = false;
        self.magnitude = 0.0;
    }

    /// Returns `true` while held.
    #[must_use]
    pub fn pressed(&self) -> bool {
        self.pressed
    }

    /// Analog magnitude of the press (1.0 for digital buttons).
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Real time of the current press.
    #[must_use]
    pub fn press_time(&self) -> f32 {
        self.press_time
    }

    /// Returns `true` if held and pressed no more than two frames ago.
    #[must_use]
    pub fn triggered(&self, now: f32, frame_delta: f32) -> bool {
        self.pressed && now - self.press_time <= frame_delta * 2.0
    }
}

/// A touch pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    /// Down/up state of the touch.
    pub button: InputButton,
    /// Screen position of the touch.
    pub position: Vec2,
}

/// Buttons, pointers and a movement axis.
#[derive(Debug, Clone)]
pub struct InputSystem {
    pointers: [Pointer; MAX_POINTERS],
    buttons: Box<[InputButton; BUTTON_COUNT]>,
    axis: Vec2,
}

impl Default for InputSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSystem {
    /// Creates an input state with everything released.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pointers: [Pointer::default(); MAX_POINTERS],
            buttons: Box::new([InputButton::default(); BUTTON_COUNT]),
            axis: Vec2::ZERO,
        }
    }

    /// Presses button `code` at real time `time`. Unknown codes are ignored.
    pub fn press_button(&mut self, code: usize, time: f32) {
        if let Some(button) = self.buttons.get_mut(code) {
            button.press(time, 1.0);
        }
    }

    /// Releases button `code`.
    pub fn release_button(&mut self, code: usize) {
        if let Some(button) = self.buttons.get_mut(code) {
            button.release();
        }
    }

    /// Returns button `code`, if in range.
    #[must_use]
    pub fn button(&self, code: usize) -> Option<&InputButton> {
        self.buttons.get(code)
    }

    /// Returns `true` if button `code` is held.
    #[must_use]
    pub fn is_pressed(&self, code: usize) -> bool {
        self.button(code).is_some_and(InputButton::pressed)
    }

    /// Returns `true` if button `code` was just pressed.
    #[must_use]
    pub fn is_triggered(&self, code: usize, now: f32, frame_delta: f32) -> bool {
        self.button(code)
            .is_some_and(|button| button.triggered(now, frame_delta))
    }

    /// Puts pointer `index` down at `position`.
    pub fn touch_down(&mut self, index: usize, position: Vec2, time: f32) {
        if let Some(pointer) = self.pointers.get_mut(index) {
            pointer.button.press(time, 1.0);
            pointer.position = position;
        }
    }

    /// Lifts pointer `index`.
    pub fn touch_up(&mut self, index: usize) {
        if let Some(pointer) = self.pointers.get_mut(index) {
            pointer.button.release();
        }
    }

    /// Returns pointer `index`, if in range.
    #[must_use]
    pub fn pointer(&self, index: usize) -> Option<&Pointer> {
        self.pointers.get(index)
    }

    /// First held pointer inside the box `[min, max]`, for on-screen buttons.
    #[must_use]
    pub fn pointer_in_region(&self, min: Vec2, max: Vec2) -> Option<&Pointer> {
        self.pointers.iter().find(|pointer| {
            pointer.button.pressed()
                && pointer.position.cmpge(min).all()
                && pointer.position.cmple(max).all()
        })
    }

    /// Sets the analog movement axis (tilt or stick), clamped to `[-1, 1]`.
    pub fn set_axis(&mut self, axis: Vec2) {
        self.axis = axis.clamp(Vec2::splat(-1.0), Vec2::splat(1.0));
    }

    /// Analog movement axis.
    #[must_use]
    pub fn axis(&self) -> Vec2 {
        self.axis
    }

    /// Releases every button and pointer and zeroes the axis.
    pub fn release_all(&mut self) {
        for button in self.buttons.iter_mut() {
            button.release();
        }
        for pointer in &mut self.pointers {
            pointer.button.release();
        }
        self.axis = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggered_only_within_two_frames_of_press() {
        let mut input = InputSystem::new();
        input.press_button(keys::JUMP, 1.0);

        assert!(input.is_triggered(keys::JUMP, 1.0, 0.016));
        assert!(input.is_triggered(keys::JUMP, 1.03, 0.016));
        assert!(!input.is_triggered(keys::JUMP, 1.05, 0.016));
        assert!(input.is_pressed(keys::JUMP));
    }

    #[test]
    fn held_key_keeps_its_first_press_time() {
        let mut input = InputSystem::new();
        input.press_button(keys::JUMP, 1.0);
        input.press_button(keys::JUMP, 2.0);
        assert_eq!(input.button(keys::JUMP).map(InputButton::press_time), Some(1.0));

        input.release_button(keys::JUMP);
        input.press_button(keys::JUMP, 3.0);
        assert_eq!(input.button(keys::JUMP).map(InputButton::press_time), Some(3.0));
    }

    #[test]
    fn out_of_range_codes_are_ignored() {
        let mut input = InputSystem::new();
        input.press_button(BUTTON_COUNT, 0.0);
        input.touch_down(MAX_POINTERS, Vec2::ZERO, 0.0);
        assert!(!input.is_pressed(BUTTON_COUNT));
        assert!(input.pointer(MAX_POINTERS).is_none());
    }

    #[test]
    fn pointer_region_lookup() {
        let mut input = InputSystem::new();
        input.touch_down(2, Vec2::new(50.0, 50.0), 0.0);

        let hit = input.pointer_in_region(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0));
        assert!(hit.is_some());
        assert!(input
            .pointer_in_region(Vec2::new(60.0, 0.0), Vec2::new(100.0, 100.0))
            .is_none());

        input.touch_up(2);
        assert!(input
            .pointer_in_region(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0))
            .is_none());
    }

    #[test]
    fn axis_is_clamped_and_release_all_resets() {
        let mut input = InputSystem::new();
        input.set_axis(Vec2::new(3.0, -0.5));
        assert_eq!(input.axis(), Vec2::new(1.0, -0.5));

        input.press_button(keys::LEFT, 0.0);
        input.release_all();
        assert_eq!(input.axis(), Vec2::ZERO);
        assert!(!input.is_pressed(keys::LEFT));
    }
}
