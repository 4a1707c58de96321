//! Player input state

use glam::Vec2;

/// Snapshot of the controls for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct InputState {
    // Movement keys (W/S/A/D or arrows)
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,

    // Mouse look, in pixels moved since the last frame
    pub mouse_delta: Vec2,

    // Discrete actions, consumed once per press
    pub flashlight_cycle_pressed: bool, // Mouse click
    pub day_night_toggle_pressed: bool, // T key
}

impl InputState {
    pub fn new() -> Self {
        Self {
            forward: false,
            backward: false,
            left: false,
            right: false,
            mouse_delta: Vec2::ZERO,
            flashlight_cycle_pressed: false,
            day_night_toggle_pressed: false,
        }
    }

    /// Any movement key held
    pub fn wants_move(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }

    /// Release everything (focus lost, pause)
    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}
