//! Scripted walks standing in for a player at the keyboard

use std::f32::consts::FRAC_PI_2;

use clap::ValueEnum;
use glam::Vec2;
use hollowpine_core::entity::InputState;
use serde::{Deserialize, Serialize};

/// Frames walked along each side of the square route
const SQUARE_SIDE_FRAMES: u64 = 240;

/// Mouse pixels per frame on the spin route
const SPIN_MOUSE_PX: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
pub enum Route {
    /// Stand still at the spawn point
    Idle,
    /// Walk straight ahead
    Forward,
    /// Walk a square, turning left at each corner
    Square,
    /// Walk forward while turning, tracing a circle
    Spin,
}

impl Route {
    /// Controls for `frame`; `look_sensitivity` converts turns into mouse pixels
    pub fn input(self, frame: u64, look_sensitivity: f32) -> InputState {
        let mut input = InputState::new();
        match self {
            Route::Idle => {}
            Route::Forward => input.forward = true,
            Route::Square => {
                input.forward = true;
                if frame > 0 && frame % SQUARE_SIDE_FRAMES == 0 {
                    // Negative x turns left
                    input.mouse_delta = Vec2::new(-FRAC_PI_2 / look_sensitivity, 0.0);
                }
            }
            Route::Spin => {
                input.forward = true;
                input.mouse_delta = Vec2::new(SPIN_MOUSE_PX, 0.0);
            }
        }
        input
    }
}
