//! Day/night cycle - stepped interpolation of fog and scene lighting

use std::time::Duration;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::config::DayNightParams;

/// RGB color from a `0xRRGGBB` literal, components in [0, 1]
pub fn rgb(hex: u32) -> Vec3 {
    Vec3::new(
        ((hex >> 16) & 0xff) as f32 / 255.0,
        ((hex >> 8) & 0xff) as f32 / 255.0,
        (hex & 0xff) as f32 / 255.0,
    )
}

/// Everything the host needs to light the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightParams {
    pub fog_color: Vec3,
    pub background: Vec3,
    pub ambient_intensity: f32,
    pub directional_intensity: f32,
    pub directional_color: Vec3,
}

impl LightParams {
    pub fn night() -> Self {
        Self {
            fog_color: rgb(0x111111),
            background: rgb(0x111111),
            ambient_intensity: 0.2,
            directional_intensity: 0.3,
            directional_color: rgb(0x444488),
        }
    }

    pub fn day() -> Self {
        Self {
            fog_color: rgb(0xccccff),
            background: rgb(0xccccff),
            ambient_intensity: 0.4,
            directional_intensity: 0.6,
            directional_color: rgb(0xffffff),
        }
    }

    pub fn lerp(&self, target: &Self, t: f32) -> Self {
        Self {
            fog_color: self.fog_color.lerp(target.fog_color, t),
            background: self.background.lerp(target.background, t),
            ambient_intensity: self.ambient_intensity
                + (target.ambient_intensity - self.ambient_intensity) * t,
            directional_intensity: self.directional_intensity
                + (target.directional_intensity - self.directional_intensity) * t,
            directional_color: self.directional_color.lerp(target.directional_color, t),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    start: LightParams,
    target: LightParams,
    step: u32,
}

/// Tracks day/night and the light transition in flight
///
/// The owner drives [`DayNightCycle::step`] from a timer every
/// [`DayNightCycle::step_interval`].
pub struct DayNightCycle {
    params: DayNightParams,
    is_day: bool,
    current: LightParams,
    transition: Option<Transition>,
}

impl DayNightCycle {
    pub fn new(params: DayNightParams) -> Self {
        let is_day = params.start_day;
        let current = if is_day {
            LightParams::day()
        } else {
            LightParams::night()
        };
        Self {
            params,
            is_day,
            current,
            transition: None,
        }
    }

    pub fn is_day(&self) -> bool {
        self.is_day
    }

    pub fn lights(&self) -> LightParams {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Time between interpolation steps
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.params.transition_ms / u64::from(self.params.steps.max(1)))
    }

    /// Period of the automatic cycle, if enabled
    pub fn auto_cycle(&self) -> Option<Duration> {
        (self.params.auto_cycle_ms > 0).then(|| Duration::from_millis(self.params.auto_cycle_ms))
    }

    /// Flip day/night and start a transition from the current values
    ///
    /// Any transition in flight is abandoned where it stands.
    pub fn toggle(&mut self) -> bool {
        self.is_day = !self.is_day;
        let target = if self.is_day {
            LightParams::day()
        } else {
            LightParams::night()
        };
        self.transition = Some(Transition {
            start: self.current,
            target,
            step: 0,
        });
        log::info!("Day/night toggled: {}", if self.is_day { "day" } else { "night" });
        self.is_day
    }

    /// Advance the transition one step; returns true when it just finished
    pub fn step(&mut self) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };
        transition.step += 1;
        let steps = self.params.steps.max(1);
        let t = transition.step as f32 / steps as f32;
        self.current = transition.start.lerp(&transition.target, t);

        if transition.step >= steps {
            self.transition = None;
            log::debug!("Day/night transition complete");
            true
        } else {
            false
        }
    }

    /// Drop the transition in flight, keeping the partially blended lights
    pub fn abandon_transition(&mut self) {
        self.transition = None;
    }
}
