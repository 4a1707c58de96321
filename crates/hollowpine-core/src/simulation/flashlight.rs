//! Flashlight and battery
//!
//! The battery drains once per drain tick while the light is on. Below the
//! warning threshold the light starts randomized flicker episodes, and at
//! zero it goes dark. Every timer the flashlight needs lives in the shared
//! [`Scheduler`]; the owner forwards fired timers to [`Flashlight::on_timer`].

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::scheduler::{Scheduler, TimerId, TimerKind};
use crate::config::FlashlightParams;
use crate::world::rng_trait::WorldRng;

pub const MAX_BATTERY: f32 = 100.0;

/// Flashlight modes in click-cycle order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlashlightMode {
    Medium,
    High,
    Off,
    Low,
}

impl FlashlightMode {
    pub fn next(self) -> Self {
        match self {
            FlashlightMode::Medium => FlashlightMode::High,
            FlashlightMode::High => FlashlightMode::Off,
            FlashlightMode::Off => FlashlightMode::Low,
            FlashlightMode::Low => FlashlightMode::Medium,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            FlashlightMode::Medium => "Medium",
            FlashlightMode::High => "High",
            FlashlightMode::Off => "Off",
            FlashlightMode::Low => "Low",
        }
    }
}

/// What a drain tick did besides lowering the battery
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrainOutcome {
    Steady,
    FlickerStarted { duration: Duration },
    /// Battery reached zero on this tick
    Depleted,
}

#[derive(Debug, Clone, Copy)]
struct FlickerEpisode {
    step_timer: TimerId,
    end_timer: TimerId,
    /// Chance per step of going fully dark, fixed at episode start
    dark_chance: f32,
}

#[derive(Debug, Clone, Copy)]
struct LanternFlicker {
    timer: TimerId,
    toggles_left: u32,
}

pub struct Flashlight {
    params: FlashlightParams,
    battery: f32,
    mode: FlashlightMode,
    intensity: f32,
    drain_timer: Option<TimerId>,
    flicker: Option<FlickerEpisode>,
    lantern: Option<LanternFlicker>,
}

impl Flashlight {
    pub fn new(params: FlashlightParams) -> Self {
        let mut flashlight = Self {
            params,
            battery: MAX_BATTERY,
            mode: FlashlightMode::Medium,
            intensity: 0.0,
            drain_timer: None,
            flicker: None,
            lantern: None,
        };
        flashlight.refresh_intensity();
        flashlight
    }

    pub fn battery(&self) -> f32 {
        self.battery
    }

    pub fn mode(&self) -> FlashlightMode {
        self.mode
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn is_flickering(&self) -> bool {
        self.flicker.is_some()
    }

    pub fn is_lantern_flickering(&self) -> bool {
        self.lantern.is_some()
    }

    /// HUD low-battery warning
    pub fn warning_visible(&self) -> bool {
        self.battery > 0.0 && self.battery < self.params.warning_threshold
    }

    /// Intensity the current mode calls for; zero when off or empty
    pub fn mode_intensity(&self) -> f32 {
        if self.battery <= 0.0 {
            return 0.0;
        }
        match self.mode {
            FlashlightMode::Medium => self.params.medium_intensity,
            FlashlightMode::High => self.params.high_intensity,
            FlashlightMode::Off => 0.0,
            FlashlightMode::Low => self.params.low_intensity,
        }
    }

    fn refresh_intensity(&mut self) {
        self.intensity = self.mode_intensity();
    }

    /// Advance to the next mode (mouse click)
    pub fn cycle_mode(&mut self) -> FlashlightMode {
        self.mode = self.mode.next();
        self.refresh_intensity();
        log::debug!("Flashlight mode: {}", self.mode.name());
        self.mode
    }

    /// Start the periodic drain (session start or resume)
    pub fn start_drain(&mut self, scheduler: &mut Scheduler) {
        scheduler.cancel_slot(&mut self.drain_timer);
        let period = Duration::from_millis(self.params.drain_interval_ms);
        self.drain_timer = Some(scheduler.schedule_interval(period, TimerKind::BatteryDrain));
    }

    /// Stop draining and end every effect in flight (pause)
    pub fn suspend(&mut self, scheduler: &mut Scheduler) {
        scheduler.cancel_slot(&mut self.drain_timer);
        self.end_flicker(scheduler);
        self.end_lantern_flicker(scheduler);
        self.refresh_intensity();
    }

    /// Add charge from a pickup; returns the new level
    pub fn recharge(&mut self, amount: f32, scheduler: &mut Scheduler) -> f32 {
        self.battery = (self.battery + amount).clamp(0.0, MAX_BATTERY);
        if self.battery >= self.params.warning_threshold {
            self.end_flicker(scheduler);
        }
        if self.flicker.is_none() && self.lantern.is_none() {
            self.refresh_intensity();
        }
        self.battery
    }

    /// Route a fired timer; returns the drain outcome for drain ticks
    pub fn on_timer<R: WorldRng + ?Sized>(
        &mut self,
        id: TimerId,
        kind: TimerKind,
        scheduler: &mut Scheduler,
        rng: &mut R,
    ) -> Option<DrainOutcome> {
        match kind {
            TimerKind::BatteryDrain if self.drain_timer == Some(id) => {
                Some(self.drain_tick(scheduler, rng))
            }
            TimerKind::FlickerStep if self.flicker.is_some_and(|f| f.step_timer == id) => {
                self.flicker_step(rng);
                None
            }
            TimerKind::FlickerEnd if self.flicker.is_some_and(|f| f.end_timer == id) => {
                self.end_flicker(scheduler);
                if self.lantern.is_none() {
                    self.refresh_intensity();
                }
                None
            }
            TimerKind::LanternToggle if self.lantern.is_some_and(|l| l.timer == id) => {
                self.lantern_toggle(scheduler);
                None
            }
            _ => None,
        }
    }

    fn drain_tick<R: WorldRng + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler,
        rng: &mut R,
    ) -> DrainOutcome {
        let was_charged = self.battery > 0.0;
        if self.mode != FlashlightMode::Off {
            self.battery = (self.battery - self.params.drain_per_tick).max(0.0);
        }

        let lit = self.mode != FlashlightMode::Off;
        let mut outcome = DrainOutcome::Steady;

        if self.battery >= self.params.warning_threshold && lit {
            if self.lantern.is_none() {
                self.refresh_intensity();
            }
        } else if self.battery > 0.0 && lit && self.flicker.is_none() {
            let duration = self.start_flicker(scheduler, rng);
            outcome = DrainOutcome::FlickerStarted { duration };
        }

        if self.battery <= 0.0 {
            self.end_flicker(scheduler);
            self.end_lantern_flicker(scheduler);
            self.intensity = 0.0;
            if was_charged {
                log::info!("Flashlight battery depleted");
                outcome = DrainOutcome::Depleted;
            }
        }

        outcome
    }

    fn start_flicker<R: WorldRng + ?Sized>(
        &mut self,
        scheduler: &mut Scheduler,
        rng: &mut R,
    ) -> Duration {
        let p = &self.params;
        let duration_ms = rng.gen_f64() * p.flicker_extra_ms + p.flicker_min_ms;
        let threshold = f64::from(p.warning_threshold);
        let step_ms = (p.flicker_base_interval_ms * f64::from(self.battery) / threshold)
            .max(p.flicker_min_interval_ms);
        let dark_chance = (MAX_BATTERY - self.battery) / MAX_BATTERY;

        let duration = Duration::from_secs_f64(duration_ms / 1000.0);
        let step = Duration::from_secs_f64(step_ms / 1000.0);
        let step_timer = scheduler.schedule_interval(step, TimerKind::FlickerStep);
        let end_timer = scheduler.schedule_once(duration, TimerKind::FlickerEnd);
        self.flicker = Some(FlickerEpisode {
            step_timer,
            end_timer,
            dark_chance,
        });

        log::debug!(
            "Flicker episode: {:.0}ms, step {:.0}ms, dark chance {:.2}",
            duration_ms,
            step_ms,
            dark_chance
        );
        duration
    }

    fn flicker_step<R: WorldRng + ?Sized>(&mut self, rng: &mut R) {
        let Some(episode) = self.flicker else {
            return;
        };
        if self.mode == FlashlightMode::Off || self.battery <= 0.0 {
            return;
        }
        self.intensity = if rng.check_probability(episode.dark_chance) {
            0.0
        } else {
            rng.gen_f32() * self.params.flicker_intensity_span + self.params.flicker_intensity_low
        };
    }

    fn end_flicker(&mut self, scheduler: &mut Scheduler) {
        if let Some(episode) = self.flicker.take() {
            scheduler.cancel(episode.step_timer);
            scheduler.cancel(episode.end_timer);
        }
    }

    /// Ghost-driven flicker: `times` off/on cycles, then back to the mode intensity
    pub fn start_lantern_flicker(&mut self, times: u32, interval: Duration, scheduler: &mut Scheduler) {
        self.end_lantern_flicker(scheduler);
        if times == 0 {
            return;
        }
        let timer = scheduler.schedule_interval(interval, TimerKind::LanternToggle);
        self.lantern = Some(LanternFlicker {
            timer,
            toggles_left: times * 2,
        });
    }

    fn lantern_toggle(&mut self, scheduler: &mut Scheduler) {
        let lit = self.mode_intensity();
        let Some(lantern) = self.lantern.as_mut() else {
            return;
        };
        self.intensity = if self.intensity > 0.0 { 0.0 } else { lit };
        lantern.toggles_left = lantern.toggles_left.saturating_sub(1);
        if lantern.toggles_left == 0 {
            self.end_lantern_flicker(scheduler);
            self.refresh_intensity();
        }
    }

    fn end_lantern_flicker(&mut self, scheduler: &mut Scheduler) {
        if let Some(lantern) = self.lantern.take() {
            scheduler.cancel(lantern.timer);
        }
    }
}
