//! Simulation world - owns every subsystem and runs the per-frame update

use std::time::Duration;

use ahash::AHashSet;
use glam::{IVec2, Vec2, Vec3};

use super::day_night::{DayNightCycle, LightParams};
use super::forest::Forest;
use super::generation::ForestGenerator;
use super::player_physics::{MoveOutcome, MovementResolver};
use super::rng_trait::{SessionRng, session_rng};
use super::scene::{AssetHandle, AssetKind, AssetState, SceneSink};
use super::spatial_grid::{SpatialHashGrid, cell_key};
use super::streamer::WorldStreamer;
use crate::config::SimConfig;
use crate::entity::input::InputState;
use crate::entity::player::Player;
use crate::entity::pursuer::Pursuer;
use crate::error::{AssetError, ConfigError};
use crate::simulation::events::SimEvent;
use crate::simulation::flashlight::{DrainOutcome, Flashlight, FlashlightMode};
use crate::simulation::scheduler::{Fired, Scheduler, TimerId, TimerKind};

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Built, nothing streamed or scheduled yet
    Ready,
    Running,
    Paused,
    /// Torn down; the world can not be restarted
    Ended,
}

/// Everything the HUD shows
#[derive(Debug, Clone, PartialEq)]
pub struct HudSnapshot {
    pub battery: f32,
    pub mode: FlashlightMode,
    pub mode_name: &'static str,
    pub warning_visible: bool,
    pub intensity: f32,
    pub is_day: bool,
    pub lights: LightParams,
    pub pursuer_visible: bool,
    pub pursuer_position: Option<Vec3>,
}

/// Everything the minimap draws
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapSnapshot {
    /// Visited grid cells in key order
    pub visited: Vec<IVec2>,
    pub cell_size: f32,
    pub player_position: Vec2,
    /// Player yaw in radians
    pub heading: f32,
    /// Pickups spotted but not yet collected
    pub collectibles: Vec<Vec2>,
    pub world_half_size: f32,
}

/// The owning struct for one play session
pub struct SimulationWorld {
    config: SimConfig,
    seed: u64,
    phase: SessionPhase,

    forest: Forest,
    grid: SpatialHashGrid,
    streamer: WorldStreamer,
    resolver: MovementResolver,
    player: Player,
    flashlight: Flashlight,
    pursuer: Pursuer,
    day_night: DayNightCycle,

    scheduler: Scheduler,
    rng: SessionRng,

    spawn_timer: Option<TimerId>,
    auto_cycle_timer: Option<TimerId>,
    day_night_step_timer: Option<TimerId>,

    /// Grid cells the player has stood in
    visited: AHashSet<IVec2>,
    events: Vec<SimEvent>,
    frame: u64,
}

impl SimulationWorld {
    /// Validate the config and generate the forest for `seed`
    pub fn new(config: SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let forest = ForestGenerator::new(seed, &config).generate();

        Ok(Self {
            grid: SpatialHashGrid::new(config.world.cell_size),
            streamer: WorldStreamer::new(config.world.clone()),
            resolver: MovementResolver::new(config.player.clone()),
            player: Player::new(Vec3::ZERO, &config.player),
            flashlight: Flashlight::new(config.flashlight.clone()),
            pursuer: Pursuer::new(config.pursuer.clone()),
            day_night: DayNightCycle::new(config.day_night.clone()),
            scheduler: Scheduler::new(),
            rng: session_rng(seed),
            spawn_timer: None,
            auto_cycle_timer: None,
            day_night_step_timer: None,
            visited: AHashSet::new(),
            events: Vec::new(),
            frame: 0,
            phase: SessionPhase::Ready,
            forest,
            config,
            seed,
        })
    }

    /// Register the fence ring, stream the starting quadrants and arm the timers
    pub fn start(&mut self, scene: &mut dyn SceneSink) {
        if self.phase != SessionPhase::Ready {
            log::warn!("start() called in phase {:?}; ignoring", self.phase);
            return;
        }

        for &id in self.forest.fences() {
            if let Some(fence) = self.forest.obstacle(id) {
                self.grid.insert(id, fence.position.x, fence.position.y);
                scene.add_obstacle(id, fence);
            }
        }

        let ground = self.player.ground();
        self.streamer
            .update_visible_chunks(ground.x, ground.y, &self.forest, &mut self.grid, scene);
        self.visited
            .insert(cell_key(ground.x, ground.y, self.config.world.cell_size));

        self.arm_session_timers();
        self.phase = SessionPhase::Running;

        log::info!(
            "Session started (seed={}): {} quadrants active, {} obstacles in grid",
            self.seed,
            self.streamer.active_count(),
            self.grid.len()
        );
    }

    fn arm_session_timers(&mut self) {
        self.flashlight.start_drain(&mut self.scheduler);

        let spawn_period = Duration::from_millis(self.config.pursuer.spawn_check_interval_ms);
        self.spawn_timer = Some(
            self.scheduler
                .schedule_interval(spawn_period, TimerKind::PursuerSpawnCheck),
        );

        self.arm_auto_cycle();
    }

    fn arm_auto_cycle(&mut self) {
        self.scheduler.cancel_slot(&mut self.auto_cycle_timer);
        if let Some(period) = self.day_night.auto_cycle() {
            self.auto_cycle_timer =
                Some(self.scheduler.schedule_interval(period, TimerKind::DayNightAuto));
        }
    }

    /// Halt the session: ticks become no-ops and every timer is cancelled
    pub fn pause(&mut self) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.flashlight.suspend(&mut self.scheduler);
        self.scheduler.cancel_all();
        self.spawn_timer = None;
        self.auto_cycle_timer = None;
        self.day_night_step_timer = None;
        self.day_night.abandon_transition();

        self.resolver.reset();
        self.player.is_moving = false;
        self.player.bob_phase = 0.0;
        self.player.camera_height = self.config.player.base_height;

        self.phase = SessionPhase::Paused;
        log::info!("Session paused at {:?}", self.scheduler.now());
    }

    /// Continue after a pause; drain, spawn rolls and the auto cycle start over
    pub fn resume(&mut self) {
        if self.phase != SessionPhase::Paused {
            return;
        }
        self.arm_session_timers();
        self.phase = SessionPhase::Running;
        log::info!("Session resumed");
    }

    /// Take every streamed object and fence out of the scene
    pub fn end(&mut self, scene: &mut dyn SceneSink) {
        if self.phase == SessionPhase::Ended {
            return;
        }
        self.scheduler.cancel_all();
        self.streamer
            .deactivate_all(&self.forest, &mut self.grid, scene);
        for &id in self.forest.fences() {
            if let Some(fence) = self.forest.obstacle(id) {
                self.grid.remove(id, fence.position.x, fence.position.y);
                scene.remove_obstacle(id);
            }
        }
        self.phase = SessionPhase::Ended;
        log::info!("Session ended after {} frames", self.frame);
    }

    /// Host callback for asynchronous asset loads
    pub fn on_asset_loaded(&mut self, kind: AssetKind, result: Result<AssetHandle, AssetError>) {
        match (kind, result) {
            (AssetKind::PursuerSprite, Ok(handle)) => {
                self.pursuer.sprite = AssetState::Ready(handle);
                log::info!("Loaded {} ({:?})", kind.path(), handle);
            }
            (AssetKind::PursuerSprite, Err(err)) => {
                self.pursuer.sprite = AssetState::Failed;
                log::warn!("Failed to load {}: {}; the ghost will not appear", kind.path(), err);
            }
        }
    }

    /// Advance the session by one frame
    ///
    /// Returns how movement was resolved, or `None` when the session is not running.
    pub fn tick(
        &mut self,
        input: &InputState,
        frame_dt: Duration,
        scene: &mut dyn SceneSink,
    ) -> Option<MoveOutcome> {
        if self.phase != SessionPhase::Running {
            return None;
        }

        // 1. Discrete actions and look
        if input.flashlight_cycle_pressed {
            self.flashlight.cycle_mode();
        }
        if input.day_night_toggle_pressed {
            self.toggle_day_night(true);
        }
        self.player.look(input.mouse_delta, &self.config.player);

        // 2. Timers due within this frame
        let until = self.scheduler.now() + frame_dt;
        while let Some(fired) = self.scheduler.pop_due(until) {
            self.dispatch(fired);
        }
        self.scheduler.advance_to(until);

        // 3. Streaming before movement so collision sees fresh trees
        let ground = self.player.ground();
        let delta =
            self.streamer
                .update_visible_chunks(ground.x, ground.y, &self.forest, &mut self.grid, scene);
        if !delta.is_empty() {
            self.events.push(SimEvent::QuadrantsStreamed {
                activated: delta.activated,
                deactivated: delta.deactivated,
            });
        }

        // 4. Movement
        let outcome = self
            .resolver
            .resolve(&mut self.player, input, &self.forest, &self.grid);

        // 5. Pickups
        self.collect_pickups();

        // 6. Ghost
        self.update_pursuer();

        // 7. Minimap bookkeeping
        let ground = self.player.ground();
        self.visited
            .insert(cell_key(ground.x, ground.y, self.config.world.cell_size));
        self.mark_seen_collectibles();

        self.frame += 1;
        Some(outcome)
    }

    fn dispatch(&mut self, fired: Fired) {
        match fired.kind {
            TimerKind::BatteryDrain
            | TimerKind::FlickerStep
            | TimerKind::FlickerEnd
            | TimerKind::LanternToggle => {
                let outcome =
                    self.flashlight
                        .on_timer(fired.id, fired.kind, &mut self.scheduler, &mut self.rng);
                match outcome {
                    Some(DrainOutcome::FlickerStarted { duration }) => {
                        self.events.push(SimEvent::FlickerStarted {
                            duration_ms: duration.as_millis() as u64,
                        });
                    }
                    Some(DrainOutcome::Depleted) => self.events.push(SimEvent::BatteryDepleted),
                    Some(DrainOutcome::Steady) | None => {}
                }
            }
            TimerKind::DayNightStep => {
                if self.day_night_step_timer == Some(fired.id) && self.day_night.step() {
                    self.scheduler.cancel_slot(&mut self.day_night_step_timer);
                }
            }
            TimerKind::DayNightAuto => {
                if self.auto_cycle_timer == Some(fired.id) {
                    self.toggle_day_night(false);
                }
            }
            TimerKind::PursuerSpawnCheck => {
                if self.spawn_timer == Some(fired.id)
                    && let Some(position) =
                        self.pursuer.spawn_check(self.player.ground(), &mut self.rng)
                {
                    self.events.push(SimEvent::PursuerSpawned { position });
                }
            }
        }
    }

    /// Flip day/night; a manual toggle also restarts the automatic cycle
    pub fn toggle_day_night(&mut self, manual: bool) {
        self.scheduler.cancel_slot(&mut self.day_night_step_timer);
        let is_day = self.day_night.toggle();
        let step = self.day_night.step_interval();
        self.day_night_step_timer =
            Some(self.scheduler.schedule_interval(step, TimerKind::DayNightStep));

        if manual {
            self.arm_auto_cycle();
        }
        self.events.push(SimEvent::DayNightToggled { is_day, manual });
    }

    fn collect_pickups(&mut self) {
        let player_box = self.player.bounds(&self.config.player);
        let size = self.config.forest.collectible_size;
        let charge = self.config.flashlight.pickup_charge;

        for collectible in &mut self.forest.collectibles {
            if collectible.collected || !player_box.intersects(&collectible.bounds(size)) {
                continue;
            }
            collectible.collected = true;
            let battery = self.flashlight.recharge(charge, &mut self.scheduler);
            log::info!("Picked up battery {} (battery now {:.0}%)", collectible.id, battery);
            self.events.push(SimEvent::PickupCollected {
                id: collectible.id,
                battery,
            });
        }
    }

    fn update_pursuer(&mut self) {
        let update = self.pursuer.update(&self.player, &mut self.rng);
        if let Some(position) = update.teleported {
            self.events.push(SimEvent::PursuerTeleported { position });
        }
        if update.flicker {
            let params = &self.config.pursuer;
            self.flashlight.start_lantern_flicker(
                params.lantern_flicker_times,
                Duration::from_millis(params.lantern_flicker_interval_ms),
                &mut self.scheduler,
            );
            self.events.push(SimEvent::LanternFlicker);
        }
        if update.captured {
            self.events.push(SimEvent::PursuerCaptured);
        }
    }

    fn mark_seen_collectibles(&mut self) {
        let ground = self.player.ground();
        let forward = self.player.forward();
        let range = self.config.player.view_range;
        let cos_half_angle = self.config.player.view_half_angle_deg.to_radians().cos();

        for collectible in &mut self.forest.collectibles {
            if collectible.seen || collectible.collected {
                continue;
            }
            let to_pickup = collectible.position - ground;
            let distance = to_pickup.length();
            if distance > range {
                continue;
            }
            if distance <= f32::EPSILON || forward.dot(to_pickup / distance) >= cos_half_angle {
                collectible.seen = true;
                log::debug!("Spotted battery {} at {:?}", collectible.id, collectible.position);
            }
        }
    }

    /// Events since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn hud(&self) -> HudSnapshot {
        HudSnapshot {
            battery: self.flashlight.battery(),
            mode: self.flashlight.mode(),
            mode_name: self.flashlight.mode().name(),
            warning_visible: self.flashlight.warning_visible(),
            intensity: self.flashlight.intensity(),
            is_day: self.day_night.is_day(),
            lights: self.day_night.lights(),
            pursuer_visible: self.pursuer.is_active(),
            pursuer_position: self.pursuer.is_active().then_some(self.pursuer.position),
        }
    }

    pub fn minimap(&self) -> MinimapSnapshot {
        let mut visited: Vec<IVec2> = self.visited.iter().copied().collect();
        visited.sort_unstable_by_key(|k| (k.x, k.y));

        MinimapSnapshot {
            visited,
            cell_size: self.config.world.cell_size,
            player_position: self.player.ground(),
            heading: self.player.yaw,
            collectibles: self
                .forest
                .collectibles
                .iter()
                .filter(|c| c.seen && !c.collected)
                .map(|c| c.position)
                .collect(),
            world_half_size: self.config.world.half_size,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Virtual time since the session started
    pub fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn grid(&self) -> &SpatialHashGrid {
        &self.grid
    }

    pub fn streamer(&self) -> &WorldStreamer {
        &self.streamer
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn flashlight(&self) -> &Flashlight {
        &self.flashlight
    }

    pub fn pursuer(&self) -> &Pursuer {
        &self.pursuer
    }

    pub fn pursuer_mut(&mut self) -> &mut Pursuer {
        &mut self.pursuer
    }

    pub fn day_night(&self) -> &DayNightCycle {
        &self.day_night
    }

    /// Outstanding timers (diagnostics)
    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending_count()
    }
}
