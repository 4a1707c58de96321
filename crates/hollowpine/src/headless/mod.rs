//! Headless session runner
//!
//! Drives a `SimulationWorld` with a scripted route at a fixed frame rate,
//! playing the part of the render host: it tracks scene membership, reports
//! the ghost sprite as loaded and tallies every event into a [`RunReport`].

mod report;
mod route;

use std::time::Duration;

use anyhow::Result;
use hollowpine_core::SimConfig;
use hollowpine_core::simulation::SimEvent;
use hollowpine_core::world::{AssetHandle, AssetKind, MoveOutcome, SceneTracker, SimulationWorld};

pub use report::RunReport;
pub use route::Route;

/// 60 fps, rounded to whole milliseconds
pub const FRAME_DT: Duration = Duration::from_millis(16);

/// Handle the headless host hands out for the ghost sprite
const GHOST_SPRITE: AssetHandle = AssetHandle(1);

pub fn run(config: SimConfig, seed: u64, frames: u64, route: Route) -> Result<RunReport> {
    let look_sensitivity = config.player.look_sensitivity;
    let mut world = SimulationWorld::new(config, seed)?;
    let mut scene = SceneTracker::new();

    world.start(&mut scene);
    world.on_asset_loaded(AssetKind::PursuerSprite, Ok(GHOST_SPRITE));

    let mut report = RunReport {
        seed,
        route: Some(route),
        trees: world.forest().tree_count(),
        fence_panels: world.forest().fences().len(),
        collectibles: world.forest().collectibles.len(),
        ..RunReport::default()
    };

    let mut last = world.player().ground();
    for frame in 0..frames {
        let input = route.input(frame, look_sensitivity);
        match world.tick(&input, FRAME_DT, &mut scene) {
            Some(MoveOutcome::SlideX | MoveOutcome::SlideZ) => report.slide_frames += 1,
            Some(MoveOutcome::Blocked) => report.blocked_frames += 1,
            _ => {}
        }

        let ground = world.player().ground();
        report.distance_walked += ground.distance(last);
        last = ground;

        for event in world.drain_events() {
            tally(&mut report, &event);
        }
    }

    let hud = world.hud();
    report.frames = world.frame();
    report.elapsed_ms = world.elapsed().as_millis() as u64;
    report.final_position = (last.x, last.y);
    report.visited_cells = world.minimap().visited.len();
    report.battery = hud.battery;
    report.flashlight_mode = hud.mode_name.to_string();
    report.is_day = hud.is_day;

    world.end(&mut scene);
    report.scene_added = scene.added;
    report.scene_removed = scene.removed;

    log::info!(
        "Headless run finished: {} frames, {:.1} units walked",
        report.frames,
        report.distance_walked
    );
    Ok(report)
}

fn tally(report: &mut RunReport, event: &SimEvent) {
    match event {
        SimEvent::PickupCollected { .. } => report.pickups += 1,
        SimEvent::PursuerSpawned { .. } => report.ghost_spawns += 1,
        SimEvent::PursuerTeleported { .. } => report.ghost_teleports += 1,
        SimEvent::PursuerCaptured => report.captures += 1,
        SimEvent::LanternFlicker => report.lantern_flickers += 1,
        SimEvent::DayNightToggled { .. } => report.day_night_toggles += 1,
        SimEvent::FlickerStarted { .. } => report.flicker_episodes += 1,
        SimEvent::BatteryDepleted => report.battery_depleted = true,
        SimEvent::QuadrantsStreamed { activated, .. } => {
            report.stream_updates += 1;
            report.quadrants_activated += activated.len() as u64;
        }
    }
}
