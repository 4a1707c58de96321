//! Summary of a headless run

use std::fmt;

use serde::Serialize;

use super::route::Route;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub seed: u64,
    pub route: Option<Route>,
    pub frames: u64,
    pub elapsed_ms: u64,

    // World
    pub trees: usize,
    pub fence_panels: usize,
    pub collectibles: usize,

    // Movement
    pub distance_walked: f32,
    pub slide_frames: u64,
    pub blocked_frames: u64,
    pub final_position: (f32, f32),
    pub visited_cells: usize,

    // Streaming
    pub stream_updates: u64,
    pub quadrants_activated: u64,
    pub scene_added: u64,
    pub scene_removed: u64,

    // Events
    pub pickups: u64,
    pub flicker_episodes: u64,
    pub battery_depleted: bool,
    pub ghost_spawns: u64,
    pub ghost_teleports: u64,
    pub lantern_flickers: u64,
    pub captures: u64,
    pub day_night_toggles: u64,

    // Final HUD
    pub battery: f32,
    pub flashlight_mode: String,
    pub is_day: bool,
}

impl RunReport {
    pub fn to_ron(&self) -> anyhow::Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Hollowpine run (seed {}) ===", self.seed)?;
        if let Some(route) = self.route {
            writeln!(f, "Route:        {:?}", route)?;
        }
        writeln!(f, "Frames:       {} ({:.1}s virtual)", self.frames, self.elapsed_ms as f64 / 1000.0)?;
        writeln!(
            f,
            "World:        {} trees, {} fence panels, {} batteries",
            self.trees, self.fence_panels, self.collectibles
        )?;
        writeln!(
            f,
            "Movement:     {:.1} units walked, {} sliding / {} blocked frames, ended at ({:.1}, {:.1})",
            self.distance_walked,
            self.slide_frames,
            self.blocked_frames,
            self.final_position.0,
            self.final_position.1
        )?;
        writeln!(f, "Minimap:      {} cells visited", self.visited_cells)?;
        writeln!(
            f,
            "Streaming:    {} updates, {} quadrants activated, scene +{} / -{}",
            self.stream_updates, self.quadrants_activated, self.scene_added, self.scene_removed
        )?;
        writeln!(
            f,
            "Flashlight:   {:.0}% ({}), {} pickups, {} flicker episodes{}",
            self.battery,
            self.flashlight_mode,
            self.pickups,
            self.flicker_episodes,
            if self.battery_depleted { ", ran dry" } else { "" }
        )?;
        writeln!(
            f,
            "Ghost:        {} spawns, {} teleports, {} lantern flickers, {} captures",
            self.ghost_spawns, self.ghost_teleports, self.lantern_flickers, self.captures
        )?;
        write!(
            f,
            "Sky:          {} toggles, ending in {}",
            self.day_night_toggles,
            if self.is_day { "day" } else { "night" }
        )
    }
}
