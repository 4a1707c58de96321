//! Simulation configuration - serializable tuning parameters
//!
//! Every constant the simulation uses lives here with the value the game
//! ships with as its default. The seed is NOT part of the config: same config
//! + different seed = different forest.
//!
//! Configs round-trip through RON so presets can be kept next to the binary.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Complete simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// World bounds, collision cells and streaming quadrants
    pub world: WorldParams,
    /// Tree lattice and battery pickup placement
    pub forest: ForestParams,
    /// Movement, camera bob and view cone
    pub player: PlayerParams,
    /// Battery drain, intensity table and flicker episodes
    pub flashlight: FlashlightParams,
    /// Ghost spawn, awareness and capture
    pub pursuer: PursuerParams,
    /// Light transition timing
    pub day_night: DayNightParams,
}

/// World bounds and spatial partitioning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldParams {
    /// Half the side length of the square world (default: 100)
    pub half_size: f32,
    /// Collision cell size; must be at least the widest obstacle (default: 10)
    pub cell_size: f32,
    /// Streaming quadrant size (default: 25)
    pub quadrant_size: f32,
    /// Distance between border fence panels (default: 3.75)
    pub fence_spacing: f32,
    /// Width of a fence panel (default: 4)
    pub fence_width: f32,
    /// Height of a fence panel (default: 4)
    pub fence_height: f32,
}

impl Default for WorldParams {
    fn default() -> Self {
        Self {
            half_size: 100.0,
            cell_size: 10.0,
            quadrant_size: 25.0,
            fence_spacing: 3.75,
            fence_width: 4.0,
            fence_height: 4.0,
        }
    }
}

impl WorldParams {
    /// Highest valid quadrant index on either axis
    pub fn max_quad_index(&self) -> i32 {
        ((2.0 * self.half_size / self.quadrant_size).ceil() as i32 - 1).max(0)
    }
}

/// Forest lattice and pickup placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Lattice step between candidate tree positions (default: 5)
    pub lattice_spacing: f32,
    /// Radius of the tree-free clearing around the origin (default: 12)
    pub path_radius: f32,
    /// A lattice point keeps its tree when `rng() > keep_threshold` (default: 0.3)
    pub keep_threshold: f64,
    /// Maximum positive jitter applied to each axis (default: 2)
    pub jitter: f32,
    /// Trunk radius range (default: 0.4..0.8)
    pub trunk_radius_min: f32,
    pub trunk_radius_span: f32,
    /// Trunk height range (default: 10..20)
    pub trunk_height_min: f32,
    pub trunk_height_span: f32,
    /// Chance a quadrant tries to host a battery pickup (default: 0.35)
    pub collectible_chance: f64,
    /// Random offsets tried before giving up on a quadrant (default: 5)
    pub collectible_attempts: u32,
    /// Minimum distance from every tree in the quadrant (default: 2)
    pub collectible_clearance: f32,
    /// Edge length of a pickup's bounding cube (default: 0.6)
    pub collectible_size: f32,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            lattice_spacing: 5.0,
            path_radius: 12.0,
            keep_threshold: 0.3,
            jitter: 2.0,
            trunk_radius_min: 0.4,
            trunk_radius_span: 0.4,
            trunk_height_min: 10.0,
            trunk_height_span: 10.0,
            collectible_chance: 0.35,
            collectible_attempts: 5,
            collectible_clearance: 2.0,
            collectible_size: 0.6,
        }
    }
}

/// Player movement and view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerParams {
    /// Displacement per active control per frame (default: 0.15)
    pub speed: f32,
    /// Bounding box width/depth (default: 1)
    pub box_width: f32,
    /// Bounding box height, centered at half height (default: 3)
    pub box_height: f32,
    /// Camera height when idle (default: 3)
    pub base_height: f32,
    /// Camera bob amplitude (default: 0.1)
    pub bob_amplitude: f32,
    /// Bob phase advance per moving frame (default: 0.1)
    pub bob_rate: f32,
    /// Radians per pixel of mouse movement (default: 0.002)
    pub look_sensitivity: f32,
    /// Maximum absolute pitch in radians (default: PI / 2.5)
    pub pitch_limit: f32,
    /// Distance within which a pickup can be spotted (default: 20)
    pub view_range: f32,
    /// Half-angle of the spotting cone in degrees (default: 37.5)
    pub view_half_angle_deg: f32,
}

impl Default for PlayerParams {
    fn default() -> Self {
        Self {
            speed: 0.15,
            box_width: 1.0,
            box_height: 3.0,
            base_height: 3.0,
            bob_amplitude: 0.1,
            bob_rate: 0.1,
            look_sensitivity: 0.002,
            pitch_limit: std::f32::consts::PI / 2.5,
            view_range: 20.0,
            view_half_angle_deg: 37.5,
        }
    }
}

/// Battery and flashlight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlashlightParams {
    /// Battery drained per drain tick while the light is on (default: 1)
    pub drain_per_tick: f32,
    /// Drain tick period in milliseconds (default: 1000)
    pub drain_interval_ms: u64,
    /// Below this level the light flickers and the HUD warns (default: 25)
    pub warning_threshold: f32,
    /// Charge restored by one battery pickup (default: 30)
    pub pickup_charge: f32,
    /// Mode intensities (default: 6.66 / 10 / 3.33)
    pub medium_intensity: f32,
    pub high_intensity: f32,
    pub low_intensity: f32,
    /// Flicker episode length: `min + rand * extra` ms (default: 1000 + 2000)
    pub flicker_min_ms: f64,
    pub flicker_extra_ms: f64,
    /// Step interval at the warning threshold, scaled by battery (default: 500)
    pub flicker_base_interval_ms: f64,
    /// Fastest step interval (default: 50)
    pub flicker_min_interval_ms: f64,
    /// Random intensity while flickering: `low + rand * span` (default: 5 + 10)
    pub flicker_intensity_low: f32,
    pub flicker_intensity_span: f32,
}

impl Default for FlashlightParams {
    fn default() -> Self {
        Self {
            drain_per_tick: 1.0,
            drain_interval_ms: 1000,
            warning_threshold: 25.0,
            pickup_charge: 30.0,
            medium_intensity: 6.66,
            high_intensity: 10.0,
            low_intensity: 3.33,
            flicker_min_ms: 1000.0,
            flicker_extra_ms: 2000.0,
            flicker_base_interval_ms: 500.0,
            flicker_min_interval_ms: 50.0,
            flicker_intensity_low: 5.0,
            flicker_intensity_span: 10.0,
        }
    }
}

/// Ghost behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PursuerParams {
    /// Spawn roll period in milliseconds (default: 20000)
    pub spawn_check_interval_ms: u64,
    /// Chance per roll to spawn while dormant (default: 0.1)
    pub spawn_chance: f32,
    /// Spawn distance band: `min + rand * span` (default: 15 + 10)
    pub spawn_distance_min: f32,
    pub spawn_distance_span: f32,
    /// Sprite height above ground (default: 1.5)
    pub spawn_height: f32,
    /// Beyond this angle from the player's forward vector the ghost teleports (default: 90)
    pub awareness_angle_deg: f32,
    /// Distance that triggers the one-shot lantern flicker (default: 10)
    pub flicker_distance: f32,
    /// Distance at which the ghost reaches the player (default: 2)
    pub capture_distance: f32,
    /// On/off cycles of the lantern flicker (default: 3)
    pub lantern_flicker_times: u32,
    /// Delay between lantern toggles in milliseconds (default: 200)
    pub lantern_flicker_interval_ms: u64,
    /// Drift toward the player per frame while in view (default: 0.05)
    pub approach_speed: f32,
}

impl Default for PursuerParams {
    fn default() -> Self {
        Self {
            spawn_check_interval_ms: 20_000,
            spawn_chance: 0.1,
            spawn_distance_min: 15.0,
            spawn_distance_span: 10.0,
            spawn_height: 1.5,
            awareness_angle_deg: 90.0,
            flicker_distance: 10.0,
            capture_distance: 2.0,
            lantern_flicker_times: 3,
            lantern_flicker_interval_ms: 200,
            approach_speed: 0.05,
        }
    }
}

/// Day/night transition timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DayNightParams {
    /// Total transition duration in milliseconds (default: 2000)
    pub transition_ms: u64,
    /// Interpolation steps per transition (default: 60)
    pub steps: u32,
    /// Automatic toggle period in milliseconds, 0 disables it (default: 120000)
    pub auto_cycle_ms: u64,
    /// Start the session in daylight (default: false)
    pub start_day: bool,
}

impl Default for DayNightParams {
    fn default() -> Self {
        Self {
            transition_ms: 2000,
            steps: 60,
            auto_cycle_ms: 120_000,
            start_day: false,
        }
    }
}

impl SimConfig {
    /// Parse a (possibly partial) RON document; missing fields use defaults
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON for presets
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("world.half_size", self.world.half_size),
            ("world.cell_size", self.world.cell_size),
            ("world.quadrant_size", self.world.quadrant_size),
            ("world.fence_spacing", self.world.fence_spacing),
            ("forest.lattice_spacing", self.forest.lattice_spacing),
            ("player.box_width", self.player.box_width),
            ("player.box_height", self.player.box_height),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(field, format!("must be positive, got {value}")));
            }
        }

        let probabilities = [
            ("forest.keep_threshold", self.forest.keep_threshold),
            ("forest.collectible_chance", self.forest.collectible_chance),
            ("pursuer.spawn_chance", f64::from(self.pursuer.spawn_chance)),
        ];
        for (field, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::invalid(field, format!("must be within [0, 1], got {value}")));
            }
        }

        if self.flashlight.drain_interval_ms == 0 {
            return Err(ConfigError::invalid("flashlight.drain_interval_ms", "must be non-zero"));
        }
        if self.pursuer.spawn_check_interval_ms == 0 {
            return Err(ConfigError::invalid("pursuer.spawn_check_interval_ms", "must be non-zero"));
        }
        if self.day_night.steps == 0 {
            return Err(ConfigError::invalid("day_night.steps", "must be non-zero"));
        }
        let flicker_lengths = [
            ("flashlight.flicker_min_ms", self.flashlight.flicker_min_ms),
            ("flashlight.flicker_extra_ms", self.flashlight.flicker_extra_ms),
        ];
        for (field, value) in flicker_lengths {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be a non-negative number, got {value}"),
                ));
            }
        }
        if self.flashlight.flicker_min_interval_ms <= 0.0 {
            return Err(ConfigError::invalid(
                "flashlight.flicker_min_interval_ms",
                "must be positive",
            ));
        }

        let widest_tree = 2.0 * (self.forest.trunk_radius_min + self.forest.trunk_radius_span);
        if self.world.cell_size < widest_tree {
            return Err(ConfigError::invalid(
                "world.cell_size",
                format!("must be at least the widest trunk ({widest_tree})"),
            ));
        }
        if self.world.cell_size < self.world.fence_width {
            log::warn!(
                "cell_size {} is narrower than a fence panel ({}); border collisions may be missed",
                self.world.cell_size,
                self.world.fence_width
            );
        }

        Ok(())
    }
}
