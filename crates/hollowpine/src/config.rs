//! Runner configuration with layered loading
//!
//! Configuration is loaded from multiple sources (lowest to highest priority):
//! 1. Compiled defaults (`SimConfig::default()`)
//! 2. `hollowpine.ron` in the working directory, or the file given with `--config`
//! 3. Environment variables prefixed with `HOLLOWPINE_`
//!
//! Example environment variable: `HOLLOWPINE_FLASHLIGHT__PICKUP_CHARGE=50`

use std::path::Path;

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use hollowpine_core::SimConfig;

/// Load and validate the simulation config
///
/// With `path` set, the file must exist; otherwise `hollowpine.ron` is optional.
pub fn load(path: Option<&Path>) -> Result<SimConfig> {
    let defaults = SimConfig::default();

    let file = match path {
        Some(path) => File::from(path).format(FileFormat::Ron).required(true),
        None => File::with_name("hollowpine")
            .format(FileFormat::Ron)
            .required(false),
    };

    let builder = Config::builder()
        // Layer 1: headline defaults; every other field falls back to serde defaults
        .set_default("world.half_size", f64::from(defaults.world.half_size))?
        .set_default("world.cell_size", f64::from(defaults.world.cell_size))?
        .set_default("world.quadrant_size", f64::from(defaults.world.quadrant_size))?
        .set_default("player.speed", f64::from(defaults.player.speed))?
        .set_default("day_night.start_day", defaults.day_night.start_day)?
        // Layer 2: config file
        .add_source(file)
        // Layer 3: environment (HOLLOWPINE_WORLD__CELL_SIZE, etc.)
        .add_source(Environment::with_prefix("HOLLOWPINE").separator("__"));

    let layered = builder.build().context("Failed to build configuration")?;
    let config: SimConfig = layered
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    config.validate().context("Invalid configuration")?;
    Ok(config)
}
