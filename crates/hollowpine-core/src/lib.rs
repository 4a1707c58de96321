//! Simulation core for a first-person night walk through a procedurally
//! generated forest: streaming, collision, flashlight battery, the ghost and
//! the day/night cycle. Rendering, audio and input capture belong to the host.

pub mod config;
pub mod entity;
pub mod error;
pub mod simulation;
pub mod world;

pub use config::SimConfig;
pub use error::{AssetError, ConfigError};
pub use world::{HudSnapshot, MinimapSnapshot, SessionPhase, SimulationWorld};
