//! World management - generation, streaming, collision and the session

pub mod collision;
pub mod day_night;
pub mod forest;
pub mod generation;
pub mod player_physics;
pub mod rng_trait;
pub mod scene;
pub mod spatial_grid;
pub mod streamer;
#[allow(clippy::module_inception)]
mod world;

pub use collision::Aabb;
pub use day_night::{DayNightCycle, LightParams};
pub use forest::{Collectible, Forest, Obstacle, ObstacleId, ObstacleKind, QuadrantKey, Tree};
pub use generation::{ForestGenerator, ParkMillerRng};
pub use player_physics::{MoveOutcome, MovementResolver, MovementState};
pub use rng_trait::{SessionRng, WorldRng, session_rng};
pub use scene::{AssetHandle, AssetKind, AssetState, NoopScene, SceneSink, SceneTracker};
pub use spatial_grid::SpatialHashGrid;
pub use streamer::{StreamDelta, WorldStreamer};
pub use world::{HudSnapshot, MinimapSnapshot, SessionPhase, SimulationWorld};
