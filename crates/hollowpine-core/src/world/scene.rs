//! Scene collaborator interface
//!
//! The core never renders. It tells the host which obstacles entered or left
//! the active scene, and the host reports back when assets finish loading.

use ahash::AHashSet;

use super::forest::{Obstacle, ObstacleId};

/// Receives scene membership changes for obstacles
pub trait SceneSink {
    /// An obstacle became part of the rendered scene
    fn add_obstacle(&mut self, id: ObstacleId, obstacle: &Obstacle);

    /// An obstacle left the rendered scene
    fn remove_obstacle(&mut self, id: ObstacleId);
}

/// Discards every change (headless runs, benchmarks)
#[derive(Debug, Default)]
pub struct NoopScene;

impl SceneSink for NoopScene {
    fn add_obstacle(&mut self, _id: ObstacleId, _obstacle: &Obstacle) {}
    fn remove_obstacle(&mut self, _id: ObstacleId) {}
}

/// Tracks scene membership without drawing anything
#[derive(Debug, Default)]
pub struct SceneTracker {
    live: AHashSet<ObstacleId>,
    pub added: u64,
    pub removed: u64,
}

impl SceneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: ObstacleId) -> bool {
        self.live.contains(&id)
    }

    /// Obstacles currently in the scene
    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}

impl SceneSink for SceneTracker {
    fn add_obstacle(&mut self, id: ObstacleId, _obstacle: &Obstacle) {
        if self.live.insert(id) {
            self.added += 1;
        } else {
            log::warn!("Obstacle {:?} added to the scene twice", id);
        }
    }

    fn remove_obstacle(&mut self, id: ObstacleId) {
        if self.live.remove(&id) {
            self.removed += 1;
        }
    }
}

/// Assets the simulation waits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    PursuerSprite,
}

impl AssetKind {
    pub fn path(self) -> &'static str {
        match self {
            AssetKind::PursuerSprite => "ghost.png",
        }
    }
}

/// Opaque handle the host hands back once an asset is ready
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetHandle(pub u64);

/// Load state of an asset the simulation depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AssetState {
    #[default]
    Pending,
    Ready(AssetHandle),
    Failed,
}

impl AssetState {
    pub fn is_ready(self) -> bool {
        matches!(self, AssetState::Ready(_))
    }
}
