//! Quadrant streaming - materializing trees around the player
//!
//! Only the 3×3 block of quadrants around the player is live: its trees are
//! in the scene and registered in the collision grid. Each update touches only
//! the quadrants that entered or left that block, so the cost is bounded by
//! the change in the active set rather than by world size.

use ahash::AHashSet;

use super::forest::{Forest, QuadrantKey};
use super::scene::SceneSink;
use super::spatial_grid::SpatialHashGrid;
use crate::config::WorldParams;

/// Quadrants that changed state during one update
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamDelta {
    pub activated: Vec<QuadrantKey>,
    pub deactivated: Vec<QuadrantKey>,
}

impl StreamDelta {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty() && self.deactivated.is_empty()
    }
}

/// Owns quadrant activation state; the only writer of streamed grid content
pub struct WorldStreamer {
    world: WorldParams,

    /// Quadrants whose trees are currently materialized
    active: AHashSet<QuadrantKey>,

    /// Quadrant the player stood in at the last update
    last_center: Option<QuadrantKey>,
}

impl WorldStreamer {
    pub fn new(world: WorldParams) -> Self {
        Self {
            world,
            active: AHashSet::new(),
            last_center: None,
        }
    }

    /// Bring the active set in line with the player's position
    ///
    /// Must run before movement resolution so collision queries see the
    /// freshly streamed trees.
    pub fn update_visible_chunks(
        &mut self,
        player_x: f32,
        player_z: f32,
        forest: &Forest,
        grid: &mut SpatialHashGrid,
        scene: &mut dyn SceneSink,
    ) -> StreamDelta {
        let center = QuadrantKey::from_position(player_x, player_z, &self.world);
        if self.last_center == Some(center) {
            return StreamDelta::default();
        }
        self.last_center = Some(center);

        let wanted: AHashSet<QuadrantKey> =
            center.neighborhood(self.world.max_quad_index()).collect();

        let mut deactivated: Vec<QuadrantKey> = self.active.difference(&wanted).copied().collect();
        let mut activated: Vec<QuadrantKey> = wanted.difference(&self.active).copied().collect();
        // Hash order is arbitrary; keep scene/grid mutation order reproducible
        deactivated.sort_unstable();
        activated.sort_unstable();

        for &key in &deactivated {
            Self::dematerialize(key, forest, grid, scene);
            self.active.remove(&key);
        }
        for &key in &activated {
            Self::materialize(key, forest, grid, scene);
            self.active.insert(key);
        }

        let delta = StreamDelta {
            activated,
            deactivated,
        };
        if !delta.is_empty() {
            log::debug!(
                "[STREAM] Player in quadrant {}: +{} / -{} quadrants, {} active",
                center,
                delta.activated.len(),
                delta.deactivated.len(),
                self.active.len()
            );
        }
        delta
    }

    /// Remove every streamed tree (session teardown)
    pub fn deactivate_all(
        &mut self,
        forest: &Forest,
        grid: &mut SpatialHashGrid,
        scene: &mut dyn SceneSink,
    ) {
        let mut keys: Vec<QuadrantKey> = self.active.drain().collect();
        keys.sort_unstable();
        for key in keys {
            Self::dematerialize(key, forest, grid, scene);
        }
        self.last_center = None;
    }

    fn materialize(
        key: QuadrantKey,
        forest: &Forest,
        grid: &mut SpatialHashGrid,
        scene: &mut dyn SceneSink,
    ) {
        for tree in forest.chunk(key) {
            if let Some(obstacle) = forest.obstacle(tree.id) {
                scene.add_obstacle(tree.id, obstacle);
                grid.insert(tree.id, tree.position.x, tree.position.y);
            }
        }
    }

    fn dematerialize(
        key: QuadrantKey,
        forest: &Forest,
        grid: &mut SpatialHashGrid,
        scene: &mut dyn SceneSink,
    ) {
        for tree in forest.chunk(key) {
            scene.remove_obstacle(tree.id);
            grid.remove(tree.id, tree.position.x, tree.position.y);
        }
    }

    pub fn is_active(&self, key: QuadrantKey) -> bool {
        self.active.contains(&key)
    }

    /// Active quadrants in key order
    pub fn active_quadrants(&self) -> Vec<QuadrantKey> {
        let mut keys: Vec<QuadrantKey> = self.active.iter().copied().collect();
        keys.sort_unstable();
        keys
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
