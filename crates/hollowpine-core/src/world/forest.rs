//! Generated forest content - obstacles, quadrant chunks and battery pickups

use std::fmt;

use ahash::AHashMap;
use glam::{DVec2, IVec2, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use crate::config::WorldParams;

/// Handle to an obstacle in the forest's obstacle table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObstacleId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Streamed with its quadrant
    Tree,
    /// Border panel, registered once for the whole session
    Fence,
}

/// A placed object the player collides with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: ObstacleId,
    pub kind: ObstacleKind,
    /// Ground position (x, z) used for grid registration
    pub position: Vec2,
    pub bounds: Aabb,
}

/// A tree trunk; everything above the trunk is visual only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub id: ObstacleId,
    /// Generated position, exactly as placed
    pub placement: DVec2,
    /// `placement` narrowed for collision and rendering
    pub position: Vec2,
    pub trunk_radius: f32,
    pub trunk_height: f32,
}

impl Tree {
    pub fn bounds(&self) -> Aabb {
        Aabb::new(
            Vec3::new(
                self.position.x - self.trunk_radius,
                0.0,
                self.position.y - self.trunk_radius,
            ),
            Vec3::new(
                self.position.x + self.trunk_radius,
                self.trunk_height,
                self.position.y + self.trunk_radius,
            ),
        )
    }
}

/// Battery pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub placement: DVec2,
    pub position: Vec2,
    /// Spotted by the player; shown on the minimap from then on
    pub seen: bool,
    /// Picked up; never comes back
    pub collected: bool,
}

impl Collectible {
    pub fn new(id: u32, placement: DVec2) -> Self {
        Self {
            id,
            placement,
            position: placement.as_vec2(),
            seen: false,
            collected: false,
        }
    }

    /// Bounding cube resting on the ground
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_center_size(
            Vec3::new(self.position.x, size * 0.5, self.position.y),
            Vec3::splat(size),
        )
    }
}

/// Streaming quadrant coordinates, always within `[0, max_quad_index]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuadrantKey(pub IVec2);

impl Ord for QuadrantKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.x(), self.z()).cmp(&(other.x(), other.z()))
    }
}

impl PartialOrd for QuadrantKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl QuadrantKey {
    pub fn new(x: i32, z: i32) -> Self {
        Self(IVec2::new(x, z))
    }

    /// Quadrant containing a ground position, clamped to the world bounds
    pub fn from_position(x: f32, z: f32, world: &WorldParams) -> Self {
        let max = world.max_quad_index();
        let axis = |v: f32| {
            (((v + world.half_size) / world.quadrant_size).floor() as i32).clamp(0, max)
        };
        Self::new(axis(x), axis(z))
    }

    /// Same as [`QuadrantKey::from_position`] for a generated f64 position
    pub fn from_placement(x: f64, z: f64, world: &WorldParams) -> Self {
        let max = world.max_quad_index();
        let half = f64::from(world.half_size);
        let size = f64::from(world.quadrant_size);
        let axis = |v: f64| (((v + half) / size).floor() as i32).clamp(0, max);
        Self::new(axis(x), axis(z))
    }

    pub fn x(self) -> i32 {
        self.0.x
    }

    pub fn z(self) -> i32 {
        self.0.y
    }

    /// The 3×3 block around this key, skipping keys outside `[0, max]`
    pub fn neighborhood(self, max: i32) -> impl Iterator<Item = QuadrantKey> {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).filter_map(move |dz| {
                let key = self.0 + IVec2::new(dx, dz);
                let in_range = (0..=max).contains(&key.x) && (0..=max).contains(&key.y);
                in_range.then_some(QuadrantKey(key))
            })
        })
    }

    /// World-space minimum corner (x, z) of this quadrant
    pub fn origin(self, world: &WorldParams) -> Vec2 {
        Vec2::new(
            self.x() as f32 * world.quadrant_size - world.half_size,
            self.z() as f32 * world.quadrant_size - world.half_size,
        )
    }
}

impl fmt::Display for QuadrantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x(), self.z())
    }
}

/// Everything generated for one session
#[derive(Debug, Clone, Default)]
pub struct Forest {
    /// Obstacle table indexed by `ObstacleId`
    obstacles: Vec<Obstacle>,
    /// Trees per quadrant, in generation order
    chunks: AHashMap<QuadrantKey, Vec<Tree>>,
    /// Border panels, never streamed
    fences: Vec<ObstacleId>,
    pub collectibles: Vec<Collectible>,
}

impl Forest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree to its quadrant chunk and the obstacle table
    pub(crate) fn push_tree(
        &mut self,
        quadrant: QuadrantKey,
        placement: DVec2,
        trunk_radius: f32,
        trunk_height: f32,
    ) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len() as u32);
        let position = placement.as_vec2();
        let tree = Tree {
            id,
            placement,
            position,
            trunk_radius,
            trunk_height,
        };
        self.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Tree,
            position,
            bounds: tree.bounds(),
        });
        self.chunks.entry(quadrant).or_default().push(tree);
        id
    }

    pub(crate) fn push_fence(&mut self, position: Vec2, bounds: Aabb) -> ObstacleId {
        let id = ObstacleId(self.obstacles.len() as u32);
        self.obstacles.push(Obstacle {
            id,
            kind: ObstacleKind::Fence,
            position,
            bounds,
        });
        self.fences.push(id);
        id
    }

    pub fn obstacle(&self, id: ObstacleId) -> Option<&Obstacle> {
        self.obstacles.get(id.0 as usize)
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Trees of one quadrant; empty for quadrants without trees
    pub fn chunk(&self, key: QuadrantKey) -> &[Tree] {
        self.chunks.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn chunks(&self) -> impl Iterator<Item = (&QuadrantKey, &Vec<Tree>)> {
        self.chunks.iter()
    }

    pub fn fences(&self) -> &[ObstacleId] {
        &self.fences
    }

    pub fn tree_count(&self) -> usize {
        self.chunks.values().map(Vec::len).sum()
    }
}
