//! Uniform spatial hash for obstacle collision queries
//!
//! Obstacles are bucketed by the cell containing their ground position.
//! Neighborhood queries look at the 3×3 block of cells around a point, so the
//! cell size must be at least the widest obstacle footprint for the query to
//! be exhaustive.

use ahash::AHashMap;
use glam::IVec2;
use smallvec::SmallVec;

use super::forest::ObstacleId;

type Bucket = SmallVec<[ObstacleId; 4]>;

/// Obstacle index keyed by integer cell coordinates
#[derive(Debug, Clone)]
pub struct SpatialHashGrid {
    cell_size: f32,
    cells: AHashMap<IVec2, Bucket>,
    len: usize,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Cell containing a ground position
    pub fn cell_key(&self, x: f32, z: f32) -> IVec2 {
        cell_key(x, z, self.cell_size)
    }

    /// Register an obstacle under the cell of (x, z)
    ///
    /// Re-inserting an obstacle already present in that cell is a no-op.
    pub fn insert(&mut self, obstacle: ObstacleId, x: f32, z: f32) {
        let key = self.cell_key(x, z);
        let bucket = self.cells.entry(key).or_default();
        if !bucket.contains(&obstacle) {
            bucket.push(obstacle);
            self.len += 1;
        }
    }

    /// Unregister an obstacle from the cell of (x, z); absent obstacles are ignored
    pub fn remove(&mut self, obstacle: ObstacleId, x: f32, z: f32) {
        let key = self.cell_key(x, z);
        let Some(bucket) = self.cells.get_mut(&key) else {
            return;
        };

        if let Some(index) = bucket.iter().position(|&id| id == obstacle) {
            // Keep insertion order within the cell
            bucket.remove(index);
            self.len -= 1;
        }

        if bucket.is_empty() {
            self.cells.remove(&key);
        }
    }

    /// All obstacles in the 3×3 block of cells centered on the cell of (x, z)
    pub fn query_neighborhood(&self, x: f32, z: f32) -> Vec<ObstacleId> {
        let center = self.cell_key(x, z);
        let mut result = Vec::new();
        for dx in -1..=1 {
            for dz in -1..=1 {
                if let Some(bucket) = self.cells.get(&(center + IVec2::new(dx, dz))) {
                    result.extend_from_slice(bucket);
                }
            }
        }
        result
    }

    /// Whether the obstacle is registered under the cell of (x, z)
    pub fn contains(&self, obstacle: ObstacleId, x: f32, z: f32) -> bool {
        self.cells
            .get(&self.cell_key(x, z))
            .is_some_and(|bucket| bucket.contains(&obstacle))
    }

    /// Number of registered obstacles
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of non-empty cells
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.len = 0;
    }
}

/// Cell coordinates for a ground position: `(floor(x / size), floor(z / size))`
pub fn cell_key(x: f32, z: f32, cell_size: f32) -> IVec2 {
    IVec2::new(
        (x / cell_size).floor() as i32,
        (z / cell_size).floor() as i32,
    )
}
