//! Procedural forest generation
//!
//! Tree placement is driven by a Park–Miller minimal-standard generator so a
//! seed always produces the same forest, tree for tree. Trunk dimensions are
//! cosmetic and come from a separate stream, leaving the placement sequence
//! untouched.

use ahash::AHashSet;
use glam::{DVec2, Vec2, Vec3};

use super::collision::Aabb;
use super::forest::{Collectible, Forest, QuadrantKey};
use super::rng_trait::{WorldRng, session_rng};
use crate::config::{ForestParams, SimConfig, WorldParams};

/// Fence panels hang with their center one unit above the ground
const FENCE_CENTER_Y: f32 = 1.0;

/// Minimal-standard linear congruential generator
///
/// `value = value * 16807 mod (2^31 - 1)`, normalized to [0, 1).
#[derive(Debug, Clone)]
pub struct ParkMillerRng {
    value: i64,
}

impl ParkMillerRng {
    pub const MODULUS: i64 = 2_147_483_647;
    pub const MULTIPLIER: i64 = 16_807;

    pub fn new(seed: u64) -> Self {
        let mut value = (seed % Self::MODULUS as u64) as i64;
        if value <= 0 {
            value += Self::MODULUS - 1;
        }
        Self { value }
    }

    /// Next value in [0, 1)
    pub fn next_f64(&mut self) -> f64 {
        // value < 2^31 and the multiplier < 2^15, so the product fits easily
        self.value = self.value * Self::MULTIPLIER % Self::MODULUS;
        (self.value - 1) as f64 / (Self::MODULUS - 1) as f64
    }
}

/// Builds the forest, border fences and battery pickups for a seed
pub struct ForestGenerator {
    pub seed: u64,
    world: WorldParams,
    forest: ForestParams,
}

impl ForestGenerator {
    pub fn new(seed: u64, config: &SimConfig) -> Self {
        Self {
            seed,
            world: config.world.clone(),
            forest: config.forest.clone(),
        }
    }

    /// Generate everything for this seed
    pub fn generate(&self) -> Forest {
        let mut forest = Forest::new();
        let mut placement = ParkMillerRng::new(self.seed);

        self.place_trees(&mut forest, &mut placement);
        self.place_fences(&mut forest);
        self.place_collectibles(&mut forest, &mut placement);

        log::info!(
            "Generated forest (seed={}): {} trees, {} fence panels, {} battery pickups",
            self.seed,
            forest.tree_count(),
            forest.fences().len(),
            forest.collectibles.len()
        );

        forest
    }

    /// Lattice pass: x outer, z inner, skipping the clearing around the origin
    fn place_trees(&self, forest: &mut Forest, placement: &mut ParkMillerRng) {
        let mut visual = session_rng(self.seed);
        let half = f64::from(self.world.half_size);
        let spacing = f64::from(self.forest.lattice_spacing);
        let path_radius = f64::from(self.forest.path_radius);
        let jitter = f64::from(self.forest.jitter);

        for x in lattice(half, spacing) {
            for z in lattice(half, spacing) {
                if (x * x + z * z).sqrt() < path_radius {
                    continue;
                }
                if placement.next_f64() <= self.forest.keep_threshold {
                    continue;
                }

                let tree_x = x + placement.next_f64() * jitter;
                let tree_z = z + placement.next_f64() * jitter;

                let radius =
                    self.forest.trunk_radius_min + visual.gen_f32() * self.forest.trunk_radius_span;
                let height =
                    self.forest.trunk_height_min + visual.gen_f32() * self.forest.trunk_height_span;

                let quadrant = QuadrantKey::from_placement(tree_x, tree_z, &self.world);
                forest.push_tree(quadrant, DVec2::new(tree_x, tree_z), radius, height);
            }
        }

        log::debug!("Placed {} trees", forest.tree_count());
    }

    /// Border ring of zero-thickness panels along all four edges
    fn place_fences(&self, forest: &mut Forest) {
        let half = self.world.half_size;
        let half_width = self.world.fence_width * 0.5;
        let half_height = self.world.fence_height * 0.5;
        let y_min = FENCE_CENTER_Y - half_height;
        let y_max = FENCE_CENTER_Y + half_height;

        let steps = (2.0 * half / self.world.fence_spacing).floor() as u32;
        for i in 0..=steps {
            let t = -half + i as f32 * self.world.fence_spacing;

            // Panels along x at both z edges span x
            for z in [-half, half] {
                let bounds = Aabb::new(
                    Vec3::new(t - half_width, y_min, z),
                    Vec3::new(t + half_width, y_max, z),
                );
                forest.push_fence(Vec2::new(t, z), bounds);
            }

            // Panels along z at both x edges span z
            for x in [-half, half] {
                let bounds = Aabb::new(
                    Vec3::new(x, y_min, t - half_width),
                    Vec3::new(x, y_max, t + half_width),
                );
                forest.push_fence(Vec2::new(x, t), bounds);
            }
        }
    }

    /// Second pass over quadrants; pickups keep at least one quadrant between them
    fn place_collectibles(&self, forest: &mut Forest, placement: &mut ParkMillerRng) {
        let max = self.world.max_quad_index();
        let size = f64::from(self.world.quadrant_size);
        let half = f64::from(self.world.half_size);
        let clearance = f64::from(self.forest.collectible_clearance);
        let mut occupied: AHashSet<QuadrantKey> = AHashSet::new();
        let mut collectibles = Vec::new();

        for qx in 0..=max {
            for qz in 0..=max {
                let key = QuadrantKey::new(qx, qz);
                if placement.next_f64() >= self.forest.collectible_chance {
                    continue;
                }

                let crowded = key
                    .neighborhood(max)
                    .any(|neighbor| neighbor != key && occupied.contains(&neighbor));
                if crowded {
                    continue;
                }

                let origin = DVec2::new(f64::from(qx) * size - half, f64::from(qz) * size - half);
                let trees = forest.chunk(key);
                for _ in 0..self.forest.collectible_attempts {
                    let x = origin.x + placement.next_f64() * size;
                    let z = origin.y + placement.next_f64() * size;
                    let candidate = DVec2::new(x, z);

                    let clear = trees
                        .iter()
                        .all(|tree| tree.placement.distance(candidate) > clearance);
                    if clear {
                        collectibles.push(Collectible::new(collectibles.len() as u32, candidate));
                        occupied.insert(key);
                        break;
                    }
                }

                if !occupied.contains(&key) {
                    log::trace!("No clear spot for a pickup in quadrant {}", key);
                }
            }
        }

        forest.collectibles = collectibles;
    }
}

/// Lattice coordinates `-half, -half + spacing, ...` strictly below `half`
fn lattice(half: f64, spacing: f64) -> impl Iterator<Item = f64> {
    (0..)
        .map(move |i| -half + f64::from(i) * spacing)
        .take_while(move |&v| v < half)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::forest::ObstacleKind;

    #[test]
    fn test_park_miller_known_sequence() {
        // Seed 1 gives the textbook minimal-standard sequence
        let mut rng = ParkMillerRng::new(1);
        let expected = [16_807_i64, 282_475_249, 1_622_650_073];
        for value in expected {
            let out = rng.next_f64();
            assert_eq!(out, (value - 1) as f64 / 2_147_483_646.0);
        }
    }

    #[test]
    fn test_park_miller_zero_seed_is_remapped() {
        let mut zero = ParkMillerRng::new(0);
        let mut max = ParkMillerRng::new(2_147_483_646);
        assert_eq!(zero.next_f64(), max.next_f64());
    }

    #[test]
    fn test_park_miller_range() {
        let mut rng = ParkMillerRng::new(987_654_321);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_lattice_matches_loop() {
        let values: Vec<f64> = lattice(10.0, 5.0).collect();
        assert_eq!(values, vec![-10.0, -5.0, 0.0, 5.0]);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let config = SimConfig::default();
        let a = ForestGenerator::new(777, &config).generate();
        let b = ForestGenerator::new(777, &config).generate();

        assert_eq!(a.obstacles(), b.obstacles());
        assert_eq!(a.collectibles, b.collectibles);
    }

    #[test]
    fn test_clearing_has_no_trees() {
        let config = SimConfig::default();
        let forest = ForestGenerator::new(42, &config).generate();
        // Lattice points inside radius 12 are skipped; jitter moves a tree by less than 2√2
        let min_distance = 12.0 - 2.0 * std::f32::consts::SQRT_2;
        for obstacle in forest.obstacles() {
            if obstacle.kind == ObstacleKind::Tree {
                assert!(
                    obstacle.position.length() >= min_distance,
                    "tree too close to origin: {:?}",
                    obstacle.position
                );
            }
        }
    }

    #[test]
    fn test_trees_live_in_their_quadrant() {
        let config = SimConfig::default();
        let forest = ForestGenerator::new(9, &config).generate();
        for (key, trees) in forest.chunks() {
            for tree in trees {
                assert_eq!(
                    QuadrantKey::from_placement(tree.placement.x, tree.placement.y, &config.world),
                    *key
                );
            }
        }
    }

    #[test]
    fn test_trunk_dimensions_within_range() {
        let config = SimConfig::default();
        let forest = ForestGenerator::new(5, &config).generate();
        for (_, trees) in forest.chunks() {
            for tree in trees {
                assert!((0.4..=0.8).contains(&tree.trunk_radius));
                assert!((10.0..=20.0).contains(&tree.trunk_height));
            }
        }
    }

    #[test]
    fn test_fence_ring_surrounds_world() {
        let config = SimConfig::default();
        let forest = ForestGenerator::new(1, &config).generate();
        // 0..=53 panels per edge position, four edges
        assert_eq!(forest.fences().len(), 54 * 4);
        for &id in forest.fences() {
            let fence = forest.obstacle(id).unwrap();
            assert_eq!(fence.kind, ObstacleKind::Fence);
            let on_edge = fence.position.x.abs() == 100.0 || fence.position.y.abs() == 100.0;
            assert!(on_edge);
        }
    }

    #[test]
    fn test_collectibles_keep_spacing_and_clearance() {
        let mut config = SimConfig::default();
        config.forest.collectible_chance = 1.0;
        let forest = ForestGenerator::new(31337, &config).generate();
        assert!(!forest.collectibles.is_empty());

        let keys: Vec<QuadrantKey> = forest
            .collectibles
            .iter()
            .map(|c| QuadrantKey::from_placement(c.placement.x, c.placement.y, &config.world))
            .collect();

        for (i, a) in keys.iter().enumerate() {
            for b in keys.iter().skip(i + 1) {
                let gap = (a.0 - b.0).abs();
                assert!(gap.x > 1 || gap.y > 1, "pickups in adjacent quadrants {a} and {b}");
            }
        }

        for (collectible, key) in forest.collectibles.iter().zip(&keys) {
            for tree in forest.chunk(*key) {
                assert!(tree.placement.distance(collectible.placement) > 2.0);
            }
        }
    }

    #[test]
    fn test_zero_chance_places_no_collectibles() {
        let mut config = SimConfig::default();
        config.forest.collectible_chance = 0.0;
        let forest = ForestGenerator::new(8, &config).generate();
        assert!(forest.collectibles.is_empty());
    }
}
