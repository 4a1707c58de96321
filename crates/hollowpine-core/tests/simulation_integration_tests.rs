//! Integration tests for a whole session
//!
//! These drive `SimulationWorld` through its public API the way a host
//! would: start, tick with input, read events and snapshots, pause, end.

use std::f32::consts::PI;
use std::time::Duration;

use glam::{DVec2, Vec2, Vec3};
use hollowpine_core::entity::input::InputState;
use hollowpine_core::entity::pursuer::PursuerState;
use hollowpine_core::simulation::events::SimEvent;
use hollowpine_core::world::{
    AssetHandle, AssetKind, ForestGenerator, MoveOutcome, ObstacleKind, ParkMillerRng, QuadrantKey,
    SceneSink, SceneTracker, Tree,
};
use hollowpine_core::{SessionPhase, SimConfig, SimulationWorld};

const FRAME: Duration = Duration::from_millis(16);

fn started(config: SimConfig, seed: u64) -> (SimulationWorld, SceneTracker) {
    let mut world = SimulationWorld::new(config, seed).unwrap();
    let mut scene = SceneTracker::new();
    world.start(&mut scene);
    (world, scene)
}

fn run_ms(world: &mut SimulationWorld, scene: &mut dyn SceneSink, ms: u64) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for _ in 0..ms / FRAME.as_millis() as u64 {
        world.tick(&InputState::new(), FRAME, scene);
        events.extend(world.drain_events());
    }
    events
}

/// Open ground inside the fence ring
fn treeless() -> SimConfig {
    let mut config = SimConfig::default();
    config.forest.keep_threshold = 1.0;
    config
}

// ============================================================================
// Generation Tests
// ============================================================================

/// Trees for one quadrant, recomputed straight from the placement sequence
fn expected_quadrant(seed: u64, config: &SimConfig, wanted: QuadrantKey) -> Vec<DVec2> {
    let mut rng = ParkMillerRng::new(seed);
    let half = f64::from(config.world.half_size);
    let spacing = f64::from(config.forest.lattice_spacing);
    let mut trees = Vec::new();

    let mut x = -half;
    while x < half {
        let mut z = -half;
        while z < half {
            let on_path = (x * x + z * z).sqrt() < 12.0;
            if !on_path && rng.next_f64() > 0.3 {
                let tree_x = x + rng.next_f64() * 2.0;
                let tree_z = z + rng.next_f64() * 2.0;
                if QuadrantKey::from_placement(tree_x, tree_z, &config.world) == wanted {
                    trees.push(DVec2::new(tree_x, tree_z));
                }
            }
            z += spacing;
        }
        x += spacing;
    }
    trees
}

fn placements(trees: &[Tree]) -> Vec<DVec2> {
    trees.iter().map(|t| t.placement).collect()
}

#[test]
fn test_quadrant_10_10_is_reproducible() {
    let mut config = SimConfig::default();
    config.world.half_size = 300.0;
    config.world.cell_size = 3.0;
    config.world.quadrant_size = 25.0;

    let key = QuadrantKey::new(10, 10);
    let forest = ForestGenerator::new(12345, &config).generate();
    let generated = placements(forest.chunk(key));

    // Known-good values for seed 12345, bit for bit
    assert_eq!(generated.len(), 20);
    let golden = [
        DVec2::new(-48.987011274310774, -48.698479616733714),
        DVec2::new(-49.566404129906005, -43.55419907118585),
        DVec2::new(-48.55589322890704, -38.89749389039119),
        DVec2::new(-48.04617612720111, -33.082169507706695),
    ];
    assert_eq!(&generated[..4], &golden);
    assert_eq!(generated[19], DVec2::new(-29.17025103156478, -28.40907835067164));

    assert_eq!(generated, expected_quadrant(12345, &config, key));

    // Same through a full session
    let world = SimulationWorld::new(config, 12345).unwrap();
    assert_eq!(placements(world.forest().chunk(key)), generated);
}

#[test]
fn test_tree_counts_vary_with_seed() {
    let config = SimConfig::default();
    let counts: Vec<usize> = (1..=5)
        .map(|seed| ForestGenerator::new(seed, &config).generate().tree_count())
        .collect();

    assert_eq!(counts, vec![1098, 1119, 1118, 1109, 1077]);
    let distinct: std::collections::BTreeSet<usize> = counts.iter().copied().collect();
    assert!(distinct.len() > 1);
}

#[test]
fn test_different_seeds_differ() {
    let config = SimConfig::default();
    let a = ForestGenerator::new(1, &config).generate();
    let b = ForestGenerator::new(2, &config).generate();
    assert_ne!(a.obstacles(), b.obstacles());
}

// ============================================================================
// Streaming and Collision Tests
// ============================================================================

#[test]
fn test_streamed_trees_are_queryable() {
    let (world, scene) = started(SimConfig::default(), 77);
    for key in world.streamer().active_quadrants() {
        for tree in world.forest().chunk(key) {
            let nearby = world.grid().query_neighborhood(tree.position.x, tree.position.y);
            assert!(nearby.contains(&tree.id));
            assert!(scene.contains(tree.id));
        }
    }
}

#[test]
fn test_streaming_round_trip() {
    let (mut world, mut scene) = started(SimConfig::default(), 2024);
    let at_origin = world.streamer().active_quadrants();
    let grid_at_origin = world.grid().len();

    world.player_mut().move_to(Vec2::new(60.0, 60.0));
    world.tick(&InputState::new(), FRAME, &mut scene);
    assert_ne!(world.streamer().active_quadrants(), at_origin);
    let streamed = world
        .drain_events()
        .into_iter()
        .any(|e| matches!(e, SimEvent::QuadrantsStreamed { .. }));
    assert!(streamed);

    world.player_mut().move_to(Vec2::ZERO);
    world.tick(&InputState::new(), FRAME, &mut scene);
    assert_eq!(world.streamer().active_quadrants(), at_origin);
    assert_eq!(world.grid().len(), grid_at_origin);
    assert_eq!(scene.live_count(), world.grid().len());
}

#[test]
fn test_fence_blocks_and_slides() {
    let (mut world, mut scene) = started(treeless(), 3);
    // Half a box width plus a bit from the south fence, facing it
    world.player_mut().move_to(Vec2::new(0.0, -99.4));
    let start = world.player().ground();

    let straight = InputState {
        forward: true,
        ..InputState::new()
    };
    let outcome = world.tick(&straight, FRAME, &mut scene);
    assert_eq!(outcome, Some(MoveOutcome::Blocked));
    assert_eq!(world.player().ground(), start);

    let diagonal = InputState {
        forward: true,
        left: true,
        ..InputState::new()
    };
    let outcome = world.tick(&diagonal, FRAME, &mut scene);
    assert_eq!(outcome, Some(MoveOutcome::SlideX));
    let after = world.player().ground();
    assert_eq!(after.y, start.y);
    assert!(after.x < start.x);
}

#[test]
fn test_open_ground_moves_full_step() {
    let (mut world, mut scene) = started(treeless(), 3);
    let input = InputState {
        forward: true,
        ..InputState::new()
    };
    let outcome = world.tick(&input, FRAME, &mut scene);
    assert_eq!(outcome, Some(MoveOutcome::Full));
    assert_eq!(world.player().ground(), Vec2::new(0.0, -0.15));
    assert!(world.player().is_moving);
}

#[test]
fn test_fences_never_stream_out() {
    let (mut world, mut scene) = started(SimConfig::default(), 11);
    world.player_mut().move_to(Vec2::new(-80.0, 80.0));
    world.tick(&InputState::new(), FRAME, &mut scene);

    for &id in world.forest().fences() {
        let fence = world.forest().obstacle(id).unwrap();
        assert_eq!(fence.kind, ObstacleKind::Fence);
        assert!(world.grid().contains(id, fence.position.x, fence.position.y));
    }
}

// ============================================================================
// Pursuer Tests
// ============================================================================

#[test]
fn test_pursuer_behind_player_teleports() {
    let (mut world, mut scene) = started(treeless(), 9);
    world.on_asset_loaded(AssetKind::PursuerSprite, Ok(AssetHandle(1)));

    // Facing +Z with the ghost directly behind
    world.player_mut().yaw = PI;
    let behind = Vec3::new(0.0, 1.5, -20.0);
    world.pursuer_mut().state = PursuerState::Pursuing;
    world.pursuer_mut().position = behind;

    world.tick(&InputState::new(), FRAME, &mut scene);

    assert_ne!(world.pursuer().position, behind);
    let teleported = world
        .drain_events()
        .into_iter()
        .any(|e| matches!(e, SimEvent::PursuerTeleported { .. }));
    assert!(teleported);
    assert!(world.hud().pursuer_visible);
}

#[test]
fn test_pursuer_close_flickers_lantern_then_captures() {
    let (mut world, mut scene) = started(treeless(), 9);
    world.on_asset_loaded(AssetKind::PursuerSprite, Ok(AssetHandle(1)));
    world.pursuer_mut().state = PursuerState::Pursuing;
    world.pursuer_mut().position = Vec3::new(0.0, 1.5, -9.0);

    world.tick(&InputState::new(), FRAME, &mut scene);
    let events = world.drain_events();
    assert!(events.contains(&SimEvent::LanternFlicker));
    assert_eq!(world.pursuer().state, PursuerState::Flickered);

    // Walk straight at it
    let input = InputState {
        forward: true,
        ..InputState::new()
    };
    let mut captured = false;
    for _ in 0..200 {
        world.tick(&input, FRAME, &mut scene);
        if world.drain_events().contains(&SimEvent::PursuerCaptured) {
            captured = true;
            break;
        }
    }
    assert!(captured);
    assert!(!world.hud().pursuer_visible);
}

// ============================================================================
// Battery Tests
// ============================================================================

#[test]
fn test_pickup_recharges_battery() {
    let mut config = SimConfig::default();
    config.forest.collectible_chance = 1.0;
    let (mut world, mut scene) = started(config, 555);
    run_ms(&mut world, &mut scene, 40_496);
    assert_eq!(world.hud().battery, 60.0);

    let pickup = world.forest().collectibles[0].clone();
    world.player_mut().move_to(pickup.position);
    world.tick(&InputState::new(), FRAME, &mut scene);

    let events = world.drain_events();
    assert!(events.contains(&SimEvent::PickupCollected {
        id: pickup.id,
        battery: 90.0
    }));
    assert!(world.forest().collectibles[0].collected);

    // Collected pickups stay collected
    world.tick(&InputState::new(), FRAME, &mut scene);
    let again = world
        .drain_events()
        .into_iter()
        .any(|e| matches!(e, SimEvent::PickupCollected { id, .. } if id == pickup.id));
    assert!(!again);
}

#[test]
fn test_battery_runs_dry_after_100_seconds() {
    let (mut world, mut scene) = started(SimConfig::default(), 31);
    let events = run_ms(&mut world, &mut scene, 101_008);

    let hud = world.hud();
    assert_eq!(hud.battery, 0.0);
    assert_eq!(hud.intensity, 0.0);
    // The low-battery warning goes away once the battery is empty
    assert!(!hud.warning_visible);

    let depleted = events
        .iter()
        .filter(|e| matches!(e, SimEvent::BatteryDepleted))
        .count();
    assert_eq!(depleted, 1);
    assert!(events
        .iter()
        .any(|e| matches!(e, SimEvent::FlickerStarted { .. })));

    // Cycling modes can't light an empty flashlight
    let cycle = InputState {
        flashlight_cycle_pressed: true,
        ..InputState::new()
    };
    for _ in 0..4 {
        world.tick(&cycle, FRAME, &mut scene);
        assert_eq!(world.hud().intensity, 0.0);
    }
}

// ============================================================================
// Lifecycle Tests
// ============================================================================

#[test]
fn test_pause_resume_end() {
    let (mut world, mut scene) = started(SimConfig::default(), 8);
    run_ms(&mut world, &mut scene, 3_008);
    assert_eq!(world.hud().battery, 97.0);

    world.pause();
    assert_eq!(world.phase(), SessionPhase::Paused);
    assert!(world.tick(&InputState::new(), FRAME, &mut scene).is_none());
    assert_eq!(world.pending_timers(), 0);

    world.resume();
    run_ms(&mut world, &mut scene, 2_016);
    assert_eq!(world.hud().battery, 95.0);

    world.end(&mut scene);
    assert_eq!(world.phase(), SessionPhase::Ended);
    assert_eq!(scene.live_count(), 0);
    assert!(world.tick(&InputState::new(), FRAME, &mut scene).is_none());
}
