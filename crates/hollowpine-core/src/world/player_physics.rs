//! Player movement - control intent, collision against nearby obstacles, camera bob

use glam::Vec2;

use super::forest::Forest;
use super::spatial_grid::SpatialHashGrid;
use crate::config::PlayerParams;
use crate::entity::input::InputState;
use crate::entity::player::Player;

/// How a frame's movement was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// No movement key held
    Idle,
    /// Proposed position was free
    Full,
    /// Blocked; slid along X only
    SlideX,
    /// Blocked; slid along Z only
    SlideZ,
    /// Both axes blocked, player stays put
    Blocked,
}

impl MoveOutcome {
    pub fn moved(self) -> bool {
        matches!(self, MoveOutcome::Full | MoveOutcome::SlideX | MoveOutcome::SlideZ)
    }
}

/// Resolver phase within a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MovementState {
    Idle,
    ProposedMove { from: Vec2, to: Vec2 },
    Resolved(MoveOutcome),
}

/// Turns control intent into a collision-free ground position
pub struct MovementResolver {
    params: PlayerParams,
    state: MovementState,
}

impl MovementResolver {
    pub fn new(params: PlayerParams) -> Self {
        Self {
            params,
            state: MovementState::Idle,
        }
    }

    pub fn state(&self) -> MovementState {
        self.state
    }

    /// Displacement for one frame: `speed` per held key, relative to yaw
    pub fn proposed_displacement(player: &Player, input: &InputState, speed: f32) -> Vec2 {
        let forward = player.forward();
        let left = player.left();
        let mut delta = Vec2::ZERO;
        if input.forward {
            delta += forward * speed;
        }
        if input.backward {
            delta -= forward * speed;
        }
        if input.left {
            delta += left * speed;
        }
        if input.right {
            delta -= left * speed;
        }
        delta
    }

    /// True if the player box at `ground` overlaps any obstacle near it
    pub fn collides(
        ground: Vec2,
        forest: &Forest,
        grid: &SpatialHashGrid,
        params: &PlayerParams,
    ) -> bool {
        let player_box = Player::bounds_at(ground, params);
        grid.query_neighborhood(ground.x, ground.y)
            .into_iter()
            .filter_map(|id| forest.obstacle(id))
            .any(|obstacle| player_box.intersects(&obstacle.bounds))
    }

    /// Update the player for one frame
    ///
    /// Tries the full move first, then each axis on its own so the player
    /// slides along trunks and fences instead of sticking to them.
    pub fn resolve(
        &mut self,
        player: &mut Player,
        input: &InputState,
        forest: &Forest,
        grid: &SpatialHashGrid,
    ) -> MoveOutcome {
        let outcome = if input.wants_move() {
            let from = player.ground();
            let to = from + Self::proposed_displacement(player, input, self.params.speed);
            self.state = MovementState::ProposedMove { from, to };

            let (target, outcome) = if !Self::collides(to, forest, grid, &self.params) {
                (to, MoveOutcome::Full)
            } else {
                let x_only = Vec2::new(to.x, from.y);
                let z_only = Vec2::new(from.x, to.y);
                let x_free = to.x != from.x && !Self::collides(x_only, forest, grid, &self.params);
                let z_free = to.y != from.y && !Self::collides(z_only, forest, grid, &self.params);
                match (x_free, z_free) {
                    // Only the corner is blocked; keep the dominant axis, X on a tie
                    (true, true) if (to.x - from.x).abs() >= (to.y - from.y).abs() => {
                        (x_only, MoveOutcome::SlideX)
                    }
                    (true, true) => (z_only, MoveOutcome::SlideZ),
                    (true, false) => (x_only, MoveOutcome::SlideX),
                    (false, true) => (z_only, MoveOutcome::SlideZ),
                    (false, false) => (from, MoveOutcome::Blocked),
                }
            };

            if outcome.moved() {
                log::trace!("Player: {:?} → {:?} ({:?})", from, target, outcome);
            }
            player.move_to(target);
            outcome
        } else {
            MoveOutcome::Idle
        };

        self.update_bob(player, input.wants_move());
        self.state = MovementState::Resolved(outcome);
        outcome
    }

    /// Camera bob: height sampled before the phase advances
    fn update_bob(&self, player: &mut Player, moving: bool) {
        player.is_moving = moving;
        if moving {
            player.camera_height =
                self.params.base_height + (player.bob_phase * 2.0).sin() * self.params.bob_amplitude;
            player.bob_phase += self.params.bob_rate;
        } else {
            player.camera_height = self.params.base_height;
            player.bob_phase = 0.0;
        }
    }

    /// Back to idle at the start of a frame or after a pause
    pub fn reset(&mut self) {
        self.state = MovementState::Idle;
    }
}
