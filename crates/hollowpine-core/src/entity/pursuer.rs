//! The ghost - spawns around the player, hides when looked away from,
//! and makes the lantern flicker as it closes in.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::config::PursuerParams;
use crate::world::rng_trait::WorldRng;
use crate::world::scene::AssetState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PursuerState {
    /// Hidden, waiting for a spawn roll
    #[default]
    Dormant,
    /// Visible somewhere around the player
    Pursuing,
    /// Flickered the lantern since it last spawned or teleported
    Flickered,
}

impl PursuerState {
    pub fn is_active(self) -> bool {
        !matches!(self, PursuerState::Dormant)
    }
}

/// What happened to the ghost this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PursuerUpdate {
    /// New position after a teleport
    pub teleported: Option<Vec3>,
    /// Lantern should flicker now
    pub flicker: bool,
    pub captured: bool,
}

pub struct Pursuer {
    params: PursuerParams,
    pub position: Vec3,
    pub state: PursuerState,
    pub sprite: AssetState,
}

impl Pursuer {
    pub fn new(params: PursuerParams) -> Self {
        Self {
            params,
            position: Vec3::ZERO,
            state: PursuerState::Dormant,
            sprite: AssetState::Pending,
        }
    }

    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Periodic spawn roll; returns the spawn position if the ghost appeared
    ///
    /// Nothing is rolled while the ghost is out or its sprite is not loaded.
    pub fn spawn_check<R: WorldRng + ?Sized>(
        &mut self,
        player_ground: Vec2,
        rng: &mut R,
    ) -> Option<Vec3> {
        if self.is_active() || !self.sprite.is_ready() {
            return None;
        }
        if !rng.check_probability(self.params.spawn_chance) {
            return None;
        }
        let position = self.place_around(player_ground, rng);
        log::debug!("Ghost spawned at {:?}", position);
        Some(position)
    }

    /// Put the ghost on a random point of the spawn ring around the player
    fn place_around<R: WorldRng + ?Sized>(&mut self, player_ground: Vec2, rng: &mut R) -> Vec3 {
        let angle = rng.gen_f32() * TAU;
        let distance = self.params.spawn_distance_min + rng.gen_f32() * self.params.spawn_distance_span;
        self.position = Vec3::new(
            player_ground.x + angle.cos() * distance,
            self.params.spawn_height,
            player_ground.y + angle.sin() * distance,
        );
        self.state = PursuerState::Pursuing;
        self.position
    }

    fn ground(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Angle in radians between the player's facing and the direction to the ghost
    pub fn view_angle(&self, player: &Player) -> f32 {
        let to_ghost = self.ground() - player.ground();
        if to_ghost.length_squared() <= f32::EPSILON {
            return 0.0;
        }
        player
            .forward()
            .dot(to_ghost.normalize())
            .clamp(-1.0, 1.0)
            .acos()
    }

    /// Planar distance to the player
    pub fn distance_to(&self, player: &Player) -> f32 {
        self.ground().distance(player.ground())
    }

    /// Per-frame behavior while the ghost is out
    pub fn update<R: WorldRng + ?Sized>(&mut self, player: &Player, rng: &mut R) -> PursuerUpdate {
        let mut update = PursuerUpdate::default();
        if !self.is_active() {
            return update;
        }

        if self.view_angle(player) > self.params.awareness_angle_deg.to_radians() {
            // Out of sight: a fresh spawn elsewhere, able to flicker again
            let position = self.place_around(player.ground(), rng);
            update.teleported = Some(position);
            log::debug!("Ghost teleported to {:?}", position);
        } else if self.params.approach_speed > 0.0 {
            let to_player = player.ground() - self.ground();
            let step = to_player.clamp_length_max(self.params.approach_speed);
            self.position.x += step.x;
            self.position.z += step.y;
        }

        let distance = self.distance_to(player);
        if distance < self.params.flicker_distance && self.state == PursuerState::Pursuing {
            self.state = PursuerState::Flickered;
            update.flicker = true;
        }
        if distance < self.params.capture_distance {
            self.state = PursuerState::Dormant;
            update.captured = true;
            log::info!("Ghost reached the player");
        }

        update
    }

    /// Hide without a capture (session reset)
    pub fn dismiss(&mut self) {
        self.state = PursuerState::Dormant;
    }
}
