use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::PlayerParams;
use crate::world::collision::Aabb;

/// The first-person player
///
/// `position` is the ground point under the camera holder; the camera itself
/// sits `camera_height` above it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec3,
    /// Rotation around +Y in radians; 0 looks down -Z
    pub yaw: f32,
    /// Camera tilt in radians, clamped to ±`pitch_limit`
    pub pitch: f32,
    pub is_moving: bool,

    #[serde(skip)]
    pub bob_phase: f32, // Advances while walking, resets when idle
    #[serde(skip)]
    pub camera_height: f32,
}

impl Player {
    /// Create a player standing at `position`
    pub fn new(position: Vec3, params: &PlayerParams) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            is_moving: false,
            bob_phase: 0.0,
            camera_height: params.base_height,
        }
    }

    /// Ground position as (x, z)
    pub fn ground(&self) -> Vec2 {
        Vec2::new(self.position.x, self.position.z)
    }

    /// Horizontal unit vector the player faces, as (x, z)
    pub fn forward(&self) -> Vec2 {
        Vec2::new(-self.yaw.sin(), -self.yaw.cos())
    }

    /// Horizontal unit vector to the player's left, as (x, z)
    pub fn left(&self) -> Vec2 {
        Vec2::new(-self.yaw.cos(), self.yaw.sin())
    }

    /// Apply a mouse delta in pixels
    pub fn look(&mut self, mouse_delta: Vec2, params: &PlayerParams) {
        if mouse_delta == Vec2::ZERO {
            return;
        }
        self.yaw -= mouse_delta.x * params.look_sensitivity;
        self.pitch = (self.pitch - mouse_delta.y * params.look_sensitivity)
            .clamp(-params.pitch_limit, params.pitch_limit);
    }

    /// Collision box for the player standing at `ground`
    pub fn bounds_at(ground: Vec2, params: &PlayerParams) -> Aabb {
        Aabb::from_center_size(
            Vec3::new(ground.x, params.box_height * 0.5, ground.y),
            Vec3::new(params.box_width, params.box_height, params.box_width),
        )
    }

    pub fn bounds(&self, params: &PlayerParams) -> Aabb {
        Self::bounds_at(self.ground(), params)
    }

    /// Move to a new ground position, keeping height
    pub fn move_to(&mut self, ground: Vec2) {
        self.position.x = ground.x;
        self.position.z = ground.y;
    }

    /// Put the player back at a spawn point facing -Z
    pub fn respawn(&mut self, position: Vec3, params: &PlayerParams) {
        *self = Self::new(position, params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn params() -> PlayerParams {
        PlayerParams::default()
    }

    fn assert_vec_near(a: Vec2, b: Vec2) {
        assert!((a - b).length() < 1e-5, "{a:?} != {b:?}");
    }

    #[test]
    fn test_player_creation() {
        let player = Player::new(Vec3::ZERO, &params());
        assert_eq!(player.position, Vec3::ZERO);
        assert_eq!(player.yaw, 0.0);
        assert!(!player.is_moving);
        assert_eq!(player.camera_height, 3.0);
    }

    #[test]
    fn test_facing_directions() {
        let mut player = Player::new(Vec3::ZERO, &params());
        assert_vec_near(player.forward(), Vec2::new(0.0, -1.0));
        assert_vec_near(player.left(), Vec2::new(-1.0, 0.0));

        player.yaw = PI;
        assert_vec_near(player.forward(), Vec2::new(0.0, 1.0));

        player.yaw = FRAC_PI_2;
        assert_vec_near(player.forward(), Vec2::new(-1.0, 0.0));
        assert_vec_near(player.left(), Vec2::new(0.0, 1.0));
    }

    #[test]
    fn test_look_turns_and_clamps_pitch() {
        let p = params();
        let mut player = Player::new(Vec3::ZERO, &p);

        player.look(Vec2::new(100.0, 0.0), &p);
        assert!((player.yaw + 0.2).abs() < 1e-6);

        player.look(Vec2::new(0.0, -10_000.0), &p);
        assert_eq!(player.pitch, p.pitch_limit);
        player.look(Vec2::new(0.0, 10_000.0), &p);
        assert_eq!(player.pitch, -p.pitch_limit);
    }

    #[test]
    fn test_bounds_sit_on_ground() {
        let p = params();
        let player = Player::new(Vec3::new(4.0, 0.0, -2.0), &p);
        let bounds = player.bounds(&p);
        assert_eq!(bounds.min, Vec3::new(3.5, 0.0, -2.5));
        assert_eq!(bounds.max, Vec3::new(4.5, 3.0, -1.5));
    }

    #[test]
    fn test_move_to_and_respawn() {
        let p = params();
        let mut player = Player::new(Vec3::ZERO, &p);
        player.move_to(Vec2::new(7.0, 8.0));
        assert_eq!(player.ground(), Vec2::new(7.0, 8.0));

        player.yaw = 1.0;
        player.bob_phase = 2.0;
        player.respawn(Vec3::ZERO, &p);
        assert_eq!(player.ground(), Vec2::ZERO);
        assert_eq!(player.yaw, 0.0);
        assert_eq!(player.bob_phase, 0.0);
    }
}
