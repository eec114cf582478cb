//! Obstacle hit and despawn tests
//!
//! One authoritative box test per obstacle per frame: a hit takes priority
//! over leaving the screen, so an obstacle can never be counted twice.

use glam::Vec3;

/// What happens to an obstacle after it moved this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObstacleOutcome {
    /// Still on screen, no contact
    Live,
    /// Overlaps the player's hit box
    Hit,
    /// Passed behind the despawn line
    Offscreen,
}

/// True if `a` and `b` are closer than `tolerance` on every axis
#[inline]
pub fn within_box(a: Vec3, b: Vec3, tolerance: f32) -> bool {
    (a - b).abs().cmplt(Vec3::splat(tolerance)).all()
}

/// True once an obstacle is strictly behind the despawn line
#[inline]
pub fn is_offscreen(z: f32, despawn_z: f32) -> bool {
    z < despawn_z
}

/// Classify an obstacle against the player
pub fn classify_obstacle(
    obstacle_pos: Vec3,
    player_pos: Vec3,
    tolerance: f32,
    despawn_z: f32,
) -> ObstacleOutcome {
    if within_box(obstacle_pos, player_pos, tolerance) {
        ObstacleOutcome::Hit
    } else if is_offscreen(obstacle_pos.z, despawn_z) {
        ObstacleOutcome::Offscreen
    } else {
        ObstacleOutcome::Live
    }
}
