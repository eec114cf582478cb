//! Subway Surfeuille - A three-lane runner simulation core
//!
//! Core modules:
//! - `sim`: Per-frame simulation step (lanes, jumps, obstacles, collisions)
//! - `present`: Presentation-layer commands and the bridge that applies them
//! - `config`: Data-driven tunables with JSON loading
//! - `autopilot`: Simple lane-dodging input source for headless runs
//! - `highscores`: Leaderboard of finished runs

pub mod autopilot;
pub mod config;
pub mod error;
pub mod highscores;
pub mod present;
pub mod sim;

pub use config::RunnerConfig;
pub use error::{SimError, SimResult};
pub use highscores::HighScores;

/// Default tuning constants (overridable through `RunnerConfig`)
pub mod consts {
    /// Frame rate the demo runner steps at
    pub const DEMO_DT: f32 = 1.0 / 60.0;

    /// Lane layout
    pub const LANE_COUNT: usize = 3;
    pub const LANE_SPACING: f32 = 2.0;

    /// Speed in world units per second at t = 0
    pub const BASE_SPEED: f32 = 5.0;
    /// Speed goes up by one unit every interval (seconds)
    pub const SPEED_RAMP_INTERVAL: f32 = 10.0;

    /// Obstacles appear this far ahead and vanish this far behind
    pub const SPAWN_Z: f32 = 20.0;
    pub const OBSTACLE_DESPAWN_Z: f32 = -10.0;
    pub const OBSTACLE_HEIGHT: f32 = 1.0;
    /// Hard cap on concurrently live obstacles
    pub const MAX_LIVE_OBSTACLES: usize = 64;
    pub const MAX_LANE_COUNT: usize = 64;

    /// Half-extent of the hit box on every axis
    pub const COLLISION_TOLERANCE: f32 = 1.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Player placement
    pub const GROUND_HEIGHT: f32 = 1.0;
    pub const PLAYER_Z: f32 = -5.0;

    /// Jump animation
    pub const JUMP_HEIGHT: f32 = 2.5;
    pub const JUMP_RISE_DURATION: f32 = 0.3;
    pub const JUMP_TOTAL_DURATION: f32 = 0.6;

    /// Looping road
    pub const ROAD_SEGMENT_COUNT: usize = 3;
    pub const ROAD_SEGMENT_LENGTH: f32 = 20.0;
    pub const ROAD_FIRST_SEGMENT_Z: f32 = -20.0;
    pub const ROAD_WRAP_Z: f32 = -30.0;

    /// River particles
    pub const RIVER_PARTICLES_PER_FRAME: usize = 10;
    pub const RIVER_PARTICLE_LIFETIME: f32 = 5.0;
    pub const MAX_PARTICLES: usize = 2000;

    /// Simulation clock resolution (ticks per second)
    pub const MICROS_PER_SEC: f64 = 1_000_000.0;
}

/// Convert a frame delta in seconds to whole clock microseconds
#[inline]
pub fn secs_to_micros(secs: f32) -> u64 {
    (secs as f64 * consts::MICROS_PER_SEC).round().max(0.0) as u64
}

/// Advance the clock by one frame delta, carrying the sub-microsecond
/// remainder so tiny deltas still add up over many frames
#[inline]
pub fn advance_clock(carry: &mut f64, dt: f32) -> u64 {
    let total = dt as f64 * consts::MICROS_PER_SEC + *carry;
    let whole = total.round().max(0.0);
    *carry = total - whole;
    whole as u64
}

/// Convert clock microseconds back to seconds
#[inline]
pub fn micros_to_secs(micros: u64) -> f64 {
    micros as f64 / consts::MICROS_PER_SEC
}

/// Check a frame delta: must be finite and non-negative
#[inline]
pub fn check_dt(dt: f32) -> SimResult<()> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDeltaTime(dt))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secs_to_micros_rounds() {
        assert_eq!(secs_to_micros(0.1), 100_000);
        assert_eq!(secs_to_micros(0.0), 0);
        assert_eq!(secs_to_micros(1.0 / 60.0), 16_667);
    }

    #[test]
    fn test_advance_clock_carries_remainder() {
        let mut carry = 0.0;
        let total: u64 = (0..10).map(|_| advance_clock(&mut carry, 3e-7)).sum();
        assert_eq!(total, 3);
        assert!(carry.abs() <= 0.5);

        let mut carry = 0.0;
        assert_eq!(advance_clock(&mut carry, 0.1), 100_000);
        assert_eq!(advance_clock(&mut carry, 0.0), 0);
    }

    #[test]
    fn test_check_dt() {
        assert!(check_dt(0.0).is_ok());
        assert!(check_dt(0.016).is_ok());
        assert!(matches!(check_dt(-0.01), Err(SimError::InvalidDeltaTime(_))));
        assert!(check_dt(f32::NAN).is_err());
        assert!(check_dt(f32::INFINITY).is_err());
    }
}
