//! Runner tunables
//!
//! Every gameplay constant can be overridden from a JSON file. Missing
//! fields fall back to the defaults in [`crate::consts`].

use std::fs;
use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{SimError, SimResult};
use crate::present::Color;
use crate::sim::ObstacleKind;

/// One independently rolled obstacle category
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnCategory {
    pub kind: ObstacleKind,
    /// Per-frame Bernoulli spawn probability (0-1)
    pub probability: f32,
    pub scale: Vec3,
    pub color: Color,
}

impl SpawnCategory {
    /// Default category table (barrier, rock, tree)
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                kind: ObstacleKind::Barrier,
                probability: 0.02,
                scale: Vec3::new(1.0, 2.0, 1.0),
                color: Color::Red,
            },
            Self {
                kind: ObstacleKind::Rock,
                probability: 0.01,
                scale: Vec3::new(1.2, 1.0, 1.2),
                color: Color::Gray,
            },
            Self {
                kind: ObstacleKind::Tree,
                probability: 0.01,
                scale: Vec3::new(1.0, 3.0, 1.0),
                color: Color::Green,
            },
        ]
    }
}

/// Looping road geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub segment_count: usize,
    pub segment_length: f32,
    pub first_segment_z: f32,
    /// Segments whose z drops below this jump forward by the loop length
    pub wrap_z: f32,
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            segment_count: ROAD_SEGMENT_COUNT,
            segment_length: ROAD_SEGMENT_LENGTH,
            first_segment_z: ROAD_FIRST_SEGMENT_Z,
            wrap_z: ROAD_WRAP_Z,
        }
    }
}

impl RoadConfig {
    /// Distance a wrapped segment jumps forward
    pub fn loop_length(&self) -> f32 {
        self.segment_count as f32 * self.segment_length
    }

    pub fn validate(&self) -> SimResult<()> {
        require(
            self.segment_length.is_finite() && self.segment_length > 0.0,
            "road.segment_length",
            "must be finite and > 0",
        )?;
        require(
            self.first_segment_z.is_finite(),
            "road.first_segment_z",
            "must be finite",
        )?;
        require(self.wrap_z.is_finite(), "road.wrap_z", "must be finite")?;
        require(
            self.loop_length().is_finite(),
            "road.segment_count",
            "loop length must be finite",
        )
    }
}

/// Decorative river emitter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiverConfig {
    pub start_pos: Vec3,
    pub particles_per_frame: usize,
    /// Half-width of the x jitter around `start_pos`
    pub lateral_jitter: f32,
    /// Half-depth of the z jitter around `start_pos`
    pub depth_jitter: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub lifetime: f32,
    pub max_particles: usize,
}

impl Default for RiverConfig {
    fn default() -> Self {
        Self {
            start_pos: Vec3::new(0.0, 0.1, -5.0),
            particles_per_frame: RIVER_PARTICLES_PER_FRAME,
            lateral_jitter: 2.0,
            depth_jitter: 0.5,
            min_speed: 1.0,
            max_speed: 2.0,
            lifetime: RIVER_PARTICLE_LIFETIME,
            max_particles: MAX_PARTICLES,
        }
    }
}

/// Complete set of runner tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    // === Speed ===
    pub base_speed: f32,
    /// Seconds between +1 speed steps
    pub speed_ramp_interval: f32,

    // === Lanes ===
    pub lane_count: usize,
    pub lane_spacing: f32,

    // === Obstacles ===
    pub spawn_categories: Vec<SpawnCategory>,
    pub spawn_z: f32,
    pub obstacle_height: f32,
    pub obstacle_despawn_z: f32,
    pub max_live_obstacles: usize,
    /// Hit-box half-extent, applied on x, y and z
    pub collision_tolerance: f32,

    // === Player ===
    pub starting_lives: u32,
    pub ground_height: f32,
    pub player_z: f32,
    pub jump_height: f32,
    pub jump_rise_duration: f32,
    pub jump_total_duration: f32,

    // === Scenery ===
    pub road: RoadConfig,
    pub river: RiverConfig,
}

impl RiverConfig {
    /// Reject emitter settings that would make sampling fail
    pub fn validate(&self) -> SimResult<()> {
        require(self.start_pos.is_finite(), "river.start_pos", "must be finite")?;
        require(
            self.lateral_jitter.is_finite() && self.lateral_jitter >= 0.0,
            "river.lateral_jitter",
            "must be finite and >= 0",
        )?;
        require(
            self.depth_jitter.is_finite() && self.depth_jitter >= 0.0,
            "river.depth_jitter",
            "must be finite and >= 0",
        )?;
        require(
            self.min_speed.is_finite() && self.max_speed.is_finite(),
            "river.max_speed",
            "speeds must be finite",
        )?;
        require(
            self.min_speed <= self.max_speed,
            "river.min_speed",
            "must be <= river.max_speed",
        )?;
        require(
            self.lifetime.is_finite() && self.lifetime > 0.0,
            "river.lifetime",
            "must be finite and > 0",
        )?;
        require(self.max_particles >= 1, "river.max_particles", "must be >= 1")
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            base_speed: BASE_SPEED,
            speed_ramp_interval: SPEED_RAMP_INTERVAL,

            lane_count: LANE_COUNT,
            lane_spacing: LANE_SPACING,

            spawn_categories: SpawnCategory::defaults(),
            spawn_z: SPAWN_Z,
            obstacle_height: OBSTACLE_HEIGHT,
            obstacle_despawn_z: OBSTACLE_DESPAWN_Z,
            max_live_obstacles: MAX_LIVE_OBSTACLES,
            collision_tolerance: COLLISION_TOLERANCE,

            starting_lives: STARTING_LIVES,
            ground_height: GROUND_HEIGHT,
            player_z: PLAYER_Z,
            jump_height: JUMP_HEIGHT,
            jump_rise_duration: JUMP_RISE_DURATION,
            jump_total_duration: JUMP_TOTAL_DURATION,

            road: RoadConfig::default(),
            river: RiverConfig::default(),
        }
    }
}

fn require(ok: bool, field: &'static str, reason: &str) -> SimResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SimError::config(field, reason))
    }
}

impl RunnerConfig {
    /// Same defaults with every spawn probability forced to zero
    pub fn without_spawns() -> Self {
        let mut config = Self::default();
        for category in &mut config.spawn_categories {
            category.probability = 0.0;
        }
        config
    }

    /// Center lane index (the player's starting lane)
    pub fn center_lane(&self) -> usize {
        self.lane_count.saturating_sub(1) / 2
    }

    /// World x offset of a lane, lanes centered on x = 0
    pub fn lane_offset(&self, lane: usize) -> f32 {
        let lane = lane.min(self.lane_count.saturating_sub(1));
        let center = (self.lane_count as f32 - 1.0) / 2.0;
        (lane as f32 - center) * self.lane_spacing
    }

    /// Speed ramp interval on the simulation clock
    pub fn ramp_interval_micros(&self) -> u64 {
        crate::secs_to_micros(self.speed_ramp_interval).max(1)
    }

    /// Speed after `elapsed_micros` of simulated time
    pub fn speed_at(&self, elapsed_micros: u64) -> f32 {
        let steps = elapsed_micros / self.ramp_interval_micros();
        self.base_speed + steps as f32
    }

    /// Reject configurations the step loop cannot run with
    pub fn validate(&self) -> SimResult<()> {
        require(
            self.base_speed.is_finite() && self.base_speed >= 0.0,
            "base_speed",
            "must be finite and >= 0",
        )?;
        require(
            self.speed_ramp_interval.is_finite() && self.speed_ramp_interval > 0.0,
            "speed_ramp_interval",
            "must be finite and > 0",
        )?;
        require(
            (1..=MAX_LANE_COUNT).contains(&self.lane_count),
            "lane_count",
            "must be between 1 and 64",
        )?;
        require(self.lane_spacing.is_finite(), "lane_spacing", "must be finite")?;
        for category in &self.spawn_categories {
            require(
                (0.0..=1.0).contains(&category.probability),
                "spawn_categories",
                "probability must be within 0-1",
            )?;
            require(
                category.scale.is_finite(),
                "spawn_categories",
                "scale must be finite",
            )?;
        }
        require(self.spawn_z.is_finite(), "spawn_z", "must be finite")?;
        require(
            self.obstacle_despawn_z.is_finite() && self.obstacle_despawn_z < self.spawn_z,
            "obstacle_despawn_z",
            "must be finite and behind spawn_z",
        )?;
        require(
            self.obstacle_height.is_finite(),
            "obstacle_height",
            "must be finite",
        )?;
        require(self.max_live_obstacles >= 1, "max_live_obstacles", "must be >= 1")?;
        require(
            self.collision_tolerance.is_finite() && self.collision_tolerance >= 0.0,
            "collision_tolerance",
            "must be finite and >= 0",
        )?;
        require(self.starting_lives >= 1, "starting_lives", "must be >= 1")?;
        require(self.ground_height.is_finite(), "ground_height", "must be finite")?;
        require(self.player_z.is_finite(), "player_z", "must be finite")?;
        require(
            self.jump_total_duration.is_finite(),
            "jump_total_duration",
            "must be finite",
        )?;
        require(
            self.jump_rise_duration > 0.0 && self.jump_rise_duration <= self.jump_total_duration,
            "jump_rise_duration",
            "must be > 0 and <= jump_total_duration",
        )?;
        require(
            self.jump_height.is_finite() && self.jump_height >= self.ground_height,
            "jump_height",
            "must be finite and not below ground_height",
        )?;
        self.road.validate()?;
        self.river.validate()
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(|source| SimError::Json {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON config file
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = fs::read_to_string(path).map_err(|source| SimError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|source| SimError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::info!("Loaded runner config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        RunnerConfig::default().validate().unwrap();
    }

    #[test]
    fn test_lane_offsets() {
        let config = RunnerConfig::default();
        assert_eq!(config.lane_offset(0), -2.0);
        assert_eq!(config.lane_offset(1), 0.0);
        assert_eq!(config.lane_offset(2), 2.0);
        // Clamped past the last lane
        assert_eq!(config.lane_offset(9), 2.0);
        assert_eq!(config.center_lane(), 1);
    }

    #[test]
    fn test_speed_steps_every_interval() {
        let config = RunnerConfig::default();
        assert_eq!(config.speed_at(0), 5.0);
        assert_eq!(config.speed_at(9_999_999), 5.0);
        assert_eq!(config.speed_at(10_000_000), 6.0);
        assert_eq!(config.speed_at(25_000_000), 7.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = RunnerConfig::from_json_str(r#"{ "starting_lives": 5, "lane_count": 5 }"#)
            .unwrap();
        assert_eq!(config.starting_lives, 5);
        assert_eq!(config.lane_count, 5);
        assert_eq!(config.base_speed, BASE_SPEED);
        assert_eq!(config.lane_offset(0), -4.0);
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = RunnerConfig::default();
        config.spawn_categories[0].probability = 1.5;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "spawn_categories",
                ..
            }
        ));
    }

    fn rejected_field(config: &RunnerConfig) -> Option<&'static str> {
        match config.validate() {
            Err(SimError::InvalidConfig { field, .. }) => Some(field),
            _ => None,
        }
    }

    #[test]
    fn test_rejects_lane_count_out_of_range() {
        for lane_count in [0, MAX_LANE_COUNT + 1, usize::MAX] {
            let config = RunnerConfig {
                lane_count,
                ..Default::default()
            };
            assert_eq!(rejected_field(&config), Some("lane_count"));
        }
    }

    #[test]
    fn test_rejects_non_finite_geometry() {
        let config = RunnerConfig {
            jump_total_duration: f32::INFINITY,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), Some("jump_total_duration"));

        let config = RunnerConfig {
            obstacle_height: f32::NAN,
            ..Default::default()
        };
        assert_eq!(rejected_field(&config), Some("obstacle_height"));

        let mut config = RunnerConfig::default();
        config.road.segment_length = 0.0;
        assert_eq!(rejected_field(&config), Some("road.segment_length"));
    }

    #[test]
    fn test_rejects_bad_river_from_json() {
        // Overflowing literals parse as infinity
        let err = RunnerConfig::from_json_str(r#"{"river": {"max_speed": 1e39}}"#).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "river.max_speed",
                ..
            }
        ));

        let json = r#"{"river": {"lateral_jitter": -1.0}}"#;
        let err = RunnerConfig::from_json_str(json).unwrap_err();
        assert!(matches!(
            err,
            SimError::InvalidConfig {
                field: "river.lateral_jitter",
                ..
            }
        ));

        let mut config = RunnerConfig::default();
        config.river.min_speed = 3.0;
        assert_eq!(rejected_field(&config), Some("river.min_speed"));
    }

    #[test]
    fn test_rejects_rise_longer_than_jump() {
        let config = RunnerConfig {
            jump_rise_duration: 1.0,
            jump_total_duration: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_json_reports_error() {
        let err = RunnerConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, SimError::Json { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunnerConfig::load(Path::new("/nonexistent/runner.json")).unwrap_err();
        assert!(matches!(err, SimError::Io { .. }));
    }
}
