//! Session state and core simulation types
//!
//! Everything a run needs lives in [`SessionState`]; the caller owns it and
//! passes it to [`super::step`] once per frame.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::schedule::Scheduler;
use crate::config::{RunnerConfig, SpawnCategory};
use crate::error::SimResult;
use crate::present::{Color, Command, HudField, Material, Transform, VisualKind};

/// Simulation-side entity identifier
pub type EntityId = u32;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Accepting steps
    Running,
    /// Lives ran out; terminal
    GameOver,
}

/// Obstacle categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObstacleKind {
    Barrier,
    Rock,
    Tree,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    /// Lane index, always within the configured lane count
    pub lane: usize,
    pub pos: Vec3,
    pub scale: Vec3,
    /// Jump animation in progress (cleared by the scheduled reset)
    pub jumping: bool,
    /// Clock time the current jump started at
    pub jump_started_micros: u64,
}

impl Player {
    fn new(id: EntityId, config: &RunnerConfig) -> Self {
        let lane = config.center_lane();
        Self {
            id,
            lane,
            pos: Vec3::new(config.lane_offset(lane), config.ground_height, config.player_z),
            scale: Vec3::new(1.0, 2.0, 1.0),
            jumping: false,
            jump_started_micros: 0,
        }
    }

    /// Whether a jump may start this frame
    pub fn on_ground(&self, ground_height: f32) -> bool {
        !self.jumping && self.pos.y <= ground_height
    }

    /// Move one lane left/right; returns true if the lane changed
    pub fn shift_lane(&mut self, delta: isize, config: &RunnerConfig) -> bool {
        let max_lane = config.lane_count.saturating_sub(1) as isize;
        let target = (self.lane as isize + delta).clamp(0, max_lane) as usize;
        if target == self.lane {
            return false;
        }
        self.lane = target;
        self.pos.x = config.lane_offset(target);
        true
    }

    /// Snap back to the ground and end the jump (safe to repeat)
    pub fn land(&mut self, ground_height: f32) {
        self.pos.y = ground_height;
        self.jumping = false;
    }
}

/// An obstacle moving toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub kind: ObstacleKind,
    pub lane: usize,
    pub pos: Vec3,
}

/// A piece of the looping road
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: EntityId,
    pub z: f32,
}

/// Complete run state (serializable, caller-owned)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    /// Tunables this run was started with
    pub config: RunnerConfig,
    pub phase: SessionPhase,
    /// Simulated time on a microsecond clock
    pub elapsed_micros: u64,
    /// Sub-microsecond remainder of the deltas applied so far
    #[serde(default)]
    pub clock_carry_micros: f64,
    /// Current forward speed (units/s)
    pub speed: f32,
    pub score: u64,
    pub lives: u32,
    /// Frames that advanced time
    pub frames: u64,
    pub player: Player,
    /// Live obstacles, in spawn order
    pub obstacles: Vec<Obstacle>,
    pub road: Vec<RoadSegment>,
    /// Pending delayed events
    pub scheduler: Scheduler,
    /// Next entity ID
    next_id: EntityId,
}

impl SessionState {
    /// Start a new run with the given tunables
    pub fn new(config: RunnerConfig) -> SimResult<Self> {
        config.validate()?;

        let mut next_id = 1;
        let player = Player::new(next_id, &config);
        next_id += 1;

        let road = (0..config.road.segment_count)
            .map(|i| {
                let segment = RoadSegment {
                    id: next_id,
                    z: config.road.first_segment_z + i as f32 * config.road.segment_length,
                };
                next_id += 1;
                segment
            })
            .collect();

        log::info!(
            "New session: {} lanes, {} lives, base speed {}",
            config.lane_count,
            config.starting_lives,
            config.base_speed
        );

        Ok(Self {
            speed: config.speed_at(0),
            lives: config.starting_lives,
            config,
            phase: SessionPhase::Running,
            elapsed_micros: 0,
            clock_carry_micros: 0.0,
            score: 0,
            frames: 0,
            player,
            obstacles: Vec::new(),
            road,
            scheduler: Scheduler::default(),
            next_id,
        })
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn is_over(&self) -> bool {
        self.phase == SessionPhase::GameOver
    }

    pub fn elapsed_secs(&self) -> f64 {
        crate::micros_to_secs(self.elapsed_micros)
    }

    /// Commands that build the starting scene (player, road, HUD)
    pub fn initial_commands(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(self.road.len() + 3);
        commands.push(Command::Spawn {
            entity: self.player.id,
            kind: VisualKind::Player,
            transform: Transform {
                position: self.player.pos,
                scale: self.player.scale,
            },
            material: Material::opaque(Color::Orange),
        });
        for segment in &self.road {
            commands.push(Command::Spawn {
                entity: segment.id,
                kind: VisualKind::RoadSegment,
                transform: Transform {
                    position: Vec3::new(0.0, 0.0, segment.z),
                    scale: Vec3::new(
                        self.config.lane_count as f32 * self.config.lane_spacing,
                        0.1,
                        self.config.road.segment_length,
                    ),
                },
                material: Material::opaque(Color::Gray),
            });
        }
        commands.push(Command::Hud {
            field: HudField::Lives,
            text: HudField::Lives.format(self.lives),
        });
        commands.push(Command::Hud {
            field: HudField::Score,
            text: HudField::Score.format(self.score),
        });
        commands
    }

    /// Place an obstacle of `category` in `lane` at depth `z`
    ///
    /// Returns the spawn command for the presentation layer. The live cap is
    /// enforced by the caller.
    pub fn spawn_obstacle(&mut self, category: &SpawnCategory, lane: usize, z: f32) -> Command {
        let lane = lane.min(self.config.lane_count.saturating_sub(1));
        let id = self.next_entity_id();
        let pos = Vec3::new(self.config.lane_offset(lane), self.config.obstacle_height, z);
        self.obstacles.push(Obstacle {
            id,
            kind: category.kind,
            lane,
            pos,
        });
        Command::Spawn {
            entity: id,
            kind: VisualKind::Obstacle(category.kind),
            transform: Transform {
                position: pos,
                scale: category.scale,
            },
            material: Material::opaque(category.color),
        }
    }
}
