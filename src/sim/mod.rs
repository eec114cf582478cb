//! Runner simulation
//!
//! All gameplay logic lives here. This module must stay engine-free:
//! - Caller-owned state, no globals
//! - Randomness only through the supplied `Rng`
//! - Time only through the frame delta
//! - Output only as presentation commands

pub mod collision;
pub mod particles;
pub mod schedule;
pub mod state;
pub mod tick;

pub use collision::{ObstacleOutcome, classify_obstacle, is_offscreen, within_box};
pub use particles::{ParticleField, WaterParticle};
pub use schedule::{ScheduledEvent, Scheduler};
pub use state::{
    EntityId, Obstacle, ObstacleKind, Player, RoadSegment, SessionPhase, SessionState,
};
pub use tick::{GameEvent, SimWarning, StepInput, StepOutput, step};
