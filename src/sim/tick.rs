//! Per-frame simulation step
//!
//! Advances a [`SessionState`] by one frame and returns the commands the
//! presentation layer needs to mirror it.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::collision::{ObstacleOutcome, classify_obstacle};
use super::schedule::ScheduledEvent;
use super::state::{EntityId, ObstacleKind, SessionPhase, SessionState};
use crate::error::SimResult;
use crate::present::{AnimatedProperty, Command, Easing, HudField};

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    /// Lane-left pressed this frame
    pub lane_left: bool,
    /// Lane-right pressed this frame
    pub lane_right: bool,
    /// Jump key held
    pub jump: bool,
}

/// Something notable that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    LaneChanged { lane: usize },
    Jumped,
    Landed,
    ObstacleSpawned { id: EntityId, kind: ObstacleKind },
    ObstacleHit { id: EntityId, lives_left: u32 },
    ObstacleCleared { id: EntityId },
    GameOver { score: u64 },
}

/// Non-fatal conditions surfaced to the frame loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimWarning {
    /// A spawn was dropped because the live obstacle cap was reached
    ObstacleCapReached { live: usize },
}

/// Everything a step produced
#[derive(Debug, Clone, Default)]
pub struct StepOutput {
    pub commands: Vec<Command>,
    pub events: Vec<GameEvent>,
    pub warnings: Vec<SimWarning>,
}

impl StepOutput {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.events.is_empty() && self.warnings.is_empty()
    }
}

/// Advance the session by `dt` seconds
///
/// Negative or non-finite `dt` is rejected. After game over every call is a
/// no-op. A zero `dt` only fires scheduled events that are already due.
pub fn step<R: Rng + ?Sized>(
    state: &mut SessionState,
    input: &StepInput,
    dt: f32,
    rng: &mut R,
) -> SimResult<StepOutput> {
    crate::check_dt(dt)?;

    let mut out = StepOutput::default();
    if state.phase == SessionPhase::GameOver {
        return Ok(out);
    }

    if dt == 0.0 {
        fire_due_events(state, &mut out);
        return Ok(out);
    }

    // Clock and speed
    state.elapsed_micros += crate::advance_clock(&mut state.clock_carry_micros, dt);
    state.speed = state.config.speed_at(state.elapsed_micros);
    state.frames += 1;

    // Score
    state.score += 1;
    out.commands.push(Command::Hud {
        field: HudField::Score,
        text: HudField::Score.format(state.score),
    });

    fire_due_events(state, &mut out);
    advance_jump(state);

    apply_lane_input(state, input, &mut out);

    if input.jump && state.player.on_ground(state.config.ground_height) {
        start_jump(state, &mut out);
    }

    spawn_obstacles(state, rng, &mut out);

    let distance = dt * state.speed;
    move_obstacles(state, distance, &mut out);
    if state.phase == SessionPhase::GameOver {
        return Ok(out);
    }

    move_road(state, distance, &mut out);

    Ok(out)
}

fn fire_due_events(state: &mut SessionState, out: &mut StepOutput) {
    for event in state.scheduler.drain_due(state.elapsed_micros) {
        match event {
            ScheduledEvent::ResetPlayerHeight => {
                state.player.land(state.config.ground_height);
                out.commands.push(Command::Move {
                    entity: state.player.id,
                    position: state.player.pos,
                });
                out.events.push(GameEvent::Landed);
            }
        }
    }
}

/// Track the eased rise so collision sees the same height the player does
fn advance_jump(state: &mut SessionState) {
    if !state.player.jumping {
        return;
    }
    let config = &state.config;
    let since = state.elapsed_micros - state.player.jump_started_micros;
    let rise = crate::secs_to_micros(config.jump_rise_duration).max(1);
    let t = since as f32 / rise as f32;
    let lift = (config.jump_height - config.ground_height) * Easing::OutQuad.apply(t);
    state.player.pos.y = config.ground_height + lift;
}

fn apply_lane_input(state: &mut SessionState, input: &StepInput, out: &mut StepOutput) {
    let mut changed = false;
    if input.lane_left {
        changed |= state.player.shift_lane(-1, &state.config);
    }
    if input.lane_right {
        changed |= state.player.shift_lane(1, &state.config);
    }
    if changed {
        log::debug!("Lane -> {}", state.player.lane);
        out.commands.push(Command::Move {
            entity: state.player.id,
            position: state.player.pos,
        });
        out.events.push(GameEvent::LaneChanged {
            lane: state.player.lane,
        });
    }
}

fn start_jump(state: &mut SessionState, out: &mut StepOutput) {
    let config = &state.config;
    state.player.jumping = true;
    state.player.jump_started_micros = state.elapsed_micros;
    out.commands.push(Command::Animate {
        entity: state.player.id,
        property: AnimatedProperty::Y,
        target: config.jump_height,
        duration: config.jump_rise_duration,
        easing: Easing::OutQuad,
    });
    state.scheduler.schedule(
        state.elapsed_micros,
        crate::secs_to_micros(config.jump_total_duration),
        ScheduledEvent::ResetPlayerHeight,
    );
    log::debug!("Jump at t={:.3}s", state.elapsed_secs());
    out.events.push(GameEvent::Jumped);
}

fn spawn_obstacles<R: Rng + ?Sized>(state: &mut SessionState, rng: &mut R, out: &mut StepOutput) {
    for idx in 0..state.config.spawn_categories.len() {
        let category = state.config.spawn_categories[idx];
        if rng.random::<f32>() >= category.probability {
            continue;
        }
        let live = state.obstacles.len();
        if live >= state.config.max_live_obstacles {
            log::warn!("Obstacle cap reached ({live} live), dropping {:?} spawn", category.kind);
            out.warnings.push(SimWarning::ObstacleCapReached { live });
            continue;
        }
        let lane = rng.random_range(0..state.config.lane_count);
        let spawn_z = state.config.spawn_z;
        let command = state.spawn_obstacle(&category, lane, spawn_z);
        if let Command::Spawn { entity, .. } = command {
            out.events.push(GameEvent::ObstacleSpawned {
                id: entity,
                kind: category.kind,
            });
        }
        out.commands.push(command);
    }
}

/// Move every obstacle, then keep, hit or clear it
///
/// Obstacles are partitioned into a fresh list so each one gets exactly one
/// outcome per frame. Processing stops at game over.
fn move_obstacles(state: &mut SessionState, distance: f32, out: &mut StepOutput) {
    let obstacles = std::mem::take(&mut state.obstacles);
    let mut retained = Vec::with_capacity(obstacles.len());
    let mut pending = obstacles.into_iter();

    for mut obstacle in pending.by_ref() {
        obstacle.pos.z -= distance;
        match classify_obstacle(
            obstacle.pos,
            state.player.pos,
            state.config.collision_tolerance,
            state.config.obstacle_despawn_z,
        ) {
            ObstacleOutcome::Live => {
                out.commands.push(Command::Move {
                    entity: obstacle.id,
                    position: obstacle.pos,
                });
                retained.push(obstacle);
            }
            ObstacleOutcome::Hit => {
                state.lives = state.lives.saturating_sub(1);
                log::info!("Hit {:?} {}; {} lives left", obstacle.kind, obstacle.id, state.lives);
                out.commands.push(Command::Hud {
                    field: HudField::Lives,
                    text: HudField::Lives.format(state.lives),
                });
                out.commands.push(Command::Destroy {
                    entity: obstacle.id,
                });
                out.events.push(GameEvent::ObstacleHit {
                    id: obstacle.id,
                    lives_left: state.lives,
                });
                if state.lives == 0 {
                    end_session(state, out);
                    break;
                }
            }
            ObstacleOutcome::Offscreen => {
                out.commands.push(Command::Destroy {
                    entity: obstacle.id,
                });
                out.events.push(GameEvent::ObstacleCleared { id: obstacle.id });
            }
        }
    }

    retained.extend(pending);
    state.obstacles = retained;
}

fn end_session(state: &mut SessionState, out: &mut StepOutput) {
    state.phase = SessionPhase::GameOver;
    let cancelled = state.scheduler.cancel_all();
    if cancelled > 0 {
        log::debug!("Cancelled {cancelled} pending events at game over");
    }
    log::info!(
        "Game over: score {} after {:.2}s",
        state.score,
        state.elapsed_secs()
    );
    out.commands.push(Command::GameOver);
    out.events.push(GameEvent::GameOver { score: state.score });
}

fn move_road(state: &mut SessionState, distance: f32, out: &mut StepOutput) {
    let wrap_z = state.config.road.wrap_z;
    let loop_length = state.config.road.loop_length();
    for segment in &mut state.road {
        segment.z -= distance;
        if segment.z < wrap_z {
            // A long frame can carry a segment past more than one loop
            segment.z = wrap_z + (segment.z - wrap_z).rem_euclid(loop_length);
        }
        out.commands.push(Command::Move {
            entity: segment.id,
            position: Vec3::new(0.0, 0.0, segment.z),
        });
    }
}
