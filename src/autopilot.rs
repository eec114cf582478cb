//! Lane-dodging autopilot
//!
//! Drives headless runs: looks at the closest obstacle coming down the
//! player's lane and either sidesteps into a clear lane or jumps.

use crate::sim::{SessionState, StepInput};

/// Seconds of look-ahead before the autopilot reacts
const REACTION_TIME: f32 = 0.5;

/// Is anything in `lane` between the player and `horizon` units ahead?
fn lane_blocked(state: &SessionState, lane: usize, horizon: f32) -> bool {
    let player_z = state.player.pos.z;
    let tolerance = state.config.collision_tolerance;
    state.obstacles.iter().any(|o| {
        o.lane == lane && o.pos.z > player_z - tolerance && o.pos.z - player_z < horizon
    })
}

/// Pick the input for the next frame
pub fn suggest_input(state: &SessionState) -> StepInput {
    if state.is_over() {
        return StepInput::default();
    }

    let horizon = state.speed * REACTION_TIME + state.config.collision_tolerance * 2.0;
    let lane = state.player.lane;
    if !lane_blocked(state, lane, horizon) {
        return StepInput::default();
    }

    // Prefer stepping aside, check the wider window so we don't dodge into trouble
    if lane > 0 && !lane_blocked(state, lane - 1, horizon * 1.5) {
        return StepInput {
            lane_left: true,
            ..Default::default()
        };
    }
    if lane + 1 < state.config.lane_count && !lane_blocked(state, lane + 1, horizon * 1.5) {
        return StepInput {
            lane_right: true,
            ..Default::default()
        };
    }

    StepInput {
        jump: true,
        ..Default::default()
    }
}
