//! Fixed timestep simulation tick
//!
//! The pitch/hit/bounce/score state machine, advanced once per fixed step.
//! The informal states: Idle (no ball) -> Pitched -> Hit -> Bouncing ->
//! Settling -> back to Idle, with the progression check running once per
//! rendered frame rather than per tick.

use glam::{Mat3, Vec3};
use rand::Rng;

use super::collider::Collider;
use super::state::{GameEvent, GamePhase, GameState, LEVELS};
use crate::consts::*;

/// Externally driven bat pose for one tick. The swing animation lives in
/// the host (see `scene::BatSwing`); the simulation only reads the result.
#[derive(Debug, Clone, Copy)]
pub struct TickInput {
    pub bat_center: Vec3,
    pub bat_rotation: Mat3,
}

/// Landing verdict: inside the lateral fence posts and past a depth line
/// that recedes as the ball pulls foul-ward.
#[inline]
pub fn is_home_run(x: f32, z: f32) -> bool {
    x.abs() < FENCE_LATERAL_MAX && z.abs() > FENCE_DEPTH - x.abs()
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput, collider: &Collider, dt: f32) {
    state.time += dt as f64;

    // The bat tracks the swing pose; re-placing resets its interpolation
    // snapshot, so the bat renders at the tick rate while the ball blends.
    state
        .bat
        .place(input.bat_center, input.bat_rotation, Vec3::ZERO, 0.0, None);

    if state.phase != GamePhase::Playing {
        return;
    }

    // Pitch cadence: next ball once the previous one is gone, the delay
    // has passed, and the budget isn't spent
    if state.ball.is_none()
        && state.time - state.last_pitch_time >= PITCH_DELAY
        && state.pitches_remaining > -1
    {
        state.spawn_pitch();
    }

    // First contact check, skipped once the ball is struck
    if !state.ball_hit {
        if let Some(ball) = state.ball.as_mut() {
            let bat_inverse = state.bat.pose().inverse();
            if collider.colliding(&state.bat, &bat_inverse, ball) {
                state.ball_hit = true;
                ball.angular_velocity = 0.0;
                state.events.push(GameEvent::BatContact);
                log::debug!("contact at {:?}", ball.center);
            }
        }
    }

    if state.ball_hit {
        if let Some(ball) = state.ball.as_mut() {
            if ball.linear_velocity.z > 0.0 {
                // Bat redirect: x/z velocity re-derived from position every
                // tick until the depth component flips toward the field,
                // with a fresh random loft each time. Not a drag model;
                // this recurrence IS the gameplay feel.
                ball.linear_velocity.x = (ball.center.z + 1.0) * LAUNCH_SLICE_GAIN;
                ball.linear_velocity.z *=
                    -f32::min(LAUNCH_DEPTH_CAP, ball.center.z.abs() * LAUNCH_DEPTH_GAIN);
                ball.linear_velocity.y += state.rng.random_range(LOFT_MIN..LOFT_MAX);
            } else {
                ball.linear_velocity.y += dt * GRAVITY;
            }

            // Ground contact while descending: judge the first landing,
            // dampen every one
            if ball.center.y < GROUND_Y && ball.linear_velocity.y < 0.0 {
                if !state.ball_bounced {
                    state.ball_bounced = true;
                    let home_run = is_home_run(ball.center.x, ball.center.z);
                    if home_run {
                        state.score += 1;
                    }
                    state.events.push(GameEvent::Landed { home_run });
                    log::info!(
                        "landed at ({:.0}, {:.0}): {}",
                        ball.center.x,
                        ball.center.z,
                        if home_run { "HOME RUN" } else { "in play" }
                    );
                }
                ball.linear_velocity.x *= BOUNCE_DAMP;
                ball.linear_velocity.y *= -BOUNCE_DAMP;
                ball.linear_velocity.z *= BOUNCE_DAMP;
                ball.angular_velocity *= BOUNCE_SPIN_DAMP;
            }

            // Rolling out: stop falling once slow and grounded
            if ball.linear_velocity.length() < SETTLE_SPEED && ball.center.y < GROUND_Y {
                ball.linear_velocity.y = 0.0;
            }
        }
    }

    // Lifecycle: settled balls and strays leave play
    let mut retire = false;
    let mut step_back = false;
    if let Some(ball) = state.ball.as_ref() {
        let v = ball.linear_velocity;
        let at_rest = state.ball_hit
            && v.x.abs() < REST_SPEED
            && v.y.abs() < REST_SPEED
            && v.z.abs() < REST_SPEED;
        let bound = if state.ball_hit {
            RETIRE_DIST_HIT
        } else {
            RETIRE_DIST_PITCH
        };
        if at_rest || ball.norm() > bound {
            retire = true;
            step_back = state.ball_hit && ball.norm() < CAMERA_NEAR_RETIRE;
        }
    }
    if retire {
        state.retire_ball();
        if step_back {
            state.events.push(GameEvent::CameraStepBack);
        }
    }

    // Integrate every live body
    state.bat.advance(dt);
    if let Some(ball) = state.ball.as_mut() {
        ball.advance(dt);
    }
}

/// Level and ending bookkeeping, evaluated once per rendered frame.
///
/// Reaching the target advances immediately (retiring any live ball);
/// an exhausted budget is only judged once the final ball has resolved,
/// so a last-pitch homer still counts.
pub fn update_progression(state: &mut GameState) {
    if state.phase != GamePhase::Playing {
        return;
    }
    let spec = state.level_spec();

    if state.score >= spec.target_runs {
        if state.level + 1 >= LEVELS.len() {
            state.phase = GamePhase::Won;
            state.events.push(GameEvent::GameWon);
            log::info!("final level cleared");
        } else {
            state.level += 1;
            state.score = 0;
            state.pitches_remaining = LEVELS[state.level].pitch_budget;
            if state.ball.is_some() {
                state.retire_ball();
            }
            state.events.push(GameEvent::LevelAdvanced { level: state.level });
            log::info!("advancing to level {}", state.level + 1);
        }
    } else if state.pitches_remaining <= -1 && state.ball.is_none() {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver);
        log::info!("out of pitches at {}/{}", state.score, spec.target_runs);
    }
}
