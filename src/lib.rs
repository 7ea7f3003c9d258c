//! Dinger - a backyard home-run derby in the browser
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collision, fixed-step clock, game state)
//! - `scene`: Draw-list and camera boundary consumed by the external scene-graph renderer
//! - `audio`: Procedural Web Audio cues (wasm only)
//! - `settings`: User preferences
//! - `highscores`: LocalStorage leaderboard

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod highscores;
pub mod scene;
pub mod settings;
pub mod sim;

pub use highscores::HighScores;
pub use settings::{QualityPreset, Settings};

use glam::Vec3;
use rand::Rng;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (20 Hz; rendering interpolates between ticks)
    pub const SIM_DT: f32 = 1.0 / 20.0;
    /// Per-frame cap on simulated time to prevent spiral of death
    pub const MAX_FRAME_TIME: f32 = 0.1;

    /// Field geometry. The plate sits at the origin, the mound toward -z,
    /// the outfield behind it; +z is toward the camera behind the batter.
    pub const GROUND_Y: f32 = -9.7;
    /// Pitcher's release point
    pub const MOUND_Z: f32 = -17.0;
    /// Release height (strike-zone level)
    pub const PITCH_HEIGHT: f32 = -6.8;
    /// Seconds between pitch events
    pub const PITCH_DELAY: f64 = 2.0;
    /// Pitch speed range, world units per second
    pub const PITCH_SPEED_MIN: f32 = 10.0;
    pub const PITCH_SPEED_MAX: f32 = 18.0;
    /// Lateral pitch lanes: integer draw in -2..=2 times this step
    pub const PITCH_LANE_STEP: f32 = 0.3;
    /// Spin rate on a fresh pitch (rad/s, random axis). Kept well under a
    /// radian per tick so the render-side matrix lerp stays clean.
    pub const PITCH_SPIN: f32 = 8.0;

    /// Post-hit launch model (see sim::tick)
    pub const LAUNCH_SLICE_GAIN: f32 = 5.0;
    pub const LAUNCH_DEPTH_CAP: f32 = 3.6;
    pub const LAUNCH_DEPTH_GAIN: f32 = 3.0;
    pub const LOFT_MIN: f32 = 10.0;
    pub const LOFT_MAX: f32 = 31.0;
    pub const GRAVITY: f32 = -9.8;

    /// Bounce damping per ground contact
    pub const BOUNCE_DAMP: f32 = 0.6;
    pub const BOUNCE_SPIN_DAMP: f32 = 0.5;

    /// Home-run fence: |x| must stay inside this...
    pub const FENCE_LATERAL_MAX: f32 = 150.0;
    /// ...and |z| must clear this minus |x| (diamond-shaped boundary)
    pub const FENCE_DEPTH: f32 = 160.0;

    /// Below this speed a grounded ball stops falling
    pub const SETTLE_SPEED: f32 = 2.0;
    /// Below this per-component speed the ball is retired
    pub const REST_SPEED: f32 = 0.5;

    /// Out-of-bounds cleanup distances from the plate
    pub const RETIRE_DIST_HIT: f32 = 300.0;
    pub const RETIRE_DIST_PITCH: f32 = 40.0;
    /// A hit ball retired inside this radius asks the spectator camera to step back
    pub const CAMERA_NEAR_RETIRE: f32 = 90.0;

    /// Body sizes (half-extents)
    pub const BALL_RADIUS: f32 = 0.5;
    pub const BAT_HALF_THICKNESS: f32 = 0.35;
    pub const BAT_HALF_LENGTH: f32 = 2.1;

    /// Batter lateral travel, clamped to the pitch lanes
    pub const BATTER_SHIFT_MAX: f32 = 0.6;
    pub const BATTER_SHIFT_STEP: f32 = 0.3;

    /// Collision margin on the bat's unit-sphere test
    pub const COLLIDER_LEEWAY: f32 = 0.1;
}

/// Draw a random unit vector (uniform over the sphere by rejection).
///
/// Falls back to +Y on the measure-zero degenerate draw rather than
/// normalizing a near-zero vector.
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    for _ in 0..16 {
        let v = Vec3::new(
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
            rng.random_range(-1.0..1.0),
        );
        let len_sq = v.length_squared();
        if len_sq > 1e-4 && len_sq <= 1.0 {
            return v / len_sq.sqrt();
        }
    }
    Vec3::Y
}
