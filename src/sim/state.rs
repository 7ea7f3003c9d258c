//! Game progression state and core simulation types
//!
//! Everything the pitch/hit/score loop mutates lives in one explicit
//! `GameState` passed into the tick function; nothing hides in globals.

use glam::{Mat3, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::{Body, BodyRole};
use crate::consts::*;
use crate::random_unit_vector;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting on the start prompt
    NotStarted,
    /// Pitches flying
    Playing,
    /// Pitch budget spent short of the target
    GameOver,
    /// Final level cleared
    Won,
}

/// Per-level goal: home runs required and pitches allowed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelSpec {
    pub target_runs: u32,
    pub pitch_budget: i32,
}

/// Difficulty progression, easiest first
pub const LEVELS: [LevelSpec; 3] = [
    LevelSpec {
        target_runs: 3,
        pitch_budget: 10,
    },
    LevelSpec {
        target_runs: 4,
        pitch_budget: 10,
    },
    LevelSpec {
        target_runs: 5,
        pitch_budget: 10,
    },
];

/// Fire-and-forget notifications for the host collaborators (audio cues,
/// spectator camera, HUD). Drained once per frame; dropping them is safe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PitchThrown,
    /// Bat met ball; play the crack
    BatContact,
    /// First ground contact after a hit, with the fence verdict
    Landed { home_run: bool },
    /// Ball left play (settled or out of bounds)
    BallRetired,
    /// The spectator camera should step back toward the plate
    CameraStepBack,
    LevelAdvanced { level: usize },
    GameOver,
    GameWon,
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// RNG stream; serialized whole so a restored game continues the
    /// same sequence
    pub rng: Pcg32,
    /// Current phase
    pub phase: GamePhase,
    /// Index into [`LEVELS`]
    pub level: usize,
    /// Home runs this level
    pub score: u32,
    /// Counts down through 0; -1 means the budget is spent
    pub pitches_remaining: i32,
    /// Set on the first bat/ball contact of a pitch
    pub ball_hit: bool,
    /// Set on the first ground contact after a hit
    pub ball_bounced: bool,
    /// Simulated seconds elapsed
    pub time: f64,
    /// When the last pitch left the mound
    pub last_pitch_time: f64,
    /// The bat, tracking the externally driven swing pose
    pub bat: Body,
    /// The ball in play; `None` is the idle state, not an error
    pub ball: Option<Body>,
    /// Pending notifications for the host
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh game at level 1, waiting on the start prompt
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: GamePhase::NotStarted,
            level: 0,
            score: 0,
            pitches_remaining: LEVELS[0].pitch_budget,
            ball_hit: false,
            ball_bounced: false,
            time: 0.0,
            last_pitch_time: f64::NEG_INFINITY,
            bat: Body::new(
                BodyRole::Bat,
                Vec3::new(BAT_HALF_THICKNESS, BAT_HALF_THICKNESS, BAT_HALF_LENGTH),
            ),
            ball: None,
            events: Vec::new(),
        }
    }

    /// The active level's goal
    pub fn level_spec(&self) -> LevelSpec {
        LEVELS[self.level.min(LEVELS.len() - 1)]
    }

    /// Begin play (from the start prompt, or a restart after an ending)
    pub fn start(&mut self) {
        self.level = 0;
        self.score = 0;
        self.pitches_remaining = LEVELS[0].pitch_budget;
        self.ball_hit = false;
        self.ball_bounced = false;
        self.ball = None;
        self.last_pitch_time = f64::NEG_INFINITY;
        self.phase = GamePhase::Playing;
        log::info!("play ball (seed {})", self.seed);
    }

    /// Throw the next pitch: random speed in [10, 18), one of five lateral
    /// lanes, random spin axis.
    pub fn spawn_pitch(&mut self) {
        self.pitches_remaining -= 1;
        let speed = self.rng.random_range(PITCH_SPEED_MIN..PITCH_SPEED_MAX);
        let lane = self.rng.random_range(-2i32..=2) as f32 * PITCH_LANE_STEP;
        let axis = random_unit_vector(&mut self.rng);

        let mut ball = Body::new(BodyRole::Ball, Vec3::splat(BALL_RADIUS));
        ball.place(
            Vec3::new(lane, PITCH_HEIGHT, MOUND_Z),
            Mat3::IDENTITY,
            Vec3::new(0.0, 0.0, speed),
            PITCH_SPIN,
            Some(axis),
        );
        self.ball = Some(ball);
        self.last_pitch_time = self.time;
        self.events.push(GameEvent::PitchThrown);
        log::debug!(
            "pitch away: speed {:.1}, lane {:+.1}, {} left",
            speed,
            lane,
            self.pitches_remaining
        );
    }

    /// Remove the ball from play and clear the per-pitch flags
    pub fn retire_ball(&mut self) {
        self.ball = None;
        self.ball_hit = false;
        self.ball_bounced = false;
        self.events.push(GameEvent::BallRetired);
    }

    /// Refresh every live body's render pose after the step loop
    pub fn blend_all(&mut self, alpha: f32) {
        self.bat.blend(alpha);
        if let Some(ball) = self.ball.as_mut() {
            ball.blend(alpha);
        }
    }

    /// Take this frame's pending host notifications
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_game_is_idle() {
        let state = GameState::new(1);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert!(state.ball.is_none());
        assert_eq!(state.pitches_remaining, 10);
        assert_eq!(state.level_spec().target_runs, 3);
    }

    #[test]
    fn test_spawn_pitch_decrements_and_events() {
        let mut state = GameState::new(1);
        state.start();
        state.spawn_pitch();
        assert_eq!(state.pitches_remaining, 9);
        let ball = state.ball.as_ref().unwrap();
        assert_eq!(ball.center.z, MOUND_Z);
        assert!(ball.linear_velocity.z >= PITCH_SPEED_MIN);
        assert!(ball.linear_velocity.z < PITCH_SPEED_MAX);
        assert!((ball.spin_axis.length() - 1.0).abs() < 1e-4);
        assert!(state.events.contains(&GameEvent::PitchThrown));
    }

    #[test]
    fn test_pitch_lane_is_one_of_five() {
        let mut state = GameState::new(99);
        state.start();
        for _ in 0..20 {
            state.spawn_pitch();
            let x = state.ball.as_ref().unwrap().center.x;
            let lane = (x / PITCH_LANE_STEP).round();
            assert!((-2.0..=2.0).contains(&lane));
            assert!((x - lane * PITCH_LANE_STEP).abs() < 1e-5);
            state.retire_ball();
        }
    }

    #[test]
    fn test_state_roundtrips_through_serde() {
        let mut state = GameState::new(42);
        state.start();
        state.spawn_pitch();
        let json = serde_json::to_string(&state).unwrap();
        let mut restored: GameState = serde_json::from_str(&json).unwrap();

        // The restored RNG continues the same stream
        let a: u32 = state.rng.random();
        let b: u32 = restored.rng.random();
        assert_eq!(a, b);
        assert_eq!(restored.pitches_remaining, state.pitches_remaining);
    }
}
