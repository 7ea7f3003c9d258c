//! Scene boundary: what the external renderer consumes
//!
//! The simulation never draws. Each frame the host asks for a list of
//! `(shape, material, pose)` triples built from the bodies' blended poses
//! and hands them to the scene-graph renderer; shape and material are
//! opaque handles the host maps to its own meshes and textures.
//!
//! The bat swing animation also lives on this side of the boundary: the
//! simulation treats the bat pose as external input (`TickInput`), and
//! `BatSwing` is what produces it.

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::{BodyRole, GameState, TickInput};

/// Opaque mesh handle; meaningful only to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeId(pub u32);

/// Opaque material handle; meaningful only to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialId(pub u32);

pub const SHAPE_BAT: ShapeId = ShapeId(0);
pub const SHAPE_BALL: ShapeId = ShapeId(1);
pub const MAT_ASH: MaterialId = MaterialId(0);
pub const MAT_HORSEHIDE: MaterialId = MaterialId(1);

fn handles_for(role: BodyRole) -> (ShapeId, MaterialId) {
    match role {
        BodyRole::Bat => (SHAPE_BAT, MAT_ASH),
        BodyRole::Ball => (SHAPE_BALL, MAT_HORSEHIDE),
    }
}

/// One renderer draw call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawCommand {
    pub shape: ShapeId,
    pub material: MaterialId,
    pub pose: Mat4,
}

/// Build this frame's draw calls from the blended poses. Call after
/// `GameState::blend_all`.
pub fn draw_list(state: &GameState) -> Vec<DrawCommand> {
    let mut commands = Vec::with_capacity(2);
    let (shape, material) = handles_for(state.bat.role);
    commands.push(DrawCommand {
        shape,
        material,
        pose: state.bat.drawn_location,
    });
    if let Some(ball) = state.ball.as_ref() {
        let (shape, material) = handles_for(ball.role);
        commands.push(DrawCommand {
            shape,
            material,
            pose: ball.drawn_location,
        });
    }
    commands
}

/// Candidate spectator focus: the ball in flight, else the plate.
/// Step-back requests travel separately as `GameEvent::CameraStepBack`.
pub fn camera_target(state: &GameState) -> Vec3 {
    state
        .ball
        .as_ref()
        .map(|ball| ball.center)
        .unwrap_or(Vec3::new(0.0, PITCH_HEIGHT, 0.0))
}

/// Seconds from trigger to follow-through
pub const SWING_DURATION: f32 = 0.35;
/// Pivot-to-bat-center distance (half length plus grip)
const BAT_GRIP_OFFSET: f32 = BAT_HALF_LENGTH + 0.3;
/// Where the batter's hands sit relative to the plate
const PIVOT_X: f32 = 1.6;
const PIVOT_Z: f32 = 0.9;
/// Swing arc about the vertical axis, wind-up to follow-through
const WIND_UP_ANGLE: f32 = -0.9;
const FOLLOW_THROUGH_ANGLE: f32 = -3.4;

/// The externally driven swing animation feeding the bat pose into the
/// simulation. One shot: a trigger sweeps the bat once through the zone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatSwing {
    /// Batter's lateral shift, clamped to the pitch lanes
    pub batter_x: f32,
    /// Swing progress in [0, 1); `None` between swings
    phase: Option<f32>,
}

impl BatSwing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slide the batter sideways (input collaborator)
    pub fn shift(&mut self, dx: f32) {
        self.batter_x = (self.batter_x + dx).clamp(-BATTER_SHIFT_MAX, BATTER_SHIFT_MAX);
    }

    /// Start a swing; ignored while one is in progress
    pub fn request(&mut self) {
        if self.phase.is_none() {
            self.phase = Some(0.0);
        }
    }

    pub fn swinging(&self) -> bool {
        self.phase.is_some()
    }

    /// Advance the animation by one tick
    pub fn advance(&mut self, dt: f32) {
        if let Some(phase) = self.phase.as_mut() {
            *phase += dt / SWING_DURATION;
            if *phase >= 1.0 {
                self.phase = None;
            }
        }
    }

    /// The bat pose for this tick
    pub fn tick_input(&self) -> TickInput {
        let pivot = Vec3::new(PIVOT_X + self.batter_x, PITCH_HEIGHT, PIVOT_Z);
        let rotation = match self.phase {
            Some(phase) => {
                let angle = WIND_UP_ANGLE + (FOLLOW_THROUGH_ANGLE - WIND_UP_ANGLE) * phase;
                Mat3::from_rotation_y(angle)
            }
            // At rest the bat sits shouldered, tipped up out of the zone
            None => Mat3::from_rotation_y(WIND_UP_ANGLE) * Mat3::from_rotation_x(-1.1),
        };
        TickInput {
            bat_center: pivot + rotation * Vec3::new(0.0, 0.0, BAT_GRIP_OFFSET),
            bat_rotation: rotation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::GameState;

    #[test]
    fn test_draw_list_tracks_ball_presence() {
        let mut state = GameState::new(1);
        state.blend_all(0.5);
        let idle = draw_list(&state);
        assert_eq!(idle.len(), 1);
        assert_eq!(idle[0].shape, SHAPE_BAT);

        state.start();
        state.spawn_pitch();
        state.blend_all(0.5);
        let pitched = draw_list(&state);
        assert_eq!(pitched.len(), 2);
        assert_eq!(pitched[1].shape, SHAPE_BALL);
        assert_eq!(pitched[1].material, MAT_HORSEHIDE);
    }

    #[test]
    fn test_camera_follows_ball() {
        let mut state = GameState::new(1);
        assert_eq!(camera_target(&state), Vec3::new(0.0, PITCH_HEIGHT, 0.0));
        state.start();
        state.spawn_pitch();
        assert_eq!(camera_target(&state), state.ball.as_ref().unwrap().center);
    }

    #[test]
    fn test_shift_clamps_to_lanes() {
        let mut swing = BatSwing::new();
        for _ in 0..10 {
            swing.shift(BATTER_SHIFT_STEP);
        }
        assert_eq!(swing.batter_x, BATTER_SHIFT_MAX);
        for _ in 0..10 {
            swing.shift(-BATTER_SHIFT_STEP);
        }
        assert_eq!(swing.batter_x, -BATTER_SHIFT_MAX);
    }

    #[test]
    fn test_swing_is_one_shot() {
        let mut swing = BatSwing::new();
        assert!(!swing.swinging());
        swing.request();
        assert!(swing.swinging());

        let mut elapsed = 0.0;
        while swing.swinging() {
            swing.advance(crate::consts::SIM_DT);
            elapsed += crate::consts::SIM_DT;
            assert!(elapsed < 2.0 * SWING_DURATION + 0.1, "swing never finished");
        }
        // Re-arms after completing
        swing.request();
        assert!(swing.swinging());
    }

    #[test]
    fn test_swing_sweeps_through_the_zone() {
        let mut swing = BatSwing::new();

        // At rest the bat center stays up out of the strike corridor
        let rest = swing.tick_input();
        assert!(rest.bat_center.y > PITCH_HEIGHT + 1.0);

        // Mid-swing the bat drops level and its tip crosses the plate side
        swing.request();
        for _ in 0..((SWING_DURATION / crate::consts::SIM_DT / 2.0) as usize) {
            swing.advance(crate::consts::SIM_DT);
        }
        let mid = swing.tick_input();
        assert!((mid.bat_center.y - PITCH_HEIGHT).abs() < 1e-4);
        let tip = mid.bat_center + mid.bat_rotation * Vec3::new(0.0, 0.0, BAT_HALF_LENGTH);
        assert!(tip.x < 0.5, "tip x = {}", tip.x);
    }
}
