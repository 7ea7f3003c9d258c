//! Rigid body state and the two integration primitives
//!
//! A `Body` owns one object's kinematic state plus the snapshot of that
//! state one tick behind, which is what lets rendering interpolate between
//! fixed simulation steps ("Fix Your Timestep").

use glam::{Mat3, Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// What a body is in the game, independent of how it is drawn.
///
/// The renderer maps roles to meshes/materials; simulation logic never
/// compares shape handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyRole {
    Bat,
    Ball,
}

/// Pose snapshot exactly one tick behind the current state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PrevPose {
    pub center: Vec3,
    pub rotation: Mat3,
}

/// A simulated rigid object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Body {
    pub role: BodyRole,
    /// Half-extents along local axes; fixed after creation
    pub size: Vec3,
    /// Position at the current simulated tick
    pub center: Vec3,
    /// Orientation at the current simulated tick
    pub rotation: Mat3,
    /// State at the prior tick, for render interpolation
    pub previous: PrevPose,
    /// World-space units per simulated second
    pub linear_velocity: Vec3,
    /// Spin rate about `spin_axis`, radians per second
    pub angular_velocity: f32,
    /// Unit spin axis
    pub spin_axis: Vec3,
    /// Render-only interpolated pose, refreshed by `blend`; never read by
    /// simulation logic
    #[serde(skip)]
    pub drawn_location: Mat4,
}

impl Body {
    /// Create a body at rest at the origin. Callers position it with
    /// [`Body::place`] before it enters play.
    pub fn new(role: BodyRole, size: Vec3) -> Self {
        Self {
            role,
            size,
            center: Vec3::ZERO,
            rotation: Mat3::IDENTITY,
            previous: PrevPose {
                center: Vec3::ZERO,
                rotation: Mat3::IDENTITY,
            },
            linear_velocity: Vec3::ZERO,
            angular_velocity: 0.0,
            spin_axis: Vec3::Y,
            drawn_location: Mat4::IDENTITY,
        }
    }

    /// Teleport the body and seed its velocities.
    ///
    /// `previous` is reset to the placed pose so the next `blend` starts
    /// with zero interpolation error. `spin_axis: None` keeps the current
    /// axis; a degenerate axis falls back to +Y rather than normalizing a
    /// near-zero vector.
    pub fn place(
        &mut self,
        center: Vec3,
        rotation: Mat3,
        linear_velocity: Vec3,
        angular_velocity: f32,
        spin_axis: Option<Vec3>,
    ) {
        self.center = center;
        self.rotation = rotation;
        self.previous = PrevPose { center, rotation };
        self.linear_velocity = linear_velocity;
        self.angular_velocity = angular_velocity;
        if let Some(axis) = spin_axis {
            self.spin_axis = axis.try_normalize().unwrap_or(Vec3::Y);
        }
    }

    /// Step the body forward by one fixed timestep (explicit Euler).
    ///
    /// Snapshots the pre-step pose into `previous`, so after every call
    /// `previous` lags the current state by exactly one `dt`. Must be
    /// called with the same `dt` the owning clock uses.
    pub fn advance(&mut self, dt: f32) {
        self.previous = PrevPose {
            center: self.center,
            rotation: self.rotation,
        };
        self.center += self.linear_velocity * dt;
        if self.angular_velocity != 0.0 {
            let spin = Mat3::from_axis_angle(self.spin_axis, self.angular_velocity * dt);
            self.rotation = spin * self.rotation;
        }
    }

    /// Produce the render pose `alpha` of the way from `previous` to the
    /// current state, composed with the fixed size scale.
    ///
    /// Rotation is blended component-wise on the raw matrices, not
    /// slerped; at large per-tick rotation deltas this shears. Accepted
    /// approximation: spin rates here stay far below one radian per tick.
    pub fn blend(&mut self, alpha: f32) -> Mat4 {
        let alpha = alpha.clamp(0.0, 1.0);
        let center = self.previous.center.lerp(self.center, alpha);
        let rotation = self.previous.rotation * (1.0 - alpha) + self.rotation * alpha;
        self.drawn_location =
            Mat4::from_translation(center) * Mat4::from_mat3(rotation) * Mat4::from_scale(self.size);
        self.drawn_location
    }

    /// Current (non-interpolated) transform, used by collision testing
    pub fn pose(&self) -> Mat4 {
        Mat4::from_translation(self.center)
            * Mat4::from_mat3(self.rotation)
            * Mat4::from_scale(self.size)
    }

    /// Distance from the world origin (the plate)
    #[inline]
    pub fn norm(&self) -> f32 {
        self.center.length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_body() -> Body {
        let mut body = Body::new(BodyRole::Ball, Vec3::splat(0.5));
        body.place(
            Vec3::new(1.0, 2.0, 3.0),
            Mat3::IDENTITY,
            Vec3::new(0.5, -1.0, 4.0),
            3.0,
            Some(Vec3::X),
        );
        body
    }

    #[test]
    fn test_place_resets_previous() {
        let body = test_body();
        assert_eq!(body.previous.center, body.center);
        assert_eq!(body.previous.rotation, body.rotation);
    }

    #[test]
    fn test_advance_one_step_lag() {
        let mut body = test_body();
        let dt = 0.05;
        for _ in 0..10 {
            let before_center = body.center;
            let before_rotation = body.rotation;
            body.advance(dt);
            assert_eq!(body.previous.center, before_center);
            assert_eq!(body.previous.rotation, before_rotation);
        }
    }

    #[test]
    fn test_advance_euler_position() {
        let mut body = test_body();
        body.advance(0.05);
        let expected = Vec3::new(1.0, 2.0, 3.0) + Vec3::new(0.5, -1.0, 4.0) * 0.05;
        assert!((body.center - expected).length() < 1e-6);
    }

    #[test]
    fn test_blend_endpoints() {
        let mut body = test_body();
        body.advance(0.05);

        let at_zero = body.blend(0.0);
        let prev_pose = Mat4::from_translation(body.previous.center)
            * Mat4::from_mat3(body.previous.rotation)
            * Mat4::from_scale(body.size);
        assert!(at_zero.abs_diff_eq(prev_pose, 1e-5));

        let at_one = body.blend(1.0);
        assert!(at_one.abs_diff_eq(body.pose(), 1e-5));
    }

    #[test]
    fn test_degenerate_spin_axis_falls_back() {
        let mut body = test_body();
        body.place(Vec3::ZERO, Mat3::IDENTITY, Vec3::ZERO, 1.0, Some(Vec3::ZERO));
        assert_eq!(body.spin_axis, Vec3::Y);
    }

    #[test]
    fn test_spin_advances_rotation() {
        let mut body = test_body();
        body.place(
            Vec3::ZERO,
            Mat3::IDENTITY,
            Vec3::ZERO,
            std::f32::consts::FRAC_PI_2,
            Some(Vec3::Y),
        );
        // Quarter turn per second at dt=1.0
        body.advance(1.0);
        let expected = Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(body.rotation.abs_diff_eq(expected, 1e-5));
    }

    proptest! {
        /// Blended centers stay on the segment between previous and current.
        #[test]
        fn prop_blend_on_segment(alpha in 0.0f32..=1.0, vx in -20.0f32..20.0, vz in -20.0f32..20.0) {
            let mut body = Body::new(BodyRole::Ball, Vec3::splat(0.5));
            body.place(Vec3::ZERO, Mat3::IDENTITY, Vec3::new(vx, 0.0, vz), 0.0, None);
            body.advance(0.05);

            body.blend(alpha);
            let blended = body.drawn_location.w_axis.truncate();
            let a = body.previous.center;
            let b = body.center;
            let lo = a.min(b) - Vec3::splat(1e-4);
            let hi = a.max(b) + Vec3::splat(1e-4);
            prop_assert!(blended.cmpge(lo).all() && blended.cmple(hi).all());
        }
    }
}
