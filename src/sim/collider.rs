//! Approximate ellipsoid-vs-ellipsoid collision by point sampling
//!
//! One body's sample cloud is pulled into the other body's local frame,
//! where that body occupies the unit sphere (or unit cube); any sample
//! landing inside means overlap. One-directional and tunable via the
//! margin; not an exact analytic intersection.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::body::Body;

/// Canonical unit-volume membership test, selected by configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IntersectTest {
    /// Squared distance from the origin under `1 + leeway`
    Sphere,
    /// Every axis within `±(1 + leeway)`
    Cube,
}

impl IntersectTest {
    /// Whether a point in a body's normalized local frame is inside it
    #[inline]
    pub fn contains(self, p: Vec3, leeway: f32) -> bool {
        match self {
            IntersectTest::Sphere => p.length_squared() < 1.0 + leeway,
            IntersectTest::Cube => {
                let bound = 1.0 + leeway;
                p.x.abs() < bound && p.y.abs() < bound && p.z.abs() < bound
            }
        }
    }
}

/// Collision configuration: the membership test, the sample cloud used to
/// approximate a body's hull, and the margin. Stateless; shared read-only
/// by every pairwise check in a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collider {
    pub test: IntersectTest,
    pub points: Vec<Vec3>,
    pub leeway: f32,
}

impl Collider {
    /// Build a collider. An empty sample cloud is a configuration error
    /// and fails fast here rather than silently never colliding.
    pub fn new(test: IntersectTest, points: Vec<Vec3>, leeway: f32) -> Self {
        assert!(
            !points.is_empty(),
            "collider requires a non-empty sample point cloud"
        );
        Self {
            test,
            points,
            leeway,
        }
    }

    /// Sphere test over a tessellated unit-sphere vertex cloud
    pub fn sphere_sampled(rings: usize, sectors: usize, leeway: f32) -> Self {
        Self::new(
            IntersectTest::Sphere,
            unit_sphere_points(rings, sectors),
            leeway,
        )
    }

    /// Approximate overlap test: does any vertex of `b`'s cloud land
    /// inside `a`'s normalized volume?
    ///
    /// `a_inverse` is `a.pose().inverse()`, cached by the caller since it
    /// is reused across every pairwise test involving `a` in a frame.
    /// Pure; never true for a body against itself.
    ///
    /// A cloud too coarse for the closing speed can tunnel straight
    /// through between ticks; accepted limitation, handled upstream by
    /// gameplay-scale speeds rather than swept tests.
    pub fn colliding(&self, a: &Body, a_inverse: &Mat4, b: &Body) -> bool {
        if std::ptr::eq(a, b) {
            return false;
        }
        let to_a_local = *a_inverse * b.pose();
        self.points
            .iter()
            .any(|&p| self.test.contains(to_a_local.transform_point3(p), self.leeway))
    }
}

/// Vertex positions of a lat/long tessellated unit sphere, poles included
pub fn unit_sphere_points(rings: usize, sectors: usize) -> Vec<Vec3> {
    let mut points = Vec::with_capacity(rings * sectors + 2);
    points.push(Vec3::Y);
    points.push(Vec3::NEG_Y);
    for ring in 1..=rings {
        let polar = std::f32::consts::PI * ring as f32 / (rings + 1) as f32;
        let (sin_polar, cos_polar) = polar.sin_cos();
        for sector in 0..sectors {
            let azimuth = std::f32::consts::TAU * sector as f32 / sectors as f32;
            let (sin_az, cos_az) = azimuth.sin_cos();
            points.push(Vec3::new(
                sin_polar * cos_az,
                cos_polar,
                sin_polar * sin_az,
            ));
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::body::BodyRole;
    use glam::Mat3;

    fn body_at(center: Vec3, size: Vec3) -> Body {
        let mut body = Body::new(BodyRole::Ball, size);
        body.place(center, Mat3::IDENTITY, Vec3::ZERO, 0.0, None);
        body
    }

    fn collider() -> Collider {
        Collider::sphere_sampled(5, 8, 0.1)
    }

    #[test]
    fn test_sphere_points_are_unit() {
        for p in unit_sphere_points(5, 8) {
            assert!((p.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_intersect_tests() {
        assert!(IntersectTest::Sphere.contains(Vec3::new(0.5, 0.5, 0.5), 0.0));
        assert!(!IntersectTest::Sphere.contains(Vec3::new(1.0, 1.0, 0.0), 0.0));
        assert!(IntersectTest::Cube.contains(Vec3::new(0.99, -0.99, 0.0), 0.0));
        assert!(!IntersectTest::Cube.contains(Vec3::new(1.2, 0.0, 0.0), 0.1));
        // Leeway admits points just outside the unit volume
        assert!(IntersectTest::Sphere.contains(Vec3::new(1.02, 0.0, 0.0), 0.1));
    }

    #[test]
    fn test_self_collision_is_false() {
        let a = body_at(Vec3::ZERO, Vec3::ONE);
        let a_inverse = a.pose().inverse();
        // A body trivially overlaps its own volume; the identity check
        // must short-circuit first.
        assert!(!collider().colliding(&a, &a_inverse, &a));
    }

    #[test]
    fn test_overlapping_bodies_collide() {
        let a = body_at(Vec3::ZERO, Vec3::new(2.0, 1.0, 1.0));
        let b = body_at(Vec3::new(2.5, 0.0, 0.0), Vec3::splat(1.0));
        let a_inverse = a.pose().inverse();
        assert!(collider().colliding(&a, &a_inverse, &b));
    }

    #[test]
    fn test_disjoint_bodies_miss() {
        let a = body_at(Vec3::ZERO, Vec3::ONE);
        let b = body_at(Vec3::new(5.0, 0.0, 0.0), Vec3::ONE);
        let a_inverse = a.pose().inverse();
        assert!(!collider().colliding(&a, &a_inverse, &b));
    }

    #[test]
    fn test_rotated_ellipsoid_reach() {
        // A long ellipsoid along local z, swung 90 degrees about y, reaches
        // along world x.
        let mut bat = Body::new(BodyRole::Bat, Vec3::new(0.35, 0.35, 2.1));
        bat.place(
            Vec3::ZERO,
            Mat3::from_rotation_y(std::f32::consts::FRAC_PI_2),
            Vec3::ZERO,
            0.0,
            None,
        );
        let ball = body_at(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(0.5));
        let bat_inverse = bat.pose().inverse();
        assert!(collider().colliding(&bat, &bat_inverse, &ball));

        // Same ball along world z is now past the thin side
        let miss = body_at(Vec3::new(0.0, 0.0, 2.0), Vec3::splat(0.5));
        assert!(!collider().colliding(&bat, &bat_inverse, &miss));
    }

    #[test]
    #[should_panic(expected = "non-empty sample point cloud")]
    fn test_empty_cloud_fails_fast() {
        let _ = Collider::new(IntersectTest::Sphere, Vec::new(), 0.1);
    }
}
