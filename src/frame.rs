//! Tangent frames on climbable surfaces.

use crate::prelude::*;

/// World up. Climbing assumes gravity points along `-WORLD_UP`.
pub const WORLD_UP: Vec3 = Vec3::Y;

/// Horizontal direction along the surface with the given normal.
///
/// When facing the surface, this points to the climber's right.
/// Near-zero for surfaces whose normal is parallel to [`WORLD_UP`], i.e. floors and ceilings.
pub fn tangent_right(normal: Vec3) -> Vec3 {
    WORLD_UP.cross(normal).normalize_or_zero()
}

/// Direction "up the surface" with the given normal, perpendicular to [`tangent_right`].
pub fn tangent_up(normal: Vec3) -> Vec3 {
    normal.cross(tangent_right(normal)).normalize_or_zero()
}

/// `{right, up, normal}` on a surface, right-handed.
#[derive(Clone, Copy, Reflect, Debug, PartialEq)]
pub struct TangentFrame {
    pub right: Vec3,
    pub up: Vec3,
    pub normal: Vec3,
}

impl TangentFrame {
    pub fn from_normal(normal: Vec3) -> Self {
        Self {
            right: tangent_right(normal),
            up: tangent_up(normal),
            normal,
        }
    }

    /// Maps 2D input (`x` = right, `y` = up) onto the surface.
    pub fn project(&self, input: Vec2) -> Vec3 {
        self.right * input.x + self.up * input.y
    }

    /// The orientation of a body facing into the surface.
    pub fn facing_rotation(&self) -> Quat {
        Transform::default().looking_to(-self.normal, WORLD_UP).rotation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_orthonormal(normal: Vec3) {
        let frame = TangentFrame::from_normal(normal);
        for v in [frame.right, frame.up, frame.normal] {
            assert!((v.length() - 1.0).abs() < EPS, "{v} is not unit length");
        }
        assert!(frame.right.dot(frame.up).abs() < EPS);
        assert!(frame.right.dot(frame.normal).abs() < EPS);
        assert!(frame.up.dot(frame.normal).abs() < EPS);
        // right-handed
        assert!(frame.right.cross(frame.up).abs_diff_eq(frame.normal, EPS));
    }

    #[test]
    fn frame_is_orthonormal_for_walls_and_slopes() {
        let normals = [
            Vec3::Z,
            Vec3::NEG_X,
            vec3(1.0, 0.0, 1.0).normalize(),
            vec3(0.3, 0.4, -0.8).normalize(),
            vec3(-0.2, -0.6, 0.5).normalize(),
            vec3(0.0, 0.95, 0.1).normalize(),
        ];
        for normal in normals {
            assert_orthonormal(normal);
        }
    }

    #[test]
    fn vertical_wall_has_world_up_as_tangent_up() {
        let frame = TangentFrame::from_normal(Vec3::Z);
        assert!(frame.up.abs_diff_eq(Vec3::Y, EPS));
        assert!(frame.right.abs_diff_eq(Vec3::X, EPS));
    }

    #[test]
    fn tangent_right_points_to_the_right_of_a_body_facing_the_wall() {
        let normal = vec3(-1.0, 0.0, 1.0).normalize();
        let frame = TangentFrame::from_normal(normal);
        let body = Transform::from_rotation(frame.facing_rotation());
        assert!(Vec3::from(body.right()).abs_diff_eq(frame.right, EPS));
        assert!(Vec3::from(body.forward()).abs_diff_eq(-normal, EPS));
    }

    #[test]
    fn floors_degenerate_to_zero() {
        assert_eq!(tangent_right(Vec3::Y), Vec3::ZERO);
        assert_eq!(tangent_up(Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn project_maps_input_axes() {
        let frame = TangentFrame::from_normal(Vec3::Z);
        let motion = frame.project(vec2(1.0, -1.0));
        assert!(motion.abs_diff_eq(vec3(1.0, -1.0, 0.0), EPS));
    }
}
