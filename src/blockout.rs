//! Graybox level geometry made of axis-aligned boxes.
//!
//! Useful for prototyping levels and for testing climbing without a physics backend.

use bevy_math::bounding::Aabb3d;

use crate::prelude::*;

/// A static [`SurfaceQuery`] over a set of boxes.
#[derive(Clone, Debug)]
pub struct Blockout {
    pub boxes: Vec<Aabb3d>,
    /// Surfaces whose normal has at least this much world up are walkable. `cos(40°)` by default.
    pub min_walk_cos: f32,
}

impl Default for Blockout {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            min_walk_cos: 0.766,
        }
    }
}

impl Blockout {
    pub fn with_box(mut self, center: Vec3, half_size: Vec3) -> Self {
        self.boxes.push(Aabb3d::new(center, half_size));
        self
    }

    /// Adds a box spanning `min` to `max`.
    pub fn with_span(mut self, min: Vec3, max: Vec3) -> Self {
        self.boxes.push(Aabb3d {
            min: min.into(),
            max: max.into(),
        });
        self
    }
}

/// Entry distance along `end - origin` (as a fraction) and the face normal the segment enters through.
/// Segments starting inside a box don't hit it.
fn cast_box(aabb: &Aabb3d, origin: Vec3, end: Vec3) -> Option<(f32, Vec3)> {
    let min = Vec3::from(aabb.min);
    let max = Vec3::from(aabb.max);
    let dir = end - origin;
    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;
    let mut normal = Vec3::ZERO;
    for axis in 0..3 {
        let (o, d) = (origin[axis], dir[axis]);
        if d.abs() < f32::EPSILON {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }
        let (near, far, face) = if d > 0.0 {
            (min[axis], max[axis], -Vec3::AXES[axis])
        } else {
            (max[axis], min[axis], Vec3::AXES[axis])
        };
        let t_near = (near - o) / d;
        let t_far = (far - o) / d;
        if t_near > t_enter {
            t_enter = t_near;
            normal = face;
        }
        t_exit = t_exit.min(t_far);
        if t_enter > t_exit {
            return None;
        }
    }
    (normal != Vec3::ZERO).then_some((t_enter, normal))
}

impl SurfaceQuery for Blockout {
    fn cast_ray(&self, origin: Vec3, end: Vec3, _ignore: Option<Entity>) -> Option<SurfaceHit> {
        let (t, normal) = self
            .boxes
            .iter()
            .filter_map(|aabb| cast_box(aabb, origin, end))
            .min_by(|a, b| a.0.total_cmp(&b.0))?;
        Some(SurfaceHit {
            point: origin.lerp(end, t),
            normal,
            walkable: normal.y >= self.min_walk_cos,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Blockout {
        Blockout::default()
            // floor
            .with_span(vec3(-10.0, -1.0, -10.0), vec3(10.0, 0.0, 10.0))
            // wall facing +Z, 3 high
            .with_span(vec3(-10.0, 0.0, -6.0), vec3(10.0, 3.0, -4.0))
    }

    #[test]
    fn hits_the_nearest_face() {
        let hit = world()
            .cast_ray(vec3(0.0, 1.0, 0.0), vec3(0.0, 1.0, -20.0), None)
            .unwrap();
        assert!(hit.point.abs_diff_eq(vec3(0.0, 1.0, -4.0), 1e-5));
        assert_eq!(hit.normal, Vec3::Z);
        assert!(!hit.walkable);
    }

    #[test]
    fn floors_are_walkable() {
        let hit = world()
            .cast_ray(vec3(0.0, 5.0, -5.0), vec3(0.0, -5.0, -5.0), None)
            .unwrap();
        assert!(hit.point.abs_diff_eq(vec3(0.0, 3.0, -5.0), 1e-5));
        assert_eq!(hit.normal, Vec3::Y);
        assert!(hit.walkable);
    }

    #[test]
    fn short_segments_miss() {
        assert!(
            world()
                .cast_ray(vec3(0.0, 1.0, 0.0), vec3(0.0, 1.0, -3.0), None)
                .is_none()
        );
    }

    #[test]
    fn segments_starting_inside_a_box_ignore_it() {
        let hit = world().cast_ray(vec3(0.0, 1.0, -5.0), vec3(0.0, 1.0, 5.0), None);
        assert!(hit.is_none());
    }

    #[test]
    fn diagonal_cast_reports_entry_face() {
        let hit = world()
            .cast_ray(vec3(0.0, 5.0, -3.5), vec3(0.0, -1.0, -5.5), None)
            .unwrap();
        // passes above the wall's front face and lands on its top
        assert_eq!(hit.normal, Vec3::Y);
        assert!((hit.point.y - 3.0).abs() < 1e-4);
    }
}
