//! Finding a ledge to stand on at the top of a wall.

use tracing::trace;

use crate::{frame::WORLD_UP, prelude::*, probe::BodyPose};

/// The spot the mantle probes landed on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ledge {
    pub point: Vec3,
    pub walkable: bool,
}

impl Ledge {
    /// Only walkable ledges are mantle targets.
    pub fn is_standable(&self) -> bool {
        self.walkable
    }
}

/// Looks over the top of the wall in front of the body for somewhere to stand.
///
/// Casts horizontally forward to find the wall face, then down from a point
/// [`Climber::mantle_inset`] past the face and half a body above it.
pub fn check_mantle(
    query: &(impl SurfaceQuery + ?Sized),
    pose: &BodyPose,
    climber: &Climber,
) -> Result<Ledge, ClimbError> {
    let mut forward = pose.forward();
    forward.y = 0.0;
    if forward.length_squared() < 1e-6 {
        return Err(ClimbError::NoLedge);
    }
    let forward = forward.normalize();

    let face = pose
        .cast(query, pose.position, forward, climber.probe_length)
        .ok_or(ClimbError::NoLedge)?;

    let half_height = climber.capsule_half_height;
    let start = face.point - face.normal * climber.mantle_inset + WORLD_UP * half_height;
    let Some(top) = pose.cast(query, start, -WORLD_UP, half_height * 2.0) else {
        trace!("nothing below {start} to mantle onto");
        return Err(ClimbError::NoLedge);
    };
    Ok(Ledge {
        point: top.point,
        walkable: top.walkable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A wall facing +Z at `z = -40` whose top is at `y = top`.
    fn block(top: f32, walkable: bool) -> impl SurfaceQuery {
        move |origin: Vec3, end: Vec3| -> Option<SurfaceHit> {
            let downward = end.y < origin.y;
            if downward {
                (origin.z < -40.0 && origin.y >= top && end.y <= top).then_some(SurfaceHit {
                    point: vec3(origin.x, top, origin.z),
                    normal: Vec3::Y,
                    walkable,
                })
            } else {
                (origin.z >= -40.0 && end.z <= -40.0 && origin.y <= top).then_some(SurfaceHit {
                    point: vec3(origin.x, origin.y, -40.0),
                    normal: Vec3::Z,
                    walkable: false,
                })
            }
        }
    }

    fn climber() -> Climber {
        Climber::from_capsule(42.0, 96.0)
    }

    fn pose() -> BodyPose {
        BodyPose::new(&Transform::from_xyz(0.0, 0.0, 0.0), &climber())
    }

    #[test]
    fn finds_ledge_past_the_wall_face() {
        let ledge = check_mantle(&block(50.0, true), &pose(), &climber()).unwrap();
        assert!(ledge.is_standable());
        assert!(ledge.point.abs_diff_eq(vec3(0.0, 50.0, -90.0), 1e-3));
    }

    #[test]
    fn forward_miss_means_no_ledge() {
        let far = Transform::from_xyz(0.0, 0.0, 100.0);
        let pose = BodyPose::new(&far, &climber());
        assert_eq!(
            check_mantle(&block(50.0, true), &pose, &climber()),
            Err(ClimbError::NoLedge)
        );
    }

    #[test]
    fn top_out_of_reach_means_no_ledge() {
        // the downward cast spans 96 above to 96 below the body
        assert_eq!(
            check_mantle(&block(150.0, true), &pose(), &climber()),
            Err(ClimbError::NoLedge)
        );
    }

    #[test]
    fn steep_top_is_found_but_not_standable() {
        let ledge = check_mantle(&block(50.0, false), &pose(), &climber()).unwrap();
        assert!(!ledge.is_standable());
    }

    #[test]
    fn looks_horizontally_even_when_pitched() {
        let tilted = Transform::default().with_rotation(Quat::from_rotation_x(0.3));
        let pose = BodyPose::new(&tilted, &climber());
        let ledge = check_mantle(&block(50.0, true), &pose, &climber()).unwrap();
        assert!(ledge.point.abs_diff_eq(vec3(0.0, 50.0, -90.0), 1e-3));
    }

    #[test]
    fn facing_straight_down_finds_nothing() {
        let down = Transform::default().looking_to(Vec3::NEG_Y, Vec3::Z);
        let pose = BodyPose::new(&down, &climber());
        assert_eq!(
            check_mantle(&block(50.0, true), &pose, &climber()),
            Err(ClimbError::NoLedge)
        );
    }
}
