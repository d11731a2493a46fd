//! Ray probes that look for climbable surfaces around a body.

use tracing::trace;

use crate::{frame::WORLD_UP, prelude::*};

/// The first blocking surface found along a cast.
#[derive(Clone, Copy, Reflect, Debug, PartialEq)]
pub struct SurfaceHit {
    pub point: Vec3,
    /// Unit normal pointing away from the surface, into open space.
    pub normal: Vec3,
    /// Whether the surface is flat enough to stand on, as judged by the host's ground rules.
    pub walkable: bool,
}

/// The ray cast capability climbing needs from the physics backend.
pub trait SurfaceQuery: Send + Sync + 'static {
    /// Returns the nearest blocking surface on the segment from `origin` to `end`.
    /// Colliders belonging to `ignore` must not be reported.
    fn cast_ray(&self, origin: Vec3, end: Vec3, ignore: Option<Entity>) -> Option<SurfaceHit>;
}

impl<F> SurfaceQuery for F
where
    F: Fn(Vec3, Vec3) -> Option<SurfaceHit> + Send + Sync + 'static,
{
    fn cast_ray(&self, origin: Vec3, end: Vec3, _ignore: Option<Entity>) -> Option<SurfaceHit> {
        self(origin, end)
    }
}

/// The world geometry climbers probe against.
#[derive(Resource, Deref)]
pub struct Surfaces(Box<dyn SurfaceQuery>);

impl Surfaces {
    pub fn new(query: impl SurfaceQuery) -> Self {
        Self(Box::new(query))
    }
}

/// A probe origin rigidly attached to the body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeAnchor {
    pub origin: Vec3,
    pub forward: Vec3,
}

/// Where the body and its probe anchors are this tick.
#[derive(Clone, Copy, Debug)]
pub struct BodyPose {
    pub entity: Option<Entity>,
    pub position: Vec3,
    pub rotation: Quat,
    pub pelvis: ProbeAnchor,
    pub head: ProbeAnchor,
}

impl BodyPose {
    pub fn new(transform: &Transform, climber: &Climber) -> Self {
        let anchor = |offset: Vec3| ProbeAnchor {
            origin: transform.transform_point(offset),
            forward: transform.rotation * Vec3::NEG_Z,
        };
        Self {
            entity: None,
            position: transform.translation,
            rotation: transform.rotation,
            pelvis: anchor(climber.pelvis_anchor),
            head: anchor(climber.head_anchor),
        }
    }

    pub fn with_entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    pub(crate) fn cast(
        &self,
        query: &(impl SurfaceQuery + ?Sized),
        origin: Vec3,
        direction: Vec3,
        length: f32,
    ) -> Option<SurfaceHit> {
        query.cast_ray(origin, origin + direction * length, self.entity)
    }
}

/// Both anchor hits of a successful wall detection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallContact {
    pub pelvis: SurfaceHit,
    pub head: SurfaceHit,
}

/// Checks whether there is a wall in front of the body that is tall enough to climb.
///
/// Both the pelvis and the head anchor must see it, so low ledges and overhangs don't count.
pub fn detect_climbable_wall(
    query: &(impl SurfaceQuery + ?Sized),
    pose: &BodyPose,
    probe_length: f32,
) -> Result<WallContact, ClimbError> {
    let pelvis = pose
        .cast(query, pose.pelvis.origin, pose.pelvis.forward, probe_length)
        .ok_or(ClimbError::NoWall)?;
    let head = pose
        .cast(query, pose.head.origin, pose.head.forward, probe_length)
        .ok_or(ClimbError::NoWall)?;
    Ok(WallContact { pelvis, head })
}

/// Re-reads the surface straight ahead of the body.
pub fn probe_forward(
    query: &(impl SurfaceQuery + ?Sized),
    pose: &BodyPose,
    distance: f32,
) -> Result<SurfaceHit, ClimbError> {
    pose.cast(query, pose.position, pose.forward(), distance)
        .ok_or_else(|| {
            trace!("forward probe missed at {}", pose.position);
            ClimbError::ProbeMiss
        })
}

/// Looks for ground straight below the body.
pub fn probe_exit(
    query: &(impl SurfaceQuery + ?Sized),
    pose: &BodyPose,
    depth: f32,
) -> Option<SurfaceHit> {
    pose.cast(query, pose.position, -WORLD_UP, depth)
}

/// Angle between the body's up axis and world up.
pub fn surface_tilt_degrees(rotation: Quat) -> f32 {
    (rotation * Vec3::Y).angle_between(WORLD_UP).to_degrees()
}

/// Why a climb has to end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitReason {
    GroundBelow,
    Tilted,
}

/// Checks whether the body should let go of the wall and walk again.
pub fn exit_reason(
    query: &(impl SurfaceQuery + ?Sized),
    pose: &BodyPose,
    climber: &Climber,
) -> Option<ExitReason> {
    if probe_exit(query, pose, climber.exit_probe_depth).is_some() {
        return Some(ExitReason::GroundBelow);
    }
    if surface_tilt_degrees(pose.rotation) >= climber.max_surface_tilt_degrees {
        return Some(ExitReason::Tilted);
    }
    None
}
