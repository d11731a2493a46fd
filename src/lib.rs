#![doc = include_str!("../readme.md")]

/// Everything you need to get started with `bevy_clamber`
pub mod prelude {
    pub(crate) use {
        bevy_app::prelude::*,
        bevy_derive::{Deref, DerefMut},
        bevy_ecs::prelude::*,
        bevy_math::prelude::*,
        bevy_reflect::prelude::*,
        bevy_time::prelude::*,
        bevy_transform::prelude::*,
        bevy_utils::prelude::*,
    };

    pub use crate::{
        ClamberPlugin, ClamberSystems, Climber, FlightParameters,
        blockout::Blockout,
        body::{BodyCapabilities, BodyControls, Locomotion},
        camera::{CameraBoom, ClimberCamera, ClimberCameraOf},
        director::{ActiveTransition, TransitionKind},
        error::ClimbError,
        input::{ClimbInput, ForceWalking},
        mode::{ClimbState, MovementMode},
        probe::{SurfaceHit, SurfaceQuery, Surfaces},
    };
}

use crate::prelude::*;
use bevy_ecs::{intern::Interned, schedule::ScheduleLabel};
use core::time::Duration;

pub mod blockout;
pub mod body;
pub mod camera;
mod controller;
pub mod director;
pub mod error;
pub mod frame;
pub mod input;
pub mod mantle;
pub mod mode;
pub mod probe;

/// Requires a [`Surfaces`] resource to be inserted so climbers can see the world.
pub struct ClamberPlugin {
    schedule: Interned<dyn ScheduleLabel>,
}

impl ClamberPlugin {
    /// Create a new plugin in the given schedule. The default is [`FixedPostUpdate`].
    pub fn new(schedule: impl ScheduleLabel) -> Self {
        Self {
            schedule: schedule.intern(),
        }
    }
}

impl Default for ClamberPlugin {
    fn default() -> Self {
        Self {
            schedule: FixedPostUpdate.intern(),
        }
    }
}

impl Plugin for ClamberPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            self.schedule,
            (ClamberSystems::MoveClimbers, ClamberSystems::SyncCameras).chain(),
        )
        .register_type::<Climber>()
        .register_type::<ClimbState>()
        .register_type::<BodyControls>()
        .register_type::<ClimbInput>()
        .register_type::<CameraBoom>()
        .add_plugins((
            input::plugin,
            camera::plugin(self.schedule),
            controller::plugin(self.schedule),
        ));
    }
}

/// System set used by all systems of `bevy_clamber`.
#[derive(SystemSet, Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum ClamberSystems {
    MoveClimbers,
    SyncCameras,
}

/// Movement limits handed to the host's locomotion while it integrates the body's wish direction.
#[derive(Clone, Copy, Reflect, Debug, PartialEq)]
pub struct FlightParameters {
    pub max_speed: f32,
    pub braking: f32,
}

/// Configuration of a body that can climb walls and mantle onto ledges.
///
/// Lengths are in world units (metres by default). Read-only during simulation.
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
#[require(ClimbState, ClimbInput, BodyControls, Transform)]
pub struct Climber {
    pub capsule_radius: f32,
    pub capsule_half_height: f32,
    /// Local offset of the pelvis probe anchor.
    pub pelvis_anchor: Vec3,
    /// Local offset of the head probe anchor.
    pub head_anchor: Vec3,
    /// How far the wall and mantle probes reach forward.
    pub probe_length: f32,
    /// Distance kept between the body and the surface while attached.
    pub standoff_distance: f32,
    pub standoff_offset: f32,
    /// Extra reach of the per-tick forward re-probe past the standoff distance.
    pub reattach_margin: f32,
    /// How far below the body ground ends a climb.
    pub exit_probe_depth: f32,
    pub max_surface_tilt_degrees: f32,
    /// Exponential decay rate towards the attach target, per second.
    pub smoothing_rate: f32,
    /// Attach time when no attach animation is used, e.g. when catching a wall mid-air.
    pub attach_duration: Duration,
    /// Length of the attach animation played when entering a climb by jumping.
    pub attach_animation: Option<Duration>,
    /// Length of the mantle animation. The lift starts once it has played.
    pub mantle_animation: Option<Duration>,
    /// How far past the wall face the ledge probe starts.
    pub mantle_inset: f32,
    pub mantle_step_duration: Duration,
    pub camera_restore_delay: Duration,
    pub climb_flight: FlightParameters,
    pub walk_flight: FlightParameters,
}

impl Default for Climber {
    fn default() -> Self {
        Self::from_capsule(0.42, 0.96)
    }
}

impl Climber {
    /// Scales every distance that depends on the body's size from its capsule.
    pub fn from_capsule(radius: f32, half_height: f32) -> Self {
        let scale = half_height / 0.96;
        Self {
            capsule_radius: radius,
            capsule_half_height: half_height,
            pelvis_anchor: Vec3::ZERO,
            head_anchor: Vec3::Y * half_height * 0.6,
            probe_length: 0.75 * scale,
            standoff_distance: radius,
            standoff_offset: 0.03 * scale,
            reattach_margin: 0.5 * scale,
            exit_probe_depth: half_height + 0.5 * scale,
            max_surface_tilt_degrees: 30.0,
            smoothing_rate: 5.0,
            attach_duration: Duration::from_millis(300),
            attach_animation: None,
            mantle_animation: None,
            mantle_inset: 0.5 * scale,
            mantle_step_duration: Duration::from_millis(100),
            camera_restore_delay: Duration::from_millis(300),
            climb_flight: FlightParameters {
                max_speed: 1.0 * scale,
                braking: 20.48 * scale,
            },
            walk_flight: FlightParameters {
                max_speed: 6.0 * scale,
                braking: 0.0,
            },
        }
    }

    /// Distance from the surface the body is held at while climbing.
    pub fn attach_distance(&self) -> f32 {
        self.standoff_distance + self.standoff_offset
    }
}
