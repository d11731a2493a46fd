use bevy_ecs::{intern::Interned, schedule::ScheduleLabel};

use crate::prelude::*;

pub(super) fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Fn(&mut App) {
    move |app: &mut App| {
        app.add_systems(
            schedule,
            sync_camera_booms.in_set(ClamberSystems::SyncCameras),
        );
    }
}

#[derive(Component, Clone, Copy)]
#[relationship(relationship_target = ClimberCamera)]
pub struct ClimberCameraOf(pub Entity);

#[derive(Component, Clone, Copy)]
#[relationship_target(relationship = ClimberCameraOf)]
pub struct ClimberCamera(Entity);

impl ClimberCamera {
    pub fn get(self) -> Entity {
        self.0
    }
}

/// The spring arm a follow camera hangs from. Climbing flips [`CameraBoom::collision_test`] so the
/// arm doesn't snap while the body passes through a ledge; the host's camera rig does the rest.
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
pub struct CameraBoom {
    /// Whether the arm shortens when geometry is between the camera and the body.
    pub collision_test: bool,
}

impl Default for CameraBoom {
    fn default() -> Self {
        Self {
            collision_test: true,
        }
    }
}

pub(crate) fn sync_camera_booms(
    mut booms: Query<(&mut CameraBoom, &ClimberCameraOf)>,
    bodies: Query<&BodyControls>,
) {
    for (mut boom, camera_of) in &mut booms {
        let Ok(controls) = bodies.get(camera_of.0) else {
            continue;
        };
        if boom.collision_test != controls.camera_collision_test {
            boom.collision_test = controls.camera_collision_test;
        }
    }
}

/// The horizontal directions walking input is relative to: the camera's if there is one.
pub(crate) fn input_basis(orientation: &Transform) -> (Vec3, Vec3) {
    let mut forward = Vec3::from(orientation.forward());
    forward.y = 0.0;
    forward = forward.normalize_or_zero();
    let mut right = Vec3::from(orientation.right());
    right.y = 0.0;
    right = right.normalize_or_zero();
    (forward, right)
}
