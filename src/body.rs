use crate::prelude::*;

/// How the host's locomotion should integrate the body.
#[derive(Default, Clone, Copy, Reflect, Debug, PartialEq, Eq)]
pub enum Locomotion {
    #[default]
    Walking,
    /// No gravity, movement follows [`BodyControls::wish_direction`] in all three axes.
    Flying,
}

/// The toggles climbing flips on the physics, movement and camera collaborators.
pub trait BodyCapabilities {
    fn set_collision_enabled(&mut self, enabled: bool);
    fn set_camera_collision_test(&mut self, enabled: bool);
    fn set_flight_parameters(&mut self, flight: FlightParameters);
}

/// The interface between a [`Climber`] and whatever moves the body around.
///
/// The host writes [`BodyControls::airborne`] every tick and reads the rest.
#[derive(Component, Clone, Reflect, Debug)]
#[reflect(Component)]
pub struct BodyControls {
    /// Whether the body is currently falling, as reported by the host's ground detection.
    pub airborne: bool,
    pub collision_enabled: bool,
    /// Whether the camera boom may pull in when something is between it and the body.
    pub camera_collision_test: bool,
    pub locomotion: Locomotion,
    /// Whether the host should turn the body towards its movement direction.
    pub orient_to_movement: bool,
    pub flight: FlightParameters,
    /// Where the body wants to go this tick, with a length of at most 1.
    pub wish_direction: Vec3,
    /// Set when a jump impulse should be applied. The host clears it once applied.
    pub jump_requested: bool,
}

impl Default for BodyControls {
    fn default() -> Self {
        Self {
            airborne: false,
            collision_enabled: true,
            camera_collision_test: true,
            locomotion: Locomotion::Walking,
            orient_to_movement: true,
            flight: Climber::default().walk_flight,
            wish_direction: Vec3::ZERO,
            jump_requested: false,
        }
    }
}

impl BodyCapabilities for BodyControls {
    fn set_collision_enabled(&mut self, enabled: bool) {
        self.collision_enabled = enabled;
    }

    fn set_camera_collision_test(&mut self, enabled: bool) {
        self.camera_collision_test = enabled;
    }

    fn set_flight_parameters(&mut self, flight: FlightParameters) {
        self.flight = flight;
    }
}
