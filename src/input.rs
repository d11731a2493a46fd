use crate::prelude::*;

pub(super) fn plugin(app: &mut App) {
    app.add_message::<ForceWalking>();
}

/// Input accumulated since the last climbing tick. Jump edges are consumed by every tick,
/// `movement` stays until the host overwrites it.
///
/// The host's input layer fills this in; `bevy_clamber` does not bind keys itself.
#[derive(Component, Clone, Reflect, Default, Debug)]
#[reflect(Component)]
pub struct ClimbInput {
    /// The last movement input, `x` to the right and `y` forward / up.
    pub movement: Vec2,
    /// Whether jump was pressed since the last tick.
    pub jump_pressed: bool,
    /// Whether jump was released since the last tick.
    pub jump_released: bool,
}

impl ClimbInput {
    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    pub fn press_jump(&mut self) {
        self.jump_pressed = true;
    }

    pub fn release_jump(&mut self) {
        self.jump_released = true;
    }
}

/// Puts a body back into walking, abandoning any climb or mantle in progress.
#[derive(Message, Clone, Copy, Debug)]
pub struct ForceWalking {
    pub entity: Entity,
}
