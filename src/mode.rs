//! The Walking / Jumping / Climbing state machine.

use tracing::debug;

use crate::{frame::TangentFrame, prelude::*};

#[derive(Default, Clone, Copy, Reflect, Debug, PartialEq, Eq, Hash)]
pub enum MovementMode {
    #[default]
    Walking,
    /// Airborne after a jump, until the jump input is released.
    Jumping,
    Climbing,
}

/// Everything that can move a body from one [`MovementMode`] to another.
#[derive(Clone, Copy, Reflect, Debug, PartialEq, Eq)]
pub enum ClimbEvent {
    JumpPressed { wall: bool },
    JumpReleased,
    /// Falling past a climbable wall.
    CaughtWall,
    /// Ground below or too much tilt while climbing.
    ExitDetected,
    MantleFinished,
    /// Something outside the climbing logic needs the body back on its feet.
    ForceWalking,
}

/// The transition table.
pub fn transition(from: MovementMode, event: ClimbEvent) -> Result<MovementMode, ClimbError> {
    use ClimbEvent::*;
    use MovementMode::*;
    match (from, event) {
        (Walking, JumpPressed { wall: true } | CaughtWall) => Ok(Climbing),
        (Walking, JumpPressed { wall: false }) => Ok(Jumping),
        (Jumping, JumpReleased) | (Climbing, ExitDetected | MantleFinished) | (_, ForceWalking) => {
            Ok(Walking)
        }
        _ => Err(ClimbError::InvalidTransition { from, event }),
    }
}

/// The current movement mode of a [`Climber`] and what it remembers about the surface it's on.
#[derive(Component, Default, Clone, Reflect, Debug)]
#[reflect(Component)]
pub struct ClimbState {
    mode: MovementMode,
    /// Frame of the last surface the forward probe saw. Kept across probe misses.
    pub surface: Option<TangentFrame>,
}

impl ClimbState {
    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn is_climbing(&self) -> bool {
        self.mode == MovementMode::Climbing
    }

    /// Runs `event` through the transition table.
    /// On failure the mode is left untouched.
    pub fn apply(&mut self, event: ClimbEvent) -> Result<MovementMode, ClimbError> {
        let next = transition(self.mode, event)?;
        if next != self.mode {
            debug!("{:?} -> {:?} on {:?}", self.mode, next, event);
        }
        if next != MovementMode::Climbing {
            self.surface = None;
        }
        self.mode = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ClimbEvent::*;
    use MovementMode::*;

    const ALL_EVENTS: [ClimbEvent; 7] = [
        JumpPressed { wall: true },
        JumpPressed { wall: false },
        JumpReleased,
        CaughtWall,
        ExitDetected,
        MantleFinished,
        ForceWalking,
    ];

    #[test]
    fn jump_from_walking_is_climb_or_jump_never_both() {
        assert_eq!(transition(Walking, JumpPressed { wall: true }), Ok(Climbing));
        assert_eq!(transition(Walking, JumpPressed { wall: false }), Ok(Jumping));
    }

    #[test]
    fn jump_release_always_lands_in_walking() {
        assert_eq!(transition(Jumping, JumpReleased), Ok(Walking));
    }

    #[test]
    fn climbing_only_ends_through_exit_mantle_or_force() {
        assert_eq!(transition(Climbing, ExitDetected), Ok(Walking));
        assert_eq!(transition(Climbing, MantleFinished), Ok(Walking));
        assert_eq!(transition(Climbing, ForceWalking), Ok(Walking));
        for event in [JumpPressed { wall: true }, JumpReleased, CaughtWall] {
            assert!(transition(Climbing, event).is_err(), "{event:?}");
        }
    }

    #[test]
    fn force_walking_is_accepted_everywhere() {
        for mode in [Walking, Jumping, Climbing] {
            assert_eq!(transition(mode, ForceWalking), Ok(Walking));
        }
    }

    #[test]
    fn unlisted_pairs_are_invalid() {
        let valid = [
            (Walking, JumpPressed { wall: true }),
            (Walking, JumpPressed { wall: false }),
            (Walking, CaughtWall),
            (Jumping, JumpReleased),
            (Climbing, ExitDetected),
            (Climbing, MantleFinished),
        ];
        for mode in [Walking, Jumping, Climbing] {
            for event in ALL_EVENTS {
                let result = transition(mode, event);
                if event == ForceWalking || valid.contains(&(mode, event)) {
                    assert!(result.is_ok(), "{mode:?} {event:?}");
                } else {
                    assert_eq!(
                        result,
                        Err(ClimbError::InvalidTransition { from: mode, event })
                    );
                }
            }
        }
    }

    #[test]
    fn failed_apply_keeps_mode() {
        let mut state = ClimbState::default();
        assert!(state.apply(ExitDetected).is_err());
        assert_eq!(state.mode(), Walking);
        state.apply(CaughtWall).unwrap();
        assert!(state.is_climbing());
    }

    #[test]
    fn leaving_climbing_forgets_the_surface() {
        let mut state = ClimbState::default();
        state.apply(CaughtWall).unwrap();
        state.surface = Some(TangentFrame::from_normal(Vec3::Z));
        state.apply(ExitDetected).unwrap();
        assert_eq!(state.surface, None);
    }
}
