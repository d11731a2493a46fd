use thiserror::Error;

use crate::mode::{ClimbEvent, MovementMode};

/// Negative results of the climbing probes, plus the one contract violation the state machine can report.
///
/// Only [`ClimbError::InvalidTransition`] indicates a bug. The others are the normal "nothing to
/// climb here" answers and are handled right where they are produced.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ClimbError {
    /// The pelvis and head probes did not both hit a surface.
    #[error("no climbable wall in front of the body")]
    NoWall,
    /// The mantle probes did not find a point to stand on.
    #[error("no ledge to mantle onto")]
    NoLedge,
    /// A single forward re-probe while climbing found nothing, e.g. at a seam between surfaces.
    #[error("forward surface probe missed")]
    ProbeMiss,
    #[error("cannot handle {event:?} while {from:?}")]
    InvalidTransition {
        from: MovementMode,
        event: ClimbEvent,
    },
}
