//! Timed transitions onto a wall and over a ledge.
//!
//! A [`TransitionSequence`] is a short queue of steps that move the body's root [`Transform`]
//! directly, bypassing physics. Capabilities a sequence switches off are held as [`Leases`] and
//! are handed back exactly once: either by the step that restores them, or by
//! [`TransitionSequence::cancel`] when the sequence is abandoned early.

use bevy_ecs::{lifecycle::HookContext, world::DeferredWorld};
use core::time::Duration;
use std::collections::VecDeque;
use tracing::debug;

use crate::{frame::WORLD_UP, prelude::*};

#[derive(Clone, Copy, Reflect, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    /// Moving onto the wall when a climb starts.
    Attach,
    /// Lifting the body over a ledge at the top of a climb.
    Mantle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    Wait(Duration),
    MoveTo {
        position: Vec3,
        rotation: Option<Quat>,
        duration: Duration,
    },
    /// Straight up from wherever the body is when the step starts.
    Rise { height: f32, duration: Duration },
    /// Hands collision back and lets the controller finish the climb.
    ExitClimb,
    RestoreCamera,
}

/// Capabilities a sequence currently holds disabled.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Leases {
    pub collision: bool,
    pub camera: bool,
}

impl Leases {
    pub fn is_empty(&self) -> bool {
        !self.collision && !self.camera
    }

    pub fn release(self, body: &mut impl BodyCapabilities) {
        if self.collision {
            body.set_collision_enabled(true);
        }
        if self.camera {
            body.set_camera_collision_test(true);
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Timed {
    elapsed: Duration,
    duration: Duration,
    motion: Option<Motion>,
}

#[derive(Clone, Copy, Debug)]
struct Motion {
    from: Transform,
    to_position: Vec3,
    to_rotation: Option<Quat>,
}

impl Timed {
    fn fraction(&self) -> f32 {
        if self.duration.is_zero() {
            1.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
        }
    }

    fn is_done(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn apply(&self, transform: &mut Transform) {
        let Some(motion) = self.motion else {
            return;
        };
        let t = self.fraction();
        transform.translation = motion.from.translation.lerp(motion.to_position, t);
        if let Some(rotation) = motion.to_rotation {
            transform.rotation = motion.from.rotation.slerp(rotation, t);
        }
    }
}

/// What happened during one [`TransitionSequence::advance`].
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct Progress {
    /// The mantle reached its target this tick and the climb should end.
    pub landed: bool,
    pub finished: bool,
}

#[derive(Clone, Debug)]
pub struct TransitionSequence {
    kind: TransitionKind,
    steps: VecDeque<Step>,
    current: Option<Timed>,
    leases: Leases,
    landed: bool,
}

impl TransitionSequence {
    /// Moves and turns the body onto the wall over `duration`.
    pub fn attach(position: Vec3, rotation: Quat, duration: Duration) -> Self {
        debug!("attaching to {position} over {duration:?}");
        Self {
            kind: TransitionKind::Attach,
            steps: VecDeque::from([Step::MoveTo {
                position,
                rotation: Some(rotation),
                duration,
            }]),
            current: None,
            leases: default(),
            landed: false,
        }
    }

    /// Lifts the body onto the ledge at `target`.
    ///
    /// Collision and the camera collision test are switched off right away. Collision comes back
    /// when the body lands, the camera test `camera_restore_delay` later so the camera doesn't snap.
    pub fn mantle(target: Vec3, climber: &Climber, body: &mut impl BodyCapabilities) -> Self {
        debug!("mantling onto {target}");
        body.set_collision_enabled(false);
        body.set_camera_collision_test(false);
        let lift = climber.capsule_half_height;
        let step = climber.mantle_step_duration;
        Self {
            kind: TransitionKind::Mantle,
            steps: VecDeque::from([
                Step::Wait(climber.mantle_animation.unwrap_or_default()),
                Step::Rise {
                    height: lift,
                    duration: step,
                },
                Step::MoveTo {
                    position: target + WORLD_UP * lift,
                    rotation: None,
                    duration: step,
                },
                Step::ExitClimb,
                Step::Wait(climber.camera_restore_delay),
                Step::RestoreCamera,
            ]),
            current: None,
            leases: Leases {
                collision: true,
                camera: true,
            },
            landed: false,
        }
    }

    pub fn kind(&self) -> TransitionKind {
        self.kind
    }

    pub fn leases(&self) -> Leases {
        self.leases
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_none() && self.steps.is_empty()
    }

    /// Whether input-driven movement is suspended. A mantle stops suspending once it has landed.
    pub fn locks_input(&self) -> bool {
        !self.landed && !self.is_finished()
    }

    /// Runs the sequence forward by `dt`. Time left over after a step carries into the next one.
    pub fn advance(
        &mut self,
        dt: Duration,
        transform: &mut Transform,
        body: &mut impl BodyCapabilities,
    ) -> Progress {
        let mut progress = Progress::default();
        let mut budget = dt;
        loop {
            if self.current.is_none() {
                let Some(step) = self.steps.pop_front() else {
                    break;
                };
                self.current = self.start(step, transform, body, &mut progress);
            }
            let Some(timed) = self.current.as_mut() else {
                continue;
            };
            let spent = budget.min(timed.duration.saturating_sub(timed.elapsed));
            timed.elapsed += spent;
            budget -= spent;
            timed.apply(transform);
            if !timed.is_done() {
                break;
            }
            self.current = None;
        }
        progress.finished = self.is_finished();
        if progress.finished {
            debug!("{:?} finished", self.kind);
        }
        progress
    }

    /// Starts `step`. Instant steps run here and return `None`.
    fn start(
        &mut self,
        step: Step,
        transform: &Transform,
        body: &mut impl BodyCapabilities,
        progress: &mut Progress,
    ) -> Option<Timed> {
        let timed = |duration, motion| {
            Some(Timed {
                elapsed: Duration::ZERO,
                duration,
                motion,
            })
        };
        match step {
            Step::Wait(duration) => timed(duration, None),
            Step::MoveTo {
                position,
                rotation,
                duration,
            } => timed(
                duration,
                Some(Motion {
                    from: *transform,
                    to_position: position,
                    to_rotation: rotation,
                }),
            ),
            Step::Rise { height, duration } => timed(
                duration,
                Some(Motion {
                    from: *transform,
                    to_position: transform.translation + WORLD_UP * height,
                    to_rotation: None,
                }),
            ),
            Step::ExitClimb => {
                Leases {
                    collision: std::mem::take(&mut self.leases.collision),
                    camera: false,
                }
                .release(body);
                self.landed = true;
                progress.landed = true;
                None
            }
            Step::RestoreCamera => {
                Leases {
                    collision: false,
                    camera: std::mem::take(&mut self.leases.camera),
                }
                .release(body);
                None
            }
        }
    }

    /// Drops all remaining steps and returns the leases still held. Safe to call repeatedly.
    pub fn abandon(&mut self) -> Leases {
        if !self.is_finished() {
            debug!("abandoning {:?}", self.kind);
        }
        self.steps.clear();
        self.current = None;
        std::mem::take(&mut self.leases)
    }

    /// Abandons the sequence and restores everything it switched off.
    pub fn cancel(&mut self, body: &mut impl BodyCapabilities) {
        self.abandon().release(body);
    }
}

/// The transition a body is currently going through.
///
/// Removing, replacing or despawning this component cancels the sequence, so capabilities it
/// switched off on the entity's [`BodyControls`] are always restored.
#[derive(Component, Debug, Deref, DerefMut)]
#[component(on_replace = ActiveTransition::on_replace)]
pub struct ActiveTransition(pub TransitionSequence);

impl ActiveTransition {
    fn on_replace(mut world: DeferredWorld, ctx: HookContext) {
        let leases = {
            let Some(mut active) = world.get_mut::<Self>(ctx.entity) else {
                return;
            };
            active.abandon()
        };
        if leases.is_empty() {
            return;
        }
        let Some(mut body) = world.get_mut::<BodyControls>(ctx.entity) else {
            return;
        };
        leases.release(&mut *body);
    }
}
