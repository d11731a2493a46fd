use bevy_ecs::{intern::Interned, schedule::ScheduleLabel};
use core::time::Duration;
use tracing::{debug, error, trace, warn};

use crate::{
    camera::input_basis,
    director::TransitionSequence,
    frame::TangentFrame,
    mantle::check_mantle,
    mode::ClimbEvent,
    prelude::*,
    probe::{BodyPose, detect_climbable_wall, exit_reason, probe_forward},
};

pub(super) fn plugin(schedule: Interned<dyn ScheduleLabel>) -> impl Fn(&mut App) {
    move |app: &mut App| {
        app.add_systems(schedule, run_climbers.in_set(ClamberSystems::MoveClimbers));
    }
}

struct Ctx<'a> {
    entity: Entity,
    cfg: &'a Climber,
    surfaces: &'a dyn SurfaceQuery,
    orientation: Transform,
    movement: Vec2,
    dt: f32,
}

impl Ctx<'_> {
    fn pose(&self, transform: &Transform) -> BodyPose {
        BodyPose::new(transform, self.cfg).with_entity(self.entity)
    }
}

fn run_climbers(
    mut climbers: Query<(
        Entity,
        &Climber,
        &mut ClimbState,
        &mut ClimbInput,
        &mut Transform,
        &mut BodyControls,
        Option<&mut ActiveTransition>,
        Option<&ClimberCamera>,
    )>,
    cams: Query<&Transform, Without<Climber>>,
    time: Res<Time>,
    surfaces: Option<Res<Surfaces>>,
    mut force_walking: MessageReader<ForceWalking>,
    mut commands: Commands,
) {
    let forced: Vec<Entity> = force_walking.read().map(|msg| msg.entity).collect();
    let surfaces = surfaces.as_deref();

    for (entity, cfg, mut state, mut input, mut transform, mut controls, mut active, cam) in
        &mut climbers
    {
        let jump_pressed = core::mem::take(&mut input.jump_pressed);
        let jump_released = core::mem::take(&mut input.jump_released);

        if forced.contains(&entity) {
            if let Some(active) = active.as_mut() {
                active.cancel(&mut *controls);
                commands.entity(entity).remove::<ActiveTransition>();
            }
            let was_climbing = state.is_climbing();
            if apply(&mut state, ClimbEvent::ForceWalking) && was_climbing {
                exit_climbing(&mut transform, &mut controls, cfg);
            }
            controls.wish_direction = Vec3::ZERO;
            continue;
        }

        if let Some(active) = active.as_mut() {
            let progress = active.advance(time.delta(), &mut transform, &mut *controls);
            if progress.landed && apply(&mut state, ClimbEvent::MantleFinished) {
                exit_climbing(&mut transform, &mut controls, cfg);
            }
            if progress.finished {
                commands.entity(entity).remove::<ActiveTransition>();
            }
            if active.locks_input() {
                controls.wish_direction = Vec3::ZERO;
                continue;
            }
        }

        let orientation = cam
            .and_then(|e| cams.get(e.get()).copied().ok())
            .unwrap_or(*transform);
        let Some(surfaces) = surfaces else {
            // nothing to probe, so only ground movement is left
            controls.wish_direction = if state.is_climbing() {
                Vec3::ZERO
            } else {
                calculate_wish_direction(&orientation, input.movement)
            };
            continue;
        };
        let ctx = Ctx {
            entity,
            cfg,
            surfaces: &***surfaces,
            orientation,
            movement: input.movement,
            dt: time.delta_secs(),
        };

        let attach = handle_jump(
            jump_pressed,
            jump_released,
            &transform,
            &mut state,
            &mut controls,
            &ctx,
        )
        .or_else(|| catch_wall(&transform, &mut state, &mut controls, &ctx));
        if let Some(attach) = attach {
            start_transition(&mut commands, active.as_deref_mut(), &mut controls, &ctx, attach);
            continue;
        }

        match state.mode() {
            MovementMode::Walking | MovementMode::Jumping => {
                controls.wish_direction =
                    calculate_wish_direction(&ctx.orientation, ctx.movement);
            }
            MovementMode::Climbing => {
                if let Some(mantle) = climb(&mut transform, &mut state, &mut controls, &ctx) {
                    start_transition(
                        &mut commands,
                        active.as_deref_mut(),
                        &mut controls,
                        &ctx,
                        mantle,
                    );
                }
            }
        }
    }
}

/// Runs `event` through the transition table. The controller only sends events that are valid in
/// the current mode, so a rejection is a bug.
fn apply(state: &mut ClimbState, event: ClimbEvent) -> bool {
    match state.apply(event) {
        Ok(_) => true,
        Err(err) => {
            error!("{err}");
            debug_assert!(false, "{err}");
            false
        }
    }
}

/// A transition the tick decided to start.
enum Begin {
    Attach {
        position: Vec3,
        rotation: Quat,
        duration: Duration,
    },
    Mantle(Vec3),
}

fn start_transition(
    commands: &mut Commands,
    previous: Option<&mut ActiveTransition>,
    controls: &mut BodyControls,
    ctx: &Ctx,
    begin: Begin,
) {
    if let Some(previous) = previous {
        previous.cancel(&mut *controls);
    }
    let sequence = match begin {
        Begin::Attach {
            position,
            rotation,
            duration,
        } => TransitionSequence::attach(position, rotation, duration),
        Begin::Mantle(target) => TransitionSequence::mantle(target, ctx.cfg, &mut *controls),
    };
    commands
        .entity(ctx.entity)
        .insert(ActiveTransition(sequence));
}

fn handle_jump(
    pressed: bool,
    released: bool,
    transform: &Transform,
    state: &mut ClimbState,
    controls: &mut BodyControls,
    ctx: &Ctx,
) -> Option<Begin> {
    let mut attach = None;
    if pressed && state.mode() == MovementMode::Walking {
        match detect_climbable_wall(ctx.surfaces, &ctx.pose(transform), ctx.cfg.probe_length) {
            Ok(contact) => {
                if apply(state, ClimbEvent::JumpPressed { wall: true }) {
                    let duration = ctx.cfg.attach_animation.unwrap_or(ctx.cfg.attach_duration);
                    attach = Some(enter_climbing(contact.pelvis, duration, state, controls, ctx));
                }
            }
            Err(err) => {
                trace!("jumping instead of climbing: {err}");
                if apply(state, ClimbEvent::JumpPressed { wall: false }) {
                    controls.jump_requested = true;
                }
            }
        }
    }
    if released && state.mode() == MovementMode::Jumping {
        apply(state, ClimbEvent::JumpReleased);
    }
    attach
}

/// Grabs a wall the body falls past without any input.
fn catch_wall(
    transform: &Transform,
    state: &mut ClimbState,
    controls: &mut BodyControls,
    ctx: &Ctx,
) -> Option<Begin> {
    if state.mode() != MovementMode::Walking || !controls.airborne {
        return None;
    }
    let contact =
        detect_climbable_wall(ctx.surfaces, &ctx.pose(transform), ctx.cfg.probe_length).ok()?;
    if !apply(state, ClimbEvent::CaughtWall) {
        return None;
    }
    debug!("caught a wall at {}", contact.pelvis.point);
    Some(enter_climbing(
        contact.pelvis,
        ctx.cfg.attach_duration,
        state,
        controls,
        ctx,
    ))
}

fn enter_climbing(
    hit: SurfaceHit,
    duration: Duration,
    state: &mut ClimbState,
    controls: &mut BodyControls,
    ctx: &Ctx,
) -> Begin {
    let frame = TangentFrame::from_normal(hit.normal);
    state.surface = Some(frame);
    controls.locomotion = Locomotion::Flying;
    controls.orient_to_movement = false;
    controls.set_flight_parameters(ctx.cfg.climb_flight);
    controls.wish_direction = Vec3::ZERO;
    controls.jump_requested = false;

    Begin::Attach {
        position: hit.point + hit.normal * ctx.cfg.attach_distance(),
        rotation: frame.facing_rotation(),
        duration,
    }
}

/// One tick on the wall. Returns the mantle to start, if the body reached a ledge.
///
/// Re-attachment runs every tick. The exit and mantle checks only run on ticks with directional
/// input, so a body hanging still right above the ground stays on the wall.
fn climb(
    transform: &mut Transform,
    state: &mut ClimbState,
    controls: &mut BodyControls,
    ctx: &Ctx,
) -> Option<Begin> {
    let reach = ctx.cfg.standoff_distance + ctx.cfg.reattach_margin;
    if let Ok(hit) = probe_forward(ctx.surfaces, &ctx.pose(transform), reach) {
        let frame = TangentFrame::from_normal(hit.normal);
        state.surface = Some(frame);
        reattach(transform, hit, &frame, ctx);
    }

    controls.wish_direction = state
        .surface
        .map(|frame| frame.project(ctx.movement).clamp_length_max(1.0))
        .unwrap_or_default();
    if ctx.movement == Vec2::ZERO {
        return None;
    }

    let pose = ctx.pose(transform);
    if let Some(reason) = exit_reason(ctx.surfaces, &pose, ctx.cfg) {
        debug!("letting go of the wall: {reason:?}");
        if apply(state, ClimbEvent::ExitDetected) {
            exit_climbing(transform, controls, ctx.cfg);
        }
        return None;
    }

    if ctx.movement.y <= 0.0 {
        return None;
    }
    let ledge = match check_mantle(ctx.surfaces, &pose, ctx.cfg) {
        Ok(ledge) if ledge.is_standable() => ledge,
        Ok(ledge) => {
            trace!("ledge at {} is too steep to stand on", ledge.point);
            return None;
        }
        Err(_) => return None,
    };
    controls.wish_direction = Vec3::ZERO;
    Some(Begin::Mantle(ledge.point))
}

/// Eases the body towards its spot in front of `hit`.
fn reattach(transform: &mut Transform, hit: SurfaceHit, frame: &TangentFrame, ctx: &Ctx) {
    let rate = ctx.cfg.smoothing_rate;
    let mut translation = transform.translation;
    translation.smooth_nudge(
        &(hit.point + hit.normal * ctx.cfg.attach_distance()),
        rate,
        ctx.dt,
    );
    let mut rotation = transform.rotation;
    rotation.smooth_nudge(&frame.facing_rotation(), rate, ctx.dt);

    if translation.is_finite() {
        transform.translation = translation;
    } else {
        warn!("reattach translation is not finite: {translation}, keeping the old one");
    }
    if rotation.is_finite() {
        transform.rotation = rotation.normalize();
    } else {
        warn!("reattach rotation is not finite: {rotation}, keeping the old one");
    }
}

/// Hands the body back to walking and stands it upright.
fn exit_climbing(transform: &mut Transform, controls: &mut BodyControls, cfg: &Climber) {
    controls.locomotion = Locomotion::Walking;
    controls.orient_to_movement = true;
    controls.set_flight_parameters(cfg.walk_flight);
    controls.wish_direction = Vec3::ZERO;
    let (yaw, _, _) = transform.rotation.to_euler(EulerRot::YXZ);
    transform.rotation = Quat::from_rotation_y(yaw);
}

fn calculate_wish_direction(orientation: &Transform, movement: Vec2) -> Vec3 {
    let (forward, right) = input_basis(orientation);
    (movement.y * forward + movement.x * right).normalize_or_zero()
}
