//! Collision avoidance manoeuvre installed by [conflict detection](crate::level::conflict).

use std::cmp::Ordering;

use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::log;
use math::Heading;

use super::{Context, Outcome, Procedure, safe_configuration, steer};
use crate::WorldTryLog;
use crate::level::Conf;
use crate::level::aeroplane::{Aeroplane, Kinematics};
use crate::level::conflict::Conflict;
use crate::level::message::Severity;
use crate::level::navigator::Haste;
use crate::level::pilot::{HeadingTarget, Pilot, TargetConfiguration};

#[derive(Debug)]
pub struct Avert {
    /// Target configuration to resume once the conflict is resolved.
    saved:    TargetConfiguration,
    intruder: Entity,
}

impl Avert {
    #[must_use]
    pub fn intruder(&self) -> Entity { self.intruder }

    pub(super) fn update(&mut self, ctx: &mut Context) -> Outcome {
        if let Some(conflict) = ctx.world.get::<Conflict>(ctx.plane) {
            self.intruder = conflict.intruder;
            steer_away(ctx, self.intruder);
            return Outcome::Continue;
        }

        let Some((kin, envelope)) = ctx.snapshot() else { return Outcome::Done };
        let saved = self.saved;
        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target = saved;
            pilot.status.haste = Haste::Normal;
        }
        steer(ctx, &kin, &envelope, saved.heading);
        ctx.say("Clear of traffic, resuming own navigation.", Severity::Info);
        Outcome::Done
    }
}

/// Makes `plane` avoid `intruder`, replacing any other active procedure.
///
/// If the aeroplane is already averting, only the intruder is updated.
pub fn engage(world: &mut World, plane: Entity, intruder: Entity, conf: &Conf) {
    let Some(intruder_altitude) = world.log_get::<Kinematics>(intruder).map(Kinematics::altitude)
    else {
        return;
    };

    let previous = {
        let Some(mut pilot) = world.log_get_mut::<Pilot>(plane) else { return };
        if let Some(Procedure::Avert(avert)) = &mut pilot.status.procedure {
            avert.intruder = intruder;
            return;
        }
        pilot.status.procedure.take()
    };

    let mut ctx = Context { world, plane, conf };
    let Some((kin, envelope)) = ctx.snapshot() else { return };
    let Some(current_target) = ctx.pilot_mut().map(|pilot| pilot.target) else { return };

    let saved = match previous {
        Some(procedure) => {
            log::debug!("{plane:?} abandons {} to avert {intruder:?}", procedure.name());
            procedure.release(ctx.world, plane);
            ctx.set_locked(false);
            safe_configuration(&kin, &envelope, conf)
        }
        None => current_target,
    };

    let climb = match kin.altitude().total_cmp(&intruder_altitude) {
        Ordering::Greater => true,
        Ordering::Less => false,
        Ordering::Equal => plane > intruder,
    };
    let offset = if climb { conf.flight_level_step } else { -conf.flight_level_step };
    let altitude = (kin.altitude() + offset).clamp(conf.min_flight_level, envelope.max_altitude);

    if let Some(mut pilot) = ctx.pilot_mut() {
        pilot.target.altitude = altitude;
        pilot.status.haste = Haste::Emergency;
        pilot.status.long = false;
        pilot.status.procedure = Some(Procedure::Avert(Avert { saved, intruder }));
    }
    steer_away(&mut ctx, intruder);

    let intruder_callsign = ctx
        .world
        .get::<Aeroplane>(intruder)
        .map(|other| other.callsign.clone())
        .unwrap_or_default();
    let verb = if climb { "climbing" } else { "descending" };
    ctx.say(
        format!("Traffic alert, {verb} to {altitude:.0} m to avoid {intruder_callsign}."),
        Severity::Urgent,
    );
}

/// Points the aeroplane directly away from the intruder.
fn steer_away(ctx: &mut Context, intruder: Entity) {
    let Some((kin, envelope)) = ctx.snapshot() else { return };
    let Some(other) = ctx.world.log_get::<Kinematics>(intruder) else { return };

    let offset = kin.horizontal() - other.horizontal();
    let away = if offset.length_squared() > 0. { Heading::from_vec2(offset) } else { kin.heading };
    steer(ctx, &kin, &envelope, HeadingTarget::Absolute(away));
}
