//! Validation of command sets against the current state of an aeroplane.

use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use math::KPH_PER_MPS;

use super::aeroplane::{Aeroplane, Envelope, Kinematics, Locked, OnGround};
use super::airport::{Airspace, LookupError};
use super::conflict::Conflict;
use super::navigator::Navigator;
use super::pilot::Pilot;
use crate::command::{Command, CommandName, CommandSet};

#[cfg(test)]
mod tests;

/// Why a command set cannot be executed now.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("No such aeroplane")]
    UnknownAeroplane,
    #[error("Unable, executing collision avoidance.")]
    Emergency,
    #[error("Unable, still executing previous instruction.")]
    Busy,
    #[error("Unable, under automatic control.")]
    Locked,
    #[error("Unable, still on the ground.")]
    OnGround,
    #[error("Unable, already airborne.")]
    Airborne,
    #[error("Unable, no departure airport.")]
    NoOrigin,
    #[error("Unable, {requested:.0} m is above our ceiling of {ceiling:.0} m.")]
    AboveCeiling { requested: f32, ceiling: f32 },
    #[error(
        "Unable, {:.0} kph is outside our speed range of {:.0} to {:.0} kph.",
        .requested * KPH_PER_MPS,
        .min * KPH_PER_MPS,
        .max * KPH_PER_MPS,
    )]
    SpeedOutOfRange { requested: f32, min: f32, max: f32 },
    #[error("Unable, {0}.")]
    Lookup(#[from] LookupError),
    #[error("Unable, runway {0} is in use.")]
    RunwayInUse(String),
}

/// State of an aeroplane relevant to command validation.
#[derive(Debug, Clone, Copy)]
pub struct Subject<'a> {
    pub envelope:  &'a Envelope,
    /// Code of the departure airport.
    pub origin:    Option<&'a str>,
    pub on_ground: bool,
    pub locked:    bool,
    /// Whether collision avoidance has taken over.
    pub emergency: bool,
    /// Whether a procedure is active or the target configuration is not reached.
    pub busy:      bool,
}

/// Checks whether `commands` can be executed by `subject` right now.
///
/// Never mutates anything.
pub fn check(
    subject: &Subject,
    airspace: &impl Airspace,
    commands: &CommandSet,
) -> Result<(), Rejection> {
    let only = |allowed: &[CommandName]| commands.names().all(|name| allowed.contains(&name));

    if subject.emergency && !only(&[CommandName::Squawk]) {
        return Err(Rejection::Emergency);
    }
    if subject.busy && !only(&[CommandName::Abort, CommandName::Squawk]) {
        return Err(Rejection::Busy);
    }
    if subject.locked && !only(&[CommandName::Squawk]) {
        return Err(Rejection::Locked);
    }

    let takeoff = commands.contains(CommandName::TakeOff);
    if subject.on_ground && !takeoff && !only(&[CommandName::Squawk]) {
        return Err(Rejection::OnGround);
    }
    if !subject.on_ground && takeoff {
        return Err(Rejection::Airborne);
    }

    for issued in commands.iter() {
        match &issued.command {
            &Command::Altitude(altitude) => {
                if altitude > subject.envelope.max_altitude {
                    return Err(Rejection::AboveCeiling {
                        requested: altitude,
                        ceiling:   subject.envelope.max_altitude,
                    });
                }
            }
            &Command::Speed(speed) => {
                let Envelope { min_speed, max_speed, .. } = *subject.envelope;
                if !(min_speed..=max_speed).contains(&speed) {
                    return Err(Rejection::SpeedOutOfRange {
                        requested: speed,
                        min:       min_speed,
                        max:       max_speed,
                    });
                }
            }
            Command::Land { airport, runway } => {
                Navigator::check_existing_runway(airspace, airport, runway)?;
            }
            Command::TakeOff { runway } => {
                let origin = subject.origin.ok_or(Rejection::NoOrigin)?;
                let found = Navigator::check_existing_runway(airspace, origin, runway)?;
                if found.holder.is_some() {
                    return Err(Rejection::RunwayInUse(runway.clone()));
                }
            }
            _ => {}
        }
    }

    Ok(())
}

/// Runs [`check`] on the aeroplane entity `plane`.
pub fn check_entity(world: &World, plane: Entity, commands: &CommandSet) -> Result<(), Rejection> {
    let entity = world.get_entity(plane).map_err(|_| Rejection::UnknownAeroplane)?;
    let (Some(aeroplane), Some(envelope), Some(kin), Some(pilot)) = (
        entity.get::<Aeroplane>(),
        entity.get::<Envelope>(),
        entity.get::<Kinematics>(),
        entity.get::<Pilot>(),
    ) else {
        return Err(Rejection::UnknownAeroplane);
    };

    let subject = Subject {
        envelope,
        origin: aeroplane.origin.as_deref(),
        on_ground: entity.contains::<OnGround>(),
        locked: entity.contains::<Locked>(),
        emergency: entity.contains::<Conflict>(),
        busy: !pilot.is_idle(kin),
    };
    check(&subject, world, commands)
}
