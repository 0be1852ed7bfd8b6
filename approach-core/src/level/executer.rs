//! Application of validated command sets.

use bevy::ecs::entity::Entity;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::World;
use bevy::math::Vec2;
use math::{KPH_PER_MPS, TurnDirection};
use smallvec::SmallVec;

use super::aeroplane::{
    Aeroplane, Destination, Envelope, Kinematics, Locked, Outcome, Terminate,
};
use super::message::{self, Severity};
use super::navigator::{Haste, Navigator};
use super::pilot::{HeadingTarget, Pilot};
use super::score::IssuedMessage;
use super::{Conf, beacon, procedure};
use crate::command::{Command, CommandName, CommandSet, Flag, HeadingArg, Issued};
use crate::{WorldTryLog, try_log_return};

/// Applies `commands` to `plane`.
///
/// Must only be called after the checker accepted the command set.
///
/// # Panics
/// Panics if the set contains more than one procedure command,
/// which the parser's combination table never produces.
pub fn execute(world: &mut World, plane: Entity, commands: &CommandSet, conf: &Conf) {
    for name in commands.names().filter(|&name| name != CommandName::Squawk) {
        world.write_message(IssuedMessage { aeroplane: plane, command: name });
    }

    let procedures: SmallVec<[&Issued; 1]> =
        commands.iter().filter(|issued| issued.command.name().is_procedure()).collect();
    assert!(
        procedures.len() <= 1,
        "command set contains multiple procedures: {:?}",
        procedures.iter().map(|issued| issued.command.name()).collect::<Vec<_>>()
    );

    let manoeuvring = commands
        .names()
        .any(|name| !matches!(name, CommandName::Squawk | CommandName::Bye));
    if manoeuvring && let Some(mut pilot) = world.log_get_mut::<Pilot>(plane) {
        pilot.status.haste = Haste::Normal;
        pilot.status.long = false;
    }

    let procedure = procedures.first().copied();
    // Takeoff consumes its own HEADING and ALTITUDE arguments after lifting off.
    let takeoff = procedure.is_some_and(|issued| issued.command.name() == CommandName::TakeOff);
    if !takeoff {
        process_commands(world, plane, commands);
    }
    if manoeuvring {
        apply_flags(world, plane, commands);
    }
    if !takeoff {
        readback(world, plane, commands);
    }

    if let Some(issued) = procedure {
        procedure::start(world, plane, issued, commands, conf);
    }
}

/// Applies the non-procedure commands of the set.
fn process_commands(world: &mut World, plane: Entity, commands: &CommandSet) {
    for issued in commands.iter() {
        match &issued.command {
            Command::Heading(arg) => set_heading(world, plane, arg),
            &Command::Altitude(altitude) => {
                let mut pilot = try_log_return!(world.log_get_mut::<Pilot>(plane), expect "aeroplane has a pilot");
                pilot.target.altitude = altitude;
            }
            &Command::Speed(speed) => {
                let mut pilot = try_log_return!(world.log_get_mut::<Pilot>(plane), expect "aeroplane has a pilot");
                pilot.target.speed = speed;
            }
            Command::Abort => abort(world, plane),
            Command::Squawk => squawk(world, plane),
            Command::Bye => bye(world, plane),
            Command::Land { .. }
            | Command::TakeOff { .. }
            | Command::Circle(_)
            | Command::Clear(_) => {}
        }
    }
}

fn set_heading(world: &mut World, plane: Entity, arg: &HeadingArg) {
    let beacon_position = |world: &World, name: &str| -> Option<Vec2> {
        world.get_resource::<beacon::Index>().and_then(|index| index.position(name))
    };

    let kin = *try_log_return!(world.log_get::<Kinematics>(plane), expect "aeroplane has kinematics");
    let envelope = *try_log_return!(world.log_get::<Envelope>(plane), expect "aeroplane has an envelope");
    let (target, explicit_veer) = match arg {
        &HeadingArg::Absolute(heading) => (HeadingTarget::Absolute(heading), None),
        &HeadingArg::Relative(delta) => {
            let veer =
                if delta >= 0. { TurnDirection::Clockwise } else { TurnDirection::CounterClockwise };
            (HeadingTarget::Absolute(kin.heading + delta), Some(veer))
        }
        HeadingArg::Beacon(name) => {
            let position = try_log_return!(
                beacon_position(world, name),
                expect "parser only accepts known beacons, but {name} is unknown"
            );
            (HeadingTarget::TowardPoint(position), None)
        }
    };

    let mut pilot = try_log_return!(world.log_get_mut::<Pilot>(plane), expect "aeroplane has a pilot");
    pilot.set_heading_target(target, &Navigator::new(&kin, &envelope));
    if let Some(veer) = explicit_veer {
        pilot.status.veer = veer;
    }
}

/// Discards the active procedure and the command queue, then holds the current state.
pub fn abort(world: &mut World, plane: Entity) {
    let kin = *try_log_return!(world.log_get::<Kinematics>(plane), expect "aeroplane has kinematics");
    let procedure = {
        let mut pilot = try_log_return!(world.log_get_mut::<Pilot>(plane), expect "aeroplane has a pilot");
        pilot.queued.clear();
        pilot.hold_current(&kin);
        pilot.status.procedure.take()
    };
    if let Some(procedure) = procedure {
        procedure.release(world, plane);
    }
    world.entity_mut(plane).remove::<Locked>();
}

fn squawk(world: &mut World, plane: Entity) {
    let kin = *try_log_return!(world.log_get::<Kinematics>(plane), expect "aeroplane has kinematics");
    let Some(aeroplane) = world.log_get::<Aeroplane>(plane) else { return };
    let callsign = aeroplane.callsign.clone();
    let destination = match &aeroplane.destination {
        Destination::Airport(code) => format!("inbound {code}"),
        Destination::Beacon(name) => format!("outbound via {name}"),
    };
    let text = format!(
        "{} at {:.0} m, heading {}, {:.0} kph, {destination}.",
        aeroplane.icao,
        kin.altitude(),
        kin.heading,
        kin.speed * KPH_PER_MPS,
    );
    message::say(world, &callsign, text, Severity::Info);
}

fn bye(world: &mut World, plane: Entity) {
    let Some(aeroplane) = world.log_get::<Aeroplane>(plane) else { return };
    let (callsign, cleared) = (aeroplane.callsign.clone(), aeroplane.cleared);
    message::say(world, &callsign, "Good day.", Severity::Info);
    if cleared {
        Terminate { outcome: Outcome::Dismissed }.apply(world.entity_mut(plane));
    }
}

fn readback(world: &mut World, plane: Entity, commands: &CommandSet) {
    let Some(aeroplane) = world.log_get::<Aeroplane>(plane) else { return };
    let callsign = aeroplane.callsign.clone();
    let Some(kin) = world.log_get::<Kinematics>(plane) else { return };
    let altitude = kin.altitude();
    let Some(pilot) = world.log_get::<Pilot>(plane) else { return };

    let parts: Vec<String> = commands
        .iter()
        .filter_map(|issued| match &issued.command {
            Command::Heading(HeadingArg::Beacon(name)) => {
                Some(format!("turning {} direct {name}", pilot.status.veer))
            }
            Command::Heading(_) => {
                Some(format!("turning {} heading {}", pilot.status.veer, pilot.resolved_heading))
            }
            &Command::Altitude(target) => Some(if target > altitude {
                format!("climbing to {target:.0} m")
            } else {
                format!("descending to {target:.0} m")
            }),
            &Command::Speed(speed) => Some(format!("speed {:.0} kph", speed * KPH_PER_MPS)),
            Command::Abort => Some("aborting, holding present configuration".to_owned()),
            _ => None,
        })
        .collect();

    if !parts.is_empty() {
        message::say(world, &callsign, parts.join(", "), Severity::Info);
    }
}

fn apply_flags(world: &mut World, plane: Entity, commands: &CommandSet) {
    let mut pilot = try_log_return!(world.log_get_mut::<Pilot>(plane), expect "aeroplane has a pilot");
    if commands.has_flag(Flag::Expedite) {
        pilot.status.haste = Haste::Expedite;
    }
    if commands.has_flag(Flag::Long) {
        pilot.status.long = true;
        pilot.status.veer = -pilot.status.veer;
    }
}
