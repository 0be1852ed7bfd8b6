//! Per-aeroplane autopilot.
//!
//! The [`Pilot`] steers its aeroplane towards a [`TargetConfiguration`] every ping.
//! [`issue`] is the single entry point for controller instructions:
//! instructions are validated by the [checker](super::checker),
//! then applied by the [executer](super::executer) or buffered until the aeroplane is idle.

use std::collections::VecDeque;

use bevy::app::{self, App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::query::{Has, With, Without};
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::{Query, Res};
use bevy::ecs::world::World;
use bevy::log;
use bevy::math::Vec2;
use math::{Heading, TurnDirection};

use super::aeroplane::{Aeroplane, Envelope, Kinematics, Locked, OnGround, Terminated};
use super::checker::{self, Rejection};
use super::message::{self, Severity};
use super::navigator::{Haste, Navigator};
use super::procedure::Procedure;
use super::radar::RadarClock;
use super::{Conf, SystemSets, executer};
use crate::WorldTryLog;
use crate::command::CommandSet;

#[cfg(test)]
mod tests;

/// Largest heading change integrated in a single ping.
///
/// Keeps every step on the shorter arc so that [`dampen`] can detect crossing the target.
const MAX_TURN_PER_TICK: f32 = 90.;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_systems(app::Update, manoeuvre_system.in_set(SystemSets::Aviate));
        app.add_systems(app::Update, dispatch_system.in_set(SystemSets::Dispatch));
    }
}

/// The heading the pilot steers towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeadingTarget {
    /// Hold a fixed heading.
    Absolute(Heading),
    /// Fly towards a point, recomputing the course every ping.
    TowardPoint(Vec2),
}

/// The configuration the pilot steers towards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetConfiguration {
    pub heading:  HeadingTarget,
    /// Target altitude, in metres.
    pub altitude: f32,
    /// Target ground speed, in m/s.
    pub speed:    f32,
}

impl TargetConfiguration {
    /// Holds the current state.
    #[must_use]
    pub fn current(kin: &Kinematics) -> Self {
        Self {
            heading:  HeadingTarget::Absolute(kin.heading),
            altitude: kin.altitude(),
            speed:    kin.speed,
        }
    }
}

#[derive(Debug)]
pub struct Status {
    /// Direction of the current or next turn.
    pub veer:      TurnDirection,
    /// Whether the turn was requested the long way round.
    pub long:      bool,
    pub haste:     Haste,
    /// The active procedure, if any.
    ///
    /// Temporarily taken out while the procedure itself is being updated.
    pub procedure: Option<Procedure>,
}

#[derive(Component)]
pub struct Pilot {
    pub target:           TargetConfiguration,
    /// The concrete heading resolved from `target.heading` during the last update.
    pub resolved_heading: Heading,
    pub status:           Status,
    /// Command sets buffered while the aeroplane was busy, oldest first.
    pub queued:           VecDeque<CommandSet>,
    /// Radar ping of the last executed command.
    pub last_command:     Option<u64>,
}

impl Pilot {
    #[must_use]
    pub fn new(kin: &Kinematics) -> Self {
        Self {
            target:           TargetConfiguration::current(kin),
            resolved_heading: kin.heading,
            status:           Status {
                veer:      TurnDirection::Clockwise,
                long:      false,
                haste:     Haste::Normal,
                procedure: None,
            },
            queued:           VecDeque::new(),
            last_command:     None,
        }
    }

    /// Sets the heading target and chooses the direction to turn.
    ///
    /// The turn takes the shorter way unless the long flag is set.
    pub fn set_heading_target(&mut self, heading: HeadingTarget, nav: &Navigator) {
        self.target.heading = heading;
        self.resolved_heading = nav.resolve_heading(&heading);
        self.status.veer = nav.get_shortest_veering_direction(self.resolved_heading);
        if self.status.long {
            self.status.veer = -self.status.veer;
        }
    }

    /// Resets the target configuration to the current state.
    pub fn hold_current(&mut self, kin: &Kinematics) {
        self.target = TargetConfiguration::current(kin);
        self.resolved_heading = kin.heading;
    }

    /// Whether the current state equals the target configuration exactly.
    #[must_use]
    pub fn is_reached(&self, kin: &Kinematics) -> bool {
        kin.heading == self.resolved_heading
            && kin.altitude() == self.target.altitude
            && kin.speed == self.target.speed
    }

    /// Whether the pilot is free to execute a new command set.
    #[must_use]
    pub fn is_idle(&self, kin: &Kinematics) -> bool {
        self.status.procedure.is_none() && self.is_reached(kin)
    }
}

/// Integrates one ping of flight towards the target configuration,
/// then dampens any overshoot of the target.
pub fn manoeuvre(
    kin: &mut Kinematics,
    pilot: &mut Pilot,
    envelope: &Envelope,
    on_ground: bool,
    conf: &Conf,
) {
    let dt = conf.tick_seconds();
    let previous = *kin;

    let nav = Navigator::new(&previous, envelope);
    let target_heading = nav.resolve_heading(&pilot.target.heading);
    if matches!(pilot.target.heading, HeadingTarget::TowardPoint(_)) && !pilot.status.long {
        pilot.status.veer = nav.get_shortest_veering_direction(target_heading);
    }
    pilot.resolved_heading = target_heading;

    let procedure_active = pilot.status.procedure.is_some();
    let throttle = if pilot.status.haste == Haste::Normal && !procedure_active {
        conf.normal_throttle
    } else {
        1.
    };

    if !on_ground && kin.heading != target_heading && kin.speed > 0. {
        let omega = nav.get_veering_angular_velocity(pilot.status.haste, kin.speed);
        let step = (omega * dt).into_degrees().min(MAX_TURN_PER_TICK);
        kin.heading = kin.heading.add_direction(pilot.status.veer, step);
    }

    if on_ground {
        kin.climb_rate = 0.;
    } else if kin.altitude() != pilot.target.altitude {
        let (down, up) = envelope.climb_rate_accels;
        let accel = (if pilot.target.altitude > kin.altitude() { up } else { down }) * throttle;
        let (min_rate, max_rate) = envelope.climb_rate_limits;
        kin.climb_rate = (kin.climb_rate + accel * dt).clamp(min_rate, max_rate);
    }

    let floor = if on_ground {
        0.
    } else if pilot.status.procedure.as_ref().is_some_and(Procedure::lowers_speed_floor) {
        envelope.landing_speed
    } else {
        envelope.min_speed
    };
    let target_speed = pilot.target.speed.clamp(floor, envelope.max_speed);
    if kin.speed != target_speed {
        let (decel, accel) = envelope.ground_accels;
        let accel = (if target_speed > kin.speed { accel } else { decel }) * throttle;
        kin.speed = (kin.speed + accel * dt).clamp(floor.min(kin.speed), envelope.max_speed);
    }

    kin.position += kin.velocity() * dt;

    let mut dampen_target = pilot.target;
    dampen_target.speed = target_speed;
    dampen(&previous, kin, target_heading, &dampen_target);
}

/// Snaps each axis onto its target if the last step crossed it.
///
/// Fixed-step integration rarely lands exactly on the target,
/// so without this the aeroplane would oscillate around the setpoint.
pub fn dampen(
    previous: &Kinematics,
    kin: &mut Kinematics,
    target_heading: Heading,
    target: &TargetConfiguration,
) {
    if target_heading.is_between((previous.heading, kin.heading)) {
        kin.heading = target_heading;
    }

    if math::in_between((previous.altitude(), kin.altitude()), target.altitude) {
        kin.position.z = target.altitude;
        kin.climb_rate = 0.;
    }

    if math::in_between((previous.speed, kin.speed), target.speed) {
        kin.speed = target.speed;
    }
}

fn manoeuvre_system(
    conf: Res<Conf>,
    mut plane_query: Query<
        (&mut Kinematics, &mut Pilot, &Envelope, Has<OnGround>),
        Without<Terminated>,
    >,
) {
    plane_query.par_iter_mut().for_each(|(mut kin, mut pilot, envelope, on_ground)| {
        // Deref first to avoid borrowck issues.
        let (kin, pilot) = (&mut *kin, &mut *pilot);
        manoeuvre(kin, pilot, envelope, on_ground, &conf);
    });
}

/// How an accepted command set was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Acknowledgement {
    /// Applied immediately.
    Executed,
    /// Buffered until the aeroplane finishes its current manoeuvre.
    Queued,
}

/// Issues `commands` to the aeroplane `plane`.
///
/// Rejections are also transmitted as radio messages from the aeroplane.
pub fn issue(
    world: &mut World,
    plane: Entity,
    commands: CommandSet,
) -> Result<Acknowledgement, Rejection> {
    let conf = world.resource::<Conf>().clone();
    let callsign = world.log_get::<Aeroplane>(plane).map(|p| p.callsign.clone()).unwrap_or_default();

    match checker::check_entity(world, plane, &commands) {
        Ok(()) => {
            execute(world, plane, &commands, &conf);
            Ok(Acknowledgement::Executed)
        }
        Err(Rejection::Busy) if conf.queue_commands => {
            if let Some(mut pilot) = world.log_get_mut::<Pilot>(plane) {
                pilot.queued.push_back(commands);
            }
            message::say(
                world,
                &callsign,
                "Will comply after current manoeuvre.",
                Severity::NeedAck,
            );
            Ok(Acknowledgement::Queued)
        }
        Err(rejection) => {
            message::say(world, &callsign, rejection.to_string(), Severity::NeedAck);
            Err(rejection)
        }
    }
}

fn execute(world: &mut World, plane: Entity, commands: &CommandSet, conf: &Conf) {
    let ping = world.get_resource::<RadarClock>().map(RadarClock::pings);
    if let Some(mut pilot) = world.log_get_mut::<Pilot>(plane) {
        pilot.last_command = ping;
    }
    executer::execute(world, plane, commands, conf);
}

/// Executes the oldest buffered command set of every idle aeroplane.
fn dispatch_system(world: &mut World) {
    let conf = world.resource::<Conf>().clone();

    let ready: Vec<_> = world
        .query_filtered::<(Entity, &Kinematics, &Pilot), (Without<Locked>, Without<Terminated>)>()
        .iter(world)
        .filter(|(_, kin, pilot)| !pilot.queued.is_empty() && pilot.is_idle(kin))
        .map(|(entity, _, _)| entity)
        .collect();

    for plane in ready {
        let Some(commands) =
            world.log_get_mut::<Pilot>(plane).and_then(|mut pilot| pilot.queued.pop_front())
        else {
            continue;
        };

        match checker::check_entity(world, plane, &commands) {
            Ok(()) => {
                log::debug!("Dispatching queued commands to {plane:?}");
                execute(world, plane, &commands, &conf);
            }
            Err(rejection) => {
                let callsign = world
                    .log_get::<Aeroplane>(plane)
                    .map(|p| p.callsign.clone())
                    .unwrap_or_default();
                message::say(
                    world,
                    &callsign,
                    format!("Queued instruction dropped: {rejection}"),
                    Severity::NeedAck,
                );
            }
        }
    }
}
