//! Multi-ping sequences that take over the target configuration.
//!
//! At most one procedure is active per aeroplane, stored in its [`Pilot`] status.
//! Every ping the active procedure is taken out of the pilot, updated,
//! and put back unless it finished.

use bevy::app::{self, App, Plugin};
use bevy::ecs::change_detection::Mut;
use bevy::ecs::entity::Entity;
use bevy::ecs::query::Without;
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::World;
use bevy::log;

use super::aeroplane::{self, Aeroplane, Envelope, Kinematics, Locked, Terminate, Terminated};
use super::message::{self, Severity};
use super::navigator::{Haste, Navigator};
use super::pilot::{HeadingTarget, Pilot, TargetConfiguration};
use super::{Conf, SystemSets};
use crate::WorldTryLog;
use crate::command::{Command, CommandSet, Issued};

pub mod avert;
pub mod circle;
pub mod clear;
pub mod land;
pub mod takeoff;


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_systems(app::Update, advance_system.in_set(SystemSets::Navigate));
    }
}

#[derive(Debug, strum::IntoStaticStr)]
pub enum Procedure {
    Land(land::Land),
    TakeOff(takeoff::TakeOff),
    Circle(circle::Circle),
    Clear(clear::Clear),
    Avert(avert::Avert),
}

/// Result of one procedure update.
#[derive(Debug)]
pub enum Outcome {
    /// Keep the procedure active.
    Continue,
    /// The procedure completed and has released its resources.
    Done,
    /// The procedure is infeasible and must be torn down.
    Abort(Abort),
    /// The aeroplane has been terminated.
    Terminated,
}

/// Why a procedure cannot continue, as transmitted on the radio.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct Abort(pub String);

impl Abort {
    pub fn new(text: impl Into<String>) -> Self { Self(text.into()) }
}

/// Access to the world on behalf of one aeroplane.
pub struct Context<'a> {
    pub world: &'a mut World,
    pub plane: Entity,
    pub conf:  &'a Conf,
}

impl Context<'_> {
    /// Copies the kinematics and envelope of the aeroplane.
    pub fn snapshot(&self) -> Option<(Kinematics, Envelope)> {
        Some((
            *self.world.log_get::<Kinematics>(self.plane)?,
            *self.world.log_get::<Envelope>(self.plane)?,
        ))
    }

    pub fn pilot_mut(&mut self) -> Option<Mut<'_, Pilot>> {
        self.world.log_get_mut::<Pilot>(self.plane)
    }

    pub fn kinematics_mut(&mut self) -> Option<Mut<'_, Kinematics>> {
        self.world.log_get_mut::<Kinematics>(self.plane)
    }

    pub fn aeroplane(&self) -> Option<&Aeroplane> { self.world.log_get::<Aeroplane>(self.plane) }

    pub fn say(&mut self, text: impl Into<String>, severity: Severity) {
        let callsign = self.aeroplane().map(|plane| plane.callsign.clone()).unwrap_or_default();
        message::say(self.world, &callsign, text, severity);
    }

    pub fn set_locked(&mut self, locked: bool) {
        let mut entity = self.world.entity_mut(self.plane);
        if locked {
            entity.insert(Locked);
        } else {
            entity.remove::<Locked>();
        }
    }

    pub fn terminate(&mut self, outcome: aeroplane::Outcome) {
        Terminate { outcome }.apply(self.world.entity_mut(self.plane));
    }
}

impl Procedure {
    /// Sets up the procedure requested by `issued`.
    ///
    /// `commands` is the full set `issued` belongs to,
    /// for procedures that consume accompanying commands.
    ///
    /// # Panics
    /// Panics if `issued` is not a procedure command.
    pub fn initiate(
        ctx: &mut Context,
        issued: &Issued,
        commands: &CommandSet,
    ) -> Result<Self, Abort> {
        Ok(match &issued.command {
            Command::Land { airport, runway } => Self::Land(land::Land::initiate(ctx, airport, runway)?),
            Command::TakeOff { runway } => {
                Self::TakeOff(takeoff::TakeOff::initiate(ctx, runway, commands)?)
            }
            &Command::Circle(direction) => Self::Circle(circle::Circle::initiate(ctx, direction)),
            Command::Clear(beacon) => Self::Clear(clear::Clear::initiate(ctx, beacon)?),
            other => panic!("{:?} does not start a procedure", other.name()),
        })
    }

    pub fn update(&mut self, ctx: &mut Context) -> Outcome {
        match self {
            Self::Land(land) => land.update(ctx),
            Self::TakeOff(takeoff) => takeoff.update(ctx),
            Self::Circle(circle) => circle.update(ctx),
            Self::Clear(clear) => clear.update(ctx),
            Self::Avert(avert) => avert.update(ctx),
        }
    }

    /// Releases shared resources held by the procedure.
    pub fn release(&self, world: &mut World, plane: Entity) {
        match self {
            Self::Land(land) => land.release(world, plane),
            Self::TakeOff(takeoff) => takeoff.release(world, plane),
            Self::Circle(_) | Self::Clear(_) | Self::Avert(_) => {}
        }
    }

    /// Whether the minimum speed is lowered to the landing speed during this procedure.
    #[must_use]
    pub fn lowers_speed_floor(&self) -> bool { matches!(self, Self::Land(_) | Self::TakeOff(_)) }

    #[must_use]
    pub fn name(&self) -> &'static str { self.into() }
}

/// Starts the procedure `issued` on `plane`, radioing the reason if it is infeasible.
pub fn start(world: &mut World, plane: Entity, issued: &Issued, commands: &CommandSet, conf: &Conf) {
    let mut ctx = Context { world, plane, conf };
    match Procedure::initiate(&mut ctx, issued, commands) {
        Ok(procedure) => {
            log::debug!("{plane:?} starts {}", procedure.name());
            if let Some(mut pilot) = ctx.pilot_mut() {
                pilot.status.procedure = Some(procedure);
            }
        }
        Err(abort) => fail(&mut ctx, None, abort),
    }
}

/// Tears down a failed procedure and returns the aeroplane to a safe configuration.
///
/// Releases any held runway, holds the current heading,
/// moves to the nearest valid flight level and keeps a speed within the envelope.
pub fn fail(ctx: &mut Context, procedure: Option<&Procedure>, abort: Abort) {
    if let Some(procedure) = procedure {
        log::debug!("{:?} aborts {}: {abort}", ctx.plane, procedure.name());
        procedure.release(ctx.world, ctx.plane);
    }

    if let Some((kin, envelope)) = ctx.snapshot() {
        let target = safe_configuration(&kin, &envelope, ctx.conf);
        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target = target;
            pilot.resolved_heading = kin.heading;
            pilot.status.haste = Haste::Normal;
        }
    }

    ctx.set_locked(false);
    ctx.say(abort.0, Severity::Anomaly);
}

/// Holds the current heading at the nearest valid flight level and an in-envelope speed.
#[must_use]
pub fn safe_configuration(kin: &Kinematics, envelope: &Envelope, conf: &Conf) -> TargetConfiguration {
    TargetConfiguration {
        heading:  HeadingTarget::Absolute(kin.heading),
        altitude: conf.nearest_flight_level(kin.altitude()).min(envelope.max_altitude),
        speed:    kin.speed.clamp(envelope.min_speed, envelope.max_speed),
    }
}

/// Updates the active procedure of `plane` by one ping.
pub fn advance(world: &mut World, plane: Entity, conf: &Conf) {
    if world.get::<Terminated>(plane).is_some() {
        return;
    }

    let Some(mut procedure) =
        world.log_get_mut::<Pilot>(plane).and_then(|mut pilot| pilot.status.procedure.take())
    else {
        return;
    };

    let mut ctx = Context { world, plane, conf };
    match procedure.update(&mut ctx) {
        Outcome::Continue => {
            if let Some(mut pilot) = ctx.pilot_mut() {
                pilot.status.procedure = Some(procedure);
            }
        }
        Outcome::Done => log::debug!("{plane:?} completed {}", procedure.name()),
        Outcome::Abort(abort) => fail(&mut ctx, Some(&procedure), abort),
        Outcome::Terminated => {}
    }
}

fn advance_system(world: &mut World) {
    let conf = world.resource::<Conf>().clone();

    let planes: Vec<_> = world
        .query_filtered::<(Entity, &Pilot), Without<Terminated>>()
        .iter(world)
        .filter(|(_, pilot)| pilot.status.procedure.is_some())
        .map(|(entity, _)| entity)
        .collect();

    for plane in planes {
        advance(world, plane, &conf);
    }
}

/// Replaces the heading target, turning the shorter way.
fn steer(
    ctx: &mut Context,
    kin: &Kinematics,
    envelope: &Envelope,
    heading: HeadingTarget,
) {
    let nav = Navigator::new(kin, envelope);
    if let Some(mut pilot) = ctx.pilot_mut() {
        pilot.set_heading_target(heading, &nav);
    }
}
