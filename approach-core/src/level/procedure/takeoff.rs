//! Takeoff roll, initial climb and departure turn.

use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::math::{Vec2, Vec3Swizzles};

use super::{Abort, Context, Outcome, steer};
use crate::WorldTryLog;
use crate::command::{Command, CommandName, CommandSet, HeadingArg};
use crate::level::aeroplane::{self, OnGround};
use crate::level::airport::Airspace;
use crate::level::beacon;
use crate::level::message::Severity;
use crate::level::navigator::Navigator;
use crate::level::pilot::HeadingTarget;
use crate::level::runway::{self, Runway};

#[derive(Debug)]
pub struct TakeOff {
    runway:         String,
    strip:          Entity,
    /// Far end of the runway, where the aeroplane must be airborne.
    end:            Vec2,
    after_heading:  HeadingTarget,
    after_altitude: f32,
    /// Pings left before the runway is released.
    busy_pings:     u32,
    phase:          Phase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Rolling along the runway until lift-off speed.
    Accelerating,
    /// Airborne on the runway heading until past the runway end.
    Climbing,
    /// Flying the departure heading until the runway is released.
    Heading,
}

impl TakeOff {
    pub(super) fn initiate(
        ctx: &mut Context,
        designator: &str,
        commands: &CommandSet,
    ) -> Result<Self, Abort> {
        let origin = ctx
            .aeroplane()
            .and_then(|plane| plane.origin.clone())
            .ok_or_else(|| Abort::new("Unable to take off, no departure airport."))?;
        let found = ctx
            .world
            .find_runway(&origin, designator)
            .map_err(|err| Abort::new(format!("Unable to take off, {err}.")))?;
        let runway = ctx
            .world
            .log_get::<Runway>(found.runway)
            .ok_or_else(|| Abort::new("Unable to take off, runway data unavailable."))?;
        let (foot, end, heading) = (runway.foot, runway.end().xy(), runway.heading());

        let (_, envelope) = ctx
            .snapshot()
            .ok_or_else(|| Abort::new("Unable to take off, lost track of aircraft."))?;

        let after_heading = match commands.get(CommandName::Heading) {
            Some(issued) => match &issued.command {
                &Command::Heading(HeadingArg::Absolute(absolute)) => HeadingTarget::Absolute(absolute),
                &Command::Heading(HeadingArg::Relative(delta)) => HeadingTarget::Absolute(heading + delta),
                Command::Heading(HeadingArg::Beacon(name)) => {
                    let position = ctx
                        .world
                        .get_resource::<beacon::Index>()
                        .and_then(|index| index.position(name))
                        .ok_or_else(|| Abort::new(format!("Unable to take off, unknown beacon {name}.")))?;
                    HeadingTarget::TowardPoint(position)
                }
                _ => HeadingTarget::Absolute(heading),
            },
            None => HeadingTarget::Absolute(heading),
        };
        let after_altitude = commands
            .iter()
            .find_map(|issued| match issued.command {
                Command::Altitude(altitude) => Some(altitude),
                _ => None,
            })
            .unwrap_or(envelope.max_altitude);

        if !runway::try_acquire(ctx.world, found.strip, ctx.plane) {
            return Err(Abort::new(format!("Unable to take off, runway {designator} in use.")));
        }

        if let Some(mut kin) = ctx.kinematics_mut() {
            kin.position = foot;
            kin.heading = heading;
            kin.speed = 1.;
            kin.climb_rate = 0.;
        }
        if let Some((kin, _)) = ctx.snapshot()
            && let Some(mut pilot) = ctx.pilot_mut()
        {
            pilot.hold_current(&kin);
            pilot.target.speed = envelope.min_speed;
        }
        ctx.set_locked(true);
        ctx.say(format!("Rolling runway {designator}."), Severity::Info);

        Ok(Self {
            runway: designator.to_owned(),
            strip: found.strip,
            end,
            after_heading,
            after_altitude,
            busy_pings: ctx.conf.takeoff_runway_pings,
            phase: Phase::Accelerating,
        })
    }

    #[must_use]
    pub fn phase(&self) -> Phase { self.phase }

    pub(super) fn update(&mut self, ctx: &mut Context) -> Outcome {
        let Some((kin, envelope)) = ctx.snapshot() else { return Outcome::Continue };
        let nav = Navigator::new(&kin, &envelope);
        self.busy_pings = self.busy_pings.saturating_sub(1);

        match self.phase {
            Phase::Accelerating => {
                if kin.speed > envelope.landing_speed {
                    ctx.world.entity_mut(ctx.plane).remove::<OnGround>();
                    if let Some(mut pilot) = ctx.pilot_mut() {
                        pilot.target.altitude = self.after_altitude;
                    }
                    ctx.say("Airborne.", Severity::Info);
                    self.phase = Phase::Climbing;
                } else if nav.check_overshot(self.end) {
                    runway::release(ctx.world, self.strip, ctx.plane);
                    ctx.say(
                        format!("Overran runway {} before lifting off.", self.runway),
                        Severity::Urgent,
                    );
                    ctx.terminate(aeroplane::Outcome::Crashed);
                    return Outcome::Terminated;
                }
            }
            Phase::Climbing => {
                if nav.check_overshot(self.end) {
                    steer(ctx, &kin, &envelope, self.after_heading);
                    self.phase = Phase::Heading;
                }
            }
            Phase::Heading => {}
        }

        if self.phase == Phase::Heading && self.busy_pings == 0 {
            runway::release(ctx.world, self.strip, ctx.plane);
            ctx.set_locked(false);
            ctx.say(format!("Departure from runway {} complete.", self.runway), Severity::Info);
            return Outcome::Done;
        }

        Outcome::Continue
    }

    pub(super) fn release(&self, world: &mut World, plane: Entity) {
        runway::release(world, self.strip, plane);
    }
}
