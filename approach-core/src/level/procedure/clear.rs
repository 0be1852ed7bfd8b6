use bevy::math::Vec2;

use super::{Abort, Context, Outcome, steer};
use crate::level::aeroplane::{Aeroplane, Destination};
use crate::level::beacon;
use crate::level::message::Severity;
use crate::level::navigator::Navigator;
use crate::level::pilot::HeadingTarget;

/// Flies direct to a beacon, then holds the heading it arrived on.
///
/// Passing the exit beacon of an outbound aeroplane clears it for hand-off.
#[derive(Debug)]
pub struct Clear {
    beacon:   String,
    position: Vec2,
    /// Whether the beacon has been ahead of the aeroplane since the procedure started.
    /// Overshooting only counts as passing once the aeroplane has turned towards it.
    ahead:    bool,
}

impl Clear {
    pub(super) fn initiate(ctx: &mut Context, beacon: &str) -> Result<Self, Abort> {
        let position = ctx
            .world
            .get_resource::<beacon::Index>()
            .and_then(|index| index.position(beacon))
            .ok_or_else(|| Abort::new(format!("Unable, unknown beacon {beacon}.")))?;
        let (kin, envelope) =
            ctx.snapshot().ok_or_else(|| Abort::new("Unable, lost track of aircraft."))?;

        steer(ctx, &kin, &envelope, HeadingTarget::TowardPoint(position));
        ctx.say(format!("Proceeding direct {beacon}."), Severity::Info);
        Ok(Self { beacon: beacon.to_owned(), position, ahead: false })
    }

    pub(super) fn update(&mut self, ctx: &mut Context) -> Outcome {
        let Some((kin, envelope)) = ctx.snapshot() else { return Outcome::Continue };
        let nav = Navigator::new(&kin, &envelope);
        let distance = (self.position - kin.horizontal()).length();
        let overshot = nav.check_overshot(self.position);
        let passed = distance <= kin.speed * ctx.conf.tick_seconds() || (self.ahead && overshot);
        self.ahead |= !overshot;
        if !passed {
            return Outcome::Continue;
        }

        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target.heading = HeadingTarget::Absolute(kin.heading);
            pilot.resolved_heading = kin.heading;
        }

        let exit = ctx.world.get_mut::<Aeroplane>(ctx.plane).is_some_and(|mut plane| {
            let exit = plane.destination == Destination::Beacon(self.beacon.clone());
            if exit {
                plane.cleared = true;
            }
            exit
        });
        if exit {
            ctx.say(format!("Passing {}, ready for hand-off.", self.beacon), Severity::NeedAck);
        } else {
            ctx.say(format!("Passing {}.", self.beacon), Severity::Info);
        }
        Outcome::Done
    }
}
