use math::TurnDirection;

use super::{Context, Outcome};
use crate::level::message::Severity;
use crate::level::pilot::HeadingTarget;

/// Flies in circles until another instruction replaces the procedure.
#[derive(Debug)]
pub struct Circle {
    direction: TurnDirection,
}

impl Circle {
    pub(super) fn initiate(ctx: &mut Context, direction: TurnDirection) -> Self {
        let mut circle = Self { direction };
        circle.keep_turning(ctx);
        ctx.say(format!("Circling {direction}."), Severity::Info);
        circle
    }

    #[must_use]
    pub fn direction(&self) -> TurnDirection { self.direction }

    pub(super) fn update(&mut self, ctx: &mut Context) -> Outcome {
        self.keep_turning(ctx);
        Outcome::Continue
    }

    /// Moves the heading target almost half a turn ahead so that it is never reached.
    fn keep_turning(&mut self, ctx: &mut Context) {
        let Some((kin, _)) = ctx.snapshot() else { return };
        let target = kin.heading.add_direction(self.direction, 179.);
        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target.heading = HeadingTarget::Absolute(target);
            pilot.resolved_heading = target;
            pilot.status.veer = self.direction;
        }
    }
}
