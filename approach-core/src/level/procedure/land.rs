//! Approach along the ILS, glide path descent, touchdown and taxiing.

use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use math::{Angle, Intersection};

use super::{Abort, Context, Outcome, steer};
use crate::WorldTryLog;
use crate::level::aeroplane::{self, Destination, OnGround};
use crate::level::airport::Airspace;
use crate::level::message::Severity;
use crate::level::navigator::Navigator;
use crate::level::pilot::HeadingTarget;
use crate::level::runway::{self, Runway};

#[derive(Debug)]
pub struct Land {
    airport: String,
    runway:  String,
    strip:   Entity,
    lander:  Lander,
    phase:   Phase,
}

/// Approach geometry computed when the landing is initiated.
#[derive(Debug, Clone, Copy)]
pub struct Lander {
    /// Touchdown point.
    pub foot:         Vec3,
    /// Unit vector of the ILS course.
    pub ils:          Vec2,
    /// Where the projected course crosses the ILS.
    pub intersection: Vec2,
    /// Where the turn onto the ILS must begin.
    pub merge:        Vec2,
    /// Where deceleration to landing speed must begin, known once on the glide path.
    pub braking:      Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Holding the current course until the merge point.
    Intercepting,
    /// Turning towards the runway foot.
    Merging,
    /// Established on the course, waiting to capture the glide path.
    Matching,
    /// Descending on the glide path.
    Gliding { slowing: bool },
    /// On the runway, vacating it after the remaining pings.
    Taxiing { remaining: u32, outcome: aeroplane::Outcome },
}

impl Land {
    pub(super) fn initiate(ctx: &mut Context, airport: &str, designator: &str) -> Result<Self, Abort> {
        let found = ctx
            .world
            .find_runway(airport, designator)
            .map_err(|err| Abort::new(format!("Unable to land, {err}.")))?;
        let runway = ctx
            .world
            .log_get::<Runway>(found.runway)
            .ok_or_else(|| Abort::new("Unable to land, runway data unavailable."))?;
        let (foot, ils, ils_heading, ils_start) = (
            runway.foot,
            runway.direction,
            runway.heading(),
            runway.ils_start(ctx.conf.ils_extension()),
        );

        let (kin, envelope) =
            ctx.snapshot().ok_or_else(|| Abort::new("Unable to land, lost track of aircraft."))?;
        let haste = ctx.pilot_mut().map(|pilot| pilot.status.haste).unwrap_or_default();
        let nav = Navigator::new(&kin, &envelope);

        let incidence = kin.heading.angle_to(ils_heading);
        if incidence > ctx.conf.ils_tolerance {
            return Err(Abort::new(format!(
                "ILS heading must be within {:.0} degrees from current heading.",
                ctx.conf.ils_tolerance
            )));
        }

        let course_end = kin.horizontal() + kin.heading.into_vec2() * ctx.conf.ils_extension();
        let intersection =
            match math::segment_intersection(kin.horizontal(), course_end, ils_start, foot.xy()) {
                Intersection::Point(point) => point,
                Intersection::Overlapping => kin.horizontal(),
                Intersection::Parallel | Intersection::Separated => {
                    return Err(Abort::new("Current course does not intersect the ILS."));
                }
            };

        let radius = nav.get_veering_radius(haste, kin.speed);
        let merge =
            intersection - kin.heading.into_vec2() * math::merge_distance(radius, Angle::from_degrees(incidence));
        if nav.check_overshot(merge) {
            return Err(Abort::new("Too close to merge onto the ILS."));
        }

        steer(ctx, &kin, &envelope, HeadingTarget::Absolute(kin.heading));
        ctx.say(format!("Cleared to land runway {designator} at {airport}."), Severity::Info);

        Ok(Self {
            airport: airport.to_owned(),
            runway:  designator.to_owned(),
            strip:   found.strip,
            lander:  Lander { foot, ils, intersection, merge, braking: None },
            phase:   Phase::Intercepting,
        })
    }

    #[must_use]
    pub fn lander(&self) -> &Lander { &self.lander }

    #[must_use]
    pub fn phase(&self) -> Phase { self.phase }

    pub(super) fn update(&mut self, ctx: &mut Context) -> Outcome {
        let Some((kin, envelope)) = ctx.snapshot() else { return Outcome::Continue };
        let nav = Navigator::new(&kin, &envelope);
        let foot = self.lander.foot;
        let dt = ctx.conf.tick_seconds();

        match self.phase {
            Phase::Intercepting => {
                if nav.check_overshot(self.lander.merge) {
                    self.phase = Phase::Merging;
                    steer(ctx, &kin, &envelope, HeadingTarget::Absolute(nav.get_course_towards(foot.xy())));
                }
            }
            Phase::Merging => {
                let aligned = ctx.pilot_mut().is_some_and(|pilot| {
                    pilot.target.heading == HeadingTarget::Absolute(kin.heading)
                });
                if aligned {
                    self.phase = Phase::Matching;
                } else {
                    steer(ctx, &kin, &envelope, HeadingTarget::Absolute(nav.get_course_towards(foot.xy())));
                }
            }
            Phase::Matching => {
                steer(ctx, &kin, &envelope, HeadingTarget::Absolute(nav.get_course_towards(foot.xy())));

                let distance = (foot.xy() - kin.horizontal()).length();
                let glide = math::glide_altitude(distance, ctx.conf.glide_slope, foot.z);
                let delta = glide - kin.altitude();
                let (max_descent, max_climb) = envelope.climb_rate_limits;
                let capability = (if delta < 0. { -max_descent } else { max_climb }) * dt;

                if delta.abs() <= capability {
                    let braking_distance = nav.get_braking_distance(envelope.landing_speed, dt);
                    let braking = foot.xy() - self.lander.ils * braking_distance;
                    if !braking_distance.is_finite() || nav.check_overshot(braking) {
                        return Outcome::Abort(Abort::new("Too fast to slow down for landing."));
                    }

                    self.lander.braking = Some(braking);
                    self.hold_glide_path(ctx, glide);
                    ctx.set_locked(true);
                    ctx.say("Established on the glide path.", Severity::Info);
                    self.phase = Phase::Gliding { slowing: false };
                } else if delta < 0. {
                    return Outcome::Abort(Abort::new("Too fast to descend onto the glide path."));
                }
            }
            Phase::Gliding { slowing } => {
                steer(ctx, &kin, &envelope, HeadingTarget::Absolute(nav.get_course_towards(foot.xy())));

                if !slowing && self.lander.braking.is_some_and(|braking| nav.check_overshot(braking)) {
                    if let Some(mut pilot) = ctx.pilot_mut() {
                        pilot.target.speed = envelope.landing_speed;
                    }
                    self.phase = Phase::Gliding { slowing: true };
                }

                let distance = (foot.xy() - kin.horizontal()).length();
                if distance <= kin.speed * dt || nav.check_overshot(foot.xy()) {
                    return self.touchdown(ctx);
                }

                let glide = math::glide_altitude(distance, ctx.conf.glide_slope, foot.z);
                self.hold_glide_path(ctx, glide);
            }
            Phase::Taxiing { remaining, outcome } => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    runway::release(ctx.world, self.strip, ctx.plane);
                    ctx.terminate(outcome);
                    return Outcome::Terminated;
                }
                self.phase = Phase::Taxiing { remaining, outcome };
            }
        }

        Outcome::Continue
    }

    /// Places the aeroplane on the glide path at `altitude` and holds it there.
    fn hold_glide_path(&self, ctx: &mut Context, altitude: f32) {
        if let Some(mut kin) = ctx.kinematics_mut() {
            kin.position.z = altitude;
            kin.climb_rate = 0.;
        }
        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target.altitude = altitude;
        }
    }

    fn touchdown(&mut self, ctx: &mut Context) -> Outcome {
        if !runway::try_acquire(ctx.world, self.strip, ctx.plane) {
            return Outcome::Abort(Abort::new(format!(
                "Runway {} in use, going around.",
                self.runway
            )));
        }

        let foot = self.lander.foot;
        self.hold_glide_path(ctx, foot.z);
        if let Some(mut pilot) = ctx.pilot_mut() {
            pilot.target.speed = 0.;
        }
        ctx.world.entity_mut(ctx.plane).insert(OnGround);

        let at_destination = ctx
            .aeroplane()
            .is_some_and(|plane| plane.destination == Destination::Airport(self.airport.clone()));
        let outcome = if at_destination {
            aeroplane::Outcome::Landed
        } else {
            aeroplane::Outcome::LandedWrongAirport
        };
        ctx.say(format!("Touchdown runway {} at {}.", self.runway, self.airport), Severity::Info);

        self.phase = Phase::Taxiing { remaining: ctx.conf.taxi_pings, outcome };
        Outcome::Continue
    }

    pub(super) fn release(&self, world: &mut World, plane: Entity) {
        runway::release(world, self.strip, plane);
    }
}
