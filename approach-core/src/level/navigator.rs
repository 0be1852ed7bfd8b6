//! Geometric queries about one aeroplane.
//!
//! The navigator never mutates anything;
//! procedures and the pilot use its answers to decide their next target.

use bevy::math::{Vec2, Vec3};
use math::{
    Angle, AngularSpeed, EXPEDITE_BANK_LOAD, Heading, NORMAL_BANK_LOAD, TurnDirection,
};

use super::aeroplane::{Envelope, Kinematics};
use super::airport::{Airspace, LookupError, RunwayRef};
use super::pilot::HeadingTarget;


/// Points closer than this horizontal distance are considered to coincide with the aeroplane.
const COINCIDENT_DISTANCE: f32 = 0.01;

/// How aggressively the aeroplane manoeuvres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum::Display)]
pub enum Haste {
    /// 30 degrees of bank and throttled accelerations.
    #[default]
    Normal,
    /// 45 degrees of bank and full accelerations.
    Expedite,
    /// The airframe's maximum load factor and full accelerations.
    Emergency,
}

impl Haste {
    /// Load factor of a level turn at this haste.
    #[must_use]
    pub fn load_factor(self, envelope: &Envelope) -> f32 {
        match self {
            Self::Normal => NORMAL_BANK_LOAD,
            Self::Expedite => EXPEDITE_BANK_LOAD,
            Self::Emergency => envelope.max_g,
        }
    }
}

#[derive(Clone, Copy)]
pub struct Navigator<'a> {
    pub kinematics: &'a Kinematics,
    pub envelope:   &'a Envelope,
}

impl<'a> Navigator<'a> {
    #[must_use]
    pub fn new(kinematics: &'a Kinematics, envelope: &'a Envelope) -> Self {
        Self { kinematics, envelope }
    }

    /// Resolves a runway designator, describing which part is unknown on failure.
    pub fn check_existing_runway(
        airspace: &impl Airspace,
        airport: &str,
        designator: &str,
    ) -> Result<RunwayRef, LookupError> {
        airspace.find_runway(airport, designator)
    }

    /// Whether the aeroplane has flown past `point`,
    /// i.e. the point is more than 90 degrees away from the current track.
    ///
    /// A point at the current position is never overshot.
    #[must_use]
    pub fn check_overshot(&self, point: Vec2) -> bool {
        let offset = point - self.kinematics.horizontal();
        if offset.length_squared() <= COINCIDENT_DISTANCE.powi(2) {
            return false;
        }
        self.kinematics.heading.into_vec2().dot(offset) < 0.
    }

    /// Whether a turn at `haste` starting now can pass through `point`.
    ///
    /// The circle tangent to the current track through `point` has radius
    /// `distance / (2 sin a)` where `a` is the angle between the track and the point.
    /// The point is reachable if the aeroplane can turn tighter than that.
    #[must_use]
    pub fn check_reachable(&self, point: Vec2, haste: Haste) -> bool {
        let offset = point - self.kinematics.horizontal();
        let angle = self.kinematics.heading.angle_to(Heading::from_vec2(offset));
        if angle == 0. {
            return true;
        }

        let required = offset.length() / (2. * Angle::from_degrees(angle).sin());
        self.get_veering_radius(haste, self.kinematics.speed) < required
    }

    /// The position `distance` metres ahead along the current velocity.
    #[must_use]
    pub fn get_point_ahead(&self, distance: f32) -> Vec3 {
        self.kinematics.position + self.kinematics.velocity().normalize_or_zero() * distance
    }

    /// The heading that points directly at `point`.
    #[must_use]
    pub fn get_course_towards(&self, point: Vec2) -> Heading {
        Heading::from_vec2(point - self.kinematics.horizontal())
    }

    /// The direction of the shorter turn to `target`.
    /// Exactly opposite targets turn right.
    #[must_use]
    pub fn get_shortest_veering_direction(&self, target: Heading) -> TurnDirection {
        self.kinematics.heading.shortest_turn_to(target)
    }

    /// Radius of a level turn at `haste` and `speed`, in metres.
    #[must_use]
    pub fn get_veering_radius(&self, haste: Haste, speed: f32) -> f32 {
        math::turn_radius(haste.load_factor(self.envelope), speed)
    }

    /// Turn rate at `haste` and `speed`.
    #[must_use]
    pub fn get_veering_angular_velocity(&self, haste: Haste, speed: f32) -> AngularSpeed {
        math::turn_rate(haste.load_factor(self.envelope), speed)
    }

    /// The concrete heading to steer towards for this tick.
    #[must_use]
    pub fn resolve_heading(&self, target: &HeadingTarget) -> Heading {
        match *target {
            HeadingTarget::Absolute(heading) => heading,
            HeadingTarget::TowardPoint(point) => {
                if (point - self.kinematics.horizontal()).length_squared()
                    <= COINCIDENT_DISTANCE.powi(2)
                {
                    self.kinematics.heading
                } else {
                    self.get_course_towards(point)
                }
            }
        }
    }

    /// Distance flown while decelerating at full braking to `target_speed`,
    /// integrated with the same fixed step as the pilot.
    #[must_use]
    pub fn get_braking_distance(&self, target_speed: f32, tick_seconds: f32) -> f32 {
        let decel = self.envelope.ground_accels.0;
        let mut speed = self.kinematics.speed;
        if speed <= target_speed {
            return 0.;
        }
        if decel >= 0. {
            return f32::INFINITY;
        }

        let mut distance = 0.;
        while speed > target_speed {
            speed = (speed + decel * tick_seconds).max(target_speed);
            distance += speed * tick_seconds;
        }
        distance
    }
}
