//! Algorithms and constants related to turning and gliding.

use crate::{Angle, AngularSpeed};

#[cfg(test)]
mod tests;

/// Standard gravity at Earth's surface, in m/s^2.
pub const EARTH_SURFACE_GRAVITY: f32 = 9.80665;

/// Load factor of a coordinated turn at 30 degrees of bank.
pub const NORMAL_BANK_LOAD: f32 = 1.1547;

/// Load factor of a coordinated turn at 45 degrees of bank.
pub const EXPEDITE_BANK_LOAD: f32 = 1.4142;

/// Centripetal acceleration available in a level turn pulling `load_factor` g.
///
/// The total load T combines gravity (vertical) and the centripetal component C
/// orthogonally, so `C = sqrt(T^2 - g^2)`.
///
/// # Panics
/// Panics if `load_factor` does not exceed 1,
/// since such a turn cannot hold altitude.
#[must_use]
pub fn centripetal_accel(load_factor: f32) -> f32 {
    assert!(load_factor > 1., "load factor {load_factor} cannot sustain a level turn");
    let total = EARTH_SURFACE_GRAVITY * load_factor;
    (total.powi(2) - EARTH_SURFACE_GRAVITY.powi(2)).sqrt()
}

/// Angular velocity of a level turn.
#[must_use]
pub fn turn_rate(load_factor: f32, speed: f32) -> AngularSpeed {
    AngularSpeed::from_radians_per_sec(centripetal_accel(load_factor) / speed)
}

/// Radius of a level turn, in metres.
#[must_use]
pub fn turn_radius(load_factor: f32, speed: f32) -> f32 {
    speed.powi(2) / centripetal_accel(load_factor)
}

/// Altitude of a glide path at `distance` metres before its foot.
#[must_use]
pub fn glide_altitude(distance: f32, slope: Angle, foot_altitude: f32) -> f32 {
    distance * slope.sin() + foot_altitude
}

/// Distance along the tangent at which a turn of `radius`
/// must begin to merge onto a track `delta` away from the current one.
///
/// This is the cathetus of the right triangle formed by the turn center,
/// the tangent point and the intersection of the two tracks.
#[must_use]
pub fn merge_distance(radius: f32, delta: Angle) -> f32 {
    radius / ((Angle::STRAIGHT - delta) / 2.).tan()
}
