//! Typed angular quantities.
//!
//! Headings and turn limits are configured in degrees while trigonometry runs in radians.
//! These newtypes carry radians internally so the conversion happens in one place.

use std::f32::consts::{FRAC_PI_2, PI, TAU};
use std::{fmt, ops};

#[cfg(test)]
mod tests;

/// A relative angle. Internal representation is in radians.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Angle(f32);

impl Angle {
    pub const ZERO: Self = Self(0.);
    pub const RIGHT: Self = Self(FRAC_PI_2);
    pub const STRAIGHT: Self = Self(PI);
    pub const FULL: Self = Self(TAU);

    #[must_use]
    pub const fn from_radians(radians: f32) -> Self { Self(radians) }

    #[must_use]
    pub const fn into_radians(self) -> f32 { self.0 }

    #[must_use]
    pub const fn from_degrees(degrees: f32) -> Self { Self(degrees.to_radians()) }

    #[must_use]
    pub const fn into_degrees(self) -> f32 { self.0.to_degrees() }

    #[must_use]
    pub fn sin(self) -> f32 { self.0.sin() }

    #[must_use]
    pub fn tan(self) -> f32 { self.0.tan() }

    #[must_use]
    pub fn sin_cos(self) -> (f32, f32) { self.0.sin_cos() }

    #[must_use]
    pub fn abs(self) -> Self { Self(self.0.abs()) }
}

impl fmt::Debug for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Angle").field("degrees", &self.into_degrees()).finish()
    }
}

impl ops::Add for Angle {
    type Output = Self;
    fn add(self, other: Self) -> Self { Self(self.0 + other.0) }
}

impl ops::Sub for Angle {
    type Output = Self;
    fn sub(self, other: Self) -> Self { Self(self.0 - other.0) }
}

impl ops::Neg for Angle {
    type Output = Self;
    fn neg(self) -> Self { Self(-self.0) }
}

impl ops::Mul<f32> for Angle {
    type Output = Self;
    fn mul(self, factor: f32) -> Self { Self(self.0 * factor) }
}

impl ops::Div<f32> for Angle {
    type Output = Self;
    fn div(self, divisor: f32) -> Self { Self(self.0 / divisor) }
}

/// Rate of [angle](Angle) change. Always in rad/s.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct AngularSpeed(f32);

impl AngularSpeed {
    #[must_use]
    pub const fn from_radians_per_sec(radians: f32) -> Self { Self(radians) }

    #[must_use]
    pub const fn into_radians_per_sec(self) -> f32 { self.0 }

    #[must_use]
    pub const fn into_degrees_per_sec(self) -> f32 { self.0.to_degrees() }
}

impl fmt::Debug for AngularSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AngularSpeed").field("degrees/s", &self.into_degrees_per_sec()).finish()
    }
}

/// The angle turned through in `seconds`.
impl ops::Mul<f32> for AngularSpeed {
    type Output = Angle;
    fn mul(self, seconds: f32) -> Angle { Angle(self.0 * seconds) }
}
