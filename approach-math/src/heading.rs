use std::{fmt, ops};

use bevy_math::Vec2;

use crate::Angle;

#[cfg(test)]
mod tests;

/// An absolute directional bearing, in degrees clockwise from north.
///
/// The internal value is always in the range `0 <= degrees < 360`,
/// so two headings compare equal exactly when they point the same way.
#[derive(Clone, Copy, PartialEq, PartialOrd, Default, serde::Serialize, serde::Deserialize)]
pub struct Heading(f32);

impl Heading {
    /// Heading north.
    pub const NORTH: Self = Self(0.);
    /// Heading east.
    pub const EAST: Self = Self(90.);
    /// Heading south.
    pub const SOUTH: Self = Self(180.);
    /// Heading west.
    pub const WEST: Self = Self(270.);

    /// Creates a heading from an arbitrary bearing in degrees.
    #[must_use]
    pub fn from_degrees(degrees: f32) -> Self {
        let normalized = degrees.rem_euclid(360.);
        // rem_euclid may round up to exactly 360 for tiny negative inputs.
        if normalized >= 360. { Self(0.) } else { Self(normalized) }
    }

    /// Returns the heading in degrees in the range `0..360`.
    #[must_use]
    pub fn degrees(self) -> f32 { self.0 }

    /// Creates a heading from a clockwise angle from north.
    #[must_use]
    pub fn from_angle(angle: Angle) -> Self { Self::from_degrees(angle.into_degrees()) }

    /// Returns the clockwise angle from north in the range `0..FULL`.
    #[must_use]
    pub fn into_angle(self) -> Angle { Angle::from_degrees(self.0) }

    /// Returns the heading of a vector.
    ///
    /// Vectors use the mathematical convention (x east, y north, counterclockwise angles),
    /// so the conversion swaps the axes to obtain a clockwise bearing from north.
    /// A zero vector yields north.
    #[must_use]
    pub fn from_vec2(vec: Vec2) -> Self {
        Self::from_angle(Angle::from_radians(vec.x.atan2(vec.y)))
    }

    /// Converts the heading into a unit direction vector.
    #[must_use]
    pub fn into_vec2(self) -> Vec2 {
        let (sin, cos) = self.into_angle().sin_cos();
        Vec2::new(sin, cos)
    }

    /// Signed degrees to turn from `self` to `other` along the shorter arc.
    ///
    /// Positive values are clockwise. The output is in the range `(-180, 180]`.
    #[must_use]
    pub fn closest_distance(self, other: Heading) -> f32 {
        let delta = (other.0 - self.0).rem_euclid(360.);
        if delta > 180. { delta - 360. } else { delta }
    }

    /// Unsigned angle between two headings, in the range `0..=180`.
    #[must_use]
    pub fn angle_to(self, other: Heading) -> f32 { self.closest_distance(other).abs() }

    /// Returns the direction to turn from `self` to reach `target` the short way.
    ///
    /// Compares `(self - target) mod 360` against 180 degrees.
    /// Exactly opposite headings turn clockwise.
    #[must_use]
    pub fn shortest_turn_to(self, target: Heading) -> TurnDirection {
        if (self.0 - target.0).rem_euclid(360.) >= 180. {
            TurnDirection::Clockwise
        } else {
            TurnDirection::CounterClockwise
        }
    }

    /// Rotate by `degrees` in the direction of `dir`.
    #[must_use]
    pub fn add_direction(self, dir: TurnDirection, degrees: f32) -> Self {
        self + degrees * dir.signum()
    }

    /// Checks whether `self` is on the shorter arc between `bounds.0` and `bounds.1`.
    ///
    /// Equality with either bound always passes.
    /// Bounds exactly 180 degrees apart have no shorter arc, so every heading passes.
    #[must_use]
    pub fn is_between(self, bounds: (Heading, Heading)) -> bool {
        let (a, b) = bounds;
        if self == a || self == b {
            return true;
        }

        let span = a.closest_distance(b);
        if span.abs() == 180. {
            return true;
        }

        let offset = a.closest_distance(self);
        if span >= 0. { offset >= 0. && offset <= span } else { offset <= 0. && offset >= span }
    }

    /// Returns the opposite direction of this heading.
    #[must_use]
    pub fn opposite(self) -> Self { self + 180. }
}

impl fmt::Debug for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Heading").field(&self.0).finish()
    }
}

/// Whole degrees, zero-padded. Bearings that round up to 360 print as `000`.
impl fmt::Display for Heading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03.0}", Self::from_degrees(self.0.round()).0)
    }
}

impl ops::Add<f32> for Heading {
    type Output = Self;
    /// Offsets `self` by `degrees` clockwise.
    fn add(self, degrees: f32) -> Self { Self::from_degrees(self.0 + degrees) }
}

impl ops::AddAssign<f32> for Heading {
    fn add_assign(&mut self, degrees: f32) { *self = *self + degrees; }
}

impl ops::Sub<f32> for Heading {
    type Output = Self;
    /// Offsets `self` by `degrees` counterclockwise.
    fn sub(self, degrees: f32) -> Self { self + (-degrees) }
}

/// The direction for yaw change.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize, strum::Display,
)]
pub enum TurnDirection {
    /// A left, counterclockwise turn.
    #[strum(to_string = "left")]
    CounterClockwise,
    /// A right, clockwise turn.
    #[strum(to_string = "right")]
    Clockwise,
}

impl TurnDirection {
    /// `1.0` for clockwise, `-1.0` for counterclockwise.
    #[must_use]
    pub fn signum(self) -> f32 {
        match self {
            Self::CounterClockwise => -1.,
            Self::Clockwise => 1.,
        }
    }
}

impl ops::Neg for TurnDirection {
    type Output = Self;

    fn neg(self) -> Self {
        match self {
            TurnDirection::CounterClockwise => TurnDirection::Clockwise,
            TurnDirection::Clockwise => TurnDirection::CounterClockwise,
        }
    }
}
