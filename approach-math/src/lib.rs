use bevy_math::{Quat, Vec3};

mod heading;
pub use heading::{Heading, TurnDirection};

mod alg2d;
pub use alg2d::*;

mod physics;
pub use physics::*;

mod units;
pub use units::{Angle, AngularSpeed};

#[cfg(test)]
mod tests;

/// Converts kilometres per hour to metres per second.
pub const KPH_PER_MPS: f32 = 3.6;

/// Checks whether `value` lies between the two bounds inclusively.
///
/// The bounds may be given in either order.
#[must_use]
pub fn in_between(bounds: (f32, f32), value: f32) -> bool {
    let (low, high) = if bounds.0 <= bounds.1 { bounds } else { (bounds.1, bounds.0) };
    value >= low && value <= high
}

/// Rotates `vector` by `angle` around `axis` following the right-hand rule.
///
/// `axis` does not need to be normalized, but must be nonzero.
#[must_use]
pub fn rotate_around_axis(vector: Vec3, axis: Vec3, angle: Angle) -> Vec3 {
    Quat::from_axis_angle(axis.normalize(), angle.into_radians()) * vector
}

/// Rounds `value` to the closest multiple of `step` within `min..=max`.
#[must_use]
pub fn snap_to_step(value: f32, step: f32, min: f32, max: f32) -> f32 {
    ((value / step).round() * step).clamp(min, max)
}
