use bevy_math::Vec3;

use crate::{Angle, in_between, rotate_around_axis, snap_to_step};

#[test]
fn in_between_either_order() {
    assert!(in_between((1., 3.), 2.));
    assert!(in_between((3., 1.), 2.));
    assert!(in_between((3., 1.), 3.));
    assert!(!in_between((3., 1.), 0.5));
}

#[test]
fn rotate_pitch_up() {
    // rotating a northward vector around the east axis pitches it upward.
    let rotated = rotate_around_axis(Vec3::Y, Vec3::X, Angle::RIGHT);
    assert!((rotated - Vec3::Z).length() < 1e-5, "got {rotated:?}");
}

#[test]
fn rotate_unnormalized_axis() {
    let rotated = rotate_around_axis(Vec3::new(2., 0., 0.), Vec3::new(0., 0., 5.), Angle::RIGHT);
    assert!((rotated - Vec3::new(0., 2., 0.)).length() < 1e-5, "got {rotated:?}");
}

#[test]
fn snap_rounds_and_clamps() {
    assert_eq!(snap_to_step(1240., 500., 500., 9500.), 1000.);
    assert_eq!(snap_to_step(1260., 500., 500., 9500.), 1500.);
    assert_eq!(snap_to_step(100., 500., 500., 9500.), 500.);
    assert_eq!(snap_to_step(12000., 500., 500., 9500.), 9500.);
}
