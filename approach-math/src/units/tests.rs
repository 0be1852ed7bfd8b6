use std::f32::consts::FRAC_PI_2;

use super::{Angle, AngularSpeed};

#[test]
fn degrees_and_radians_agree() {
    assert!((Angle::from_degrees(90.).into_radians() - FRAC_PI_2).abs() < 1e-6);
    assert!((Angle::STRAIGHT.into_degrees() - 180.).abs() < 1e-4);
    assert!((Angle::from_degrees(30.).sin() - 0.5).abs() < 1e-6);
}

#[test]
fn arithmetic_stays_in_radians() {
    let half = (Angle::STRAIGHT - Angle::RIGHT) / 2.;
    assert!((half.into_degrees() - 45.).abs() < 1e-4, "{half:?}");
    assert!((half.tan() - 1.).abs() < 1e-6);
    assert_eq!(-Angle::RIGHT * 2., -Angle::STRAIGHT);
    assert!(Angle::from_degrees(-10.).abs() > Angle::from_degrees(5.));
}

#[test]
fn angular_speed_integrates_to_angle() {
    let omega = AngularSpeed::from_radians_per_sec(0.1);
    let turned = omega * 3.;
    assert!((turned.into_radians() - 0.3).abs() < 1e-6, "{turned:?}");
    assert!((omega.into_degrees_per_sec() - 5.7296).abs() < 1e-3);
}
