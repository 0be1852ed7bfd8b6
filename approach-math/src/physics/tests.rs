use crate::{
    Angle, EXPEDITE_BANK_LOAD, NORMAL_BANK_LOAD, centripetal_accel, glide_altitude,
    merge_distance, turn_radius, turn_rate,
};

fn assert_close(actual: f32, expect: f32, tolerance: f32) {
    assert!(
        (actual - expect).abs() <= expect.abs() * tolerance,
        "expected {expect} within {tolerance}, got {actual}"
    );
}

#[test]
fn normal_turn_radius_at_100_mps() {
    assert_close(turn_radius(NORMAL_BANK_LOAD, 100.), 1775., 0.02);
}

#[test]
fn expedite_turn_radius_at_100_mps() {
    assert_close(turn_radius(EXPEDITE_BANK_LOAD, 100.), 1025., 0.02);
}

#[test]
fn turn_rate_consistent_with_radius() {
    let speed = 120.;
    let radius = turn_radius(NORMAL_BANK_LOAD, speed);
    let rate = turn_rate(NORMAL_BANK_LOAD, speed).into_radians_per_sec();
    assert_close(rate * radius, speed, 1e-4);
}

#[test]
fn higher_load_turns_faster() {
    assert!(centripetal_accel(EXPEDITE_BANK_LOAD) > centripetal_accel(NORMAL_BANK_LOAD));
}

#[test]
#[should_panic(expected = "cannot sustain a level turn")]
fn unit_load_cannot_turn() { _ = centripetal_accel(1.); }

#[test]
fn glide_path_altitude() {
    let slope = Angle::from_degrees(3.);
    assert_close(glide_altitude(0., slope, 20.), 20., 1e-6);
    // sin(3 deg) = 0.05234
    assert_close(glide_altitude(10000., slope, 20.), 543.36, 1e-3);
}

#[test]
fn merge_distance_of_right_angle_equals_radius() {
    assert_close(merge_distance(1500., Angle::RIGHT), 1500., 1e-4);
}

#[test]
fn merge_distance_of_small_turn_is_short() {
    assert!(merge_distance(1500., Angle::from_degrees(10.)) < 200.);
}
