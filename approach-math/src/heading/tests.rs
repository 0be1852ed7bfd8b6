use bevy_math::Vec2;

use super::{Heading, TurnDirection};
use crate::Angle;

fn assert_heading(actual: Heading, expect: f32) {
    assert!(
        (actual.degrees() - expect).abs() < 1e-3,
        "expected heading {expect}, got {actual:?}"
    );
}

#[test]
fn from_degrees_normalizes() {
    assert_heading(Heading::from_degrees(360.), 0.);
    assert_heading(Heading::from_degrees(-90.), 270.);
    assert_heading(Heading::from_degrees(725.), 5.);
    assert_heading(Heading::from_degrees(-1e-9), 0.);
}

#[test]
fn vector_conversion_uses_compass_convention() {
    assert_heading(Heading::from_vec2(Vec2::new(0., 1.)), 0.);
    assert_heading(Heading::from_vec2(Vec2::new(1., 0.)), 90.);
    assert_heading(Heading::from_vec2(Vec2::new(0., -1.)), 180.);
    assert_heading(Heading::from_vec2(Vec2::new(-1., 0.)), 270.);

    let east = Heading::EAST.into_vec2();
    assert!((east - Vec2::new(1., 0.)).length() < 1e-6, "got {east:?}");

    let converted = Heading::from_vec2(Heading::from_degrees(123.).into_vec2());
    assert_heading(converted, 123.);
}

#[test]
fn angle_conversion() {
    assert_heading(Heading::from_angle(Angle::RIGHT), 90.);
    assert_heading(Heading::from_angle(-Angle::RIGHT), 270.);
    let south = Heading::SOUTH.into_angle();
    assert!((south - Angle::STRAIGHT).abs() < Angle::from_radians(1e-6), "{south:?}");
}

#[test]
fn display_rounds_to_whole_degrees() {
    assert_eq!(Heading::NORTH.to_string(), "000");
    assert_eq!(Heading::from_degrees(5.4).to_string(), "005");
    assert_eq!(Heading::from_degrees(269.5).to_string(), "270");
    assert_eq!(Heading::from_degrees(359.4).to_string(), "359");
    assert_eq!(Heading::from_degrees(359.6).to_string(), "000");
}

#[test]
fn closest_distance_wraps() {
    assert_eq!(Heading::from_degrees(350.).closest_distance(Heading::from_degrees(10.)), 20.);
    assert_eq!(Heading::from_degrees(10.).closest_distance(Heading::from_degrees(350.)), -20.);
    assert_eq!(Heading::NORTH.closest_distance(Heading::SOUTH), 180.);
}

#[test]
fn shortest_turn() {
    assert_eq!(Heading::NORTH.shortest_turn_to(Heading::EAST), TurnDirection::Clockwise);
    assert_eq!(Heading::EAST.shortest_turn_to(Heading::NORTH), TurnDirection::CounterClockwise);
    assert_eq!(
        Heading::from_degrees(10.).shortest_turn_to(Heading::from_degrees(350.)),
        TurnDirection::CounterClockwise
    );
}

#[test]
fn shortest_turn_tie_is_clockwise() {
    assert_eq!(Heading::NORTH.shortest_turn_to(Heading::SOUTH), TurnDirection::Clockwise);
    assert_eq!(Heading::WEST.shortest_turn_to(Heading::EAST), TurnDirection::Clockwise);
}

#[test]
fn is_between_shorter_arc() {
    let bounds = (Heading::from_degrees(350.), Heading::from_degrees(10.));
    assert!(Heading::NORTH.is_between(bounds));
    assert!(Heading::from_degrees(355.).is_between(bounds));
    assert!(!Heading::SOUTH.is_between(bounds));
    assert!(!Heading::from_degrees(11.).is_between(bounds));

    let reversed = (bounds.1, bounds.0);
    assert!(Heading::NORTH.is_between(reversed));
    assert!(!Heading::SOUTH.is_between(reversed));
}

#[test]
fn is_between_boundary_equality() {
    let bounds = (Heading::from_degrees(30.), Heading::from_degrees(60.));
    assert!(Heading::from_degrees(30.).is_between(bounds));
    assert!(Heading::from_degrees(60.).is_between(bounds));

    let degenerate = (Heading::EAST, Heading::EAST);
    assert!(Heading::EAST.is_between(degenerate));
    assert!(!Heading::WEST.is_between(degenerate));
}

#[test]
fn is_between_opposite_bounds_always_true() {
    for start in [0., 45., 90., 200., 315.] {
        let a = Heading::from_degrees(start);
        let b = a.opposite();
        for probe in [0., 17., 90., 181., 270., 359.] {
            assert!(Heading::from_degrees(probe).is_between((a, b)), "{probe} in ({a:?}, {b:?})");
        }
    }
}

#[test]
fn add_direction() {
    assert_heading(Heading::from_degrees(10.).add_direction(TurnDirection::CounterClockwise, 20.), 350.);
    assert_heading(Heading::from_degrees(350.).add_direction(TurnDirection::Clockwise, 20.), 10.);
}
