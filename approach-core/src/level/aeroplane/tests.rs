use bevy::ecs::system::EntityCommand;
use bevy::math::Vec3;
use math::Heading;

use super::{Fuel, Kinematics, Outcome, Terminate, Terminated};
use crate::level::message::Severity;
use crate::level::score::Scores;
use crate::level::{Conf, test_util};

#[test]
fn velocity_follows_heading() {
    let kin = Kinematics {
        position:   Vec3::ZERO,
        heading:    Heading::EAST,
        speed:      100.,
        climb_rate: -5.,
    };
    let velocity = kin.velocity();
    assert!((velocity.x - 100.).abs() < 1e-3, "{velocity:?}");
    assert!(velocity.y.abs() < 1e-3, "{velocity:?}");
    assert!((velocity.z + 5.).abs() < 1e-6, "{velocity:?}");
}

#[test]
fn out_of_fuel() {
    let mut app = test_util::app_without_conflicts();
    let plane = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(0., 0., 3000.),
        Heading::NORTH,
        100.,
    );
    app.world_mut().entity_mut(plane).insert(Fuel::new(28.5));

    let mut warned = false;
    for _ in 0..9 {
        test_util::ping(&mut app);
        warned |= test_util::drain_says(app.world_mut())
            .iter()
            .any(|say| say.severity == Severity::Urgent && say.text.starts_with("Low fuel"));
    }
    assert!(warned, "low fuel warning expected below 10% of fuel");
    assert!(app.world().get_entity(plane).is_ok(), "1.5 seconds of fuel remain");

    test_util::ping(&mut app);
    let terminations = test_util::drain_terminations(app.world_mut());
    assert_eq!(terminations.len(), 1);
    assert_eq!(terminations[0].outcome, Outcome::OutOfFuel);
    assert!(app.world().get_entity(plane).is_err(), "terminated aeroplanes are despawned");
    assert_eq!(app.world().resource::<Scores>().count(Outcome::OutOfFuel), 1);
}

#[test]
fn leaving_airspace() {
    let mut app = test_util::app(Conf { radar_range: 1000., ..Conf::default() });
    let plane = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(0., 900., 3000.),
        Heading::NORTH,
        100.,
    );

    test_util::ping(&mut app);
    let terminations = test_util::drain_terminations(app.world_mut());
    assert_eq!(terminations.len(), 1);
    assert_eq!(terminations[0].outcome, Outcome::LeftAirspace);
    assert_eq!(terminations[0].icao, "ABC1234");
    assert!(app.world().get_entity(plane).is_err());
}

#[test]
fn terminate_is_idempotent() {
    let mut app = test_util::app_without_conflicts();
    let plane = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(0., 0., 3000.),
        Heading::NORTH,
        100.,
    );

    let world = app.world_mut();
    Terminate { outcome: Outcome::Crashed }.apply(world.entity_mut(plane));
    Terminate { outcome: Outcome::Collided }.apply(world.entity_mut(plane));
    assert!(world.get::<Terminated>(plane).is_some());

    let terminations = test_util::drain_terminations(world);
    assert_eq!(terminations.len(), 1);
    assert_eq!(terminations[0].outcome, Outcome::Crashed);
}
