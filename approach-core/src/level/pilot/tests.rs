use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::math::Vec3;
use math::{Heading, TurnDirection};

use super::{Acknowledgement, HeadingTarget, Pilot, TargetConfiguration, issue, manoeuvre};
use crate::command::{Command, CommandSet, HeadingArg, Issued};
use crate::level::aeroplane::Kinematics;
use crate::level::checker::Rejection;
use crate::level::navigator::Haste;
use crate::level::{Conf, test_util};

fn kinematics() -> Kinematics {
    Kinematics {
        position:   Vec3::new(0., 0., 1000.),
        heading:    Heading::NORTH,
        speed:      100.,
        climb_rate: 0.,
    }
}

#[test]
fn converges_and_stays() {
    let conf = Conf::default();
    let envelope = test_util::envelope();
    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    pilot.target.heading = HeadingTarget::Absolute(Heading::EAST);
    pilot.target.altitude = 2000.;
    pilot.target.speed = 150.;

    let mut pings = 0;
    while !pilot.is_reached(&kin) {
        manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
        pings += 1;
        assert!(pings < 200, "target not reached: {kin:?}");
    }

    assert_eq!(kin.heading, Heading::EAST);
    assert_eq!(kin.altitude(), 2000.);
    assert_eq!(kin.speed, 150.);
    assert_eq!(kin.climb_rate, 0.);

    for _ in 0..20 {
        manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
        assert!(pilot.is_reached(&kin), "drifted away from target: {kin:?}");
    }
}

#[test]
fn axes_are_independent() {
    let conf = Conf::default();
    let envelope = test_util::envelope();
    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    pilot.target.altitude = 500.;

    for _ in 0..50 {
        manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
        assert_eq!(kin.heading, Heading::NORTH);
        assert_eq!(kin.speed, 100.);
        assert!(kin.climb_rate >= envelope.climb_rate_limits.0);
    }
    assert_eq!(kin.altitude(), 500.);
}

/// Counts the pings needed to reach the target set by `retarget` at `haste`.
fn pings_to_reach(haste: Haste, retarget: impl FnOnce(&mut TargetConfiguration)) -> usize {
    let conf = Conf::default();
    let envelope = test_util::envelope();
    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    pilot.status.haste = haste;
    retarget(&mut pilot.target);

    let mut pings = 0;
    while !pilot.is_reached(&kin) {
        manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
        pings += 1;
        assert!(pings < 200, "target not reached at {haste:?}: {kin:?}");
    }
    pings
}

#[test]
fn expedite_converges_faster() {
    let speed = |target: &mut TargetConfiguration| target.speed = 150.;
    let (normal, expedite) =
        (pings_to_reach(Haste::Normal, speed), pings_to_reach(Haste::Expedite, speed));
    assert!(expedite * 2 <= normal + 1, "speed: {expedite} expedited vs {normal} normal pings");

    let altitude = |target: &mut TargetConfiguration| target.altitude = 1100.;
    let (normal, expedite) =
        (pings_to_reach(Haste::Normal, altitude), pings_to_reach(Haste::Expedite, altitude));
    assert!(expedite < normal, "altitude: {expedite} expedited vs {normal} normal pings");

    let heading = |target: &mut TargetConfiguration| {
        target.heading = HeadingTarget::Absolute(Heading::EAST);
    };
    let (normal, expedite) =
        (pings_to_reach(Haste::Normal, heading), pings_to_reach(Haste::Expedite, heading));
    assert!(expedite < normal, "heading: {expedite} expedited vs {normal} normal pings");
}

#[test]
fn expedite_flag_speeds_up_issued_commands() {
    let mut app = test_util::app_without_conflicts();
    let plain = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(-20_000., 0., 3000.),
        Heading::NORTH,
        100.,
    );
    let hasty = test_util::spawn_airborne(
        app.world_mut(),
        "DEF5678",
        Vec3::new(20_000., 0., 3000.),
        Heading::NORTH,
        100.,
    );

    let world = app.world_mut();
    assert_eq!(
        issue(world, plain, test_util::commands([Command::Speed(150.)])),
        Ok(Acknowledgement::Executed),
    );
    let mut expedited = Issued::from(Command::Speed(150.));
    expedited.flags.expedite = true;
    assert_eq!(
        issue(world, hasty, CommandSet([expedited].into_iter().collect())),
        Ok(Acknowledgement::Executed),
    );
    assert_eq!(world.get::<Pilot>(plain).expect("spawned").status.haste, Haste::Normal);
    assert_eq!(world.get::<Pilot>(hasty).expect("spawned").status.haste, Haste::Expedite);

    let speed = |app: &App, plane: Entity| app.world().get::<Kinematics>(plane).expect("flying").speed;
    let mut pings = 0;
    while speed(&app, hasty) != 150. {
        test_util::ping(&mut app);
        pings += 1;
        assert!(pings < 50, "expedited aeroplane never reached its speed");
    }
    assert!(speed(&app, plain) < 150., "normal aeroplane arrived as early as the expedited one");
}

#[test]
fn turns_the_short_way_unless_long() {
    let conf = Conf::default();
    let envelope = test_util::envelope();

    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    let nav = super::Navigator::new(&kin, &envelope);
    pilot.set_heading_target(HeadingTarget::Absolute(Heading::WEST), &nav);
    assert_eq!(pilot.status.veer, TurnDirection::CounterClockwise);
    manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
    assert!(kin.heading.degrees() > 300., "{:?}", kin.heading);

    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    pilot.status.long = true;
    let nav = super::Navigator::new(&kin, &envelope);
    pilot.set_heading_target(HeadingTarget::Absolute(Heading::WEST), &nav);
    assert_eq!(pilot.status.veer, TurnDirection::Clockwise);
    manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
    assert!(kin.heading.degrees() > 0. && kin.heading.degrees() < 60., "{:?}", kin.heading);
}

#[test]
fn speed_never_drops_below_minimum() {
    let conf = Conf::default();
    let envelope = test_util::envelope();
    let mut kin = kinematics();
    let mut pilot = Pilot::new(&kin);
    pilot.target.speed = 0.;

    for _ in 0..30 {
        manoeuvre(&mut kin, &mut pilot, &envelope, false, &conf);
        assert!(kin.speed >= envelope.min_speed);
    }
    assert_eq!(kin.speed, envelope.min_speed);
}

#[test]
fn busy_commands_are_queued() {
    let mut app = test_util::app_without_conflicts();
    let plane = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(0., 0., 3000.),
        Heading::NORTH,
        100.,
    );
    let world = app.world_mut();

    assert_eq!(
        issue(world, plane, test_util::commands([Command::Altitude(3500.)])),
        Ok(Acknowledgement::Executed),
    );
    assert_eq!(
        issue(
            world,
            plane,
            test_util::commands([Command::Heading(HeadingArg::Absolute(Heading::EAST))])
        ),
        Ok(Acknowledgement::Queued),
    );
    let says = test_util::drain_says(world);
    assert!(says.iter().any(|say| say.text == "Will comply after current manoeuvre."));

    for _ in 0..60 {
        test_util::ping(&mut app);
    }

    let world = app.world();
    let kin = world.get::<Kinematics>(plane).expect("aeroplane still flying");
    let pilot = world.get::<Pilot>(plane).expect("aeroplane still flying");
    assert!(pilot.queued.is_empty());
    assert_eq!(kin.altitude(), 3500.);
    assert_eq!(kin.heading, Heading::EAST);
}

#[test]
fn rejections_without_queueing() {
    let mut app = test_util::app(Conf { queue_commands: false, ..test_util::conf_without_conflicts() });
    let plane = test_util::spawn_airborne(
        app.world_mut(),
        "ABC1234",
        Vec3::new(0., 0., 3000.),
        Heading::NORTH,
        100.,
    );
    let world = app.world_mut();

    assert_eq!(
        issue(world, plane, test_util::commands([Command::Speed(150.)])),
        Ok(Acknowledgement::Executed),
    );
    assert_eq!(
        issue(world, plane, test_util::commands([Command::Altitude(5000.)])),
        Err(Rejection::Busy),
    );

    assert_eq!(
        issue(world, plane, test_util::commands([Command::Abort])),
        Ok(Acknowledgement::Executed),
    );
    let kin = *world.get::<Kinematics>(plane).expect("spawned");
    let pilot = world.get::<Pilot>(plane).expect("spawned");
    assert!(pilot.is_idle(&kin), "abort holds the current configuration");
}
