use bevy::ecs::world::World;
use bevy::math::Vec3;
use math::Heading;

use super::{Reservation, Runway};
use crate::level::airport::{Airport, Airspace, LookupError};
use crate::level::test_util;

#[test]
fn reservation_is_exclusive() {
    let mut world = World::new();
    let (a, b) = (world.spawn_empty().id(), world.spawn_empty().id());
    let mut reservation = Reservation::default();

    assert!(reservation.try_acquire(a));
    assert!(!reservation.try_acquire(b));
    assert!(reservation.try_acquire(a), "holder may reacquire");
    assert_eq!(reservation.holder(), Some(a));

    assert!(!reservation.release(b));
    assert_eq!(reservation.holder(), Some(a));
    assert!(reservation.release(a));
    assert!(reservation.try_acquire(b));
}

#[test]
fn spawn_creates_opposite_pair() {
    let mut app = test_util::app(Default::default());
    let world = app.world_mut();
    let fixture = test_util::spawn_airspace(world);

    let runways = world.get::<Airport>(fixture.airport).expect("airport spawned").runways.clone();
    assert_eq!(runways.len(), 2);

    let forward = world.get::<Runway>(runways[0]).expect("runway spawned");
    assert_eq!(forward.designator, "09");
    assert!(forward.heading().angle_to(Heading::EAST) < 1e-3);
    assert_eq!(forward.foot, Vec3::new(-1000., 0., 0.));
    assert_eq!(forward.end(), Vec3::new(1000., 0., 0.));
    assert_eq!(forward.strip, fixture.strip);

    let backward = world.get::<Runway>(runways[1]).expect("runway spawned");
    assert_eq!(backward.designator, "27");
    assert!(backward.heading().angle_to(Heading::WEST) < 1e-3);
    assert_eq!(backward.foot, Vec3::new(1000., 0., 0.));
    assert_eq!(backward.strip, fixture.strip);
}

#[test]
fn pair_shares_reservation() {
    let mut app = test_util::app(Default::default());
    let world = app.world_mut();
    let fixture = test_util::spawn_airspace(world);
    let plane = world.spawn_empty().id();

    assert!(super::try_acquire(world, fixture.strip, plane));
    assert_eq!(world.find_runway("NAD", "09").map(|found| found.holder), Ok(Some(plane)));
    assert_eq!(world.find_runway("NAD", "27").map(|found| found.holder), Ok(Some(plane)));

    super::release(world, fixture.strip, plane);
    assert_eq!(world.find_runway("NAD", "27").map(|found| found.holder), Ok(None));
}

#[test]
fn lookup_errors() {
    let mut app = test_util::app(Default::default());
    let world = app.world_mut();
    test_util::spawn_airspace(world);

    assert_eq!(
        world.find_runway("XYZ", "09"),
        Err(LookupError::UnknownAirport("XYZ".into())),
    );
    assert_eq!(
        world.find_runway("NAD", "18"),
        Err(LookupError::UnknownRunway { airport: "NAD".into(), runway: "18".into() }),
    );
}
