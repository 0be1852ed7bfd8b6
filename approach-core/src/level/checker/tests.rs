use bevy::ecs::entity::Entity;
use bevy::ecs::world::World;
use math::{Heading, TurnDirection};

use super::{Rejection, Subject, check};
use crate::command::{Command, CommandSet, HeadingArg};
use crate::level::aeroplane::Envelope;
use crate::level::airport::{Airspace, LookupError, RunwayRef};
use crate::level::test_util;

/// Airport `NAD` with runway `09`, optionally held by an aeroplane.
struct FakeAirspace {
    entities: [Entity; 2],
    holder:   Option<Entity>,
}

impl FakeAirspace {
    fn new(world: &mut World, held: bool) -> Self {
        let entities = [world.spawn_empty().id(), world.spawn_empty().id()];
        let holder = held.then(|| world.spawn_empty().id());
        Self { entities, holder }
    }
}

impl Airspace for FakeAirspace {
    fn find_runway(&self, code: &str, designator: &str) -> Result<RunwayRef, LookupError> {
        if code != "NAD" {
            return Err(LookupError::UnknownAirport(code.into()));
        }
        if designator != "09" {
            return Err(LookupError::UnknownRunway { airport: code.into(), runway: designator.into() });
        }
        Ok(RunwayRef {
            runway: self.entities[0],
            strip:  self.entities[1],
            holder: self.holder,
        })
    }
}

fn subject(envelope: &Envelope) -> Subject<'_> {
    Subject {
        envelope,
        origin: None,
        on_ground: false,
        locked: false,
        emergency: false,
        busy: false,
    }
}

fn set(commands: impl IntoIterator<Item = Command>) -> CommandSet { test_util::commands(commands) }

fn heading() -> Command { Command::Heading(HeadingArg::Absolute(Heading::EAST)) }

#[test]
fn idle_airborne_accepts_manoeuvres() {
    let free = FakeAirspace::new(&mut World::new(), false);
    let envelope = test_util::envelope();
    let subject = subject(&envelope);
    assert_eq!(check(&subject, &free, &set([heading(), Command::Altitude(3000.)])), Ok(()));
    assert_eq!(
        check(&subject, &free, &set([Command::Land { airport: "NAD".into(), runway: "09".into() }])),
        Ok(()),
    );
    assert_eq!(check(&subject, &free, &set([Command::Circle(TurnDirection::Clockwise)])), Ok(()));
}

#[test]
fn gates_in_order() {
    let free = FakeAirspace::new(&mut World::new(), false);
    let envelope = test_util::envelope();

    let emergency = Subject { emergency: true, busy: true, ..subject(&envelope) };
    assert_eq!(check(&emergency, &free, &set([heading()])), Err(Rejection::Emergency));
    assert_eq!(check(&emergency, &free, &set([Command::Abort])), Err(Rejection::Emergency));
    assert_eq!(check(&emergency, &free, &set([Command::Squawk])), Ok(()));

    let busy = Subject { busy: true, locked: true, ..subject(&envelope) };
    assert_eq!(check(&busy, &free, &set([heading()])), Err(Rejection::Busy));
    assert_eq!(check(&busy, &free, &set([Command::Abort])), Err(Rejection::Locked));
    assert_eq!(check(&busy, &free, &set([Command::Squawk])), Ok(()));

    let busy = Subject { busy: true, ..subject(&envelope) };
    assert_eq!(check(&busy, &free, &set([Command::Abort])), Ok(()));
}

#[test]
fn ground_and_air_restrictions() {
    let free = FakeAirspace::new(&mut World::new(), false);
    let envelope = test_util::envelope();
    let takeoff = || Command::TakeOff { runway: "09".into() };

    let grounded = Subject { on_ground: true, origin: Some("NAD"), ..subject(&envelope) };
    assert_eq!(check(&grounded, &free, &set([heading()])), Err(Rejection::OnGround));
    assert_eq!(check(&grounded, &free, &set([Command::Squawk])), Ok(()));
    assert_eq!(check(&grounded, &free, &set([takeoff(), Command::Altitude(3000.)])), Ok(()));

    let airborne = Subject { origin: Some("NAD"), ..subject(&envelope) };
    assert_eq!(check(&airborne, &free, &set([takeoff()])), Err(Rejection::Airborne));

    let nowhere = Subject { on_ground: true, ..subject(&envelope) };
    assert_eq!(check(&nowhere, &free, &set([takeoff()])), Err(Rejection::NoOrigin));
}

#[test]
fn envelope_limits() {
    let free = FakeAirspace::new(&mut World::new(), false);
    let envelope = test_util::envelope();
    let subject = subject(&envelope);

    assert_eq!(
        check(&subject, &free, &set([Command::Altitude(12_500.)])),
        Err(Rejection::AboveCeiling { requested: 12_500., ceiling: 12_000. }),
    );
    assert_eq!(check(&subject, &free, &set([Command::Altitude(12_000.)])), Ok(()));

    let rejection = check(&subject, &free, &set([Command::Speed(60.)])).expect_err("too slow");
    assert!(matches!(rejection, Rejection::SpeedOutOfRange { .. }));
    assert_eq!(rejection.to_string(), "Unable, 216 kph is outside our speed range of 288 to 900 kph.");
    assert!(check(&subject, &free, &set([Command::Speed(260.)])).is_err());
    assert_eq!(check(&subject, &free, &set([Command::Speed(80.)])), Ok(()));
}

#[test]
fn runway_lookup() {
    let free = FakeAirspace::new(&mut World::new(), false);
    let envelope = test_util::envelope();
    let subject = subject(&envelope);

    let rejection = check(
        &subject,
        &free,
        &set([Command::Land { airport: "NAD".into(), runway: "27".into() }]),
    )
    .expect_err("unknown runway");
    assert_eq!(rejection.to_string(), "Unable, airport NAD has no runway 27.");

    let rejection =
        check(&subject, &free, &set([Command::Land { airport: "XYZ".into(), runway: "09".into() }]))
            .expect_err("unknown airport");
    assert_eq!(rejection, Rejection::Lookup(LookupError::UnknownAirport("XYZ".into())));

    let held = FakeAirspace::new(&mut World::new(), true);
    let grounded = Subject { on_ground: true, origin: Some("NAD"), ..subject };
    assert_eq!(
        check(&grounded, &held, &set([Command::TakeOff { runway: "09".into() }])),
        Err(Rejection::RunwayInUse("09".into())),
    );
}
