use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Messages;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::World;
use bevy::math::Vec3;
use bevy::time::{self, Time};
use math::Heading;

use super::aeroplane::{self, Aeroplane, Destination, Envelope, Kinematics, TerminateMessage};
use super::message::SayMessage;
use super::{Conf, airport, beacon, runway};
use crate::command::{Command, CommandSet, Issued};

/// Creates an app running the simulation plugins with `conf`.
pub fn app(conf: Conf) -> App {
    let mut app = App::new();
    app.init_resource::<Time<time::Virtual>>();
    app.insert_resource(conf);
    app.add_plugins(super::Plug);
    app
}

/// Default configuration with conflict detection effectively disabled.
pub fn conf_without_conflicts() -> Conf {
    Conf {
        conflict_horizontal: 0.,
        conflict_vertical: 0.,
        collision_distance: 0.,
        ..Conf::default()
    }
}

pub fn app_without_conflicts() -> App { app(conf_without_conflicts()) }

/// Advances the simulation by exactly one radar ping.
pub fn ping(app: &mut App) {
    let interval = app.world().resource::<Conf>().ping_interval;
    app.world_mut().resource_mut::<Time<time::Virtual>>().advance_by(interval);
    app.update();
}

pub fn spawn(world: &mut World, command: impl EntityCommand) -> Entity {
    let entity = world.spawn_empty().id();
    command.apply(world.entity_mut(entity));
    entity
}

pub struct Fixture {
    pub airport: Entity,
    /// Strip of runways `09` (landing east from `x = -1000`) and `27`.
    pub strip:   Entity,
}

/// Spawns airport `NAD` at the origin with a 2 km east-west strip,
/// and beacons `DVR` 20 km north and `LAM` 20 km south.
pub fn spawn_airspace(world: &mut World) -> Fixture {
    let airport = spawn(
        world,
        airport::SpawnCommand {
            code:     "NAD".into(),
            name:     "Nadir International".into(),
            position: Vec3::ZERO,
        },
    );
    let strip = spawn(
        world,
        runway::SpawnCommand {
            airport,
            designators: ["09".into(), "27".into()],
            start: Vec3::new(-1000., 0., 0.),
            end: Vec3::new(1000., 0., 0.),
        },
    );
    for (name, y) in [("DVR", 20_000.), ("LAM", -20_000.)] {
        spawn(
            world,
            beacon::SpawnCommand {
                beacon: beacon::Beacon { name: name.into(), position: bevy::math::Vec2::new(0., y) },
            },
        );
    }
    Fixture { airport, strip }
}

pub fn envelope() -> Envelope {
    Envelope {
        max_altitude:      12_000.,
        max_speed:         250.,
        min_speed:         80.,
        landing_speed:     70.,
        climb_rate_limits: (-15., 15.),
        climb_rate_accels: (-3., 3.),
        ground_accels:     (-3., 3.),
        max_g:             2.,
    }
}

pub fn aeroplane(icao: &str, destination: Destination) -> Aeroplane {
    Aeroplane {
        icao: icao.into(),
        callsign: format!("Callsign {icao}"),
        origin: None,
        destination,
        cleared: false,
    }
}

/// Spawns an airborne aeroplane inbound to `NAD`.
pub fn spawn_airborne(
    world: &mut World,
    icao: &str,
    position: Vec3,
    heading: Heading,
    speed: f32,
) -> Entity {
    spawn(
        world,
        aeroplane::SpawnCommand {
            aeroplane:  aeroplane(icao, Destination::Airport("NAD".into())),
            envelope:   envelope(),
            kinematics: Kinematics { position, heading, speed, climb_rate: 0. },
            fuel:       3600.,
            on_ground:  false,
        },
    )
}

/// Spawns an aeroplane parked at `NAD` bound for beacon `DVR`.
pub fn spawn_departure(world: &mut World, icao: &str, envelope: Envelope) -> Entity {
    let mut identity = aeroplane(icao, Destination::Beacon("DVR".into()));
    identity.origin = Some("NAD".into());
    spawn(
        world,
        aeroplane::SpawnCommand {
            aeroplane: identity,
            envelope,
            kinematics: Kinematics {
                position:   Vec3::new(-1200., -200., 0.),
                heading:    Heading::EAST,
                speed:      0.,
                climb_rate: 0.,
            },
            fuel: 3600.,
            on_ground: true,
        },
    )
}

pub fn commands(commands: impl IntoIterator<Item = Command>) -> CommandSet {
    commands.into_iter().map(Issued::from).collect()
}

/// Removes and returns all radio messages sent so far.
pub fn drain_says(world: &mut World) -> Vec<SayMessage> {
    world.resource_mut::<Messages<SayMessage>>().drain().collect()
}

/// Removes and returns all termination messages sent so far.
pub fn drain_terminations(world: &mut World) -> Vec<TerminateMessage> {
    world.resource_mut::<Messages<TerminateMessage>>().drain().collect()
}
