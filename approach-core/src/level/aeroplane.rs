//! Aeroplane entities and their lifecycle.
//!
//! An aeroplane entity carries the static [`Aeroplane`] identity and [`Envelope`],
//! the dynamic [`Kinematics`] and [`Fuel`], and a [`Pilot`](super::pilot::Pilot).
//! The entity is removed at the end of the ping in which it was [terminated](Terminate).

use bevy::app::{self, App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::{Message, MessageWriter};
use bevy::ecs::query::{Has, With, Without};
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::{Commands, EntityCommand, Query, Res};
use bevy::ecs::world::EntityWorldMut;
use bevy::log;
use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use math::Heading;

use super::message::{SayMessage, Severity};
use super::pilot::Pilot;
use super::{Conf, SystemSets};

#[cfg(test)]
mod tests;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_message::<SpawnMessage>();
        app.add_message::<TerminateMessage>();
        app.add_systems(app::Update, reconcile_system.in_set(SystemSets::Reconcile));
        app.add_systems(app::Update, despawn_system.in_set(SystemSets::Cleanup));
    }
}

/// Identity of an aeroplane.
#[derive(Component)]
pub struct Aeroplane {
    /// Unique identifier matching `[A-Z]{3}\d{4}`, used to address commands.
    pub icao:        String,
    /// Spoken callsign used in radio messages.
    pub callsign:    String,
    /// Code of the departure airport if the aeroplane starts on the ground.
    pub origin:      Option<String>,
    /// Where the aeroplane wants to go.
    pub destination: Destination,
    /// Whether the aeroplane has been cleared through its exit beacon.
    pub cleared:     bool,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Destination {
    /// Land at the airport with this code.
    Airport(String),
    /// Leave the airspace through the beacon with this name.
    Beacon(String),
}

/// Airframe performance limits.
///
/// Pairs are ordered as `(negative limit, positive limit)`.
#[derive(Debug, Clone, Copy, Component, serde::Serialize, serde::Deserialize)]
pub struct Envelope {
    /// Service ceiling, in metres.
    pub max_altitude:      f32,
    /// Maximum ground speed, in m/s.
    pub max_speed:         f32,
    /// Minimum airborne speed outside takeoff and landing, in m/s.
    pub min_speed:         f32,
    /// Speed at which the aeroplane lifts off and touches down, in m/s.
    pub landing_speed:     f32,
    /// Maximum descent and climb rates, in m/s.
    pub climb_rate_limits: (f32, f32),
    /// Maximum vertical accelerations downwards and upwards, in m/s^2.
    pub climb_rate_accels: (f32, f32),
    /// Maximum deceleration and acceleration along the track, in m/s^2.
    pub ground_accels:     (f32, f32),
    /// Maximum load factor in an emergency turn, in g.
    pub max_g:             f32,
}

/// Dynamic state of an aeroplane.
#[derive(Debug, Clone, Copy, PartialEq, Component)]
pub struct Kinematics {
    /// Position in metres. `x` points east, `y` points north and `z` is the altitude.
    pub position:   Vec3,
    /// Direction of the horizontal velocity.
    pub heading:    Heading,
    /// Magnitude of the horizontal velocity, in m/s.
    pub speed:      f32,
    /// Vertical velocity, in m/s.
    pub climb_rate: f32,
}

impl Kinematics {
    #[must_use]
    pub fn altitude(&self) -> f32 { self.position.z }

    #[must_use]
    pub fn horizontal(&self) -> Vec2 { self.position.xy() }

    /// The 3D velocity vector.
    #[must_use]
    pub fn velocity(&self) -> Vec3 {
        let horizontal =
            math::rotate_around_axis(Vec3::Y * self.speed, Vec3::Z, -self.heading.into_angle());
        horizontal + Vec3::Z * self.climb_rate
    }
}

/// Remaining flight time.
#[derive(Debug, Component)]
pub struct Fuel {
    /// Seconds of flight left.
    pub remaining: f32,
    /// Seconds of flight at spawn.
    pub initial:   f32,
    /// Whether the low fuel warning has been transmitted.
    pub warned:    bool,
}

impl Fuel {
    #[must_use]
    pub fn new(seconds: f32) -> Self { Self { remaining: seconds, initial: seconds, warned: false } }
}

/// Marker for aeroplanes on the ground.
/// Heading and altitude are not integrated and the speed floor is zero.
#[derive(Component)]
pub struct OnGround;

/// Marker for aeroplanes under automatic control that only accept SQUAWK.
#[derive(Component)]
pub struct Locked;

/// Marker for aeroplanes removed from the simulation at the end of this ping.
#[derive(Component)]
pub struct Terminated;

/// How a flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
pub enum Outcome {
    /// Landed at the destination airport.
    Landed,
    /// Landed at an airport other than the destination.
    LandedWrongAirport,
    /// Failed to lift off before the end of the runway.
    Crashed,
    /// Came within collision distance of another aeroplane.
    Collided,
    /// Ran out of fuel while airborne.
    OutOfFuel,
    /// Flew outside the radar range.
    LeftAirspace,
    /// Handed off to the next controller after passing its exit beacon.
    Dismissed,
}

/// Ends the flight of an aeroplane.
///
/// Releases any runway held by its active procedure.
/// Terminating an already terminated aeroplane has no effect.
pub struct Terminate {
    pub outcome: Outcome,
}

impl EntityCommand for Terminate {
    fn apply(self, mut entity: EntityWorldMut) {
        if entity.contains::<Terminated>() {
            return;
        }
        entity.insert(Terminated);

        let entity_id = entity.id();
        let icao = entity.get::<Aeroplane>().map(|plane| plane.icao.clone()).unwrap_or_default();
        let procedure =
            entity.get_mut::<Pilot>().and_then(|mut pilot| pilot.status.procedure.take());

        log::info!("Aeroplane {icao} ({entity_id:?}) terminated: {}", self.outcome);

        entity.world_scope(|world| {
            if let Some(procedure) = procedure {
                procedure.release(world, entity_id);
            }
            world.write_message(TerminateMessage {
                aeroplane: entity_id,
                icao,
                outcome: self.outcome,
            });
        });
    }
}

/// Sent when an aeroplane is terminated.
#[derive(Debug, Clone, Message)]
pub struct TerminateMessage {
    pub aeroplane: Entity,
    pub icao:      String,
    pub outcome:   Outcome,
}

pub struct SpawnCommand {
    pub aeroplane:  Aeroplane,
    pub envelope:   Envelope,
    pub kinematics: Kinematics,
    /// Seconds of flight.
    pub fuel:       f32,
    pub on_ground:  bool,
}

impl EntityCommand for SpawnCommand {
    fn apply(self, mut entity: EntityWorldMut) {
        entity.insert((
            self.aeroplane,
            self.envelope,
            self.kinematics,
            Fuel::new(self.fuel),
            Pilot::new(&self.kinematics),
        ));
        if self.on_ground {
            entity.insert(OnGround);
        }

        let entity_id = entity.id();
        entity.world_scope(|world| world.write_message(SpawnMessage(entity_id)));
    }
}

/// Sent when an aeroplane entity is spawned.
#[derive(Message)]
pub struct SpawnMessage(pub Entity);

fn reconcile_system(
    conf: Res<Conf>,
    mut commands: Commands,
    mut plane_query: Query<
        (Entity, &Aeroplane, &Kinematics, &mut Fuel, Has<OnGround>),
        Without<Terminated>,
    >,
    mut say_writer: MessageWriter<SayMessage>,
) {
    let dt = conf.tick_seconds();

    for (entity, plane, kin, mut fuel, on_ground) in &mut plane_query {
        if on_ground {
            continue;
        }

        fuel.remaining -= dt;
        if fuel.remaining <= 0. {
            commands.entity(entity).queue(Terminate { outcome: Outcome::OutOfFuel });
            continue;
        }

        if !fuel.warned && fuel.remaining < fuel.initial * 0.1 {
            fuel.warned = true;
            say_writer.write(SayMessage {
                callsign: plane.callsign.clone(),
                text:     format!("Low fuel, {:.0} minutes remaining.", fuel.remaining / 60.),
                severity: Severity::Urgent,
            });
        }

        if kin.horizontal().length() > conf.radar_range {
            commands.entity(entity).queue(Terminate { outcome: Outcome::LeftAirspace });
        }
    }
}

fn despawn_system(mut commands: Commands, query: Query<Entity, With<Terminated>>) {
    for entity in query {
        commands.entity(entity).despawn();
    }
}
