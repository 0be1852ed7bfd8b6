//! JSON scenario files describing the initial airspace.

use std::fs;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result, ensure};
use approach::level::aeroplane::{self, Aeroplane, Destination, Envelope, Kinematics};
use approach::level::{airport, beacon, runway};
use bevy::ecs::entity::Entity;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::World;
use bevy::math::{Vec2, Vec3};
use math::Heading;


#[derive(Debug, serde::Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub airports:   Vec<AirportDef>,
    #[serde(default)]
    pub beacons:    Vec<BeaconDef>,
    #[serde(default)]
    pub aeroplanes: Vec<AeroplaneDef>,
}

#[derive(Debug, serde::Deserialize)]
pub struct AirportDef {
    pub code:     String,
    pub name:     String,
    pub position: [f32; 3],
    #[serde(default)]
    pub runways:  Vec<RunwayDef>,
}

/// A physical strip landable from both ends.
#[derive(Debug, serde::Deserialize)]
pub struct RunwayDef {
    /// Designators for landing from `start` towards `end` and the reverse.
    pub designators: [String; 2],
    pub start:       [f32; 3],
    pub end:         [f32; 3],
}

#[derive(Debug, serde::Deserialize)]
pub struct BeaconDef {
    pub name:     String,
    pub position: [f32; 2],
}

#[derive(Debug, serde::Deserialize)]
pub struct AeroplaneDef {
    pub icao:        String,
    pub callsign:    String,
    #[serde(default)]
    pub origin:      Option<String>,
    pub destination: Destination,
    pub envelope:    Envelope,
    pub position:    [f32; 3],
    /// Degrees clockwise from north.
    pub heading:     f32,
    /// Ground speed in m/s.
    pub speed:       f32,
    /// Seconds of flight.
    pub fuel:        f32,
    #[serde(default)]
    pub on_ground:   bool,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let file = fs::File::open(path)
            .with_context(|| format!("open scenario {}", path.display()))?;
        let scenario: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("parse scenario {}", path.display()))?;
        scenario.validate().with_context(|| format!("validate scenario {}", path.display()))?;
        Ok(scenario)
    }

    /// Rejects aeroplanes that could not be flown with their envelope and fuel.
    pub fn validate(&self) -> Result<()> {
        for def in &self.aeroplanes {
            validate_envelope(&def.envelope)
                .with_context(|| format!("envelope of aeroplane {}", def.icao))?;
            ensure!(def.fuel > 0., "aeroplane {} has no fuel", def.icao);
        }
        Ok(())
    }

    /// Spawns every object of the scenario into `world`.
    ///
    /// Airports are spawned before their runways and aeroplanes last,
    /// so that lookups by code and name resolve during the first ping.
    /// Codes, designators and beacon names are upper-cased like controller input.
    pub fn spawn(self, world: &mut World) {
        for def in self.airports {
            let airport = spawn(
                world,
                airport::SpawnCommand {
                    code:     def.code.to_uppercase(),
                    name:     def.name,
                    position: Vec3::from_array(def.position),
                },
            );
            for strip in def.runways {
                spawn(
                    world,
                    runway::SpawnCommand {
                        airport,
                        designators: strip.designators.map(|designator| designator.to_uppercase()),
                        start: Vec3::from_array(strip.start),
                        end: Vec3::from_array(strip.end),
                    },
                );
            }
        }

        for def in self.beacons {
            spawn(
                world,
                beacon::SpawnCommand {
                    beacon: beacon::Beacon { name: def.name, position: Vec2::from_array(def.position) },
                },
            );
        }

        for def in self.aeroplanes {
            spawn(
                world,
                aeroplane::SpawnCommand {
                    aeroplane:  Aeroplane {
                        icao:        def.icao,
                        callsign:    def.callsign,
                        origin:      def.origin,
                        destination: match def.destination {
                            Destination::Airport(code) => Destination::Airport(code.to_uppercase()),
                            Destination::Beacon(name) => Destination::Beacon(name.to_uppercase()),
                        },
                        cleared:     false,
                    },
                    envelope:   def.envelope,
                    kinematics: Kinematics {
                        position:   Vec3::from_array(def.position),
                        heading:    Heading::from_degrees(def.heading),
                        speed:      def.speed,
                        climb_rate: 0.,
                    },
                    fuel:       def.fuel,
                    on_ground:  def.on_ground,
                },
            );
        }
    }
}

fn validate_envelope(envelope: &Envelope) -> Result<()> {
    ensure!(envelope.max_g > 1., "max_g {} cannot sustain a level turn", envelope.max_g);
    ensure!(envelope.max_altitude > 0., "max_altitude {} is not positive", envelope.max_altitude);
    ensure!(
        envelope.landing_speed > 0. && envelope.landing_speed <= envelope.min_speed,
        "landing_speed {} must be positive and at most min_speed {}",
        envelope.landing_speed,
        envelope.min_speed,
    );
    ensure!(
        envelope.min_speed <= envelope.max_speed,
        "min_speed {} exceeds max_speed {}",
        envelope.min_speed,
        envelope.max_speed,
    );

    for (name, (down, up)) in [
        ("climb_rate_limits", envelope.climb_rate_limits),
        ("climb_rate_accels", envelope.climb_rate_accels),
        ("ground_accels", envelope.ground_accels),
    ] {
        ensure!(down < 0. && up > 0., "{name} ({down}, {up}) must be negative then positive");
    }

    Ok(())
}

fn spawn(world: &mut World, command: impl EntityCommand) -> Entity {
    let entity = world.spawn_empty().id();
    command.apply(world.entity_mut(entity));
    entity
}
