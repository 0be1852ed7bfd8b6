use std::collections::HashMap;

use bevy::app::{App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Message;
use bevy::ecs::resource::Resource;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::{EntityWorldMut, World};
use bevy::math::Vec3;
use smallvec::SmallVec;

use super::runway::{Reservation, Runway};

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Index>();
        app.add_message::<SpawnMessage>();
    }
}

#[derive(Component)]
pub struct Airport {
    /// Three-letter code used in LAND commands.
    pub code:     String,
    /// Display name.
    pub name:     String,
    /// Reference point of the airport.
    pub position: Vec3,
    /// Runway entities belonging to this airport, one per designator.
    pub runways:  SmallVec<[Entity; 4]>,
}

/// Looks up airport entities by code.
#[derive(Default, Resource)]
pub struct Index {
    airports: HashMap<String, Entity>,
}

impl Index {
    #[must_use]
    pub fn get(&self, code: &str) -> Option<Entity> { self.airports.get(code).copied() }
}

pub struct SpawnCommand {
    pub code:     String,
    pub name:     String,
    pub position: Vec3,
}

impl EntityCommand for SpawnCommand {
    fn apply(self, mut entity: EntityWorldMut) {
        let entity_id = entity.id();
        let code = self.code.clone();
        entity.insert(Airport {
            code:     self.code,
            name:     self.name,
            position: self.position,
            runways:  SmallVec::new(),
        });
        entity.world_scope(|world| {
            world.resource_mut::<Index>().airports.insert(code, entity_id);
            world.write_message(SpawnMessage(entity_id));
        });
    }
}

#[derive(Message)]
pub struct SpawnMessage(pub Entity);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("unknown airport {0}")]
    UnknownAirport(String),
    #[error("airport {airport} has no runway {runway}")]
    UnknownRunway { airport: String, runway: String },
}

/// A runway designator resolved against the airspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunwayRef {
    /// The runway entity of the requested designator.
    pub runway: Entity,
    /// The strip entity holding the reservation of the runway pair.
    pub strip:  Entity,
    /// The aeroplane currently holding the runway pair, if any.
    pub holder: Option<Entity>,
}

/// Read-only access to airport reference data.
pub trait Airspace {
    /// Resolves the runway `designator` at airport `code`.
    fn find_runway(&self, code: &str, designator: &str) -> Result<RunwayRef, LookupError>;
}

impl Airspace for World {
    fn find_runway(&self, code: &str, designator: &str) -> Result<RunwayRef, LookupError> {
        let unknown_airport = || LookupError::UnknownAirport(code.to_owned());

        let airport_id = self.resource::<Index>().get(code).ok_or_else(unknown_airport)?;
        let airport = self.get::<Airport>(airport_id).ok_or_else(unknown_airport)?;

        airport
            .runways
            .iter()
            .find_map(|&runway_id| {
                let runway = self.get::<Runway>(runway_id)?;
                (runway.designator == designator).then(|| RunwayRef {
                    runway: runway_id,
                    strip:  runway.strip,
                    holder: self.get::<Reservation>(runway.strip).and_then(|r| r.holder()),
                })
            })
            .ok_or_else(|| LookupError::UnknownRunway {
                airport: code.to_owned(),
                runway:  designator.to_owned(),
            })
    }
}
