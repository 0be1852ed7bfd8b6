use std::collections::HashMap;

use bevy::app::{App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Message;
use bevy::ecs::resource::Resource;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::EntityWorldMut;
use bevy::math::Vec2;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Index>();
        app.add_message::<SpawnMessage>();
    }
}

/// A named navigation point that aeroplanes can be directed to.
#[derive(Component)]
pub struct Beacon {
    pub name:     String,
    pub position: Vec2,
}

/// Looks up beacon positions by name.
#[derive(Default, Resource)]
pub struct Index {
    beacons: HashMap<String, (Entity, Vec2)>,
}

impl Index {
    #[must_use]
    pub fn position(&self, name: &str) -> Option<Vec2> {
        self.beacons.get(name).map(|&(_, position)| position)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> { self.beacons.keys().map(String::as_str) }
}

/// Spawns a beacon, upper-casing its name to match parsed commands.
pub struct SpawnCommand {
    pub beacon: Beacon,
}

impl EntityCommand for SpawnCommand {
    fn apply(self, mut entity: EntityWorldMut) {
        let entity_id = entity.id();
        let beacon = Beacon { name: self.beacon.name.to_uppercase(), ..self.beacon };
        let entry = (beacon.name.clone(), (entity_id, beacon.position));
        entity.insert(beacon);
        entity.world_scope(|world| {
            world.resource_mut::<Index>().beacons.extend([entry]);
            world.write_message(SpawnMessage(entity_id));
        });
    }
}

#[derive(Message)]
pub struct SpawnMessage(pub Entity);
