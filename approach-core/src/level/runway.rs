//! Runways and their reservation.
//!
//! A physical strip has two designators, one per landing direction.
//! Both directions share a single [`Reservation`] on the strip entity,
//! so an aeroplane holding "09" also blocks "27".

use bevy::app::{App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Message;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::{EntityWorldMut, World};
use bevy::log;
use bevy::math::{Vec2, Vec3, Vec3Swizzles};
use math::Heading;

use super::airport::Airport;
use crate::WorldTryLog;

#[cfg(test)]
mod tests;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.add_message::<SpawnMessage>(); }
}

/// One landing direction of a strip.
#[derive(Component)]
pub struct Runway {
    /// The airport entity this runway belongs to.
    pub airport:    Entity,
    /// The designator used in commands, e.g. `09L`.
    pub designator: String,
    /// Threshold where landing aeroplanes touch down and departing aeroplanes line up.
    pub foot:       Vec3,
    /// Unit vector of the landing and takeoff direction.
    pub direction:  Vec2,
    /// Usable length from the foot along `direction`.
    pub length:     f32,
    /// The strip entity holding the shared [`Reservation`].
    pub strip:      Entity,
}

impl Runway {
    /// Heading of the ILS course and the takeoff roll.
    #[must_use]
    pub fn heading(&self) -> Heading { Heading::from_vec2(self.direction) }

    /// The far end of the runway.
    #[must_use]
    pub fn end(&self) -> Vec3 { self.foot + (self.direction * self.length).extend(0.) }

    /// Start of the inbound ILS segment, `extension` metres before the foot.
    #[must_use]
    pub fn ils_start(&self, extension: f32) -> Vec2 { self.foot.xy() - self.direction * extension }
}

/// Exclusive hold of a runway pair by at most one aeroplane.
#[derive(Component, Default)]
pub struct Reservation {
    holder: Option<Entity>,
}

impl Reservation {
    #[must_use]
    pub fn holder(&self) -> Option<Entity> { self.holder }

    /// Grants the reservation to `plane` if it is free or already held by `plane`.
    ///
    /// Returns whether `plane` holds the reservation afterwards.
    pub fn try_acquire(&mut self, plane: Entity) -> bool {
        match self.holder {
            None => {
                self.holder = Some(plane);
                true
            }
            Some(holder) => holder == plane,
        }
    }

    /// Releases the reservation if it is held by `plane`.
    ///
    /// Returns whether anything was released.
    pub fn release(&mut self, plane: Entity) -> bool {
        if self.holder == Some(plane) {
            self.holder = None;
            true
        } else {
            false
        }
    }
}

/// Attempts to reserve `strip` for `plane`.
pub fn try_acquire(world: &mut World, strip: Entity, plane: Entity) -> bool {
    let Some(mut reservation) = world.log_get_mut::<Reservation>(strip) else { return false };
    let granted = reservation.try_acquire(plane);
    if granted {
        log::debug!("Runway strip {strip:?} reserved by {plane:?}");
    } else {
        log::debug!("Runway strip {strip:?} denied to {plane:?}, held by {:?}", reservation.holder);
    }
    granted
}

/// Releases `strip` if it is held by `plane`.
pub fn release(world: &mut World, strip: Entity, plane: Entity) {
    if let Some(mut reservation) = world.log_get_mut::<Reservation>(strip)
        && reservation.release(plane)
    {
        log::debug!("Runway strip {strip:?} released by {plane:?}");
    }
}

/// Spawns a strip entity and the two runway entities of its landing directions.
pub struct SpawnCommand {
    pub airport:     Entity,
    /// Designators for landing from `start` towards `end` and the reverse.
    pub designators: [String; 2],
    /// Threshold of the first designator.
    pub start:       Vec3,
    /// Threshold of the second designator.
    pub end:         Vec3,
}

impl EntityCommand for SpawnCommand {
    fn apply(self, mut entity: EntityWorldMut) {
        let strip = entity.id();
        entity.insert(Reservation::default());

        let forward = (self.end - self.start).xy();
        let length = forward.length();
        let direction = forward.normalize_or_zero();
        let [forward_designator, backward_designator] = self.designators;

        entity.world_scope(|world| {
            let runways = [
                (forward_designator, self.start, direction),
                (backward_designator, self.end, -direction),
            ]
            .map(|(designator, foot, direction)| {
                world
                    .spawn(Runway {
                        airport: self.airport,
                        designator,
                        foot,
                        direction,
                        length,
                        strip,
                    })
                    .id()
            });

            if let Some(mut airport) = world.log_get_mut::<Airport>(self.airport) {
                airport.runways.extend(runways);
            }

            world.write_message(SpawnMessage(strip));
        });
    }
}

/// Sent when a runway strip is spawned.
#[derive(Message)]
pub struct SpawnMessage(pub Entity);
