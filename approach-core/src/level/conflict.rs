//! Separation monitoring between airborne aeroplanes.
//!
//! All pairs are evaluated against a snapshot of the positions at the start of the ping,
//! before any aeroplane is updated, so the result does not depend on iteration order.

use std::collections::{BTreeMap, BTreeSet};

use bevy::app::{self, App, Plugin};
use bevy::ecs::component::Component;
use bevy::ecs::entity::Entity;
use bevy::ecs::query::{With, Without};
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::EntityCommand;
use bevy::ecs::world::World;
use bevy::log;
use bevy::math::{Vec3, Vec3Swizzles};
use itertools::Itertools;

use super::aeroplane::{Kinematics, OnGround, Outcome, Terminate, Terminated};
use super::procedure::avert;
use super::{Conf, SystemSets};


pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.add_systems(app::Update, detect_system.in_set(SystemSets::Detect));
    }
}

/// Marks an aeroplane under collision avoidance.
///
/// While present, the aeroplane only accepts SQUAWK.
#[derive(Debug, Component)]
pub struct Conflict {
    /// The nearest aeroplane violating separation.
    pub intruder: Entity,
}

/// Separation violations found in one snapshot.
#[derive(Debug, Default, PartialEq)]
pub struct Violations {
    /// Aeroplanes within collision distance of another.
    pub collided: BTreeSet<Entity>,
    /// The nearest intruder of every aeroplane in conflict.
    pub nearest:  BTreeMap<Entity, Entity>,
}

/// Evaluates every pair of `positions` against the separation minima in `conf`.
#[must_use]
pub fn find_violations(positions: &[(Entity, Vec3)], conf: &Conf) -> Violations {
    let mut violations = Violations::default();
    let mut nearest_distance = BTreeMap::<Entity, f32>::new();

    for (&(a, pos_a), &(b, pos_b)) in positions.iter().tuple_combinations() {
        let distance = pos_a.distance(pos_b);
        if distance < conf.collision_distance {
            violations.collided.extend([a, b]);
            continue;
        }

        let horizontal = pos_a.xy().distance(pos_b.xy());
        let vertical = (pos_a.z - pos_b.z).abs();
        if horizontal >= conf.conflict_horizontal || vertical >= conf.conflict_vertical {
            continue;
        }

        for (subject, intruder) in [(a, b), (b, a)] {
            let closer = nearest_distance.get(&subject).is_none_or(|&best| distance < best);
            if closer {
                nearest_distance.insert(subject, distance);
                violations.nearest.insert(subject, intruder);
            }
        }
    }

    violations.nearest.retain(|plane, _| !violations.collided.contains(plane));
    violations
}

fn detect_system(world: &mut World) {
    let conf = world.resource::<Conf>().clone();

    let positions: Vec<_> = world
        .query_filtered::<(Entity, &Kinematics), (Without<OnGround>, Without<Terminated>)>()
        .iter(world)
        .map(|(entity, kin)| (entity, kin.position))
        .collect();
    let violations = find_violations(&positions, &conf);

    for &plane in &violations.collided {
        Terminate { outcome: Outcome::Collided }.apply(world.entity_mut(plane));
    }

    let resolved: Vec<_> = world
        .query_filtered::<Entity, With<Conflict>>()
        .iter(world)
        .filter(|plane| !violations.nearest.contains_key(plane))
        .collect();
    for plane in resolved {
        log::info!("{plane:?} is clear of conflict");
        world.entity_mut(plane).remove::<Conflict>();
    }

    for (&plane, &intruder) in &violations.nearest {
        if world.get::<Conflict>(plane).is_none() {
            log::info!("{plane:?} is in conflict with {intruder:?}");
        }
        world.entity_mut(plane).insert(Conflict { intruder });
        avert::engage(world, plane, intruder, &conf);
    }
}
