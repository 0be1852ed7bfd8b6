//! The radar clock that paces the simulation.

use bevy::app::{self, App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::system::{Res, ResMut};
use bevy::ecs::world::{FromWorld, World};
use bevy::time::{self, Time, Timer, TimerMode};

use super::Conf;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<RadarClock>();
        app.add_systems(app::PreUpdate, tick_clock_system);
    }
}

/// Counts virtual time towards the next radar ping.
#[derive(Resource)]
pub struct RadarClock {
    timer: Timer,
    pings: u64,
}

impl FromWorld for RadarClock {
    fn from_world(world: &mut World) -> Self {
        let interval = world.get_resource::<Conf>().cloned().unwrap_or_default().ping_interval;
        Self { timer: Timer::new(interval, TimerMode::Repeating), pings: 0 }
    }
}

impl RadarClock {
    /// Number of pings elapsed since the simulation started.
    #[must_use]
    pub fn pings(&self) -> u64 { self.pings }
}

fn tick_clock_system(time: Res<Time<time::Virtual>>, mut clock: ResMut<RadarClock>) {
    clock.timer.tick(time.delta());
    if clock.timer.just_finished() {
        clock.pings += 1;
    }
}

/// Run condition for systems that advance once per ping.
#[must_use]
pub fn pinged(clock: Res<RadarClock>) -> bool { clock.timer.just_finished() }
