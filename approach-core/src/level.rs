//! Gameplay simulation.
//!
//! All simulation systems run in [`AllSystemSets`],
//! which only runs on frames where a radar ping elapsed.
//! One ping advances every aeroplane exactly once by [`Conf::tick_seconds`].

use std::time::Duration;

use bevy::app::{self, App, Plugin};
use bevy::ecs::resource::Resource;
use bevy::ecs::schedule::{IntoScheduleConfigs, SystemSet};
use itertools::Itertools;
use math::Angle;
use strum::IntoEnumIterator;

pub mod aeroplane;
pub mod airport;
pub mod beacon;
pub mod checker;
pub mod conflict;
pub mod executer;
pub mod message;
pub mod navigator;
pub mod pilot;
pub mod procedure;
pub mod radar;
pub mod runway;
pub mod score;

#[cfg(test)]
pub(crate) mod test_util;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Conf>();

        for set in SystemSets::iter() {
            app.configure_sets(app::Update, set.in_set(AllSystemSets));
        }

        for (before, after) in SystemSets::iter().tuple_windows() {
            app.configure_sets(app::Update, before.before(after));
        }

        app.configure_sets(app::Update, AllSystemSets.run_if(radar::pinged));

        app.add_plugins(radar::Plug);
        app.add_plugins(message::Plug);
        app.add_plugins(airport::Plug);
        app.add_plugins(runway::Plug);
        app.add_plugins(beacon::Plug);
        app.add_plugins(aeroplane::Plug);
        app.add_plugins(conflict::Plug);
        app.add_plugins(procedure::Plug);
        app.add_plugins(pilot::Plug);
        app.add_plugins(score::Plug);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet, strum::EnumIter)]
pub enum SystemSets {
    /// Pairwise separation checks over all aeroplanes.
    /// Runs before any aeroplane is updated so that the result is order-independent.
    Detect,
    /// Procedures deciding the target configuration of their aeroplane.
    Navigate,
    /// Integration of kinematics towards the target configuration.
    Aviate,
    /// Dequeueing of buffered commands for idle aeroplanes.
    Dispatch,
    /// Bookkeeping that depends on the integrated state, such as fuel and airspace bounds.
    Reconcile,
    /// Removal of terminated aeroplanes.
    Cleanup,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SystemSet)]
pub struct AllSystemSets;

/// Simulation parameters.
///
/// Insert a custom value before adding [`Plug`] to override the defaults,
/// since the radar clock reads the ping interval once during plugin setup.
#[derive(Debug, Clone, Resource)]
pub struct Conf {
    /// Simulated time between two radar pings.
    pub ping_interval:        Duration,
    /// Horizontal radius of the controlled airspace around the origin, in metres.
    pub radar_range:          f32,
    /// Maximum angle between the current heading and the ILS course to accept a LAND command.
    pub ils_tolerance:        f32,
    /// Glide path angle above the horizon.
    pub glide_slope:          Angle,
    /// Length of the projected course and the ILS segment, as a multiple of `radar_range`.
    pub ils_extension_factor: f32,
    /// Number of pings a landed aeroplane occupies its runway before leaving the simulation.
    pub taxi_pings:           u32,
    /// Number of pings a departing aeroplane holds its runway after starting the takeoff roll.
    pub takeoff_runway_pings: u32,
    /// Vertical spacing between flight levels, in metres.
    pub flight_level_step:    f32,
    /// Lowest flight level, in metres.
    pub min_flight_level:     f32,
    /// Highest flight level, in metres.
    pub max_flight_level:     f32,
    /// Horizontal separation below which two aeroplanes are in conflict.
    pub conflict_horizontal:  f32,
    /// Vertical separation below which two aeroplanes are in conflict.
    pub conflict_vertical:    f32,
    /// 3D distance below which two aeroplanes collide.
    pub collision_distance:   f32,
    /// Whether commands issued to a busy aeroplane are buffered instead of rejected.
    pub queue_commands:       bool,
    /// Fraction of the airframe acceleration used for unhurried manoeuvres.
    pub normal_throttle:      f32,
}

impl Default for Conf {
    fn default() -> Self {
        Self {
            ping_interval:        Duration::from_secs(3),
            radar_range:          75_000.,
            ils_tolerance:        60.,
            glide_slope:          Angle::from_degrees(3.),
            ils_extension_factor: 3.,
            taxi_pings:           3,
            takeoff_runway_pings: 10,
            flight_level_step:    500.,
            min_flight_level:     500.,
            max_flight_level:     9_500.,
            conflict_horizontal:  3_000.,
            conflict_vertical:    300.,
            collision_distance:   200.,
            queue_commands:       true,
            normal_throttle:      0.5,
        }
    }
}

impl Conf {
    /// Simulated seconds per ping.
    #[must_use]
    pub fn tick_seconds(&self) -> f32 { self.ping_interval.as_secs_f32() }

    /// Length of the projected course and ILS segments used for interception geometry.
    #[must_use]
    pub fn ils_extension(&self) -> f32 { self.radar_range * self.ils_extension_factor }

    /// Rounds `altitude` to the closest valid flight level.
    #[must_use]
    pub fn nearest_flight_level(&self, altitude: f32) -> f32 {
        math::snap_to_step(
            altitude,
            self.flight_level_step,
            self.min_flight_level,
            self.max_flight_level,
        )
    }
}
