//! Tallies flight outcomes and issued instructions.

use std::collections::HashMap;

use bevy::app::{self, App, Plugin};
use bevy::ecs::entity::Entity;
use bevy::ecs::message::{Message, MessageReader};
use bevy::ecs::resource::Resource;
use bevy::ecs::schedule::IntoScheduleConfigs;
use bevy::ecs::system::ResMut;

use super::AllSystemSets;
use super::aeroplane::{Outcome, TerminateMessage};
use crate::command::CommandName;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) {
        app.init_resource::<Scores>();
        app.add_message::<IssuedMessage>();
        app.add_systems(app::Update, tally_system.after(AllSystemSets));
    }
}

/// Sent for every executed command other than SQUAWK.
#[derive(Debug, Clone, Message)]
pub struct IssuedMessage {
    pub aeroplane: Entity,
    pub command:   CommandName,
}

#[derive(Debug, Default, Resource)]
pub struct Scores {
    pub outcomes:        HashMap<Outcome, u32>,
    pub commands_issued: u32,
    pub points:          i32,
}

impl Scores {
    #[must_use]
    pub fn count(&self, outcome: Outcome) -> u32 {
        self.outcomes.get(&outcome).copied().unwrap_or_default()
    }

    /// Points awarded for a flight ending with `outcome`.
    #[must_use]
    pub fn points_for(outcome: Outcome) -> i32 {
        match outcome {
            Outcome::Landed | Outcome::Dismissed => 10,
            Outcome::LandedWrongAirport | Outcome::LeftAirspace => -5,
            Outcome::Crashed | Outcome::Collided | Outcome::OutOfFuel => -50,
        }
    }
}

fn tally_system(
    mut scores: ResMut<Scores>,
    mut terminate_reader: MessageReader<TerminateMessage>,
    mut issued_reader: MessageReader<IssuedMessage>,
) {
    for message in terminate_reader.read() {
        *scores.outcomes.entry(message.outcome).or_default() += 1;
        scores.points += Scores::points_for(message.outcome);
    }

    let issued = issued_reader.read().count();
    scores.commands_issued += u32::try_from(issued).unwrap_or(u32::MAX);
}
