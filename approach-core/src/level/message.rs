//! Radio transmissions from aeroplanes to the controller.

use bevy::app::{App, Plugin};
use bevy::ecs::message::Message;
use bevy::ecs::world::World;

pub struct Plug;

impl Plugin for Plug {
    fn build(&self, app: &mut App) { app.add_message::<SayMessage>(); }
}

/// A line of radio feedback to display to the controller.
#[derive(Debug, Clone, Message)]
pub struct SayMessage {
    /// Callsign of the speaking aeroplane.
    pub callsign: String,
    /// The transmission content.
    pub text:     String,
    /// Classifies the message by urgency.
    pub severity: Severity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum Severity {
    /// Readbacks and status reports that do not need a response.
    Info,
    /// Transmissions that expect the controller to act,
    /// e.g. a rejected or queued instruction.
    NeedAck,
    /// Abnormal events, e.g. a missed approach.
    Anomaly,
    /// Transmissions that need urgent response,
    /// e.g. a traffic alert.
    Urgent,
}

/// Sends a radio message from `callsign`.
pub fn say(world: &mut World, callsign: &str, text: impl Into<String>, severity: Severity) {
    world.write_message(SayMessage { callsign: callsign.to_owned(), text: text.into(), severity });
}
