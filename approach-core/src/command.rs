//! Structured controller instructions and their text syntax.
//!
//! A line of text is turned into a [`Parsed`] value by [`Parser`].
//! Plane-directed lines yield a [`CommandSet`] which is issued through
//! [`level::pilot::issue`](crate::level::pilot::issue).

use math::{Heading, TurnDirection};
use smallvec::SmallVec;

mod parser;
pub use parser::{ParseError, Parser, ParserConf};
mod table;
pub use table::{COMMAND_SPECS, CommandSpec, FLAG_SPECS, FlagSpec, VALID_COMBINATIONS};


/// Names of plane-directed commands.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum CommandName {
    Heading,
    Altitude,
    Speed,
    Land,
    TakeOff,
    Circle,
    Clear,
    Abort,
    Squawk,
    Bye,
}

impl CommandName {
    /// Whether this command starts a procedure.
    #[must_use]
    pub fn is_procedure(self) -> bool {
        matches!(self, Self::Land | Self::TakeOff | Self::Circle | Self::Clear)
    }
}

/// A validated command with its arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Heading(HeadingArg),
    /// Target altitude in metres.
    Altitude(f32),
    /// Target ground speed in m/s.
    Speed(f32),
    Land {
        airport: String,
        runway:  String,
    },
    /// Take off from a runway of the departure airport.
    TakeOff {
        runway: String,
    },
    Circle(TurnDirection),
    /// Fly to a beacon and hold the course after passing it.
    Clear(String),
    Abort,
    Squawk,
    Bye,
}

impl Command {
    #[must_use]
    pub fn name(&self) -> CommandName {
        match self {
            Self::Heading(_) => CommandName::Heading,
            Self::Altitude(_) => CommandName::Altitude,
            Self::Speed(_) => CommandName::Speed,
            Self::Land { .. } => CommandName::Land,
            Self::TakeOff { .. } => CommandName::TakeOff,
            Self::Circle(_) => CommandName::Circle,
            Self::Clear(_) => CommandName::Clear,
            Self::Abort => CommandName::Abort,
            Self::Squawk => CommandName::Squawk,
            Self::Bye => CommandName::Bye,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum HeadingArg {
    Absolute(Heading),
    /// Degrees to turn clockwise from the current heading at issue time.
    Relative(f32),
    /// Fly towards the named beacon.
    Beacon(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Flag {
    /// Manoeuvre with full accelerations and a steeper bank.
    Expedite,
    /// Turn the long way round.
    Long,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlagSet {
    pub expedite: bool,
    pub long:     bool,
}

impl FlagSet {
    pub fn insert(&mut self, flag: Flag) {
        match flag {
            Flag::Expedite => self.expedite = true,
            Flag::Long => self.long = true,
        }
    }
}

/// A command together with the flags it was issued with.
#[derive(Debug, Clone, PartialEq)]
pub struct Issued {
    pub command: Command,
    pub flags:   FlagSet,
}

impl From<Command> for Issued {
    fn from(command: Command) -> Self { Self { command, flags: FlagSet::default() } }
}

/// Commands issued together in one line, without duplicate names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSet(pub SmallVec<[Issued; 3]>);

impl CommandSet {
    pub fn iter(&self) -> impl Iterator<Item = &Issued> { self.0.iter() }

    pub fn names(&self) -> impl Iterator<Item = CommandName> + '_ {
        self.0.iter().map(|issued| issued.command.name())
    }

    #[must_use]
    pub fn contains(&self, name: CommandName) -> bool { self.names().any(|n| n == name) }

    #[must_use]
    pub fn get(&self, name: CommandName) -> Option<&Issued> {
        self.0.iter().find(|issued| issued.command.name() == name)
    }

    /// Whether any command in the set carries the flag.
    #[must_use]
    pub fn has_flag(&self, flag: Flag) -> bool {
        self.0.iter().any(|issued| match flag {
            Flag::Expedite => issued.flags.expedite,
            Flag::Long => issued.flags.long,
        })
    }
}

impl FromIterator<Issued> for CommandSet {
    fn from_iter<I: IntoIterator<Item = Issued>>(iter: I) -> Self { Self(iter.into_iter().collect()) }
}

/// Simulation control commands, prefixed by the control character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameCommand {
    /// Advance the simulation by this many pings.
    Tick(u32),
    /// List the aeroplanes in the airspace.
    Status,
    Quit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    Plane { icao: String, commands: CommandSet },
    Game(GameCommand),
}
