use super::{CommandName, Flag};

/// Syntax of a plane-directed command.
#[derive(Debug)]
pub struct CommandSpec {
    pub name:      CommandName,
    /// Accepted spellings, the canonical name first.
    pub spellings: &'static [&'static str],
    /// Number of argument tokens following the command.
    pub arity:     usize,
    /// Flags that may follow the arguments.
    pub flags:     &'static [Flag],
}

#[derive(Debug)]
pub struct FlagSpec {
    pub flag:      Flag,
    pub spellings: &'static [&'static str],
}

pub static COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name:      CommandName::Heading,
        spellings: &["HEADING", "H"],
        arity:     1,
        flags:     &[Flag::Expedite, Flag::Long],
    },
    CommandSpec {
        name:      CommandName::Altitude,
        spellings: &["ALTITUDE", "A"],
        arity:     1,
        flags:     &[Flag::Expedite],
    },
    CommandSpec {
        name:      CommandName::Speed,
        spellings: &["SPEED", "S"],
        arity:     1,
        flags:     &[Flag::Expedite],
    },
    CommandSpec {
        name:      CommandName::Land,
        spellings: &["LAND", "L"],
        arity:     2,
        flags:     &[Flag::Expedite],
    },
    CommandSpec {
        name:      CommandName::TakeOff,
        spellings: &["TAKEOFF", "TO"],
        arity:     1,
        flags:     &[Flag::Expedite],
    },
    CommandSpec {
        name:      CommandName::Circle,
        spellings: &["CIRCLE", "C"],
        arity:     1,
        flags:     &[Flag::Expedite],
    },
    CommandSpec {
        name:      CommandName::Clear,
        spellings: &["CLEAR", "CL"],
        arity:     1,
        flags:     &[Flag::Expedite],
    },
    CommandSpec { name: CommandName::Abort, spellings: &["ABORT", "AB"], arity: 0, flags: &[] },
    CommandSpec { name: CommandName::Squawk, spellings: &["SQUAWK", "SQ"], arity: 0, flags: &[] },
    CommandSpec { name: CommandName::Bye, spellings: &["BYE"], arity: 0, flags: &[] },
];

pub static FLAG_SPECS: &[FlagSpec] = &[
    FlagSpec { flag: Flag::Expedite, spellings: &["EXPEDITE", "X"] },
    FlagSpec { flag: Flag::Long, spellings: &["LONG", "LG"] },
];

/// A command set is valid if its names are a subset of one of these.
pub static VALID_COMBINATIONS: &[&[CommandName]] = &[
    &[CommandName::Heading, CommandName::Altitude, CommandName::Speed],
    &[CommandName::TakeOff, CommandName::Heading, CommandName::Altitude],
    &[CommandName::Circle, CommandName::Altitude, CommandName::Speed],
    &[CommandName::Clear, CommandName::Altitude, CommandName::Speed],
    &[CommandName::Land],
    &[CommandName::Abort],
    &[CommandName::Squawk],
    &[CommandName::Bye],
];

impl CommandSpec {
    pub(super) fn find(token: &str) -> Option<&'static Self> {
        COMMAND_SPECS.iter().find(|spec| spec.spellings.contains(&token))
    }
}

impl FlagSpec {
    pub(super) fn find(token: &str) -> Option<&'static Self> {
        FLAG_SPECS.iter().find(|spec| spec.spellings.contains(&token))
    }
}
