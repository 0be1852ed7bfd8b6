use std::collections::HashSet;
use std::sync::LazyLock;

use itertools::Itertools;
use math::{Heading, KPH_PER_MPS, TurnDirection};
use regex::Regex;
use smallvec::SmallVec;

use super::table::{CommandSpec, FlagSpec, VALID_COMBINATIONS};
use super::{
    Command, CommandName, CommandSet, Flag, FlagSet, GameCommand, HeadingArg, Issued, Parsed,
};

static ICAO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}\d{4}$").expect("ICAO pattern is valid"));
static SHORTHAND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([HAS])([+-]?\d+)$").expect("shorthand pattern is valid"));
static ABSOLUTE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}$").expect("heading pattern is valid"));
static RELATIVE_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]\d{1,3}$").expect("turn pattern is valid"));
static FLIGHT_LEVEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}$").expect("flight level pattern is valid"));
static SPEED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2,4}$").expect("speed pattern is valid"));
static AIRPORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{3}$").expect("airport pattern is valid"));
static RUNWAY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{2}[LCR]?$").expect("runway pattern is valid"));

/// Metres per flight level unit in ALTITUDE arguments.
const FLIGHT_LEVEL_UNIT: f32 = 100.;

#[derive(Debug, Clone)]
pub struct ParserConf {
    /// Lowest accepted ALTITUDE argument, in hundreds of metres.
    pub min_flight_level: u32,
    /// Highest accepted ALTITUDE argument, in hundreds of metres.
    pub max_flight_level: u32,
    /// Prefix of game-directed commands.
    pub control_char:     char,
}

impl Default for ParserConf {
    fn default() -> Self { Self { min_flight_level: 5, max_flight_level: 95, control_char: '!' } }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    Empty,
    #[error("{0} is not a valid ICAO code")]
    InvalidIcao(String),
    #[error("No instruction for {0}")]
    MissingCommand(String),
    #[error("Unknown command {0}")]
    UnknownCommand(String),
    #[error("Unknown game command {0}")]
    UnknownGameCommand(String),
    #[error("{command} expects {expected} argument(s)")]
    MissingArgument { command: CommandName, expected: usize },
    #[error("Invalid argument {arg} for {command}: {reason}")]
    InvalidArgument { command: CommandName, arg: String, reason: &'static str },
    #[error("{command} does not accept the {flag} flag")]
    FlagNotAccepted { command: CommandName, flag: Flag },
    #[error("{0} issued more than once")]
    Duplicate(CommandName),
    #[error("{} cannot be issued together", .0.iter().join(" + "))]
    InvalidCombination(Vec<CommandName>),
    #[error("Invalid tick count {0}")]
    InvalidTickCount(String),
}

/// Converts lines of text into structured commands.
pub struct Parser {
    conf:    ParserConf,
    beacons: HashSet<String>,
}

impl Parser {
    /// Creates a parser that accepts the given beacon names in HEADING and CLEAR.
    ///
    /// Names are compared against upper-cased input, so they are stored upper-cased.
    pub fn new(conf: ParserConf, beacons: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let beacons = beacons.into_iter().map(|name| name.into().to_uppercase()).collect();
        Self { conf, beacons }
    }

    /// Parses one line of input.
    ///
    /// Input is case-insensitive. Malformed input is always an `Err`, never a panic.
    pub fn parse(&self, line: &str) -> Result<Parsed, ParseError> {
        let line = line.trim().to_uppercase();
        if let Some(rest) = line.strip_prefix(self.conf.control_char) {
            return self.parse_game(rest).map(Parsed::Game);
        }

        let mut tokens = line.split_whitespace().peekable();
        let icao = tokens.next().ok_or(ParseError::Empty)?;
        if !ICAO.is_match(icao) {
            return Err(ParseError::InvalidIcao(icao.to_owned()));
        }
        if tokens.peek().is_none() {
            return Err(ParseError::MissingCommand(icao.to_owned()));
        }

        let mut commands = CommandSet::default();
        while let Some(token) = tokens.next() {
            let (spec, inline_arg) = Self::command_spec(token)?;

            let mut args: SmallVec<[&str; 2]> = inline_arg.into_iter().collect();
            while args.len() < spec.arity {
                let arg = tokens.next().ok_or(ParseError::MissingArgument {
                    command:  spec.name,
                    expected: spec.arity,
                })?;
                args.push(arg);
            }
            let command = self.parse_args(spec.name, &args)?;

            let mut flags = FlagSet::default();
            while let Some(flag_spec) = tokens.peek().and_then(|token| FlagSpec::find(token)) {
                tokens.next();
                if !spec.flags.contains(&flag_spec.flag) {
                    return Err(ParseError::FlagNotAccepted {
                        command: spec.name,
                        flag:    flag_spec.flag,
                    });
                }
                flags.insert(flag_spec.flag);
            }

            if commands.contains(spec.name) {
                return Err(ParseError::Duplicate(spec.name));
            }
            commands.0.push(Issued { command, flags });
        }

        let names: Vec<_> = commands.names().collect();
        if !VALID_COMBINATIONS.iter().any(|combination| names.iter().all(|n| combination.contains(n)))
        {
            return Err(ParseError::InvalidCombination(names));
        }

        Ok(Parsed::Plane { icao: icao.to_owned(), commands })
    }

    /// Resolves a command token, expanding the condensed `H270`/`A20`/`S450` forms.
    fn command_spec(token: &str) -> Result<(&'static CommandSpec, Option<&str>), ParseError> {
        if let Some(spec) = CommandSpec::find(token) {
            return Ok((spec, None));
        }

        if let Some(captures) = SHORTHAND.captures(token)
            && let (Some(name), Some(arg)) = (captures.get(1), captures.get(2))
            && let Some(spec) = CommandSpec::find(name.as_str())
        {
            return Ok((spec, Some(arg.as_str())));
        }

        Err(ParseError::UnknownCommand(token.to_owned()))
    }

    fn parse_args(&self, name: CommandName, args: &[&str]) -> Result<Command, ParseError> {
        let invalid = |arg: &str, reason| ParseError::InvalidArgument {
            command: name,
            arg: arg.to_owned(),
            reason,
        };

        let command = match (name, args) {
            (CommandName::Heading, &[arg]) => Command::Heading(self.parse_heading(arg).ok_or_else(
                || invalid(arg, "expected a heading from 000 to 360, a signed turn or a beacon"),
            )?),
            (CommandName::Altitude, &[arg]) => {
                let level = FLIGHT_LEVEL
                    .is_match(arg)
                    .then(|| arg.parse::<u32>().ok())
                    .flatten()
                    .ok_or_else(|| invalid(arg, "expected a two-digit flight level"))?;
                if level % 5 != 0 {
                    return Err(invalid(arg, "flight level must be a multiple of 5"));
                }
                if !(self.conf.min_flight_level..=self.conf.max_flight_level).contains(&level) {
                    return Err(invalid(arg, "flight level out of range"));
                }
                Command::Altitude(level as f32 * FLIGHT_LEVEL_UNIT)
            }
            (CommandName::Speed, &[arg]) => {
                let kph = SPEED
                    .is_match(arg)
                    .then(|| arg.parse::<u32>().ok())
                    .flatten()
                    .ok_or_else(|| invalid(arg, "expected a speed in kph"))?;
                Command::Speed(kph as f32 / KPH_PER_MPS)
            }
            (CommandName::Land, &[airport, runway]) => {
                if !AIRPORT.is_match(airport) {
                    return Err(invalid(airport, "expected a three-letter airport code"));
                }
                if !RUNWAY.is_match(runway) {
                    return Err(invalid(runway, "expected a runway designator"));
                }
                Command::Land { airport: airport.to_owned(), runway: runway.to_owned() }
            }
            (CommandName::TakeOff, &[runway]) => {
                if !RUNWAY.is_match(runway) {
                    return Err(invalid(runway, "expected a runway designator"));
                }
                Command::TakeOff { runway: runway.to_owned() }
            }
            (CommandName::Circle, &[direction]) => Command::Circle(match direction {
                "L" | "LEFT" | "CCW" => TurnDirection::CounterClockwise,
                "R" | "RIGHT" | "CW" => TurnDirection::Clockwise,
                _ => return Err(invalid(direction, "expected L, LEFT, CCW, R, RIGHT or CW")),
            }),
            (CommandName::Clear, &[beacon]) => {
                if !self.beacons.contains(beacon) {
                    return Err(invalid(beacon, "unknown beacon"));
                }
                Command::Clear(beacon.to_owned())
            }
            (CommandName::Abort, []) => Command::Abort,
            (CommandName::Squawk, []) => Command::Squawk,
            (CommandName::Bye, []) => Command::Bye,
            (name, args) => {
                unreachable!("command table declares wrong arity for {name}: got {args:?}")
            }
        };
        Ok(command)
    }

    fn parse_heading(&self, arg: &str) -> Option<HeadingArg> {
        if ABSOLUTE_HEADING.is_match(arg) {
            let degrees = arg.parse::<u16>().ok().filter(|&d| d <= 360)?;
            Some(HeadingArg::Absolute(Heading::from_degrees(f32::from(degrees))))
        } else if RELATIVE_HEADING.is_match(arg) {
            let delta = arg.parse::<i16>().ok().filter(|d| d.abs() <= 360)?;
            Some(HeadingArg::Relative(f32::from(delta)))
        } else if self.beacons.contains(arg) {
            Some(HeadingArg::Beacon(arg.to_owned()))
        } else {
            None
        }
    }

    fn parse_game(&self, rest: &str) -> Result<GameCommand, ParseError> {
        let mut tokens = rest.split_whitespace();
        match (tokens.next(), tokens.next(), tokens.next()) {
            (Some("TICK"), None, None) => Ok(GameCommand::Tick(1)),
            (Some("TICK"), Some(count), None) => count
                .parse()
                .ok()
                .filter(|&n| n > 0)
                .map(GameCommand::Tick)
                .ok_or_else(|| ParseError::InvalidTickCount(count.to_owned())),
            (Some("STATUS"), None, None) => Ok(GameCommand::Status),
            (Some("QUIT"), None, None) => Ok(GameCommand::Quit),
            _ => Err(ParseError::UnknownGameCommand(rest.trim().to_owned())),
        }
    }
}
