//! Line-oriented controller session over a simulated airspace.

use std::io::{self, Write};

use approach::command::{GameCommand, Parsed, Parser, ParserConf};
use approach::level::aeroplane::{Aeroplane, Fuel, Kinematics, TerminateMessage, Terminated};
use approach::level::message::SayMessage;
use approach::level::pilot::{self, Pilot};
use approach::level::radar::RadarClock;
use approach::level::score::Scores;
use approach::level::{self, Conf, beacon};
use bevy::app::App;
use bevy::ecs::entity::Entity;
use bevy::ecs::message::Messages;
use bevy::ecs::query::Without;
use bevy::time::{self, Time};
use math::KPH_PER_MPS;

use crate::scenario::Scenario;


/// Whether the session should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

pub struct Session {
    app:    App,
    parser: Parser,
}

impl Session {
    /// Installs the simulation into `app` and spawns `scenario`.
    pub fn new(mut app: App, conf: Conf, scenario: Scenario) -> Self {
        app.init_resource::<Time<time::Virtual>>();
        app.insert_resource(conf);
        app.add_plugins(level::Plug);
        scenario.spawn(app.world_mut());

        let beacons: Vec<String> =
            app.world().resource::<beacon::Index>().names().map(str::to_owned).collect();
        let parser = Parser::new(ParserConf::default(), beacons);

        Self { app, parser }
    }

    /// Handles one line of controller input, writing all feedback to `out`.
    pub fn handle(&mut self, line: &str, out: &mut impl Write) -> io::Result<Control> {
        if line.trim().is_empty() {
            return Ok(Control::Continue);
        }

        match self.parser.parse(line) {
            Err(err) => writeln!(out, "Error: {err}")?,
            Ok(Parsed::Game(GameCommand::Quit)) => return Ok(Control::Quit),
            Ok(Parsed::Game(GameCommand::Tick(count))) => {
                for _ in 0..count {
                    self.ping();
                    self.flush(out)?;
                }
            }
            Ok(Parsed::Game(GameCommand::Status)) => self.status(out)?,
            Ok(Parsed::Plane { icao, commands }) => {
                match self.find(&icao) {
                    None => writeln!(out, "Error: no aeroplane {icao} in the airspace")?,
                    Some(plane) => match pilot::issue(self.app.world_mut(), plane, commands) {
                        Ok(ack) => writeln!(out, "{icao}: {ack}")?,
                        Err(_) => writeln!(out, "{icao}: rejected")?,
                    },
                }
                self.flush(out)?;
            }
        }

        Ok(Control::Continue)
    }

    /// Advances the simulation by one radar ping.
    fn ping(&mut self) {
        let interval = self.app.world().resource::<Conf>().ping_interval;
        self.app.world_mut().resource_mut::<Time<time::Virtual>>().advance_by(interval);
        self.app.update();
    }

    fn find(&mut self, icao: &str) -> Option<Entity> {
        let world = self.app.world_mut();
        world
            .query_filtered::<(Entity, &Aeroplane), Without<Terminated>>()
            .iter(world)
            .find(|(_, aeroplane)| aeroplane.icao == icao)
            .map(|(entity, _)| entity)
    }

    /// Prints and discards pending radio messages and terminations.
    fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        let world = self.app.world_mut();
        let ping = world.resource::<RadarClock>().pings();

        let says: Vec<_> = world.resource_mut::<Messages<SayMessage>>().drain().collect();
        for say in says {
            writeln!(out, "[{ping:>4}] {} ({}): {}", say.callsign, say.severity, say.text)?;
        }

        let terminations: Vec<_> =
            world.resource_mut::<Messages<TerminateMessage>>().drain().collect();
        for termination in terminations {
            writeln!(out, "[{ping:>4}] {} {}", termination.icao, termination.outcome)?;
        }

        Ok(())
    }

    fn status(&mut self, out: &mut impl Write) -> io::Result<()> {
        let world = self.app.world_mut();
        let mut rows: Vec<_> = world
            .query_filtered::<(&Aeroplane, &Kinematics, &Pilot, &Fuel), Without<Terminated>>()
            .iter(world)
            .map(|(aeroplane, kin, pilot, fuel)| {
                let procedure = pilot.status.procedure.as_ref().map_or("-", |p| p.name());
                (
                    aeroplane.icao.clone(),
                    format!(
                        "{} {:>8.1} {:>8.1} {:>6.0} m {} {:>4.0} kph {:>8} fuel {:>5.0} s",
                        aeroplane.icao,
                        kin.position.x / 1000.,
                        kin.position.y / 1000.,
                        kin.altitude(),
                        kin.heading,
                        kin.speed * KPH_PER_MPS,
                        procedure,
                        fuel.remaining,
                    ),
                )
            })
            .collect();
        rows.sort_by(|(a, _), (b, _)| a.cmp(b));

        for (_, row) in rows {
            writeln!(out, "{row}")?;
        }

        let scores = world.resource::<Scores>();
        writeln!(out, "Score {} after {} instruction(s)", scores.points, scores.commands_issued)?;
        Ok(())
    }
}
