#![cfg_attr(feature = "precommit-checks", deny(warnings, clippy::pedantic, clippy::dbg_macro))]
#![cfg_attr(feature = "rust-analyzer", warn(warnings, clippy::pedantic, clippy::dbg_macro))]

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use approach::level::Conf;
use bevy::app::App;
use bevy::log::LogPlugin;
use clap::Parser as _;

mod scenario;
mod session;

use scenario::Scenario;
use session::{Control, Session};

#[derive(clap::Parser)]
#[clap(version, about)]
struct Options {
    /// Path to the JSON scenario file.
    #[clap(long)]
    scenario: PathBuf,
    /// Simulated milliseconds between two radar pings.
    #[clap(long, default_value_t = 3000)]
    ping_ms:  u64,
    /// Log filter, in the same syntax as `RUST_LOG`.
    #[clap(long, default_value = "warn")]
    log:      String,
}

fn main() -> Result<()> {
    let options = Options::parse();

    let scenario = Scenario::load(&options.scenario)?;
    let conf = Conf { ping_interval: Duration::from_millis(options.ping_ms), ..Conf::default() };

    let mut app = App::new();
    app.add_plugins(LogPlugin { filter: options.log, ..Default::default() });
    let mut session = Session::new(app, conf, scenario);

    let mut stdout = io::stdout().lock();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let control = session.handle(&line, &mut stdout).context("write stdout")?;
        stdout.flush().context("flush stdout")?;
        if control == Control::Quit {
            break;
        }
    }

    Ok(())
}
