//! Bounce Fill entry point
//!
//! Loads settings, opens the terminal shell and runs the session loop.
//! Logs go to stderr; redirect it (`2>bounce.log`) to keep the screen clean.

use std::path::PathBuf;

use anyhow::Context;

use bounce_fill::Settings;
use bounce_fill::shell::{Session, TerminalShell};

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Bounce Fill starting...");

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = Settings::load(config_path.as_deref()).context("loading settings")?;
    let start = settings.start_mode()?;

    let shell = TerminalShell::enter().context("initialising terminal")?;
    let mut session = Session::from_settings(shell, &settings);
    let result = session.run(start);

    // Restore the terminal before any error is printed
    drop(session);
    result
}
