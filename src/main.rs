use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod config;
mod dom;
mod logging;
mod nav;
mod node_utils;
mod screens;
mod statusbar;
mod ui;
mod ui_utils;

use cli::{Cli, Command};
use config::NavConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose)?;

    let config = NavConfig::load_or_default(cli.config.as_deref())?;
    let mut stdout = std::io::stdout().lock();

    match cli.command {
        Command::Reconcile {
            page,
            location,
            mode,
            output,
        } => commands::reconcile(&config, &page, &location, mode, output.as_deref(), &mut stdout),
        Command::Keys { page } => commands::keys(&config, &page, &mut stdout),
        Command::Browse { page, location } => {
            drop(stdout);
            commands::browse(&config, &page, location.as_deref())
        }
    }
}
