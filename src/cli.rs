use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::nav::ReconcileMode;

/// Keep a navigation tree's open/closed state in step with the current page
#[derive(Debug, Parser)]
#[command(name = "navtree", version)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile a page for a location and print the resulting markup
    Reconcile {
        /// Markup file holding the navigation tree
        #[arg(long)]
        page: PathBuf,
        /// Current location, e.g. /docs/guide/setup.html
        #[arg(long)]
        location: String,
        /// Overrides the configured mode
        #[arg(long, value_enum)]
        mode: Option<ReconcileMode>,
        /// Write the markup here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the lookup table built for a page
    Keys {
        #[arg(long)]
        page: PathBuf,
    },
    /// Browse a page's navigation tree in the terminal
    Browse {
        #[arg(long)]
        page: PathBuf,
        /// Location reconciled when the page loads
        #[arg(long)]
        location: Option<String>,
    },
}
