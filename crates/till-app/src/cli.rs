use std::path::PathBuf;

use clap::Parser;

/// Replays a scripted till session through the keybinding core and prints
/// every outbound action as a JSON line.
#[derive(Parser, Debug)]
#[command(name = "till-keytrace", version, about)]
pub struct Args {
    /// JSON-lines script of session messages and key presses.
    #[arg(short = 's', long)]
    pub script: PathBuf,

    /// Config file path override.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log filter directive override (e.g. `till=debug`).
    #[arg(long)]
    pub log_level: Option<String>,
}

pub fn parse() -> Args {
    Args::parse()
}
