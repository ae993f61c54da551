mod cli;
mod script;
mod session;

use std::io::Write;
use std::process::ExitCode;

use till_common::TillError;
use till_config::TillConfig;
use tracing_subscriber::filter::{Directive, LevelFilter};
use tracing_subscriber::EnvFilter;

use crate::session::Session;

/// Explicit `--config` must load; the default location falls back to
/// defaults so a fresh machine still runs.
fn load_config(args: &cli::Args) -> (Result<TillConfig, TillError>, Option<TillError>) {
    match &args.config {
        Some(path) => (till_config::load_from_path(path).map_err(TillError::from), None),
        None => match till_config::load_config() {
            Ok(config) => (Ok(config), None),
            Err(e) => (Ok(TillConfig::default()), Some(e.into())),
        },
    }
}

fn init_logging(directive: &str) {
    let directive: Directive = directive
        .parse()
        .unwrap_or_else(|_| LevelFilter::INFO.into());
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive))
        .init();
}

fn run(args: &cli::Args, config: &TillConfig) -> Result<usize, TillError> {
    let steps = script::load_script(&args.script)?;
    let mut session = Session::new(config);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let emitted = session.replay(&steps, |action| {
        serde_json::to_writer(&mut out, action)?;
        writeln!(out)?;
        Ok(())
    })?;
    session.shutdown();
    Ok(emitted)
}

fn main() -> ExitCode {
    let args = cli::parse();

    let (config, fallback_reason) = load_config(&args);
    let directive = match (&args.log_level, &config) {
        (Some(level), _) => level.clone(),
        (None, Ok(config)) => format!("till={}", config.logging.level.as_directive()),
        (None, Err(_)) => "till=info".to_string(),
    };
    init_logging(&directive);

    tracing::info!("till-keytrace v{} starting", env!("CARGO_PKG_VERSION"));
    if let Some(e) = fallback_reason {
        tracing::warn!("Config load failed, using defaults: {e}");
    }
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args, &config) {
        Ok(emitted) => {
            tracing::info!("done, {emitted} outbound actions");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
