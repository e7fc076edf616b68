// SPDX-License-Identifier: MIT OR Apache-2.0
//! `StretchFlow` - guided stretch routines in the terminal
//!
//! Plays an ordered set of stretch poses with a get-ready hold, per-pose
//! countdowns at a chosen speed and a short announcement between poses.
//! The pose order and theme preference are saved between runs.
//!
//! ## Architecture
//!
//! Routine state, timing and the playback state machine live in
//! `stretchflow_routine`. This binary adds config, the command line, a
//! terminal presenter and a tokio loop that drives playback.

mod app;
mod cli;
mod config;
mod error;
mod presenter;
mod runner;
mod theme;

use app::StretchApp;
use clap::Parser;
use cli::Cli;
use config::AppConfig;
use error::AppResult;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

fn init_tracing(config: &AppConfig) {
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in config.log_filter.split(',').map(str::trim).filter(|d| !d.is_empty()) {
        match directive.parse() {
            Ok(directive) => env_filter = env_filter.add_directive(directive),
            Err(e) => eprintln!("Ignoring log filter '{directive}': {e}"),
        }
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> AppResult<()> {
    let config_path = config::resolve_config_path(cli.config.as_deref());
    let config = match AppConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            init_tracing(&AppConfig::default());
            return Err(e.into());
        }
    };

    init_tracing(&config);
    tracing::info!("Starting StretchFlow v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_path.display(), "Loaded config");

    StretchApp::new(config, config_path, cli.data_file).run(cli.command)
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}
