// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line arguments.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Guided stretch routines in the terminal
#[derive(Debug, Parser)]
#[command(name = "stretchflow", version, about)]
pub struct Cli {
    /// Config file (defaults to $STRETCHFLOW_CONFIG or the platform config dir)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Saved routine file, overriding the config
    #[arg(long, global = true, value_name = "PATH")]
    pub data_file: Option<PathBuf>,

    /// What to do; plays the routine when omitted
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show the poses in play order
    List {
        /// Speed used for the total time
        #[arg(long)]
        speed: Option<String>,
    },
    /// Move a pose from one position to another (1-based)
    Reorder {
        /// Current position
        from: usize,
        /// New position
        to: usize,
    },
    /// Set or flip the saved theme
    Theme {
        /// Theme to apply
        #[arg(value_enum)]
        mode: ThemeArg,
    },
    /// Write the active config to the config file and print its path
    Config,
    /// Play the routine
    Play {
        /// Starting speed: slow, normal or fast
        #[arg(long)]
        speed: Option<String>,
    },
}

/// Theme argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ThemeArg {
    /// Dark theme
    Dark,
    /// Light theme
    Light,
    /// Flip the current theme
    Toggle,
}
