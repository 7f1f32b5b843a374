// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};
use tracing::Level;

pub mod genesis;

use genesis::GenesisArgs;

#[derive(Parser, Debug)]
#[command(version)]
pub struct Options {
    /// Set a custom directory for data and configuration files.
    #[arg(
        short = 'd',
        long,
        default_value = "~/.kii",
        env = "KII_HOME_DIR"
    )]
    pub home_dir: PathBuf,

    /// Optionally override the default configuration.
    #[arg(short, long, default_value = "dev")]
    pub mode: String,

    /// Set the logging level of the console, overriding the settings.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

impl Options {
    /// Tracing level requested on the command line, if any.
    pub fn tracing_level(&self) -> Option<Level> {
        match self.verbose {
            0 => None,
            1 => Some(Level::DEBUG),
            _ => Some(Level::TRACE),
        }
    }

    /// Path to the configuration directory, before expanding `~`.
    pub fn config_dir(&self) -> PathBuf {
        self.home_dir.join("config")
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subcommands related to the construction of genesis files.
    Genesis(GenesisArgs),
}

/// Arguments shared by commands that only need a file to work on.
#[derive(Args, Debug)]
pub struct FileArgs {
    /// Output file; print to STDOUT if missing.
    #[arg(long, short)]
    pub out: Option<PathBuf>,
}
