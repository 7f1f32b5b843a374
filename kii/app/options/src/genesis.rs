// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::FileArgs;

#[derive(Args, Debug)]
pub struct GenesisArgs {
    /// Path to the genesis JSON file.
    #[arg(long, short)]
    pub genesis_file: PathBuf,

    #[command(subcommand)]
    pub command: GenesisCommands,
}

#[derive(Subcommand, Debug)]
pub enum GenesisCommands {
    /// Create a new genesis file with the default module state.
    New(GenesisNewArgs),
    /// Check that the genesis file can be parsed and is valid.
    Validate,
    /// Load the genesis file into a fresh in-memory store, then export it back.
    Export(GenesisExportArgs),
}

#[derive(Args, Debug)]
pub struct GenesisNewArgs {
    /// Overwrite the genesis file if it already exists.
    #[arg(long, short)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct GenesisExportArgs {
    #[command(flatten)]
    pub file: FileArgs,
}
