// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT

use anyhow::{anyhow, Context};
use std::path::Path;
use std::sync::Arc;

use kii_module::{BlockHeader, GenesisState, Keeper, ModuleStore, STORE_KEY};
use kii_storage::im::InMemoryBackend;

use crate::cmd;
use crate::options::genesis::{GenesisArgs, GenesisCommands, GenesisExportArgs, GenesisNewArgs};

cmd! {
  GenesisArgs(self, settings) {
    let genesis_file = self.genesis_file.as_path();

    match &self.command {
      GenesisCommands::New(args) => new_genesis(genesis_file, args),
      GenesisCommands::Validate => validate_genesis(genesis_file).map(|_| ()),
      GenesisCommands::Export(args) => {
        let json = export_genesis(genesis_file, settings.block_header())?;
        write_output(&json, args)
      }
    }
  }
}

fn new_genesis(genesis_file: &Path, args: &GenesisNewArgs) -> anyhow::Result<()> {
    if genesis_file.exists() && !args.force {
        return Err(anyhow!(
            "genesis file {genesis_file:?} already exists; use --force to overwrite"
        ));
    }

    let json = kii_module::default_genesis_json()?;
    std::fs::write(genesis_file, json).context("failed to write genesis")?;

    tracing::info!(path = ?genesis_file, "created genesis file");

    Ok(())
}

fn validate_genesis(genesis_file: &Path) -> anyhow::Result<GenesisState> {
    let bytes = std::fs::read(genesis_file).context("failed to read genesis")?;
    let genesis = kii_module::validate_genesis_json(&bytes).context("invalid genesis")?;

    tracing::info!(path = ?genesis_file, "genesis file is valid");

    Ok(genesis)
}

/// Initialize a fresh store from the genesis file and export the result as JSON.
fn export_genesis(genesis_file: &Path, header: BlockHeader) -> anyhow::Result<String> {
    let genesis = validate_genesis(genesis_file)?;

    let db = Arc::new(InMemoryBackend::<ModuleStore<String>>::default());
    let ctx = kii_module::Context::new(db, header);
    let k = Keeper::<ModuleStore<String>>::new(STORE_KEY.to_owned());

    kii_module::init_genesis(&ctx, &k, genesis).context("failed to init genesis")?;
    let exported = kii_module::export_genesis(&ctx, &k).context("failed to export genesis")?;

    let json = exported.to_json()?;

    Ok(json)
}

fn write_output(json: &str, args: &GenesisExportArgs) -> anyhow::Result<()> {
    match args.file.out {
        Some(ref out) => std::fs::write(out, json).context("failed to write output"),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}
