// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::path::Path;

use anyhow::Context as _;
use kii_storage::{Codec, Encode, KVReadable, KVStore, KVWritable};
use serde::{Deserialize, Serialize};

use crate::{Context, Keeper, ModuleStoreKey, Params};

#[derive(Debug, thiserror::Error)]
pub enum GenesisError {
    #[error("failed to parse genesis JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("genesis file IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The module's section of the genesis file.
///
/// `Default` is the genesis a new chain starts with.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct GenesisState {
    pub params: Params,
}

impl GenesisState {
    /// Perform basic validation of the genesis state.
    pub fn validate(&self) -> Result<(), GenesisError> {
        self.params.validate()
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, GenesisError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<String, GenesisError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read a genesis file, without validating it.
    pub fn read_file(path: impl AsRef<Path>) -> Result<Self, GenesisError> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<(), GenesisError> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// JSON of the default genesis state, to put into a fresh genesis file.
pub fn default_genesis_json() -> Result<String, GenesisError> {
    GenesisState::default().to_json()
}

/// Parse and validate the module's section of a genesis file.
pub fn validate_genesis_json(bytes: &[u8]) -> Result<GenesisState, GenesisError> {
    let genesis = GenesisState::from_json(bytes)?;
    genesis.validate()?;
    Ok(genesis)
}

/// Initialize the module's state from the genesis state.
pub fn init_genesis<S, DB>(
    ctx: &Context<DB>,
    k: &Keeper<S>,
    genesis: GenesisState,
) -> anyhow::Result<()>
where
    S: KVStore + Encode<ModuleStoreKey> + Codec<Params>,
    DB: KVWritable<S>,
{
    genesis.validate().context("invalid genesis state")?;

    k.set_params(ctx, &genesis.params)
        .context("failed to set params")?;

    tracing::info!(
        chain_id = ctx.chain_id(),
        block_height = ctx.block_height(),
        "initialized genesis state"
    );

    Ok(())
}

/// Export the module's state as a genesis state.
pub fn export_genesis<S, DB>(ctx: &Context<DB>, k: &Keeper<S>) -> anyhow::Result<GenesisState>
where
    S: KVStore + Encode<ModuleStoreKey> + Codec<Params>,
    DB: KVReadable<S>,
{
    let mut genesis = GenesisState::default();

    genesis.params = k.get_params(ctx).context("failed to get params")?;

    tracing::info!(
        chain_id = ctx.chain_id(),
        block_height = ctx.block_height(),
        "exported genesis state"
    );

    Ok(genesis)
}

#[cfg(feature = "arb")]
mod arb {
    use quickcheck::{Arbitrary, Gen};

    use super::GenesisState;
    use crate::Params;

    impl Arbitrary for GenesisState {
        fn arbitrary(g: &mut Gen) -> Self {
            Self {
                params: Params::arbitrary(g),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{default_genesis_json, validate_genesis_json, GenesisError, GenesisState};

    #[test]
    fn default_genesis_is_valid() {
        let json = default_genesis_json().unwrap();
        let genesis = validate_genesis_json(json.as_bytes()).unwrap();
        assert_eq!(genesis, GenesisState::default());
    }

    #[test]
    fn missing_params_are_rejected() {
        let res = validate_genesis_json(b"{}");
        assert!(matches!(res, Err(GenesisError::Json(_))));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let res = validate_genesis_json(br#"{"params": {}, "post_list": []}"#);
        assert!(matches!(res, Err(GenesisError::Json(_))));
    }

    #[test]
    fn genesis_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("genesis.json");

        let genesis = GenesisState::default();
        genesis.write_file(&path).unwrap();

        assert_eq!(GenesisState::read_file(&path).unwrap(), genesis);
    }

    #[test]
    fn missing_genesis_file() {
        let dir = tempfile::tempdir().unwrap();
        let res = GenesisState::read_file(dir.path().join("nope.json"));
        assert!(matches!(res, Err(GenesisError::Io(_))));
    }
}
