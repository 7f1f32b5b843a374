// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! The `kii` module: its parameters, its genesis state, and the keeper which
//! persists them in a namespace of a [`kii_storage::KVStore`].
//!
//! Genesis handling follows the usual module contract: [`init_genesis`] loads
//! a [`GenesisState`] into storage when the chain is created, and
//! [`export_genesis`] reads the stored state back out so it can seed a new chain.

mod context;
mod genesis;
mod keeper;
mod params;
mod store;

pub use context::{BlockHeader, BlockHeight, Context};
pub use genesis::{
    default_genesis_json, export_genesis, init_genesis, validate_genesis_json, GenesisError,
    GenesisState,
};
pub use keeper::Keeper;
pub use params::Params;
pub use store::{ModuleStore, ModuleStoreKey};

/// Name of the module.
pub const MODULE_NAME: &str = "kii";

/// Default namespace the module's keeper writes to.
pub const STORE_KEY: &str = MODULE_NAME;
