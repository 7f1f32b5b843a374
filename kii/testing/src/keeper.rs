// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! Keepers over fresh in-memory storage, for tests.
use std::sync::Arc;

use kii_module::{BlockHeader, Context, Keeper, ModuleStore, STORE_KEY};
use kii_storage::im::InMemoryBackend;

pub const TEST_CHAIN_ID: &str = "kii-test";

pub type TestStore = ModuleStore<String>;
pub type TestBackend = InMemoryBackend<TestStore>;

/// Create a keeper and a context over empty storage, not shared with anything else.
pub fn kii_keeper() -> (Keeper<TestStore>, Context<TestBackend>) {
    let db = Arc::new(TestBackend::default());

    let header = BlockHeader {
        chain_id: TEST_CHAIN_ID.to_owned(),
        block_height: 1,
    };

    let ctx = Context::new(db, header);
    let k = Keeper::new(STORE_KEY.to_owned());

    (k, ctx)
}
