// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::{borrow::Cow, marker::PhantomData};

use kii_storage::{Codec, Decode, Encode, KVError, KVResult, KVStore};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Keys of the records the module keeps in its namespace.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleStoreKey {
    Params,
}

/// KV store family of the module, storing everything as JSON.
#[derive(Clone)]
pub struct ModuleStore<NS> {
    _ns: PhantomData<NS>,
}

impl<NS> KVStore for ModuleStore<NS>
where
    NS: Clone,
{
    type Repr = Vec<u8>;
    type Namespace = NS;
}

impl<NS, T> Codec<T> for ModuleStore<NS> where ModuleStore<NS>: Encode<T> + Decode<T> {}

/// JSON serialization.
impl<NS, T> Encode<T> for ModuleStore<NS>
where
    NS: Clone,
    T: Serialize,
{
    fn to_repr(value: &T) -> KVResult<Cow<Self::Repr>> {
        serde_json::to_vec(value)
            .map_err(|e| KVError::Codec(Box::new(e)))
            .map(Cow::Owned)
    }
}

/// JSON deserialization.
impl<NS, T> Decode<T> for ModuleStore<NS>
where
    NS: Clone,
    T: DeserializeOwned,
{
    fn from_repr(repr: &Self::Repr) -> KVResult<T> {
        serde_json::from_slice(repr).map_err(|e| KVError::Codec(Box::new(e)))
    }
}
