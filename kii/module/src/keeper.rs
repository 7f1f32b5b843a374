// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use kii_storage::{Codec, Encode, KVCollection, KVReadable, KVResult, KVStore, KVWritable};

use crate::{Context, ModuleStoreKey, Params};

/// Access to the module's records in its namespace.
///
/// The keeper itself holds no data; everything goes through the database of
/// the [`Context`] it's called with.
pub struct Keeper<S: KVStore> {
    params: KVCollection<S, ModuleStoreKey, Params>,
}

impl<S: KVStore> Clone for Keeper<S> {
    fn clone(&self) -> Self {
        Self {
            params: self.params.clone(),
        }
    }
}

impl<S> Keeper<S>
where
    S: KVStore + Encode<ModuleStoreKey> + Codec<Params>,
{
    pub fn new(namespace: S::Namespace) -> Self {
        Self {
            params: KVCollection::new(namespace),
        }
    }

    pub fn namespace(&self) -> &S::Namespace {
        self.params.namespace()
    }

    /// Get the current parameters; the zero value if none have been set yet.
    pub fn get_params<DB>(&self, ctx: &Context<DB>) -> KVResult<Params>
    where
        DB: KVReadable<S>,
    {
        let params = ctx.query::<S, _, _>(|tx| self.params.get(tx, &ModuleStoreKey::Params))?;

        match params {
            Some(params) => Ok(params),
            None => {
                tracing::debug!(
                    block_height = ctx.block_height(),
                    "params not found in store, using zero value"
                );
                Ok(Params::default())
            }
        }
    }

    /// Overwrite the parameters.
    pub fn set_params<DB>(&self, ctx: &Context<DB>, params: &Params) -> KVResult<()>
    where
        DB: KVWritable<S>,
    {
        ctx.update::<S, _, _>(|tx| self.params.put(tx, &ModuleStoreKey::Params, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kii_storage::im::InMemoryBackend;
    use kii_storage::KVRead;
    use quickcheck_macros::quickcheck;

    use crate::{BlockHeader, Context, ModuleStore, ModuleStoreKey, Params, STORE_KEY};

    use super::Keeper;

    type TestStore = ModuleStore<String>;

    fn setup(header: BlockHeader) -> (Keeper<TestStore>, Context<InMemoryBackend<TestStore>>) {
        let ctx = Context::new(Arc::new(InMemoryBackend::default()), header);
        (Keeper::new(STORE_KEY.to_owned()), ctx)
    }

    #[quickcheck]
    fn params_round_trip(header: BlockHeader, params: Params) -> bool {
        let (k, ctx) = setup(header);
        k.set_params(&ctx, &params).unwrap();
        k.get_params(&ctx).unwrap() == params
    }

    #[test]
    fn missing_params_are_zero() {
        let (k, ctx) = setup(BlockHeader {
            chain_id: "kii-test".to_owned(),
            block_height: 0,
        });
        assert_eq!(k.get_params(&ctx).unwrap(), Params::default());
    }

    #[test]
    fn keepers_in_different_namespaces_are_isolated() {
        let (k1, ctx) = setup(BlockHeader {
            chain_id: "kii-test".to_owned(),
            block_height: 0,
        });
        let k2 = Keeper::<TestStore>::new("other".to_owned());

        k1.set_params(&ctx, &Params::default()).unwrap();

        let count = |k: &Keeper<TestStore>| {
            ctx.query::<TestStore, _, _>(|tx| {
                tx.iterate::<ModuleStoreKey, Params>(k.namespace())
            })
            .unwrap()
            .len()
        };

        assert_eq!(count(&k1), 1);
        assert_eq!(count(&k2), 0);
        assert_eq!(ctx.db().version(), 1);
    }
}
