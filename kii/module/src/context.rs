// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
use std::sync::Arc;

use kii_storage::{
    KVError, KVReadable, KVResult, KVStore, KVTransaction, KVTransactionPrepared, KVWritable,
};
use serde::{Deserialize, Serialize};

pub type BlockHeight = u64;

/// The part of the block header the module gets to see.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub chain_id: String,
    pub block_height: BlockHeight,
}

/// Execution context of a request: the database the keepers operate on,
/// and the header of the block being executed.
pub struct Context<DB> {
    db: Arc<DB>,
    header: BlockHeader,
}

impl<DB> Clone for Context<DB> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            header: self.header.clone(),
        }
    }
}

impl<DB> Context<DB> {
    pub fn new(db: Arc<DB>, header: BlockHeader) -> Self {
        Self { db, header }
    }

    pub fn db(&self) -> &Arc<DB> {
        &self.db
    }

    pub fn header(&self) -> &BlockHeader {
        &self.header
    }

    pub fn chain_id(&self) -> &str {
        &self.header.chain_id
    }

    pub fn block_height(&self) -> BlockHeight {
        self.header.block_height
    }

    /// Same database, different height.
    pub fn with_block_height(&self, block_height: BlockHeight) -> Self {
        Self {
            db: self.db.clone(),
            header: BlockHeader {
                block_height,
                ..self.header.clone()
            },
        }
    }

    /// Run a closure against a read-only transaction.
    pub fn query<'a, S, F, T>(&'a self, f: F) -> KVResult<T>
    where
        S: KVStore,
        DB: KVReadable<S>,
        F: FnOnce(&<DB as KVReadable<S>>::Tx<'a>) -> KVResult<T>,
    {
        let tx = <DB as KVReadable<S>>::read(self.db.as_ref());
        f(&tx)
    }

    /// Run a closure against a read-write transaction and commit the changes,
    /// or roll them back if the closure fails.
    pub fn update<'a, S, F, T>(&'a self, f: F) -> KVResult<T>
    where
        S: KVStore,
        DB: KVWritable<S>,
        F: FnOnce(&mut <DB as KVWritable<S>>::Tx<'a>) -> KVResult<T>,
    {
        let mut tx = <DB as KVWritable<S>>::write(self.db.as_ref());

        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(e) => {
                KVTransaction::rollback(tx)?;
                return Err(e);
            }
        };

        match tx.prepare()? {
            Some(prepared) => {
                prepared.commit()?;
                Ok(value)
            }
            None => Err(KVError::Conflict),
        }
    }
}

#[cfg(feature = "arb")]
mod arb {
    use quickcheck::{Arbitrary, Gen};

    use super::BlockHeader;

    impl Arbitrary for BlockHeader {
        fn arbitrary(g: &mut Gen) -> Self {
            let len = usize::arbitrary(g) % 16 + 1;
            let chain_id = (0..len)
                .map(|_| *g.choose(b"abcdefghijklmnopqrstuvwxyz0123456789-").unwrap() as char)
                .collect();
            Self {
                chain_id,
                block_height: u64::arbitrary(g),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kii_storage::im::InMemoryBackend;
    use kii_storage::testing::{TestKVStore, TestNamespace};
    use kii_storage::{KVError, KVRead, KVWrite};

    use super::{BlockHeader, Context};

    type TestContext = Context<InMemoryBackend<TestKVStore>>;

    fn new_context() -> TestContext {
        let header = BlockHeader {
            chain_id: "test-chain".to_owned(),
            block_height: 10,
        };
        Context::new(Arc::new(InMemoryBackend::default()), header)
    }

    #[test]
    fn update_commits() {
        let ctx = new_context();
        let ns = TestNamespace::Alpha;

        ctx.update::<TestKVStore, _, _>(|tx| tx.put(&ns, &1u64, &"one".to_owned()))
            .unwrap();

        let v: Option<String> = ctx
            .query::<TestKVStore, _, _>(|tx| tx.get(&ns, &1u64))
            .unwrap();

        assert_eq!(v, Some("one".to_owned()));
    }

    #[test]
    fn failed_update_rolls_back() {
        let ctx = new_context();
        let ns = TestNamespace::Alpha;

        let res = ctx.update::<TestKVStore, _, ()>(|tx| {
            tx.put(&ns, &1u64, &"one".to_owned())?;
            Err(KVError::Unexpected("business rule violated".into()))
        });
        assert!(matches!(res, Err(KVError::Unexpected(_))));

        let v: Option<String> = ctx
            .query::<TestKVStore, _, _>(|tx| tx.get(&ns, &1u64))
            .unwrap();

        assert!(v.is_none());
    }

    #[test]
    fn conflicting_update_is_not_committed() {
        let ctx = new_context();
        let ns = TestNamespace::Alpha;

        let res = ctx.update::<TestKVStore, _, _>(|tx| {
            tx.put(&ns, &1u64, &"one".to_owned())?;
            // Another transaction commits before this one gets to.
            ctx.update::<TestKVStore, _, _>(|tx| tx.put(&ns, &2u64, &"two".to_owned()))
        });
        assert!(matches!(res, Err(KVError::Conflict)));

        let (v1, v2): (Option<String>, Option<String>) = ctx
            .query::<TestKVStore, _, _>(|tx| Ok((tx.get(&ns, &1u64)?, tx.get(&ns, &2u64)?)))
            .unwrap();

        assert!(v1.is_none());
        assert_eq!(v2, Some("two".to_owned()));
        assert_eq!(ctx.db().version(), 1);
    }

    #[test]
    fn header_json_field_names() {
        let header = BlockHeader {
            chain_id: "kii-test".to_owned(),
            block_height: 7,
        };
        let json = serde_json::to_value(&header).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "chain_id": "kii-test", "block_height": 7 })
        );
    }

    #[test]
    fn with_block_height_shares_the_db() {
        let ctx = new_context();
        let next = ctx.with_block_height(11);

        assert_eq!(next.block_height(), 11);
        assert_eq!(next.chain_id(), ctx.chain_id());
        assert!(Arc::ptr_eq(next.db(), ctx.db()));
    }
}
