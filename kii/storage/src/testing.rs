// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! Generic properties every backend should satisfy, to be run with `quickcheck`.
use std::borrow::Cow;
use std::collections::BTreeMap;

use quickcheck::{Arbitrary, Gen};

use crate::{
    Codec, Decode, Encode, KVError, KVRead, KVReadable, KVResult, KVStore, KVTransaction,
    KVTransactionPrepared, KVWritable, KVWrite,
};

#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum TestNamespace {
    Alpha,
    Beta,
}

impl Arbitrary for TestNamespace {
    fn arbitrary(g: &mut Gen) -> Self {
        if bool::arbitrary(g) {
            TestNamespace::Alpha
        } else {
            TestNamespace::Beta
        }
    }
}

/// Store with big-endian integer keys and UTF-8 string values.
#[derive(Clone)]
pub struct TestKVStore;

impl KVStore for TestKVStore {
    type Namespace = TestNamespace;
    type Repr = Vec<u8>;
}

impl Encode<u64> for TestKVStore {
    fn to_repr(value: &u64) -> KVResult<Cow<Self::Repr>> {
        Ok(Cow::Owned(value.to_be_bytes().to_vec()))
    }
}

impl Decode<u64> for TestKVStore {
    fn from_repr(repr: &Self::Repr) -> KVResult<u64> {
        let bz: [u8; 8] = repr
            .as_slice()
            .try_into()
            .map_err(|e| KVError::Codec(Box::new(e)))?;
        Ok(u64::from_be_bytes(bz))
    }
}

impl Encode<String> for TestKVStore {
    fn to_repr(value: &String) -> KVResult<Cow<Self::Repr>> {
        Ok(Cow::Owned(value.as_bytes().to_vec()))
    }
}

impl Decode<String> for TestKVStore {
    fn from_repr(repr: &Self::Repr) -> KVResult<String> {
        String::from_utf8(repr.clone()).map_err(|e| KVError::Codec(Box::new(e)))
    }
}

impl Codec<u64> for TestKVStore {}
impl Codec<String> for TestKVStore {}

#[derive(Clone, Debug)]
pub enum TestOp {
    Put(TestNamespace, u64, String),
    Delete(TestNamespace, u64),
}

impl Arbitrary for TestOp {
    fn arbitrary(g: &mut Gen) -> Self {
        let ns = TestNamespace::arbitrary(g);
        // Small key space so that operations hit the same keys.
        let k = u64::arbitrary(g) % 16;
        if u8::arbitrary(g) % 4 == 0 {
            TestOp::Delete(ns, k)
        } else {
            TestOp::Put(ns, k, String::arbitrary(g))
        }
    }
}

/// A sequence of operations to apply in a single transaction.
#[derive(Clone, Debug)]
pub struct TestData {
    pub ops: Vec<TestOp>,
}

impl Arbitrary for TestData {
    fn arbitrary(g: &mut Gen) -> Self {
        Self {
            ops: Vec::arbitrary(g),
        }
    }
}

type Model = BTreeMap<TestNamespace, BTreeMap<u64, String>>;

fn apply<W: KVWrite<TestKVStore>>(tx: &mut W, data: &TestData, model: &mut Model) -> KVResult<()> {
    for op in &data.ops {
        match op {
            TestOp::Put(ns, k, v) => {
                tx.put(ns, k, v)?;
                model.entry(ns.clone()).or_default().insert(*k, v.clone());
            }
            TestOp::Delete(ns, k) => {
                tx.delete(ns, k)?;
                if let Some(m) = model.get_mut(ns) {
                    m.remove(k);
                }
            }
        }
    }
    Ok(())
}

fn matches_model<R: KVRead<TestKVStore>>(tx: &R, model: &Model) -> KVResult<bool> {
    for ns in [TestNamespace::Alpha, TestNamespace::Beta] {
        let expected = model
            .get(&ns)
            .map(|m| m.clone().into_iter().collect::<Vec<_>>())
            .unwrap_or_default();

        for (k, v) in &expected {
            let found: Option<String> = tx.get(&ns, k)?;
            if found.as_ref() != Some(v) {
                return Ok(false);
            }
        }

        let found: Vec<(u64, String)> = tx.iterate(&ns)?;
        if found != expected {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Whatever was committed can be read back, both in key lookups and iteration.
pub fn check_write_read_commit<DB>(db: &DB, data: &TestData) -> bool
where
    DB: KVWritable<TestKVStore> + KVReadable<TestKVStore>,
{
    let mut model = Model::new();
    let mut tx = db.write();

    if apply(&mut tx, data, &mut model).is_err() {
        return false;
    }
    // Read-your-writes before commit.
    if !matches!(matches_model(&tx, &model), Ok(true)) {
        return false;
    }
    match tx.prepare() {
        Ok(Some(prepared)) => {
            if prepared.commit().is_err() {
                return false;
            }
        }
        _ => return false,
    }

    let tx = db.read();
    matches!(matches_model(&tx, &model), Ok(true))
}

/// Rolled back changes leave no trace.
pub fn check_write_rollback<DB>(db: &DB, data: &TestData) -> bool
where
    DB: KVWritable<TestKVStore> + KVReadable<TestKVStore>,
{
    let mut model = Model::new();
    let mut tx = db.write();

    if apply(&mut tx, data, &mut model).is_err() {
        return false;
    }
    if KVTransaction::rollback(tx).is_err() {
        return false;
    }

    let tx = db.read();
    matches!(matches_model(&tx, &Model::new()), Ok(true))
}

/// Uncommitted changes are not visible to readers.
pub fn check_write_isolation<DB>(db: &DB, data: &TestData) -> bool
where
    DB: KVWritable<TestKVStore> + KVReadable<TestKVStore>,
{
    let mut model = Model::new();
    let mut tx = db.write();

    if apply(&mut tx, data, &mut model).is_err() {
        return false;
    }

    let visible = matches!(matches_model(&db.read(), &Model::new()), Ok(true));

    KVTransaction::rollback(tx).is_ok() && visible
}
