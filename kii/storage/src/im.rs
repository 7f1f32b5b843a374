// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! In-memory backend using persistent maps.
//!
//! Reads work on a snapshot of the data taken when the transaction started.
//! Writes are optimistic: they go into a private copy of the data, and the
//! commit fails if anyone else committed since the copy was taken.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ::im::OrdMap;

use crate::{
    Decode, Encode, KVRead, KVReadable, KVResult, KVStore, KVTransaction, KVTransactionPrepared,
    KVWritable, KVWrite,
};

type Namespaces<S> =
    OrdMap<<S as KVStore>::Namespace, OrdMap<<S as KVStore>::Repr, <S as KVStore>::Repr>>;

struct Committed<S: KVStore> {
    data: Namespaces<S>,
    /// Incremented on every commit, to detect conflicts.
    version: u64,
}

pub struct InMemoryBackend<S: KVStore> {
    committed: Arc<Mutex<Committed<S>>>,
}

impl<S: KVStore> Clone for InMemoryBackend<S> {
    fn clone(&self) -> Self {
        Self {
            committed: self.committed.clone(),
        }
    }
}

impl<S> Default for InMemoryBackend<S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    fn default() -> Self {
        Self {
            committed: Arc::new(Mutex::new(Committed {
                data: OrdMap::new(),
                version: 0,
            })),
        }
    }
}

impl<S> InMemoryBackend<S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of commits so far.
    pub fn version(&self) -> u64 {
        self.lock().version
    }

    fn lock(&self) -> MutexGuard<'_, Committed<S>> {
        // Writers only swap in complete maps, so a poisoned lock still guards consistent data.
        self.committed.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> (Namespaces<S>, u64) {
        let guard = self.lock();
        (guard.data.clone(), guard.version)
    }
}

/// Read-only view of the data as it was when the transaction started.
pub struct InMemoryReadTx<S: KVStore> {
    data: Namespaces<S>,
}

/// Private copy of the data collecting changes until commit.
pub struct InMemoryWriteTx<'a, S: KVStore> {
    backend: &'a InMemoryBackend<S>,
    data: Namespaces<S>,
    version: u64,
}

/// A write transaction that won the race and holds the lock.
pub struct InMemoryPreparedTx<'a, S: KVStore> {
    guard: MutexGuard<'a, Committed<S>>,
    data: Namespaces<S>,
}

fn get<S, K, V>(data: &Namespaces<S>, ns: &S::Namespace, k: &K) -> KVResult<Option<V>>
where
    S: KVStore + Encode<K> + Decode<V>,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    let key = S::to_repr(k)?;
    match data.get(ns).and_then(|m| m.get(&*key)) {
        Some(bz) => Ok(Some(S::from_repr(bz)?)),
        None => Ok(None),
    }
}

fn iterate<S, K, V>(data: &Namespaces<S>, ns: &S::Namespace) -> KVResult<Vec<(K, V)>>
where
    S: KVStore + Decode<K> + Decode<V>,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    match data.get(ns) {
        None => Ok(Vec::new()),
        Some(m) => m
            .iter()
            .map(|(k, v)| -> KVResult<(K, V)> { Ok((S::from_repr(k)?, S::from_repr(v)?)) })
            .collect(),
    }
}

impl<S> KVReadable<S> for InMemoryBackend<S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    type Tx<'a> = InMemoryReadTx<S>
    where
        Self: 'a;

    fn read(&self) -> Self::Tx<'_> {
        let (data, _) = self.snapshot();
        InMemoryReadTx { data }
    }
}

impl<S> KVWritable<S> for InMemoryBackend<S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    type Tx<'a> = InMemoryWriteTx<'a, S>
    where
        Self: 'a;

    fn write(&self) -> Self::Tx<'_> {
        let (data, version) = self.snapshot();
        InMemoryWriteTx {
            backend: self,
            data,
            version,
        }
    }
}

impl<S> KVRead<S> for InMemoryReadTx<S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    fn get<K, V>(&self, ns: &S::Namespace, k: &K) -> KVResult<Option<V>>
    where
        S: Encode<K> + Decode<V>,
    {
        get::<S, K, V>(&self.data, ns, k)
    }

    fn iterate<K, V>(&self, ns: &S::Namespace) -> KVResult<Vec<(K, V)>>
    where
        S: Decode<K> + Decode<V>,
    {
        iterate::<S, K, V>(&self.data, ns)
    }
}

impl<'a, S> KVRead<S> for InMemoryWriteTx<'a, S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    fn get<K, V>(&self, ns: &S::Namespace, k: &K) -> KVResult<Option<V>>
    where
        S: Encode<K> + Decode<V>,
    {
        get::<S, K, V>(&self.data, ns, k)
    }

    fn iterate<K, V>(&self, ns: &S::Namespace) -> KVResult<Vec<(K, V)>>
    where
        S: Decode<K> + Decode<V>,
    {
        iterate::<S, K, V>(&self.data, ns)
    }
}

impl<'a, S> KVWrite<S> for InMemoryWriteTx<'a, S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    fn put<K, V>(&mut self, ns: &S::Namespace, k: &K, v: &V) -> KVResult<()>
    where
        S: Encode<K> + Encode<V>,
    {
        let k = S::to_repr(k)?.into_owned();
        let v = S::to_repr(v)?.into_owned();

        let mut m = self.data.get(ns).cloned().unwrap_or_default();
        m.insert(k, v);
        self.data.insert(ns.clone(), m);

        Ok(())
    }

    fn delete<K>(&mut self, ns: &S::Namespace, k: &K) -> KVResult<()>
    where
        S: Encode<K>,
    {
        let k = S::to_repr(k)?;

        if let Some(m) = self.data.get_mut(ns) {
            m.remove(&*k);
        }

        Ok(())
    }
}

impl<'a, S> KVTransaction for InMemoryWriteTx<'a, S>
where
    S: KVStore,
    S::Namespace: Ord,
    S::Repr: Ord,
{
    type Prepared = InMemoryPreparedTx<'a, S>;

    fn prepare(self) -> KVResult<Option<Self::Prepared>> {
        let guard = self.backend.lock();
        if guard.version != self.version {
            return Ok(None);
        }
        Ok(Some(InMemoryPreparedTx {
            guard,
            data: self.data,
        }))
    }

    fn rollback(self) -> KVResult<()> {
        Ok(())
    }
}

impl<'a, S> KVTransactionPrepared for InMemoryPreparedTx<'a, S>
where
    S: KVStore,
{
    fn commit(mut self) -> KVResult<()> {
        self.guard.data = self.data;
        self.guard.version += 1;
        Ok(())
    }

    fn rollback(self) -> KVResult<()> {
        Ok(())
    }
}
