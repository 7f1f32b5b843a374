// Copyright 2022-2023 Protocol Labs
// SPDX-License-Identifier: Apache-2.0, MIT
//! Key-value storage abstraction used by the module keepers.
//!
//! The traits are independent of any particular database; a backend only has
//! to hand out read and write transactions over namespaced byte maps, while
//! the store type `S` decides how keys and values are turned into bytes.
use std::borrow::Cow;
use std::error::Error;
use std::marker::PhantomData;

#[cfg(feature = "inmem")]
pub mod im;
#[cfg(feature = "testing")]
pub mod testing;

/// Possible errors during key-value operations.
#[derive(Debug, thiserror::Error)]
pub enum KVError {
    #[error("operation failed because there was a write conflict")]
    Conflict,
    #[error("data serialization error: {0}")]
    Codec(Box<dyn Error + Send + Sync>),
    #[error("unexpected error: {0}")]
    Unexpected(Box<dyn Error + Send + Sync>),
}

pub type KVResult<T> = Result<T, KVError>;

/// Helper trait to reduce the number of generic parameters that infect anything
/// that has to use a KV store. It's a type family of all customizable types
/// that can vary by KV store implementation.
pub trait KVStore {
    /// Type specifying in which collection to store some homogenous data set.
    type Namespace: Clone;

    /// The type used for storing data at rest, e.g. in binary format or JSON.
    type Repr: Clone;
}

/// Encode data as binary with a serialization scheme.
pub trait Encode<T>
where
    Self: KVStore,
{
    fn to_repr(value: &T) -> KVResult<Cow<Self::Repr>>;
}

/// Decode data from binary with a serialization scheme.
pub trait Decode<T>
where
    Self: KVStore,
{
    fn from_repr(repr: &Self::Repr) -> KVResult<T>;
}

/// Encode and decode data.
///
/// Ideally this would be just a trait alias, but that's an unstable feature.
pub trait Codec<T>: Encode<T> + Decode<T> {}

/// Operations available on a read transaction.
pub trait KVRead<S: KVStore> {
    fn get<K, V>(&self, ns: &S::Namespace, k: &K) -> KVResult<Option<V>>
    where
        S: Encode<K> + Decode<V>;

    /// Decode every entry of a namespace, in the order of their key representation.
    fn iterate<K, V>(&self, ns: &S::Namespace) -> KVResult<Vec<(K, V)>>
    where
        S: Decode<K> + Decode<V>;
}

/// Operations available on a write transaction.
pub trait KVWrite<S: KVStore>: KVRead<S> {
    fn put<K, V>(&mut self, ns: &S::Namespace, k: &K, v: &V) -> KVResult<()>
    where
        S: Encode<K> + Encode<V>;

    fn delete<K>(&mut self, ns: &S::Namespace, k: &K) -> KVResult<()>
    where
        S: Encode<K>;
}

/// Transaction running on a KV store, ending with a commit or a rollback.
/// This mimics the `Aux` interface in the STM module.
pub trait KVTransaction {
    type Prepared: KVTransactionPrepared;

    /// Check for write conflicts, then lock the store until the transaction
    /// is committed or rolled back.
    ///
    /// Returns `None` if there was a conflict with another transaction.
    fn prepare(self) -> KVResult<Option<Self::Prepared>>;

    /// Roll back all changes.
    fn rollback(self) -> KVResult<()>;
}

/// A transaction which passed the conflict check and holds the store lock.
pub trait KVTransactionPrepared {
    /// Write the changes to the underlying storage.
    fn commit(self) -> KVResult<()>;

    /// Release the lock without writing anything.
    fn rollback(self) -> KVResult<()>;
}

/// Interface for stores that support read-only transactions.
///
/// Any resources held by the read transaction should be released when it's dropped.
pub trait KVReadable<S: KVStore> {
    type Tx<'a>: KVRead<S>
    where
        Self: 'a;

    /// Start a read-only transaction.
    fn read(&self) -> Self::Tx<'_>;
}

/// Interface for stores that support read-write transactions.
pub trait KVWritable<S: KVStore> {
    type Tx<'a>: KVWrite<S> + KVTransaction
    where
        Self: 'a;

    /// Start a read-write transaction.
    fn write(&self) -> Self::Tx<'_>;
}

/// A collection of homogenous objects under the same namespace.
pub struct KVCollection<S: KVStore, K, V> {
    ns: S::Namespace,
    phantom_k: PhantomData<K>,
    phantom_v: PhantomData<V>,
}

impl<S: KVStore, K, V> Clone for KVCollection<S, K, V> {
    fn clone(&self) -> Self {
        Self::new(self.ns.clone())
    }
}

impl<S: KVStore, K, V> KVCollection<S, K, V> {
    pub fn new(ns: S::Namespace) -> Self {
        Self {
            ns,
            phantom_k: PhantomData,
            phantom_v: PhantomData,
        }
    }

    pub fn namespace(&self) -> &S::Namespace {
        &self.ns
    }
}

impl<S, K, V> KVCollection<S, K, V>
where
    S: KVStore + Encode<K> + Codec<V>,
{
    pub fn get(&self, kv: &impl KVRead<S>, k: &K) -> KVResult<Option<V>> {
        kv.get(&self.ns, k)
    }

    pub fn put(&self, kv: &mut impl KVWrite<S>, k: &K, v: &V) -> KVResult<()> {
        kv.put(&self.ns, k, v)
    }

    pub fn delete(&self, kv: &mut impl KVWrite<S>, k: &K) -> KVResult<()> {
        kv.delete(&self.ns, k)
    }
}

impl<S, K, V> KVCollection<S, K, V>
where
    S: KVStore + Codec<K> + Codec<V>,
{
    pub fn iterate(&self, kv: &impl KVRead<S>) -> KVResult<Vec<(K, V)>> {
        kv.iterate(&self.ns)
    }
}
