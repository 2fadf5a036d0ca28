//! Repository capability and the batch functions built on it
//!
//! Entity storage lives outside this crate. Anything that can look
//! entities up by id and scan them by foreign key implements
//! [`Repository`], and the two adapters here turn such a repository into
//! the batch function of a one-to-one ([`ById`]) or one-to-many
//! ([`ByForeignKey`]) relation.

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::try_join_all;

use crate::error::{BatchError, RepositoryError};
use crate::relation::{BatchFn, LoadKey};

/// An entity addressable by key
pub trait Entity: Clone + Send + Sync + 'static {
    type Key: LoadKey;

    /// The entity's own identifying key
    fn key(&self) -> &Self::Key;

    /// Key of the parent entity, for entities on the "many" side of a relation
    fn foreign_key(&self) -> Option<&Self::Key> {
        None
    }
}

/// Read access to the entities of one type
#[async_trait]
pub trait Repository<E: Entity>: Send + Sync + 'static {
    async fn get_by_id(&self, id: &E::Key) -> Result<Option<E>, RepositoryError>;

    /// Entities for the given ids; ids without an entity are skipped
    async fn get_by_ids(&self, ids: &[E::Key]) -> Result<Vec<E>, RepositoryError>;

    /// Entities whose foreign key equals `key`
    async fn get_by_foreign_key(&self, key: &E::Key) -> Result<Vec<E>, RepositoryError>;

    /// Entities grouped by foreign key
    ///
    /// The provided implementation issues one `get_by_foreign_key` per key
    /// concurrently and fails with the first error. Stores with a bulk scan
    /// should override it.
    async fn get_by_foreign_keys(
        &self,
        keys: &[E::Key],
    ) -> Result<HashMap<E::Key, Vec<E>>, RepositoryError> {
        let lists = try_join_all(keys.iter().map(|key| self.get_by_foreign_key(key))).await?;
        Ok(keys.iter().cloned().zip(lists).collect())
    }
}

#[async_trait]
impl<E, R> Repository<E> for Arc<R>
where
    E: Entity,
    R: Repository<E> + ?Sized,
{
    async fn get_by_id(&self, id: &E::Key) -> Result<Option<E>, RepositoryError> {
        (**self).get_by_id(id).await
    }

    async fn get_by_ids(&self, ids: &[E::Key]) -> Result<Vec<E>, RepositoryError> {
        (**self).get_by_ids(ids).await
    }

    async fn get_by_foreign_key(&self, key: &E::Key) -> Result<Vec<E>, RepositoryError> {
        (**self).get_by_foreign_key(key).await
    }

    async fn get_by_foreign_keys(
        &self,
        keys: &[E::Key],
    ) -> Result<HashMap<E::Key, Vec<E>>, RepositoryError> {
        (**self).get_by_foreign_keys(keys).await
    }
}

/// One-to-one batch function: one `get_by_ids` per flush
pub struct ById<E, R> {
    repository: R,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> ById<E, R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, R> BatchFn<E::Key, E> for ById<E, R>
where
    E: Entity,
    R: Repository<E>,
{
    async fn load(&self, keys: &[E::Key]) -> Result<HashMap<E::Key, E>, BatchError> {
        let entities = self.repository.get_by_ids(keys).await?;
        Ok(entities
            .into_iter()
            .map(|entity| (entity.key().clone(), entity))
            .collect())
    }
}

/// One-to-many batch function: one `get_by_foreign_keys` per flush
pub struct ByForeignKey<E, R> {
    repository: R,
    _entity: PhantomData<fn() -> E>,
}

impl<E, R> ByForeignKey<E, R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            _entity: PhantomData,
        }
    }
}

#[async_trait]
impl<E, R> BatchFn<E::Key, Vec<E>> for ByForeignKey<E, R>
where
    E: Entity,
    R: Repository<E>,
{
    async fn load(&self, keys: &[E::Key]) -> Result<HashMap<E::Key, Vec<E>>, BatchError> {
        let mut grouped = self.repository.get_by_foreign_keys(keys).await?;

        // Every requested key gets an entry, even if empty
        for key in keys {
            grouped.entry(key.clone()).or_default();
        }

        Ok(grouped)
    }
}
