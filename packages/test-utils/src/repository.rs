//! Repository doubles

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use brewery_relation_loader::{Entity, Repository, RepositoryError};

/// Vector-backed repository
///
/// Does not override `get_by_foreign_keys`, so it exercises the provided
/// per-key fan-out. Clones share the same entities.
pub struct VecRepository<E> {
    entities: Arc<RwLock<Vec<E>>>,
}

impl<E: Entity> VecRepository<E> {
    pub fn new(entities: impl IntoIterator<Item = E>) -> Self {
        Self {
            entities: Arc::new(RwLock::new(entities.into_iter().collect())),
        }
    }

    pub fn insert(&self, entity: E) {
        self.entities
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(entity);
    }

    pub fn len(&self) -> usize {
        self.entities.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn filter(&self, predicate: impl Fn(&E) -> bool) -> Vec<E> {
        self.entities
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|entity| predicate(entity))
            .cloned()
            .collect()
    }
}

impl<E> Clone for VecRepository<E> {
    fn clone(&self) -> Self {
        Self {
            entities: Arc::clone(&self.entities),
        }
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for VecRepository<E> {
    async fn get_by_id(&self, id: &E::Key) -> Result<Option<E>, RepositoryError> {
        Ok(self.filter(|entity| entity.key() == id).into_iter().next())
    }

    async fn get_by_ids(&self, ids: &[E::Key]) -> Result<Vec<E>, RepositoryError> {
        Ok(self.filter(|entity| ids.contains(entity.key())))
    }

    async fn get_by_foreign_key(&self, key: &E::Key) -> Result<Vec<E>, RepositoryError> {
        Ok(self.filter(|entity| entity.foreign_key() == Some(key)))
    }
}

/// Snapshot of the calls seen by a [`CountingRepository`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepositoryCalls {
    pub get_by_id: usize,
    pub get_by_ids: usize,
    pub get_by_foreign_key: usize,
    pub get_by_foreign_keys: usize,
}

#[derive(Default)]
struct Counters {
    get_by_id: AtomicUsize,
    get_by_ids: AtomicUsize,
    get_by_foreign_key: AtomicUsize,
    get_by_foreign_keys: AtomicUsize,
}

/// Wrapper counting the calls made against the inner repository
///
/// Clones share the counters.
pub struct CountingRepository<R> {
    inner: R,
    counters: Arc<Counters>,
}

impl<R> CountingRepository<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            counters: Arc::default(),
        }
    }

    pub fn calls(&self) -> RepositoryCalls {
        RepositoryCalls {
            get_by_id: self.counters.get_by_id.load(Ordering::SeqCst),
            get_by_ids: self.counters.get_by_ids.load(Ordering::SeqCst),
            get_by_foreign_key: self.counters.get_by_foreign_key.load(Ordering::SeqCst),
            get_by_foreign_keys: self.counters.get_by_foreign_keys.load(Ordering::SeqCst),
        }
    }
}

impl<R: Clone> Clone for CountingRepository<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}

#[async_trait]
impl<E, R> Repository<E> for CountingRepository<R>
where
    E: Entity,
    R: Repository<E>,
{
    async fn get_by_id(&self, id: &E::Key) -> Result<Option<E>, RepositoryError> {
        self.counters.get_by_id.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(id).await
    }

    async fn get_by_ids(&self, ids: &[E::Key]) -> Result<Vec<E>, RepositoryError> {
        self.counters.get_by_ids.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_ids(ids).await
    }

    async fn get_by_foreign_key(&self, key: &E::Key) -> Result<Vec<E>, RepositoryError> {
        self.counters.get_by_foreign_key.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_foreign_key(key).await
    }

    async fn get_by_foreign_keys(
        &self,
        keys: &[E::Key],
    ) -> Result<HashMap<E::Key, Vec<E>>, RepositoryError> {
        self.counters.get_by_foreign_keys.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_foreign_keys(keys).await
    }
}

/// Repository whose every call fails with `RepositoryError::Unavailable`
pub struct FailingRepository<E> {
    message: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E> FailingRepository<E> {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            _entity: PhantomData,
        }
    }

    fn error(&self) -> RepositoryError {
        RepositoryError::Unavailable(self.message.clone())
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for FailingRepository<E> {
    async fn get_by_id(&self, _id: &E::Key) -> Result<Option<E>, RepositoryError> {
        Err(self.error())
    }

    async fn get_by_ids(&self, _ids: &[E::Key]) -> Result<Vec<E>, RepositoryError> {
        Err(self.error())
    }

    async fn get_by_foreign_key(&self, _key: &E::Key) -> Result<Vec<E>, RepositoryError> {
        Err(self.error())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{sample_beers, TestBeer};

    #[tokio::test]
    async fn test_counting_repository_counts_the_outer_call_only() {
        let repository = CountingRepository::new(VecRepository::new(sample_beers()));

        let grouped = Repository::<TestBeer>::get_by_foreign_keys(
            &repository,
            &["b1".to_string(), "b2".to_string()],
        )
        .await
        .unwrap();

        assert_eq!(grouped["b1"].len(), 2);
        assert!(grouped["b2"].is_empty());
        assert_eq!(
            repository.calls(),
            RepositoryCalls {
                get_by_foreign_keys: 1,
                ..Default::default()
            }
        );
    }

    #[tokio::test]
    async fn test_failing_repository() {
        let repository = FailingRepository::<TestBeer>::new("offline");
        let err = repository.get_by_id(&"beerA".to_string()).await.unwrap_err();
        assert_eq!(err.to_string(), "repository unavailable: offline");
    }

    #[test]
    fn test_inserted_entities_are_visible() {
        let repository = VecRepository::new(sample_beers());
        repository.insert(TestBeer::new("beerD", "Porter", "b2"));
        assert_eq!(repository.len(), 4);

        let beers = tokio_test::block_on(repository.get_by_foreign_key(&"b2".to_string()));
        let names: Vec<_> = tokio_test::assert_ok!(beers)
            .into_iter()
            .map(|beer| beer.name)
            .collect();
        assert_eq!(names, vec!["Porter".to_string()]);
    }
}
