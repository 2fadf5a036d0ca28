//! Generic in-memory repository

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use brewery_relation_loader::{Entity, Repository, RepositoryError};

struct Snapshot<E: Entity> {
    /// Entities in seed file order
    entities: Vec<E>,
    by_id: HashMap<E::Key, usize>,
    by_foreign_key: HashMap<E::Key, Vec<usize>>,
}

/// Read-only repository over a snapshot of entities
///
/// Keyed by id with a secondary index on the foreign key. Cloning is cheap
/// and every clone shares the same snapshot.
pub struct InMemoryRepository<E: Entity> {
    snapshot: Arc<Snapshot<E>>,
}

impl<E: Entity> InMemoryRepository<E> {
    /// Build a repository; for duplicate ids the last entity wins
    pub fn new(entities: impl IntoIterator<Item = E>) -> Self {
        let mut deduped: Vec<E> = Vec::new();
        let mut by_id = HashMap::new();

        for entity in entities {
            match by_id.get(entity.key()) {
                Some(&index) => {
                    tracing::warn!(id = ?entity.key(), "Duplicate id in seed data, replacing");
                    deduped[index] = entity;
                }
                None => {
                    by_id.insert(entity.key().clone(), deduped.len());
                    deduped.push(entity);
                }
            }
        }

        let mut by_foreign_key: HashMap<E::Key, Vec<usize>> = HashMap::new();
        for (index, entity) in deduped.iter().enumerate() {
            if let Some(foreign_key) = entity.foreign_key() {
                by_foreign_key
                    .entry(foreign_key.clone())
                    .or_default()
                    .push(index);
            }
        }

        Self {
            snapshot: Arc::new(Snapshot {
                entities: deduped,
                by_id,
                by_foreign_key,
            }),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn count(&self) -> usize {
        self.snapshot.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.entities.is_empty()
    }

    pub fn find(&self, id: &E::Key) -> Option<&E> {
        self.snapshot
            .by_id
            .get(id)
            .map(|&index| &self.snapshot.entities[index])
    }

    fn children(&self, key: &E::Key) -> Vec<E> {
        self.snapshot
            .by_foreign_key
            .get(key)
            .map(|indexes| {
                indexes
                    .iter()
                    .map(|&index| self.snapshot.entities[index].clone())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<E> InMemoryRepository<E>
where
    E: Entity,
    E::Key: Ord,
{
    /// Every entity, sorted by id
    pub fn get_all(&self) -> Vec<E> {
        let mut all = self.snapshot.entities.clone();
        all.sort_by(|a, b| a.key().cmp(b.key()));
        all
    }
}

impl<E: Entity> Clone for InMemoryRepository<E> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
        }
    }
}

impl<E: Entity> std::fmt::Debug for InMemoryRepository<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryRepository")
            .field("count", &self.count())
            .finish()
    }
}

#[async_trait]
impl<E: Entity> Repository<E> for InMemoryRepository<E> {
    async fn get_by_id(&self, id: &E::Key) -> Result<Option<E>, RepositoryError> {
        Ok(self.find(id).cloned())
    }

    async fn get_by_ids(&self, ids: &[E::Key]) -> Result<Vec<E>, RepositoryError> {
        Ok(ids.iter().filter_map(|id| self.find(id).cloned()).collect())
    }

    async fn get_by_foreign_key(&self, key: &E::Key) -> Result<Vec<E>, RepositoryError> {
        Ok(self.children(key))
    }

    async fn get_by_foreign_keys(
        &self,
        keys: &[E::Key],
    ) -> Result<HashMap<E::Key, Vec<E>>, RepositoryError> {
        Ok(keys
            .iter()
            .map(|key| (key.clone(), self.children(key)))
            .collect())
    }
}
