//! Process-wide table of relations and their batch functions
//!
//! The registry is filled once at startup and then frozen behind an `Arc`.
//! Every dispatcher created afterwards reads from it without locking.

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ConfigurationError;
use crate::relation::{BatchFn, Cardinality, CardinalityKind, LoadKey, Relation, RelationSpec};

/// Public description of a registered relation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationInfo {
    pub name: &'static str,
    pub cardinality: CardinalityKind,
    pub key_type: &'static str,
    pub value_type: &'static str,
}

struct Registered {
    info: RelationInfo,
    spec: Box<dyn Any + Send + Sync>,
}

/// Registry of relation names to batch functions
#[derive(Default)]
pub struct RelationRegistry {
    relations: HashMap<&'static str, Registered>,
}

impl RelationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the batch function behind `relation`
    ///
    /// Fails if a relation with the same name is already registered.
    pub fn register<K, C, B>(
        &mut self,
        relation: Relation<K, C>,
        batch_fn: B,
    ) -> Result<&mut Self, ConfigurationError>
    where
        K: LoadKey,
        C: Cardinality,
        B: BatchFn<K, C::Item>,
    {
        let name = relation.name();
        if self.relations.contains_key(name) {
            return Err(ConfigurationError::DuplicateRelation(name));
        }

        let spec: RelationSpec<K, C> = RelationSpec {
            name,
            batch_fn: Arc::new(batch_fn),
        };
        let info = RelationInfo {
            name,
            cardinality: C::KIND,
            key_type: type_name::<K>(),
            value_type: type_name::<C::Output>(),
        };

        tracing::debug!(
            relation = name,
            cardinality = %info.cardinality,
            key_type = info.key_type,
            "Registered relation"
        );

        self.relations.insert(
            name,
            Registered {
                info,
                spec: Box::new(spec),
            },
        );
        Ok(self)
    }

    /// Look up a relation by name
    pub fn lookup(&self, name: &str) -> Result<&RelationInfo, ConfigurationError> {
        self.relations
            .get(name)
            .map(|registered| &registered.info)
            .ok_or_else(|| ConfigurationError::UnknownRelation(name.to_string()))
    }

    /// Typed lookup used by the dispatcher
    ///
    /// Checks the registered cardinality and key/value types against the
    /// ones carried by `relation`.
    pub fn spec<K, C>(
        &self,
        relation: &Relation<K, C>,
    ) -> Result<RelationSpec<K, C>, ConfigurationError>
    where
        K: LoadKey,
        C: Cardinality,
    {
        let name = relation.name();
        let registered = self
            .relations
            .get(name)
            .ok_or_else(|| ConfigurationError::UnknownRelation(name.to_string()))?;

        if registered.info.cardinality != C::KIND {
            return Err(ConfigurationError::CardinalityMismatch {
                name,
                expected: C::KIND,
                registered: registered.info.cardinality,
            });
        }

        (*registered.spec)
            .downcast_ref::<RelationSpec<K, C>>()
            .cloned()
            .ok_or(ConfigurationError::TypeMismatch {
                name,
                expected: type_name::<C::Output>(),
                registered: registered.info.value_type,
            })
    }

    /// Check that every named relation is registered
    pub fn validate<'a, I>(&self, names: I) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for name in names {
            self.lookup(name)?;
        }
        Ok(())
    }

    /// Registered relation names, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.relations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}

impl std::fmt::Debug for RelationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelationRegistry")
            .field("relations", &self.names())
            .finish()
    }
}
