//! Typed relation descriptors and batch functions
//!
//! A [`Relation`] ties a stable name to a key type and a [`Cardinality`]
//! at compile time. Resolvers refer to relations through these descriptors
//! (usually `const` items), so the registry can check on first use that the
//! batch function registered under the name has the shape the caller expects.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BatchError;

/// Bounds required of relation keys
pub trait LoadKey: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

impl<T> LoadKey for T where T: Clone + Eq + Hash + fmt::Debug + Send + Sync + 'static {}

/// Runtime tag for a relation's cardinality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardinalityKind {
    /// A key maps to at most one related entity
    One,
    /// A key maps to an ordered collection of related entities
    Many,
}

impl fmt::Display for CardinalityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::One => write!(f, "one"),
            Self::Many => write!(f, "many"),
        }
    }
}

/// Type-level cardinality of a relation
///
/// `Item` is what the batch function returns per key, `Output` is what a
/// load handle resolves to. [`Cardinality::resolve`] supplies the default
/// for keys the batch function left out of its result.
pub trait Cardinality: Send + Sync + 'static {
    type Item: Clone + Send + Sync + 'static;
    type Output: Clone + Send + Sync + 'static;

    const KIND: CardinalityKind;

    fn resolve(item: Option<&Self::Item>) -> Self::Output;
}

/// One-to-one relation resolving to `Option<T>`
pub struct One<T>(PhantomData<fn() -> T>);

impl<T> Cardinality for One<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;
    type Output = Option<T>;

    const KIND: CardinalityKind = CardinalityKind::One;

    fn resolve(item: Option<&T>) -> Option<T> {
        item.cloned()
    }
}

/// One-to-many relation resolving to `Vec<T>`; missing keys become empty
pub struct Many<T>(PhantomData<fn() -> T>);

impl<T> Cardinality for Many<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = Vec<T>;
    type Output = Vec<T>;

    const KIND: CardinalityKind = CardinalityKind::Many;

    fn resolve(item: Option<&Vec<T>>) -> Vec<T> {
        item.cloned().unwrap_or_default()
    }
}

/// Named, typed reference to a registered relation
pub struct Relation<K, C> {
    name: &'static str,
    _marker: PhantomData<fn(K) -> C>,
}

impl<K, C> Relation<K, C> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            _marker: PhantomData,
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<K, C> Clone for Relation<K, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, C> Copy for Relation<K, C> {}

impl<K, C> fmt::Debug for Relation<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Relation").field(&self.name).finish()
    }
}

/// Bulk lookup backing a relation
///
/// Receives the deduplicated keys of one flush cycle in first-seen order.
/// Keys may be left out of the returned map; the dispatcher substitutes
/// the cardinality default for them.
#[async_trait]
pub trait BatchFn<K: LoadKey, V: Send + 'static>: Send + Sync + 'static {
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, V>, BatchError>;
}

/// [`BatchFn`] backed by an async closure
pub struct FnBatch<F>(F);

/// Wrap an async closure taking the owned key list as a batch function
pub fn batch_fn<F>(f: F) -> FnBatch<F> {
    FnBatch(f)
}

#[async_trait]
impl<K, V, F, Fut> BatchFn<K, V> for FnBatch<F>
where
    K: LoadKey,
    V: Send + 'static,
    F: Fn(Vec<K>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HashMap<K, V>, BatchError>> + Send,
{
    async fn load(&self, keys: &[K]) -> Result<HashMap<K, V>, BatchError> {
        (self.0)(keys.to_vec()).await
    }
}

/// A registered relation: its name and the batch function behind it
pub struct RelationSpec<K: LoadKey, C: Cardinality> {
    pub(crate) name: &'static str,
    pub(crate) batch_fn: Arc<dyn BatchFn<K, C::Item>>,
}

impl<K: LoadKey, C: Cardinality> RelationSpec<K, C> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn cardinality(&self) -> CardinalityKind {
        C::KIND
    }
}

impl<K: LoadKey, C: Cardinality> fmt::Debug for RelationSpec<K, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationSpec")
            .field("name", &self.name)
            .field("cardinality", &C::KIND)
            .finish_non_exhaustive()
    }
}

impl<K: LoadKey, C: Cardinality> Clone for RelationSpec<K, C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            batch_fn: Arc::clone(&self.batch_fn),
        }
    }
}
