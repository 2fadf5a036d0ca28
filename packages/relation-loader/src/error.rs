//! Error types for relation loading
//!
//! Configuration problems (a relation that is registered twice, never
//! registered, or used with the wrong shape) are programming errors and
//! surface immediately. Batch failures are fanned out to every request
//! that was waiting on the failed batch.

use std::sync::Arc;

use thiserror::Error;

use crate::relation::CardinalityKind;

/// Error type returned by batch functions
pub type BatchError = Box<dyn std::error::Error + Send + Sync>;

/// Relation configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// The relation name was registered more than once
    #[error("relation already registered: {0}")]
    DuplicateRelation(&'static str),

    /// The relation name has no registered batch function
    #[error("relation not registered: {0}")]
    UnknownRelation(String),

    /// The caller expects a different cardinality than the registered one
    #[error("relation {name} is registered as {registered}, but was used as {expected}")]
    CardinalityMismatch {
        name: &'static str,
        expected: CardinalityKind,
        registered: CardinalityKind,
    },

    /// The caller expects different key or value types than the registered ones
    #[error("relation {name} resolves to {registered}, but was used as {expected}")]
    TypeMismatch {
        name: &'static str,
        expected: &'static str,
        registered: &'static str,
    },
}

/// Errors observed by a resolver awaiting a load handle
#[derive(Error, Debug, Clone)]
pub enum LoadError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The batch function failed; every request in the batch shares `source`
    #[error("batch load for relation {relation} failed: {source}")]
    Batch {
        relation: &'static str,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// The batch task went away before answering (panic or runtime shutdown)
    #[error("batch load for relation {relation} was cancelled")]
    Cancelled { relation: &'static str },
}

impl LoadError {
    /// Name of the relation whose batch failed, if this is a batch error
    pub fn relation(&self) -> Option<&'static str> {
        match self {
            Self::Batch { relation, .. } | Self::Cancelled { relation } => Some(relation),
            Self::Configuration(_) => None,
        }
    }
}

/// Errors raised by repository implementations
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Backing store cannot serve requests right now
    #[error("repository unavailable: {0}")]
    Unavailable(String),

    /// Any other backend failure
    #[error("repository backend error: {0}")]
    Backend(#[from] BatchError),
}
