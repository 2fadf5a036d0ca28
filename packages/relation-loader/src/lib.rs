//! Batched relation loading for the Brewery GraphQL service
//!
//! Resolving a nested field for every parent in a list (the beers of each
//! brewery, the brewery of each beer) naively costs one lookup per parent.
//! This crate coalesces those lookups:
//!
//! - [`RelationRegistry`] maps relation names to batch functions and is
//!   frozen at startup.
//! - [`Dispatcher`] is created per query execution. Resolvers call
//!   [`Dispatcher::load`], and every request queued for a relation before
//!   the first handle is awaited is served by one batch call.
//! - [`repository`] adapts entity repositories into batch functions.
//!
//! # Example
//!
//! ```rust,ignore
//! const BEERS_BY_BREWERY: Relation<String, Many<Beer>> = Relation::new("beersByBrewery");
//!
//! let mut registry = RelationRegistry::new();
//! registry.register(BEERS_BY_BREWERY, ByForeignKey::new(beer_repository))?;
//! let registry = Arc::new(registry);
//!
//! // once per request
//! let dispatcher = Dispatcher::new(registry.clone(), DispatcherOptions::default());
//! let beers = dispatcher.load(&BEERS_BY_BREWERY, brewery.id.clone())?.await?;
//! ```

mod dispatcher;
mod error;
mod handle;
mod registry;
mod relation;
pub mod repository;

pub use dispatcher::{Dispatcher, DispatcherOptions, DispatcherStats};
pub use error::{BatchError, ConfigurationError, LoadError, RepositoryError};
pub use handle::{LoadHandle, LoadManyHandle};
pub use registry::{RelationInfo, RelationRegistry};
pub use relation::{
    batch_fn, BatchFn, Cardinality, CardinalityKind, FnBatch, LoadKey, Many, One, Relation,
    RelationSpec,
};
pub use repository::{ByForeignKey, ById, Entity, Repository};
