//! Data access layer for the Brewery API
//!
//! All entities live in memory. They are read from JSON seed files once at
//! startup and never modified afterwards, so repositories are plain shared
//! snapshots that can be cloned into the schema, the relation registry and
//! the health routes.

pub mod ingest;
pub mod memory;

pub use ingest::DataStore;
pub use memory::InMemoryRepository;

use crate::models::{Beer, Brewery, Review};

/// Repository for breweries
pub type BreweryRepository = InMemoryRepository<Brewery>;

/// Repository for beers, indexed by brewery
pub type BeerRepository = InMemoryRepository<Beer>;

/// Repository for reviews, indexed by beer
pub type ReviewRepository = InMemoryRepository<Review>;
