//! Shared test doubles for the Brewery workspace
//!
//! These stand in for batch functions and repositories so the relation
//! loader and the API can be tested without real data files.
//!
//! - [`RecordingBatch`] - batch function that records every key set it receives
//! - [`VecRepository`] - vector-backed repository using the provided fan-out path
//! - [`CountingRepository`] - wrapper counting calls per repository method
//! - [`FailingRepository`] - repository whose every call fails
//! - [`fixtures`] - small brewery/beer entities and sample data
//!
//! # Example
//!
//! ```rust,ignore
//! use brewery_test_utils::RecordingBatch;
//!
//! let batch = RecordingBatch::returning([("b1".to_string(), 1)]);
//! registry.register(RELATION, batch.clone())?;
//! // ... run loads ...
//! assert_eq!(batch.call_count(), 1);
//! ```

mod batch;
pub mod fixtures;
mod repository;

pub use batch::RecordingBatch;
pub use fixtures::{TestBeer, TestBrewery};
pub use repository::{CountingRepository, FailingRepository, RepositoryCalls, VecRepository};
