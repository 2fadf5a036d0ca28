//! Common test utilities for API integration tests
//!
//! Shared fixtures (an in-memory brewery data set) and helpers for running
//! queries against the schema and requests against the router.

#![allow(unused_imports)]

pub mod fixtures;
pub mod helpers;

pub use fixtures::*;
pub use helpers::*;
