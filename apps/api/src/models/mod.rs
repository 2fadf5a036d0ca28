//! Domain models for the Brewery API
//!
//! Plain serde structs matching the JSON seed files (camelCase keys).
//! Each implements [`Entity`](brewery_relation_loader::Entity) so the
//! repositories and relation loaders can key them.

pub mod beer;
pub mod brewery;
pub mod review;

pub use beer::Beer;
pub use brewery::Brewery;
pub use review::Review;
