//! GraphQL schema and resolvers for the Brewery API
//!
//! - Query resolvers for breweries, beers and reviews
//! - Object types whose relation fields go through the relation loader
//! - Relation descriptors and their registration

pub mod query;
pub mod relations;
pub mod schema;
pub mod types;

pub use relations::{build_registry, RELATION_NAMES};
pub use schema::{build_schema, BrewerySchema, RelationMode, SchemaBuilder};
