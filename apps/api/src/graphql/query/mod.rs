//! GraphQL queries for the Brewery API

mod catalog;
mod status;

pub use catalog::CatalogQuery;
pub use status::StatusQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(StatusQuery, CatalogQuery);
