//! GraphQL schema builder for the Brewery API

use async_graphql::{EmptyMutation, EmptySubscription, Schema};
use brewery_shared_config::LoaderConfig;

use crate::repositories::DataStore;

use super::query::Query;

/// The Brewery GraphQL schema type
pub type BrewerySchema = Schema<Query, EmptyMutation, EmptySubscription>;

/// How relation fields are resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelationMode {
    /// Through the request's dispatcher, one batch per relation and level
    #[default]
    Batched,
    /// One repository call per parent (the N+1 baseline)
    Direct,
}

impl From<&LoaderConfig> for RelationMode {
    fn from(config: &LoaderConfig) -> Self {
        if config.enabled {
            Self::Batched
        } else {
            Self::Direct
        }
    }
}

/// Builder for constructing the GraphQL schema with required services
#[derive(Default)]
pub struct SchemaBuilder {
    store: Option<DataStore>,
    mode: RelationMode,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the repositories served by the query root
    pub fn store(mut self, store: DataStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn mode(mut self, mode: RelationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Build the schema
    ///
    /// Without a store the schema serves an empty data set.
    pub fn build(self) -> BrewerySchema {
        let store = self.store.unwrap_or_else(DataStore::empty);

        match self.mode {
            RelationMode::Batched => tracing::info!("Relation fields use batched loaders"),
            RelationMode::Direct => tracing::info!("Relation fields use per-parent lookups"),
        }

        Schema::build(Query::default(), EmptyMutation, EmptySubscription)
            .data(store.breweries)
            .data(store.beers)
            .data(store.reviews)
            .data(self.mode)
            .finish()
    }
}

/// Create a new GraphQL schema over `store`
pub fn build_schema(store: DataStore, mode: RelationMode) -> BrewerySchema {
    SchemaBuilder::new().store(store).mode(mode).build()
}
