//! Test helper functions for API integration tests

#![allow(dead_code)]

use std::path::PathBuf;

use async_graphql::Request;
use axum::{body::Body, http::StatusCode, Router};
use brewery_api::graphql::{build_registry, build_schema, BrewerySchema, RelationMode};
use brewery_api::repositories::{
    BeerRepository, BreweryRepository, DataStore, ReviewRepository,
};
use brewery_api::{build_router, LoaderState};
use brewery_relation_loader::{Dispatcher, DispatcherOptions};
use brewery_test_utils::CountingRepository;
use tower::ServiceExt;
use tower_http::cors::CorsLayer;

/// Repositories behind the relation registry, counting every call
pub struct CountedRepositories {
    pub breweries: CountingRepository<BreweryRepository>,
    pub beers: CountingRepository<BeerRepository>,
    pub reviews: CountingRepository<ReviewRepository>,
}

impl CountedRepositories {
    pub fn wrap(store: &DataStore) -> Self {
        Self {
            breweries: CountingRepository::new(store.breweries.clone()),
            beers: CountingRepository::new(store.beers.clone()),
            reviews: CountingRepository::new(store.reviews.clone()),
        }
    }

    /// Loader state whose batch functions go through the counters
    pub fn loaders(&self) -> LoaderState {
        let registry = build_registry(
            self.breweries.clone(),
            self.beers.clone(),
            self.reviews.clone(),
        )
        .unwrap();
        LoaderState::new(registry, DispatcherOptions::default())
    }
}

/// Loader state over the store's own repositories
pub fn loaders_for(store: &DataStore) -> LoaderState {
    let registry = build_registry(
        store.breweries.clone(),
        store.beers.clone(),
        store.reviews.clone(),
    )
    .unwrap();
    LoaderState::new(registry, DispatcherOptions::default())
}

/// Execute `query` with `dispatcher` attached, as the HTTP handler does
pub async fn execute(
    schema: &BrewerySchema,
    dispatcher: &Dispatcher,
    query: &str,
) -> async_graphql::Response {
    schema
        .execute(Request::new(query).data(dispatcher.clone()))
        .await
}

/// Execute `query` and return its data as JSON, failing on any error
pub async fn execute_ok(
    schema: &BrewerySchema,
    dispatcher: &Dispatcher,
    query: &str,
) -> serde_json::Value {
    let response = execute(schema, dispatcher, query).await;
    assert!(
        response.errors.is_empty(),
        "unexpected errors: {:?}",
        response.errors
    );
    response.data.into_json().unwrap()
}

/// The full application router over `store`
pub fn test_app(store: DataStore) -> Router {
    let loaders = loaders_for(&store);
    let schema = build_schema(store.clone(), RelationMode::Batched);
    build_router(schema, loaders, store, CorsLayer::permissive())
}

/// Send `request` through `app` and return the status and body
pub async fn send(app: Router, request: axum::http::Request<Body>) -> (StatusCode, String) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

/// The seed data shipped with the repository
pub fn seed_data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data")
}
