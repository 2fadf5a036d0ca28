//! HTTP router and GraphQL endpoint wiring

use std::sync::Arc;

use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    extract::Extension,
    http::{header, Method},
    response::{Html, IntoResponse},
    routing::{get, post},
    Router,
};
use brewery_relation_loader::{Dispatcher, DispatcherOptions, RelationRegistry};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::Config;
use crate::graphql::BrewerySchema;
use crate::repositories::DataStore;
use crate::routes::{health_router, HealthState};

/// What every request needs to build its own dispatcher
#[derive(Clone)]
pub struct LoaderState {
    pub registry: Arc<RelationRegistry>,
    pub options: DispatcherOptions,
}

impl LoaderState {
    pub fn new(registry: RelationRegistry, options: DispatcherOptions) -> Self {
        Self {
            registry: Arc::new(registry),
            options,
        }
    }

    /// A fresh dispatcher for one execution
    pub fn dispatcher(&self) -> Dispatcher {
        Dispatcher::new(Arc::clone(&self.registry), self.options.clone())
    }
}

/// Build the CORS layer based on configuration.
///
/// In production mode:
/// - If `CORS_ORIGINS` is set, only those origins are allowed
/// - If `CORS_ORIGINS` is not set, CORS requests are rejected
///
/// In development mode a missing `CORS_ORIGINS` falls back to permissive CORS.
pub fn build_cors_layer(config: &Config) -> CorsLayer {
    match &config.cors_allowed_origins {
        Some(origins) if !origins.is_empty() => {
            let allowed_origins: Vec<_> = origins
                .iter()
                .filter_map(|origin| {
                    origin.parse().ok().or_else(|| {
                        tracing::warn!("Invalid CORS origin '{}', skipping", origin);
                        None
                    })
                })
                .collect();

            if allowed_origins.is_empty() {
                tracing::error!("No valid CORS origins configured, CORS requests will be rejected");
                return CorsLayer::new();
            }

            tracing::info!(
                "CORS configured with {} allowed origin(s): {:?}",
                allowed_origins.len(),
                origins
            );
            CorsLayer::new()
                .allow_origin(allowed_origins)
                .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
                .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
                .max_age(std::time::Duration::from_secs(3600))
        }
        _ if config.is_production() => {
            tracing::warn!(
                "CORS_ORIGINS not configured in production mode. \
                 CORS requests will be rejected."
            );
            CorsLayer::new()
        }
        _ => {
            tracing::warn!("Using permissive CORS in development mode");
            CorsLayer::permissive()
        }
    }
}

/// GraphQL handler that executes queries against the schema
///
/// Every request gets its own dispatcher, so batches and cached results
/// never outlive the execution that produced them.
async fn graphql_handler(
    Extension(schema): Extension<BrewerySchema>,
    Extension(loaders): Extension<LoaderState>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    let dispatcher = loaders.dispatcher();
    let request = req.into_inner().data(dispatcher.clone());

    let response = schema.execute(request).await;

    let stats = dispatcher.stats();
    tracing::debug!(
        execution_id = dispatcher.execution_id(),
        batches = stats.total_batches(),
        errors = response.errors.len(),
        "GraphQL request executed"
    );

    response.into()
}

/// GraphQL Playground handler for development
async fn graphql_playground() -> impl IntoResponse {
    Html(async_graphql::http::playground_source(
        async_graphql::http::GraphQLPlaygroundConfig::new("/graphql"),
    ))
}

async fn root() -> &'static str {
    "Welcome to the Brewery API"
}

/// Assemble the application router
pub fn build_router(
    schema: BrewerySchema,
    loaders: LoaderState,
    store: DataStore,
    cors_layer: CorsLayer,
) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/graphql", post(graphql_handler))
        .route("/graphql/playground", get(graphql_playground))
        // Nested health routes: /health, /health/live, /health/ready
        .nest("/health", health_router(HealthState::new(store)))
        .layer(Extension(schema))
        .layer(Extension(loaders))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
}
