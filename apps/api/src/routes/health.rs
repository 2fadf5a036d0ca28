//! Health check HTTP route handlers
//!
//! - `GET /health` - Simple liveness check (returns 200 OK)
//! - `GET /health/live` - Liveness check with the server version
//! - `GET /health/ready` - Readiness check (seed data is loaded)

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::repositories::DataStore;

/// Shared application state for health check handlers
#[derive(Clone)]
pub struct HealthState {
    pub store: DataStore,
}

impl HealthState {
    pub fn new(store: DataStore) -> Self {
        Self { store }
    }
}

/// Entity counts reported by the readiness check
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub breweries: usize,
    pub beers: usize,
    pub reviews: usize,
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/", get(simple_health))
        .route("/live", get(liveness_check))
        .route("/ready", get(readiness_check))
        .with_state(state)
}

/// Always returns OK if the server is running
async fn simple_health() -> &'static str {
    "OK"
}

/// Liveness check
///
/// Does not look at the data; that's what readiness is for.
async fn liveness_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "alive",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness check
///
/// # Response
/// - 200 OK with entity counts once seed data is loaded
/// - 503 Service Unavailable if no data was loaded
async fn readiness_check(
    State(state): State<HealthState>,
) -> ApiResult<Json<ReadinessResponse>> {
    let store = &state.store;
    if store.is_empty() {
        return Err(ApiError::NotReady("no data loaded".to_string()));
    }

    Ok(Json(ReadinessResponse {
        status: "ready",
        breweries: store.breweries.count(),
        beers: store.beers.count(),
        reviews: store.reviews.count(),
    }))
}
