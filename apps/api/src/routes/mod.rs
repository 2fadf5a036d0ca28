//! HTTP route handlers for the Brewery API

pub mod health;

pub use health::{health_router, HealthState, ReadinessResponse};
