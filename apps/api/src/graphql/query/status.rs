//! Connectivity checks

use async_graphql::Object;

#[derive(Default)]
pub struct StatusQuery;

#[Object]
impl StatusQuery {
    /// Returns a fixed string; useful to check the endpoint is wired up
    async fn test(&self) -> &'static str {
        "GraphQL API is working!"
    }

    async fn hello(&self) -> &'static str {
        "Hello from GraphQL!"
    }
}
