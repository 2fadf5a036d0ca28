use std::net::SocketAddr;

use brewery_api::config::Config;
use brewery_api::graphql::{build_registry, build_schema, RelationMode};
use brewery_api::repositories::DataStore;
use brewery_api::{build_cors_layer, build_router, LoaderState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "brewery_api=debug,brewery_relation_loader=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    tracing::info!("Starting Brewery API server on port {}", config.port);

    tracing::info!(data_dir = %config.data_dir().display(), "Loading seed data...");
    let store = DataStore::load(config.data_dir()).await?;

    let registry = build_registry(
        store.breweries.clone(),
        store.beers.clone(),
        store.reviews.clone(),
    )?;

    let mode = RelationMode::from(config.loader());
    let schema = build_schema(store.clone(), mode);
    let loaders = LoaderState::new(registry, config.dispatcher_options());

    let app = build_router(schema, loaders, store, build_cors_layer(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("Listening on {}", addr);
    tracing::info!(
        "GraphQL Playground available at http://{}:{}/graphql/playground",
        addr.ip(),
        addr.port()
    );

    axum::serve(listener, app).await?;

    Ok(())
}
