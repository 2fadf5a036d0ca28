//! Startup ingestion of the JSON seed files

use std::path::Path;

use serde::de::DeserializeOwned;

use super::{BeerRepository, BreweryRepository, ReviewRepository};
use crate::error::{ApiError, ApiResult};

pub const BREWERIES_FILE: &str = "breweries.json";
pub const BEERS_FILE: &str = "beers.json";
pub const REVIEWS_FILE: &str = "reviews.json";

/// All repositories of one data snapshot
#[derive(Debug, Clone)]
pub struct DataStore {
    pub breweries: BreweryRepository,
    pub beers: BeerRepository,
    pub reviews: ReviewRepository,
}

impl DataStore {
    pub fn new(
        breweries: BreweryRepository,
        beers: BeerRepository,
        reviews: ReviewRepository,
    ) -> Self {
        Self {
            breweries,
            beers,
            reviews,
        }
    }

    /// A store with no data; reported as not ready by the health routes
    pub fn empty() -> Self {
        Self::new(
            BreweryRepository::empty(),
            BeerRepository::empty(),
            ReviewRepository::empty(),
        )
    }

    /// Read `breweries.json`, `beers.json` and `reviews.json` from `dir`
    ///
    /// Each file holds a JSON array. A missing or malformed file fails the
    /// whole load.
    pub async fn load(dir: &Path) -> ApiResult<Self> {
        let breweries = read_json(&dir.join(BREWERIES_FILE)).await?;
        let beers = read_json(&dir.join(BEERS_FILE)).await?;
        let reviews = read_json(&dir.join(REVIEWS_FILE)).await?;

        let store = Self::new(
            BreweryRepository::new(breweries),
            BeerRepository::new(beers),
            ReviewRepository::new(reviews),
        );

        tracing::info!(
            breweries = store.breweries.count(),
            beers = store.beers.count(),
            reviews = store.reviews.count(),
            dir = %dir.display(),
            "Loaded seed data into memory"
        );

        Ok(store)
    }

    /// True when no breweries, beers or reviews are loaded
    pub fn is_empty(&self) -> bool {
        self.breweries.is_empty() && self.beers.is_empty() && self.reviews.is_empty()
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> ApiResult<Vec<T>> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| ApiError::ingestion(path, e))?;
    let items: Vec<T> =
        serde_json::from_slice(&bytes).map_err(|e| ApiError::ingestion(path, e))?;

    tracing::debug!(file = %path.display(), count = items.len(), "Read seed file");
    Ok(items)
}
