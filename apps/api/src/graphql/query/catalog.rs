//! Brewery, beer and review lookups

use async_graphql::{Context, Object, Result, ID};
use brewery_relation_loader::Repository;

use crate::graphql::types::{field_error, Beer, Brewery, Review};
use crate::repositories::{BeerRepository, BreweryRepository, ReviewRepository};

/// Root-level lookups
#[derive(Default)]
pub struct CatalogQuery;

#[Object]
impl CatalogQuery {
    // ==================== Breweries ====================

    /// Get a brewery by ID
    async fn brewery(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Brewery>> {
        tracing::debug!(brewery_id = %id.as_str(), "Fetching brewery");
        let repo = ctx.data::<BreweryRepository>()?;
        let brewery = repo.get_by_id(&id.0).await.map_err(field_error)?;
        Ok(brewery.map(Brewery::from))
    }

    /// All breweries, sorted by ID
    async fn breweries(&self, ctx: &Context<'_>) -> Result<Vec<Brewery>> {
        let repo = ctx.data::<BreweryRepository>()?;
        Ok(repo.get_all().into_iter().map(Brewery::from).collect())
    }

    // ==================== Beers ====================

    /// Get a beer by ID
    async fn beer(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Beer>> {
        tracing::debug!(beer_id = %id.as_str(), "Fetching beer");
        let repo = ctx.data::<BeerRepository>()?;
        let beer = repo.get_by_id(&id.0).await.map_err(field_error)?;
        Ok(beer.map(Beer::from))
    }

    /// All beers, sorted by ID
    async fn beers(&self, ctx: &Context<'_>) -> Result<Vec<Beer>> {
        let repo = ctx.data::<BeerRepository>()?;
        Ok(repo.get_all().into_iter().map(Beer::from).collect())
    }

    // ==================== Reviews ====================

    /// Get a review by ID
    async fn review(&self, ctx: &Context<'_>, id: ID) -> Result<Option<Review>> {
        let repo = ctx.data::<ReviewRepository>()?;
        let review = repo.get_by_id(&id.0).await.map_err(field_error)?;
        Ok(review.map(Review::from))
    }

    /// All reviews, sorted by ID
    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        let repo = ctx.data::<ReviewRepository>()?;
        Ok(repo.get_all().into_iter().map(Review::from).collect())
    }
}
