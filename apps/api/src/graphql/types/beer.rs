//! Beer GraphQL type

use async_graphql::{Context, Object, Result, ID};
use brewery_relation_loader::Repository;

use crate::graphql::relations::{BREWERY_BY_ID, REVIEWS_BY_BEER};
use crate::models::Beer as BeerModel;
use crate::repositories::{BreweryRepository, ReviewRepository};

use super::{batched, field_error, load, Brewery, Review};

/// Beer exposed via GraphQL
pub struct Beer {
    inner: BeerModel,
}

impl From<BeerModel> for Beer {
    fn from(beer: BeerModel) -> Self {
        Self { inner: beer }
    }
}

#[Object]
impl Beer {
    async fn id(&self) -> ID {
        ID::from(self.inner.id.clone())
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn style(&self) -> Option<&str> {
        self.inner.style.as_deref()
    }

    /// Alcohol by volume, in percent
    async fn abv(&self) -> Option<f64> {
        self.inner.abv
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    async fn brewery_id(&self) -> ID {
        ID::from(self.inner.brewery_id.clone())
    }

    // Relationship resolvers

    /// Brewery that makes this beer
    async fn brewery(&self, ctx: &Context<'_>) -> Result<Option<Brewery>> {
        let brewery = match batched(ctx)? {
            Some(dispatcher) => {
                load(dispatcher, &BREWERY_BY_ID, self.inner.brewery_id.clone()).await?
            }
            None => {
                tracing::debug!(beer_id = %self.inner.id, "Loading brewery (per parent)");
                ctx.data::<BreweryRepository>()?
                    .get_by_id(&self.inner.brewery_id)
                    .await
                    .map_err(field_error)?
            }
        };
        Ok(brewery.map(Brewery::from))
    }

    /// Reviews of this beer
    async fn reviews(&self, ctx: &Context<'_>) -> Result<Vec<Review>> {
        let reviews = match batched(ctx)? {
            Some(dispatcher) => load(dispatcher, &REVIEWS_BY_BEER, self.inner.id.clone()).await?,
            None => {
                tracing::debug!(beer_id = %self.inner.id, "Loading reviews (per parent)");
                ctx.data::<ReviewRepository>()?
                    .get_by_foreign_key(&self.inner.id)
                    .await
                    .map_err(field_error)?
            }
        };
        Ok(reviews.into_iter().map(Review::from).collect())
    }
}
