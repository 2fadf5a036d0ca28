//! Brewery GraphQL type

use async_graphql::{Context, Object, Result, ID};
use brewery_relation_loader::Repository;

use crate::graphql::relations::BEERS_BY_BREWERY;
use crate::models::Brewery as BreweryModel;
use crate::repositories::BeerRepository;

use super::{batched, field_error, load, Beer};

/// Brewery exposed via GraphQL
pub struct Brewery {
    inner: BreweryModel,
}

impl From<BreweryModel> for Brewery {
    fn from(brewery: BreweryModel) -> Self {
        Self { inner: brewery }
    }
}

#[Object]
impl Brewery {
    async fn id(&self) -> ID {
        ID::from(self.inner.id.clone())
    }

    async fn name(&self) -> &str {
        &self.inner.name
    }

    async fn location(&self) -> &str {
        &self.inner.location
    }

    /// Founding year
    async fn established(&self) -> Option<i32> {
        self.inner.established
    }

    async fn description(&self) -> Option<&str> {
        self.inner.description.as_deref()
    }

    /// Beer ids as listed in the seed data
    async fn beer_ids(&self) -> &[String] {
        &self.inner.beer_ids
    }

    /// Beers brewed here, in seed file order
    async fn beers(&self, ctx: &Context<'_>) -> Result<Vec<Beer>> {
        let beers = match batched(ctx)? {
            Some(dispatcher) => {
                tracing::debug!(brewery_id = %self.inner.id, "Loading beers (batched)");
                load(dispatcher, &BEERS_BY_BREWERY, self.inner.id.clone()).await?
            }
            None => {
                tracing::debug!(brewery_id = %self.inner.id, "Loading beers (per parent)");
                ctx.data::<BeerRepository>()?
                    .get_by_foreign_key(&self.inner.id)
                    .await
                    .map_err(field_error)?
            }
        };
        Ok(beers.into_iter().map(Beer::from).collect())
    }
}
