//! Review GraphQL type

use async_graphql::{Context, Object, Result, ID};
use brewery_relation_loader::Repository;

use crate::graphql::relations::BEER_BY_ID;
use crate::models::Review as ReviewModel;
use crate::repositories::BeerRepository;

use super::{batched, field_error, load, Beer};

/// Review exposed via GraphQL
pub struct Review {
    inner: ReviewModel,
}

impl From<ReviewModel> for Review {
    fn from(review: ReviewModel) -> Self {
        Self { inner: review }
    }
}

#[Object]
impl Review {
    async fn id(&self) -> ID {
        ID::from(self.inner.id.clone())
    }

    /// Score from 1 to 5
    async fn rating(&self) -> i32 {
        self.inner.rating
    }

    async fn comment(&self) -> Option<&str> {
        self.inner.comment.as_deref()
    }

    async fn author(&self) -> &str {
        &self.inner.author
    }

    async fn date(&self) -> Option<&str> {
        self.inner.date.as_deref()
    }

    async fn beer_id(&self) -> ID {
        ID::from(self.inner.beer_id.clone())
    }

    /// The reviewed beer
    async fn beer(&self, ctx: &Context<'_>) -> Result<Option<Beer>> {
        let beer = match batched(ctx)? {
            Some(dispatcher) => load(dispatcher, &BEER_BY_ID, self.inner.beer_id.clone()).await?,
            None => {
                ctx.data::<BeerRepository>()?
                    .get_by_id(&self.inner.beer_id)
                    .await
                    .map_err(field_error)?
            }
        };
        Ok(beer.map(Beer::from))
    }
}
