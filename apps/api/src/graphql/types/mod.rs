//! GraphQL object types
//!
//! Each type wraps its model. Relation fields resolve either through the
//! request's [`Dispatcher`] or, in [`RelationMode::Direct`], with one
//! repository call per parent. Failures from either path become field
//! errors tagged with their [`ApiError`] code.

mod beer;
mod brewery;
mod review;

pub use beer::Beer;
pub use brewery::Brewery;
pub use review::Review;

use async_graphql::{Context, ErrorExtensions, Result};
use brewery_relation_loader::{Cardinality, Dispatcher, LoadKey, Relation};

use crate::error::ApiError;
use crate::graphql::schema::RelationMode;

/// The request's dispatcher in batched mode, `None` in direct mode
fn batched<'a>(ctx: &Context<'a>) -> Result<Option<&'a Dispatcher>> {
    match ctx.data::<RelationMode>()? {
        RelationMode::Batched => Ok(Some(ctx.data::<Dispatcher>()?)),
        RelationMode::Direct => Ok(None),
    }
}

/// Load `key` through the request's dispatcher
async fn load<K, C>(
    dispatcher: &Dispatcher,
    relation: &Relation<K, C>,
    key: K,
) -> Result<C::Output>
where
    K: LoadKey,
    C: Cardinality,
{
    let handle = dispatcher.load(relation, key).map_err(field_error)?;
    handle.await.map_err(field_error)
}

/// Field error for a failed relation or repository call
pub(crate) fn field_error(err: impl Into<ApiError>) -> async_graphql::Error {
    err.into().extend()
}
