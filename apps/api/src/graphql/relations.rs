//! Relation descriptors and their registration
//!
//! Every batched relation field resolves through one of the descriptors
//! below. They are registered once at startup, and the registry is checked
//! against [`RELATION_NAMES`] before the schema is served.

use brewery_relation_loader::{
    ByForeignKey, ById, ConfigurationError, Many, One, Relation, RelationRegistry, Repository,
};

use crate::models::{Beer, Brewery, Review};

/// `Beer.brewery`
pub const BREWERY_BY_ID: Relation<String, One<Brewery>> = Relation::new("breweryById");

/// `Review.beer`
pub const BEER_BY_ID: Relation<String, One<Beer>> = Relation::new("beerById");

/// `Brewery.beers`
pub const BEERS_BY_BREWERY: Relation<String, Many<Beer>> = Relation::new("beersByBrewery");

/// `Beer.reviews`
pub const REVIEWS_BY_BEER: Relation<String, Many<Review>> = Relation::new("reviewsByBeer");

/// Relations the resolvers depend on
pub const RELATION_NAMES: [&str; 4] = [
    BREWERY_BY_ID.name(),
    BEER_BY_ID.name(),
    BEERS_BY_BREWERY.name(),
    REVIEWS_BY_BEER.name(),
];

/// Build and validate the relation registry over the given repositories
pub fn build_registry<B, E, R>(
    breweries: B,
    beers: E,
    reviews: R,
) -> Result<RelationRegistry, ConfigurationError>
where
    B: Repository<Brewery>,
    E: Repository<Beer> + Clone,
    R: Repository<Review>,
{
    let mut registry = RelationRegistry::new();
    registry
        .register(BREWERY_BY_ID, ById::<Brewery, _>::new(breweries))?
        .register(BEER_BY_ID, ById::<Beer, _>::new(beers.clone()))?
        .register(BEERS_BY_BREWERY, ByForeignKey::<Beer, _>::new(beers))?
        .register(REVIEWS_BY_BEER, ByForeignKey::<Review, _>::new(reviews))?;

    registry.validate(RELATION_NAMES)?;

    tracing::info!(relations = ?registry.names(), "Relation registry ready");
    Ok(registry)
}
