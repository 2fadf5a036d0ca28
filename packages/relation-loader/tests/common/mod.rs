//! Shared setup for relation loader integration tests

#![allow(dead_code)]

use std::sync::Arc;

use brewery_relation_loader::{
    ByForeignKey, ById, Dispatcher, DispatcherOptions, Many, One, Relation, RelationRegistry,
    Repository,
};
use brewery_test_utils::fixtures::{sample_beers, sample_breweries};
use brewery_test_utils::{CountingRepository, TestBeer, TestBrewery, VecRepository};

pub const BREWERY_BY_ID: Relation<String, One<TestBrewery>> = Relation::new("breweryById");
pub const BEERS_BY_BREWERY: Relation<String, Many<TestBeer>> = Relation::new("beersByBrewery");

/// Repositories over the sample data, wrapped to count calls
pub struct Repositories {
    pub breweries: CountingRepository<VecRepository<TestBrewery>>,
    pub beers: CountingRepository<VecRepository<TestBeer>>,
}

impl Repositories {
    pub fn sample() -> Self {
        Self {
            breweries: CountingRepository::new(VecRepository::new(sample_breweries())),
            beers: CountingRepository::new(VecRepository::new(sample_beers())),
        }
    }
}

/// Registry with `breweryById` and `beersByBrewery` backed by the given repositories
pub fn registry_with<B, R>(breweries: B, beers: R) -> Arc<RelationRegistry>
where
    B: Repository<TestBrewery>,
    R: Repository<TestBeer>,
{
    let mut registry = RelationRegistry::new();
    registry
        .register(BREWERY_BY_ID, ById::<TestBrewery, _>::new(breweries))
        .expect("register breweryById")
        .register(BEERS_BY_BREWERY, ByForeignKey::<TestBeer, _>::new(beers))
        .expect("register beersByBrewery");
    Arc::new(registry)
}

pub fn dispatcher(registry: &Arc<RelationRegistry>) -> Dispatcher {
    Dispatcher::new(Arc::clone(registry), DispatcherOptions::default())
}

pub fn key(value: &str) -> String {
    value.to_string()
}

pub fn names(beers: &[TestBeer]) -> Vec<&str> {
    beers.iter().map(|beer| beer.name.as_str()).collect()
}
