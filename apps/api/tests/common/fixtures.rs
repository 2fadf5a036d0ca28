//! Test fixtures for API integration tests
//!
//! Breweries b1 (two beers), b2 (no beers) and x1 (one beer); beerA has two
//! reviews, beerC one.

#![allow(dead_code)]

use brewery_api::models::{Beer, Brewery, Review};
use brewery_api::repositories::{
    BeerRepository, BreweryRepository, DataStore, ReviewRepository,
};

pub fn brewery(id: &str, name: &str) -> Brewery {
    Brewery {
        id: id.to_string(),
        name: name.to_string(),
        location: "Somewhere".to_string(),
        established: None,
        description: None,
        beer_ids: Vec::new(),
    }
}

pub fn beer(id: &str, name: &str, brewery_id: &str) -> Beer {
    Beer {
        id: id.to_string(),
        name: name.to_string(),
        style: None,
        abv: None,
        description: None,
        brewery_id: brewery_id.to_string(),
    }
}

pub fn review(id: &str, rating: i32, beer_id: &str) -> Review {
    Review {
        id: id.to_string(),
        rating,
        comment: None,
        author: "tester".to_string(),
        date: None,
        beer_id: beer_id.to_string(),
    }
}

pub fn sample_breweries() -> Vec<Brewery> {
    vec![
        brewery("b1", "Brewery One"),
        brewery("b2", "Brewery Two"),
        brewery("x1", "Brewery X"),
    ]
}

pub fn sample_beers() -> Vec<Beer> {
    vec![
        beer("beerA", "Pale Ale", "b1"),
        beer("beerB", "Stout", "b1"),
        beer("beerC", "Pilsner", "x1"),
    ]
}

pub fn sample_reviews() -> Vec<Review> {
    vec![
        review("r1", 5, "beerA"),
        review("r2", 3, "beerA"),
        review("r3", 4, "beerC"),
    ]
}

/// The sample data set as a loaded store
pub fn sample_store() -> DataStore {
    DataStore::new(
        BreweryRepository::new(sample_breweries()),
        BeerRepository::new(sample_beers()),
        ReviewRepository::new(sample_reviews()),
    )
}
