//! Small entities and sample data for loader tests
//!
//! Two breweries, `b1` with beers `beerA` and `beerB`, and `x1` with
//! `beerC`. Brewery `b2` is referenced by tests but has no beers.

use brewery_relation_loader::Entity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBrewery {
    pub id: String,
    pub name: String,
}

impl TestBrewery {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
        }
    }
}

impl Entity for TestBrewery {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestBeer {
    pub id: String,
    pub name: String,
    pub brewery_id: String,
}

impl TestBeer {
    pub fn new(id: &str, name: &str, brewery_id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            brewery_id: brewery_id.to_string(),
        }
    }
}

impl Entity for TestBeer {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }

    fn foreign_key(&self) -> Option<&String> {
        Some(&self.brewery_id)
    }
}

pub fn sample_breweries() -> Vec<TestBrewery> {
    vec![
        TestBrewery::new("b1", "Brewery One"),
        TestBrewery::new("x1", "Brewery X"),
    ]
}

pub fn sample_beers() -> Vec<TestBeer> {
    vec![
        TestBeer::new("beerA", "Pale Ale", "b1"),
        TestBeer::new("beerB", "Stout", "b1"),
        TestBeer::new("beerC", "Pilsner", "x1"),
    ]
}
