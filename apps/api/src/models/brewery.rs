//! Brewery model

use brewery_relation_loader::Entity;
use serde::{Deserialize, Serialize};

/// A brewery from `breweries.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brewery {
    /// Unique brewery identifier
    pub id: String,

    pub name: String,

    /// City and region, free text
    pub location: String,

    /// Founding year
    #[serde(default)]
    pub established: Option<i32>,

    #[serde(default)]
    pub description: Option<String>,

    /// Beer ids as listed in the seed data
    ///
    /// Informational only; the `beers` relation is resolved from each
    /// beer's `breweryId`.
    #[serde(default)]
    pub beer_ids: Vec<String>,
}

impl Entity for Brewery {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}
