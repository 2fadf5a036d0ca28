//! Beer model

use brewery_relation_loader::Entity;
use serde::{Deserialize, Serialize};

/// A beer from `beers.json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beer {
    /// Unique beer identifier
    pub id: String,

    pub name: String,

    /// Style such as "IPA" or "Stout"
    #[serde(default)]
    pub style: Option<String>,

    /// Alcohol by volume, in percent
    #[serde(default)]
    pub abv: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    /// Brewery that makes this beer
    pub brewery_id: String,
}

impl Entity for Beer {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }

    fn foreign_key(&self) -> Option<&String> {
        Some(&self.brewery_id)
    }
}
