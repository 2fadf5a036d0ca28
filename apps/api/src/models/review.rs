//! Review model

use brewery_relation_loader::Entity;
use serde::{Deserialize, Serialize};

/// A beer review from `reviews.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,

    /// Score from 1 to 5
    pub rating: i32,

    #[serde(default)]
    pub comment: Option<String>,

    pub author: String,

    /// Review date as written in the seed data (ISO 8601)
    #[serde(default)]
    pub date: Option<String>,

    /// Reviewed beer
    pub beer_id: String,
}

impl Entity for Review {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }

    fn foreign_key(&self) -> Option<&String> {
        Some(&self.beer_id)
    }
}
