use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Catalog identifier of a movie
pub type MovieId = i64;

/// A catalog movie together with the features used for similarity scoring
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub cast: Vec<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
}

impl Movie {
    /// Genre tags normalized for comparison
    pub fn genre_set(&self) -> BTreeSet<String> {
        normalize(&self.genres)
    }

    /// Cast names normalized for comparison
    pub fn cast_set(&self) -> BTreeSet<String> {
        normalize(&self.cast)
    }
}

fn normalize(values: &[String]) -> BTreeSet<String> {
    values
        .iter()
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
        .collect()
}
