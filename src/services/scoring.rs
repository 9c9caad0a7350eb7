use std::collections::{BTreeSet, HashMap};

use crate::models::{Movie, MovieId, Rating};

/// Weights and thresholds for similarity scoring and personalization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringWeights {
    pub genre: f64,
    pub cast: f64,
    pub year: f64,
    /// Release-year distance at which year proximity reaches zero
    pub year_horizon: u32,
    /// Minimum rating that counts as a liked movie
    pub like_threshold: f64,
    /// Share of the blended score taken from user affinity, in [0, 1]
    pub personalization: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            genre: 0.6,
            cast: 0.3,
            year: 0.1,
            year_horizon: 20,
            like_threshold: 4.0,
            personalization: 0.3,
        }
    }
}

/// Normalized similarity features of one movie
#[derive(Debug, Clone)]
pub struct Features {
    pub id: MovieId,
    genres: BTreeSet<String>,
    cast: BTreeSet<String>,
    release_year: Option<i32>,
}

impl From<&Movie> for Features {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id,
            genres: movie.genre_set(),
            cast: movie.cast_set(),
            release_year: movie.release_year,
        }
    }
}

/// Jaccard index of two sets, 0 when both are empty
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

impl ScoringWeights {
    /// Content similarity of two movies
    pub fn similarity(&self, a: &Features, b: &Features) -> f64 {
        self.genre * jaccard(&a.genres, &b.genres)
            + self.cast * jaccard(&a.cast, &b.cast)
            + self.year * self.year_proximity(a.release_year, b.release_year)
    }

    fn year_proximity(&self, a: Option<i32>, b: Option<i32>) -> f64 {
        let (Some(a), Some(b)) = (a, b) else {
            return 0.0;
        };
        if self.year_horizon == 0 {
            return if a == b { 1.0 } else { 0.0 };
        }
        let horizon = self.year_horizon as f64;
        let distance = (a - b).unsigned_abs() as f64;
        1.0 - distance.min(horizon) / horizon
    }

    /// Mixes base similarity with a user's affinity for the candidate.
    ///
    /// Without an affinity signal the base score passes through untouched.
    pub fn blend(&self, similarity: f64, affinity: Option<f64>) -> f64 {
        match affinity {
            None => similarity,
            Some(affinity) => {
                let w = self.personalization.clamp(0.0, 1.0);
                (1.0 - w) * similarity + w * affinity
            }
        }
    }
}

/// A user's liked movies, used to score candidates for that user
#[derive(Debug, Clone)]
pub struct Affinity {
    liked: Vec<(Features, f64)>,
}

impl Affinity {
    /// Collects the rated movies at or above the like threshold.
    ///
    /// Ratings for movies missing from `catalog` are ignored. Returns `None`
    /// when nothing qualifies.
    pub fn from_history(
        history: &[Rating],
        catalog: &HashMap<MovieId, Features>,
        weights: &ScoringWeights,
    ) -> Option<Self> {
        let mut liked: Vec<(Features, f64)> = history
            .iter()
            .filter(|rating| rating.score >= weights.like_threshold)
            .filter_map(|rating| {
                catalog
                    .get(&rating.movie_id)
                    .map(|features| (features.clone(), rating.score))
            })
            .collect();

        if liked.is_empty() {
            return None;
        }
        // Summation order must not depend on history order.
        liked.sort_by_key(|(features, _)| features.id);
        Some(Self { liked })
    }

    /// Rating-weighted mean similarity between `candidate` and the liked movies
    ///
    /// `None` when the candidate is the only liked movie, so it keeps its
    /// plain similarity score.
    pub fn score(&self, candidate: &Features, weights: &ScoringWeights) -> Option<f64> {
        let mut weighted = 0.0;
        let mut total = 0.0;
        for (liked, rating) in &self.liked {
            if liked.id == candidate.id {
                continue;
            }
            weighted += weights.similarity(candidate, liked) * rating;
            total += rating;
        }
        if total == 0.0 {
            None
        } else {
            Some(weighted / total)
        }
    }
}
