use std::collections::HashMap;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    error::{AppError, AppResult},
    models::{Movie, MovieId, PageRequest, Rating, SuggestionPage, User},
    services::{
        catalog::{MovieCatalog, UserDirectory},
        scoring::{Affinity, Features, ScoringWeights},
    },
};

/// Ranks the catalog against a reference movie, optionally personalized
///
/// The engine only reads from its collaborators and keeps no state between
/// calls, so one instance is shared across all requests.
pub struct SimilarityEngine {
    catalog: Arc<dyn MovieCatalog>,
    users: Arc<dyn UserDirectory>,
    weights: ScoringWeights,
}

impl SimilarityEngine {
    pub fn new(
        catalog: Arc<dyn MovieCatalog>,
        users: Arc<dyn UserDirectory>,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            catalog,
            users,
            weights,
        }
    }

    /// Suggestions for `movie` ordered by content similarity
    #[instrument(skip(self, movie), fields(movie_id = movie.id))]
    pub async fn suggestions_for_movie(
        &self,
        movie: &Movie,
        page: PageRequest,
    ) -> AppResult<SuggestionPage> {
        let snapshot = self.catalog.all_movies().await?;
        let ranked = rank(snapshot, movie.id, &[], &self.weights)?;

        tracing::debug!(candidates = ranked.len(), "Ranked catalog");

        Ok(SuggestionPage::from_ranked(ranked, page))
    }

    /// Suggestions for `movie` reweighted by the user's liked movies
    ///
    /// Fails with `Unauthenticated` when no user is given. A user without
    /// liked movies gets the same ranking as [`Self::suggestions_for_movie`].
    #[instrument(skip(self, movie, user), fields(movie_id = movie.id))]
    pub async fn suggestions_for_movie_and_user(
        &self,
        movie: &Movie,
        user: Option<&User>,
        page: PageRequest,
    ) -> AppResult<SuggestionPage> {
        let user = user.ok_or(AppError::Unauthenticated)?;

        let snapshot = self.catalog.all_movies().await?;
        let history = self.users.ratings_for(user.id).await?;
        let ranked = rank(snapshot, movie.id, &history, &self.weights)?;

        tracing::debug!(
            user_id = user.id,
            history = history.len(),
            candidates = ranked.len(),
            "Ranked catalog for user"
        );

        Ok(SuggestionPage::from_ranked(ranked, page))
    }
}

/// Orders every movie except `query` by descending score, ties by ascending id
fn rank(
    snapshot: Vec<Movie>,
    query: MovieId,
    history: &[Rating],
    weights: &ScoringWeights,
) -> AppResult<Vec<Movie>> {
    let features: HashMap<MovieId, Features> = snapshot
        .iter()
        .map(|movie| (movie.id, Features::from(movie)))
        .collect();

    let reference = features
        .get(&query)
        .ok_or_else(|| AppError::NotFound(format!("Movie {} is not in the catalog", query)))?;

    let affinity = Affinity::from_history(history, &features, weights);

    let mut scored: Vec<(f64, Movie)> = snapshot
        .into_iter()
        .filter(|movie| movie.id != query)
        .map(|movie| {
            let candidate = &features[&movie.id];
            let similarity = weights.similarity(reference, candidate);
            let affinity = affinity.as_ref().and_then(|a| a.score(candidate, weights));
            (weights.blend(similarity, affinity), movie)
        })
        .collect();

    scored.sort_by(|(score_a, a), (score_b, b)| {
        score_b.total_cmp(score_a).then_with(|| a.id.cmp(&b.id))
    });

    Ok(scored.into_iter().map(|(_, movie)| movie).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::{MockMovieCatalog, MockUserDirectory};

    fn movie(id: MovieId, genres: &[&str]) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            genres: genres.iter().map(|g| g.to_string()).collect(),
            cast: vec![],
            release_year: None,
        }
    }

    fn sample_catalog() -> Vec<Movie> {
        vec![
            movie(1, &["action"]),
            movie(2, &["action"]),
            movie(3, &["drama"]),
        ]
    }

    fn catalog_returning(movies: Vec<Movie>) -> MockMovieCatalog {
        let mut catalog = MockMovieCatalog::new();
        catalog
            .expect_all_movies()
            .returning(move || Ok(movies.clone()));
        catalog
    }

    fn users_with_history(history: Vec<Rating>) -> MockUserDirectory {
        let mut users = MockUserDirectory::new();
        users
            .expect_ratings_for()
            .returning(move |_| Ok(history.clone()));
        users
    }

    fn engine(catalog: MockMovieCatalog, users: MockUserDirectory) -> SimilarityEngine {
        SimilarityEngine::new(Arc::new(catalog), Arc::new(users), ScoringWeights::default())
    }

    fn ids(page: &SuggestionPage) -> Vec<MovieId> {
        page.content.iter().map(|m| m.id).collect()
    }

    #[tokio::test]
    async fn test_genre_match_ranked_first() {
        let engine = engine(catalog_returning(sample_catalog()), MockUserDirectory::new());
        let page = engine
            .suggestions_for_movie(&movie(1, &["action"]), PageRequest::new(0, 2))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![2, 3]);
        assert_eq!(page.total_elements, 2);
    }

    #[tokio::test]
    async fn test_ties_broken_by_ascending_id() {
        let movies = vec![
            movie(10, &["western"]),
            movie(7, &["comedy"]),
            movie(3, &["comedy"]),
            movie(5, &["comedy"]),
        ];
        let engine = engine(catalog_returning(movies), MockUserDirectory::new());
        let page = engine
            .suggestions_for_movie(&movie(10, &["western"]), PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![3, 5, 7]);
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let engine = engine(catalog_returning(sample_catalog()), MockUserDirectory::new());
        let result = engine
            .suggestions_for_movie(&movie(42, &["action"]), PageRequest::new(0, 5))
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pages_share_total_and_exclude_query() {
        let movies: Vec<Movie> = (1..=7).map(|id| movie(id, &["action"])).collect();
        let engine = engine(catalog_returning(movies), MockUserDirectory::new());
        let query = movie(4, &["action"]);

        let mut seen = Vec::new();
        for index in 0..3 {
            let page = engine
                .suggestions_for_movie(&query, PageRequest::new(index, 3))
                .await
                .unwrap();
            assert!(page.content.len() <= 3);
            assert_eq!(page.total_elements, 6);
            seen.extend(ids(&page));
        }
        assert_eq!(seen, vec![1, 2, 3, 5, 6, 7]);
    }

    #[tokio::test]
    async fn test_missing_user_is_unauthenticated() {
        let engine = engine(catalog_returning(sample_catalog()), MockUserDirectory::new());
        let result = engine
            .suggestions_for_movie_and_user(&movie(1, &["action"]), None, PageRequest::new(0, 5))
            .await;
        assert!(matches!(result, Err(AppError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_user_without_history_matches_plain_ranking() {
        let movies = vec![
            movie(1, &["action", "crime"]),
            movie(2, &["crime"]),
            movie(3, &["drama"]),
            movie(4, &["action"]),
        ];
        let engine = engine(catalog_returning(movies), users_with_history(vec![]));
        let user = User {
            id: 1,
            login: "alice".to_string(),
        };
        let query = movie(1, &["action", "crime"]);

        let plain = engine
            .suggestions_for_movie(&query, PageRequest::new(0, 10))
            .await
            .unwrap();
        let personalized = engine
            .suggestions_for_movie_and_user(&query, Some(&user), PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(plain, personalized);
    }

    #[tokio::test]
    async fn test_history_boosts_liked_genres() {
        // 2 and 3 tie on content similarity to 1; the user loves dramas.
        let movies = vec![
            movie(1, &["thriller"]),
            movie(2, &["comedy"]),
            movie(3, &["drama"]),
            movie(4, &["drama"]),
        ];
        let history = vec![Rating {
            user_id: 1,
            movie_id: 4,
            score: 5.0,
        }];
        let engine = engine(catalog_returning(movies), users_with_history(history));
        let user = User {
            id: 1,
            login: "alice".to_string(),
        };

        let page = engine
            .suggestions_for_movie_and_user(&movie(1, &["thriller"]), Some(&user), PageRequest::new(0, 1))
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![3]);
    }

    #[tokio::test]
    async fn test_repeated_calls_are_identical() {
        let movies: Vec<Movie> = (1..=20)
            .map(|id| {
                let genres: &[&str] = if id % 3 == 0 { &["drama"] } else { &["action", "drama"] };
                movie(id, genres)
            })
            .collect();
        let engine = engine(catalog_returning(movies), MockUserDirectory::new());
        let query = movie(1, &["action", "drama"]);

        let first = engine
            .suggestions_for_movie(&query, PageRequest::new(1, 5))
            .await
            .unwrap();
        let second = engine
            .suggestions_for_movie(&query, PageRequest::new(1, 5))
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
