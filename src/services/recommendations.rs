use std::future::Future;
use std::sync::Arc;

use tracing::instrument;

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{Movie, MovieId, PageRequest, SuggestionPage},
    services::{
        catalog::{MovieCatalog, UserDirectory},
        similarity::SimilarityEngine,
    },
};

/// Request-facing suggestion operations
///
/// Resolves the movie and caller, runs the similarity engine and maps the
/// absent cases (unknown movie, no authenticated user) to `Ok(None)` so the
/// HTTP layer can answer them with an empty success.
pub struct RecommendationService {
    movies: Arc<dyn MovieCatalog>,
    users: Arc<dyn UserDirectory>,
    engine: SimilarityEngine,
    cache: Option<Cache>,
    cache_ttl: u64,
}

impl RecommendationService {
    pub fn new(
        movies: Arc<dyn MovieCatalog>,
        users: Arc<dyn UserDirectory>,
        engine: SimilarityEngine,
    ) -> Self {
        Self {
            movies,
            users,
            engine,
            cache: None,
            cache_ttl: 0,
        }
    }

    /// Caches computed pages in Redis for `ttl` seconds
    pub fn with_cache(mut self, cache: Cache, ttl: u64) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    /// Looks up a single movie
    pub async fn find_movie(&self, id: MovieId) -> AppResult<Movie> {
        self.movies
            .find_movie(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))
    }

    /// Suggestions for movie `id`, `None` if the movie does not exist
    #[instrument(skip(self))]
    pub async fn suggestions_for_movie(
        &self,
        id: MovieId,
        page: PageRequest,
    ) -> AppResult<Option<SuggestionPage>> {
        let Some(movie) = self.movies.find_movie(id).await? else {
            tracing::debug!("Movie not found, returning empty suggestions");
            return Ok(None);
        };

        let key = CacheKey::Suggestions {
            movie_id: id,
            user_id: None,
            page,
        };
        let result = self
            .ranked(&key, self.engine.suggestions_for_movie(&movie, page))
            .await;

        empty_when_absent(result)
    }

    /// Suggestions for movie `id` personalized to the caller `login`
    ///
    /// `None` if the movie does not exist, no login was supplied, or the
    /// login is unknown.
    #[instrument(skip(self))]
    pub async fn suggestions_for_movie_and_user(
        &self,
        id: MovieId,
        login: Option<&str>,
        page: PageRequest,
    ) -> AppResult<Option<SuggestionPage>> {
        let Some(movie) = self.movies.find_movie(id).await? else {
            tracing::debug!("Movie not found, returning empty suggestions");
            return Ok(None);
        };

        let user = match login {
            Some(login) => self.users.find_by_login(login).await?,
            None => None,
        };
        let Some(user) = user else {
            tracing::debug!("No authenticated user, returning empty suggestions");
            return Ok(None);
        };

        let key = CacheKey::Suggestions {
            movie_id: id,
            user_id: Some(user.id),
            page,
        };
        let result = self
            .ranked(
                &key,
                self.engine
                    .suggestions_for_movie_and_user(&movie, Some(&user), page),
            )
            .await;

        empty_when_absent(result)
    }

    async fn ranked<F>(&self, key: &CacheKey, compute: F) -> AppResult<SuggestionPage>
    where
        F: Future<Output = AppResult<SuggestionPage>>,
    {
        match &self.cache {
            Some(cache) => cached!(cache, *key, self.cache_ttl, compute),
            None => compute.await,
        }
    }
}

fn empty_when_absent(result: AppResult<SuggestionPage>) -> AppResult<Option<SuggestionPage>> {
    match result {
        Ok(page) => Ok(Some(page)),
        Err(e) if e.is_absent() => {
            tracing::debug!(error = %e, "Suggestions unavailable, returning empty result");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Rating, User};
    use crate::services::catalog::{MockMovieCatalog, MockUserDirectory};
    use crate::services::ScoringWeights;

    fn movie(id: MovieId, genre: &str) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            genres: vec![genre.to_string()],
            cast: vec![],
            release_year: None,
        }
    }

    fn catalog() -> Vec<Movie> {
        vec![movie(1, "action"), movie(2, "action"), movie(3, "drama")]
    }

    fn mock_catalog() -> MockMovieCatalog {
        let mut mock = MockMovieCatalog::new();
        mock.expect_find_movie()
            .returning(|id| Ok(catalog().into_iter().find(|m| m.id == id)));
        mock.expect_all_movies().returning(|| Ok(catalog()));
        mock
    }

    fn mock_users() -> MockUserDirectory {
        let mut mock = MockUserDirectory::new();
        mock.expect_find_by_login().returning(|login| {
            Ok((login == "alice").then(|| User {
                id: 1,
                login: "alice".to_string(),
            }))
        });
        mock.expect_ratings_for().returning(|_| {
            Ok(vec![Rating {
                user_id: 1,
                movie_id: 3,
                score: 5.0,
            }])
        });
        mock
    }

    fn service(movies: MockMovieCatalog, users: MockUserDirectory) -> RecommendationService {
        let movies: Arc<dyn MovieCatalog> = Arc::new(movies);
        let users: Arc<dyn UserDirectory> = Arc::new(users);
        let engine = SimilarityEngine::new(movies.clone(), users.clone(), ScoringWeights::default());
        RecommendationService::new(movies, users, engine)
    }

    #[tokio::test]
    async fn test_suggestions_for_known_movie() {
        let service = service(mock_catalog(), mock_users());
        let page = service
            .suggestions_for_movie(1, PageRequest::new(0, 2))
            .await
            .unwrap()
            .unwrap();
        let ids: Vec<MovieId> = page.content.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[tokio::test]
    async fn test_unknown_movie_yields_none() {
        let service = service(mock_catalog(), MockUserDirectory::new());
        let page = service
            .suggestions_for_movie(99, PageRequest::new(0, 2))
            .await
            .unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_missing_login_yields_none() {
        let service = service(mock_catalog(), MockUserDirectory::new());
        let page = service
            .suggestions_for_movie_and_user(1, None, PageRequest::new(0, 2))
            .await
            .unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_unknown_login_yields_none() {
        let service = service(mock_catalog(), mock_users());
        let page = service
            .suggestions_for_movie_and_user(1, Some("mallory"), PageRequest::new(0, 2))
            .await
            .unwrap();
        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_personalized_suggestions_for_known_user() {
        let service = service(mock_catalog(), mock_users());
        let page = service
            .suggestions_for_movie_and_user(1, Some("alice"), PageRequest::new(0, 5))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(page.total_elements, 2);
        assert!(page.content.iter().all(|m| m.id != 1));
    }

    #[tokio::test]
    async fn test_store_failure_is_propagated() {
        let mut movies = MockMovieCatalog::new();
        movies
            .expect_find_movie()
            .returning(|_| Err(AppError::Internal("connection reset".to_string())));
        let service = service(movies, MockUserDirectory::new());

        let result = service.suggestions_for_movie(1, PageRequest::new(0, 2)).await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn test_find_movie_not_found() {
        let service = service(mock_catalog(), MockUserDirectory::new());
        assert!(matches!(service.find_movie(5).await, Err(AppError::NotFound(_))));
        assert_eq!(service.find_movie(2).await.unwrap().id, 2);
    }
}
