//! Read-only collaborators the suggestion services depend on.
//!
//! Both traits are implemented by the in-memory store and the Postgres
//! store in `crate::db`, and mocked in unit tests.

use crate::{
    error::AppResult,
    models::{Movie, MovieId, Rating, User, UserId},
};

/// Movie lookup and catalog snapshots
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MovieCatalog: Send + Sync {
    /// Resolves a single movie, `None` when the id is unknown
    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>>;

    /// Returns every movie in the catalog
    ///
    /// Suggestions are ranked against this snapshot, so two calls against
    /// an unchanged catalog must return the same set of movies.
    async fn all_movies(&self) -> AppResult<Vec<Movie>>;
}

/// Account lookup and watch history
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>>;

    async fn ratings_for(&self, user_id: UserId) -> AppResult<Vec<Rating>>;
}
