use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;
use tokio::sync::RwLock;

use crate::{
    error::AppResult,
    models::{Movie, MovieId, Rating, User, UserId},
    services::{MovieCatalog, UserDirectory},
};

/// Seed document for the in-memory store
#[derive(Debug, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub movies: Vec<Movie>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl CatalogSeed {
    /// Reads a seed from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read seed {}: {}", path.display(), e))?;
        let seed = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("Failed to parse seed {}: {}", path.display(), e))?;
        Ok(seed)
    }
}

struct StoreInner {
    // Ordered so catalog snapshots come back in the same order every time.
    movies: BTreeMap<MovieId, Movie>,
    users: HashMap<String, User>,
    ratings: HashMap<UserId, Vec<Rating>>,
}

/// Movie catalog and user directory held in process memory
pub struct InMemoryStore {
    inner: RwLock<StoreInner>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(CatalogSeed::default())
    }
}

impl InMemoryStore {
    pub fn new(seed: CatalogSeed) -> Self {
        let movies = seed.movies.into_iter().map(|m| (m.id, m)).collect();
        let users = seed.users.into_iter().map(|u| (u.login.clone(), u)).collect();

        let mut ratings: HashMap<UserId, Vec<Rating>> = HashMap::new();
        for rating in seed.ratings {
            ratings.entry(rating.user_id).or_default().push(rating);
        }

        Self {
            inner: RwLock::new(StoreInner {
                movies,
                users,
                ratings,
            }),
        }
    }

    pub async fn movie_count(&self) -> usize {
        self.inner.read().await.movies.len()
    }
}

#[async_trait::async_trait]
impl MovieCatalog for InMemoryStore {
    async fn find_movie(&self, id: MovieId) -> AppResult<Option<Movie>> {
        Ok(self.inner.read().await.movies.get(&id).cloned())
    }

    async fn all_movies(&self) -> AppResult<Vec<Movie>> {
        Ok(self.inner.read().await.movies.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl UserDirectory for InMemoryStore {
    async fn find_by_login(&self, login: &str) -> AppResult<Option<User>> {
        Ok(self.inner.read().await.users.get(login).cloned())
    }

    async fn ratings_for(&self, user_id: UserId) -> AppResult<Vec<Rating>> {
        Ok(self
            .inner
            .read()
            .await
            .ratings
            .get(&user_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> CatalogSeed {
        serde_json::from_str(
            r#"{
                "movies": [
                    {"id": 2, "title": "Heat", "genres": ["crime"]},
                    {"id": 1, "title": "Ronin", "genres": ["action"]}
                ],
                "users": [{"id": 10, "login": "alice"}],
                "ratings": [{"user_id": 10, "movie_id": 2, "score": 5.0}]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_all_movies_ordered_by_id() {
        let store = InMemoryStore::new(seed());
        let ids: Vec<MovieId> = store.all_movies().await.unwrap().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(store.movie_count().await, 2);
    }

    #[tokio::test]
    async fn test_user_lookup_and_history() {
        let store = InMemoryStore::new(seed());
        let user = store.find_by_login("alice").await.unwrap().unwrap();
        assert_eq!(user.id, 10);
        assert_eq!(store.ratings_for(10).await.unwrap().len(), 1);
        assert!(store.ratings_for(11).await.unwrap().is_empty());
        assert!(store.find_by_login("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_movie() {
        let store = InMemoryStore::new(seed());
        assert_eq!(store.find_movie(2).await.unwrap().unwrap().title, "Heat");
        assert!(store.find_movie(3).await.unwrap().is_none());
    }
}
